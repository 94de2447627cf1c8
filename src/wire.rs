//! Binary format primitives shared by the signature and delta codecs
//!
//! All integers are little-endian. Strings carry a single-byte length prefix;
//! the multi-byte prefix form of the original C# writer is never produced and
//! is rejected on read.

use crate::error::{Error, Result};
use std::io::{ErrorKind, Read, Write};

/// Magic bytes opening a signature file
pub const SIGNATURE_HEADER: &[u8] = b"OCTOSIG";

/// Magic bytes opening a delta file
pub const DELTA_HEADER: &[u8] = b"OCTODELTA";

/// Marker closing the metadata section of both file kinds
pub const END_OF_METADATA: &[u8] = b">>>";

/// Command byte introducing a copy instruction
pub const COPY_COMMAND: u8 = 0x60;

/// Command byte introducing a literal-data instruction
pub const DATA_COMMAND: u8 = 0x80;

/// Format version written after each header
pub const FORMAT_VERSION: u8 = 0x01;

/// Fill `buf` completely, mapping a premature end-of-stream to a
/// truncation error that reports how much was actually delivered.
pub fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(Error::Truncated {
                    expected: buf.len(),
                    actual: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Read `expected.len()` bytes and require them to equal `expected`,
/// failing with `message` otherwise.
pub fn expect_bytes<R: Read>(input: &mut R, expected: &[u8], message: &str) -> Result<()> {
    let mut actual = vec![0u8; expected.len()];
    match read_full(input, &mut actual) {
        Ok(()) if actual == expected => Ok(()),
        Ok(()) => Err(Error::corrupt(message)),
        Err(Error::Truncated { .. }) => Err(Error::corrupt(message)),
        Err(err) => Err(err),
    }
}

/// Read a single-byte-length-prefixed UTF-8 string, returning it together
/// with the number of input bytes consumed.
pub fn read_string<R: Read>(input: &mut R) -> Result<(String, u64)> {
    let mut prefix = [0u8; 1];
    read_full(input, &mut prefix)?;
    let length = prefix[0];
    if length >= 0x80 {
        return Err(Error::corrupt(
            "string length uses the multi-byte form, which is not supported",
        ));
    }
    let mut bytes = vec![0u8; usize::from(length)];
    read_full(input, &mut bytes)?;
    let value = String::from_utf8(bytes)
        .map_err(|_| Error::corrupt("string is not valid UTF-8"))?;
    Ok((value, 1 + u64::from(length)))
}

/// Write a string with a single-byte length prefix. Only short names are
/// ever written; lengths above 127 would require the unsupported multi-byte
/// form.
pub fn write_string<W: Write>(output: &mut W, value: &str) -> Result<()> {
    debug_assert!(value.len() <= 0x7F);
    output.write_all(&[value.len() as u8])?;
    output.write_all(value.as_bytes())?;
    Ok(())
}

/// Read a little-endian i64.
pub fn read_i64<R: Read>(input: &mut R) -> Result<i64> {
    let mut bytes = [0u8; 8];
    read_full(input, &mut bytes)?;
    Ok(i64::from_le_bytes(bytes))
}

/// Read a little-endian i32.
pub fn read_i32<R: Read>(input: &mut R) -> Result<i32> {
    let mut bytes = [0u8; 4];
    read_full(input, &mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}
