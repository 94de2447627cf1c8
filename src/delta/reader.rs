//! Binary delta parsing

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::iter::{ByteIter, READ_BUFFER_SIZE};
use crate::wire;
use std::io::{ErrorKind, Read};

/// Metadata parsed from the front of a delta file.
#[derive(Debug, Clone)]
struct DeltaMetadata {
    hash_algorithm: HashAlgorithm,
    expected_hash: Vec<u8>,
}

/// Streaming reader for the binary delta format.
///
/// Metadata is parsed lazily on first access and cached; the command stream
/// is then dispatched to a pair of visitor callbacks by [`apply`](Self::apply).
pub struct BinaryDeltaReader<R> {
    input: R,
    metadata: Option<DeltaMetadata>,
}

impl<R: Read> BinaryDeltaReader<R> {
    /// Wrap a delta stream.
    pub fn new(input: R) -> Self {
        Self {
            input,
            metadata: None,
        }
    }

    /// The hash the reconstructed file must have.
    pub fn expected_hash(&mut self) -> Result<Vec<u8>> {
        Ok(self.ensure_metadata()?.expected_hash.clone())
    }

    /// The hash algorithm named in the delta metadata.
    pub fn hash_algorithm(&mut self) -> Result<HashAlgorithm> {
        Ok(self.ensure_metadata()?.hash_algorithm)
    }

    /// Stream the command sequence, invoking `write_data` for every chunk of
    /// literal bytes and `copy_data(offset, length)` for every copy command.
    ///
    /// Clean end-of-stream at a command boundary is success; a failure from
    /// either callback aborts the loop and propagates.
    pub fn apply<FD, FC>(&mut self, mut write_data: FD, mut copy_data: FC) -> Result<()>
    where
        FD: FnMut(&[u8]) -> Result<()>,
        FC: FnMut(u64, u64) -> Result<()>,
    {
        self.ensure_metadata()?;

        let mut scratch = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let command = match read_command_byte(&mut self.input)? {
                Some(command) => command,
                None => return Ok(()),
            };

            match command {
                wire::COPY_COMMAND => {
                    let start = non_negative(wire::read_i64(&mut self.input)?, "copy offset")?;
                    let length = non_negative(wire::read_i64(&mut self.input)?, "copy length")?;
                    copy_data(start, length)?;
                }
                wire::DATA_COMMAND => {
                    let length = non_negative(wire::read_i64(&mut self.input)?, "data length")?;
                    let mut iter = ByteIter::bounded_with_buffer(&mut self.input, scratch, length);
                    while let Some(chunk) = iter.next_chunk()? {
                        write_data(chunk)?;
                    }
                    scratch = iter.into_buffer();
                }
                other => {
                    return Err(Error::corrupt(format!(
                        "unexpected command byte 0x{other:02x} in delta file"
                    )))
                }
            }
        }
    }

    fn ensure_metadata(&mut self) -> Result<&DeltaMetadata> {
        let metadata = match self.metadata.take() {
            Some(metadata) => metadata,
            None => read_delta_metadata(&mut self.input)?,
        };
        Ok(self.metadata.insert(metadata))
    }
}

fn read_delta_metadata<R: Read>(input: &mut R) -> Result<DeltaMetadata> {
    wire::expect_bytes(
        input,
        wire::DELTA_HEADER,
        "the delta file appears to be corrupt",
    )?;
    wire::expect_bytes(
        input,
        &[wire::FORMAT_VERSION],
        "the delta file uses a newer file format than this program can handle",
    )?;

    let (hash_name, _) = wire::read_string(input)?;
    let hash_algorithm = HashAlgorithm::from_name(&hash_name)
        .ok_or_else(|| Error::corrupt("the delta file uses an unsupported hashing algorithm"))?;

    let hash_length = wire::read_i32(input)?;
    if hash_length != hash_algorithm.hash_len() as i32 {
        return Err(Error::corrupt("the delta file contains an invalid hash length"));
    }

    let mut expected_hash = vec![0u8; hash_algorithm.hash_len()];
    wire::read_full(input, &mut expected_hash)?;

    wire::expect_bytes(
        input,
        wire::END_OF_METADATA,
        "the delta file appears to be corrupt",
    )?;

    Ok(DeltaMetadata {
        hash_algorithm,
        expected_hash,
    })
}

/// Read one command-type byte; `None` means clean end-of-stream.
fn read_command_byte<R: Read>(input: &mut R) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

fn non_negative(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::corrupt(format!("negative {what} in delta file")))
}
