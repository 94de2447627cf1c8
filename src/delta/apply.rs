//! Applying deltas and verifying the result

use super::reader::BinaryDeltaReader;
use crate::error::{Error, Result};
use crate::iter::{ByteIter, READ_BUFFER_SIZE};
use std::cell::RefCell;
use std::io::{Read, Seek, SeekFrom, Write};

/// Reconstruct the new file by applying `delta` to `basis`, writing the
/// result to `output`.
///
/// Verification is a separate pass ([`verify_new_file`]) so callers are free
/// to buffer `output`; the digest should reflect the bytes actually on disk.
pub fn apply_delta<B, R, W>(
    basis: &mut B,
    delta: &mut BinaryDeltaReader<R>,
    output: &mut W,
) -> Result<()>
where
    B: Read + Seek,
    R: Read,
    W: Write,
{
    // both visitor callbacks append to the output, so it is shared through a
    // RefCell; apply never invokes them reentrantly
    let output = RefCell::new(output);
    let mut scratch = vec![0u8; READ_BUFFER_SIZE];

    delta.apply(
        |chunk| {
            output.borrow_mut().write_all(chunk)?;
            Ok(())
        },
        |offset, length| {
            basis.seek(SeekFrom::Start(offset))?;
            let mut output = output.borrow_mut();
            let mut iter =
                ByteIter::bounded_with_buffer(&mut *basis, std::mem::take(&mut scratch), length);
            while let Some(chunk) = iter.next_chunk()? {
                output.write_all(chunk)?;
            }
            scratch = iter.into_buffer();
            Ok(())
        },
    )
}

/// Check the reconstructed file against the hash recorded in the delta.
pub fn verify_new_file<N, R>(new_file: &mut N, delta: &mut BinaryDeltaReader<R>) -> Result<()>
where
    N: Read,
    R: Read,
{
    let expected_hash = delta.expected_hash()?;
    let algorithm = delta.hash_algorithm()?;
    let actual_hash = algorithm.hash_reader(new_file)?;

    if expected_hash != actual_hash.as_slice() {
        return Err(Error::Verification);
    }
    Ok(())
}
