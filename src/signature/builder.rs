//! Signature generation over a basis stream

use super::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::iter::ByteIter;
use crate::progress::{NopProgressReporter, ProgressReporter};
use crate::rolling::RollingChecksumAlgorithm;
use crate::wire;
use std::io::{Read, Write};

/// Builds a signature file from a basis stream.
///
/// The basis is read once, front to back, in `chunk_size` slices; each slice
/// (including a short final one) becomes a 26-byte record in the output.
pub struct SignatureBuilder {
    /// Chunk size in bytes, within `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`
    pub chunk_size: usize,
    /// Strong hash recorded per chunk
    pub hash_algorithm: HashAlgorithm,
    /// Weak checksum recorded per chunk
    pub rolling_checksum: RollingChecksumAlgorithm,
    /// Progress sink
    pub progress: Box<dyn ProgressReporter>,
}

impl SignatureBuilder {
    /// Builder with default chunk size and algorithms.
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash_algorithm: HashAlgorithm::default(),
            rolling_checksum: RollingChecksumAlgorithm::default(),
            progress: Box::new(NopProgressReporter),
        }
    }

    /// Stream `input` and write the complete signature file to `output`.
    ///
    /// `input_length` is only used for progress reporting; chunking adapts to
    /// the bytes actually read.
    pub fn build<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        input_length: u64,
        output: &mut W,
    ) -> Result<()> {
        self.ensure_valid()?;
        self.write_metadata(input_length, output)?;
        self.write_chunk_signatures(input, input_length, output)
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::config(format!(
                "chunk size {} is less than the minimum allowed ({MIN_CHUNK_SIZE})",
                self.chunk_size
            )));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::config(format!(
                "chunk size {} is greater than the maximum allowed ({MAX_CHUNK_SIZE})",
                self.chunk_size
            )));
        }
        Ok(())
    }

    fn write_metadata<W: Write>(&mut self, input_length: u64, output: &mut W) -> Result<()> {
        self.progress.report("Hashing file", 0, input_length);

        output.write_all(wire::SIGNATURE_HEADER)?;
        output.write_all(&[wire::FORMAT_VERSION])?;
        wire::write_string(output, self.hash_algorithm.name())?;
        wire::write_string(output, self.rolling_checksum.name())?;
        output.write_all(wire::END_OF_METADATA)?;

        self.progress.report("Hashing file", input_length, input_length);
        Ok(())
    }

    fn write_chunk_signatures<R: Read, W: Write>(
        &mut self,
        input: &mut R,
        input_length: u64,
        output: &mut W,
    ) -> Result<()> {
        self.progress.report("Building signatures", 0, input_length);

        let mut processed = 0u64;
        let mut iter = ByteIter::new(input, self.chunk_size);
        while let Some(chunk) = iter.next_chunk()? {
            output.write_all(&(chunk.len() as u16).to_le_bytes())?;
            output.write_all(&self.rolling_checksum.calculate(chunk).to_le_bytes())?;
            output.write_all(&self.hash_algorithm.hash_data(chunk))?;

            processed += chunk.len() as u64;
            self.progress.report("Building signatures", processed, input_length);
        }
        Ok(())
    }
}

impl Default for SignatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
