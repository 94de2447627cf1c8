//! Binary delta emission with copy-command coalescing

use super::DeltaWriter;
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::iter::ByteIter;
use crate::wire;
use std::io::{Read, Seek, SeekFrom, Write};

/// Buffer size for streaming literal-data payloads
const DATA_COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// A copy command held back so an adjacent successor can merge into it.
#[derive(Debug, Clone, Copy)]
struct PendingCopy {
    offset: u64,
    length: u64,
}

/// Writes the binary delta format.
///
/// Copy commands are buffered one at a time: a new copy whose region abuts
/// the pending one extends it instead of emitting a second command, which is
/// the dominant space win over long unchanged regions.
pub struct BinaryDeltaWriter<W> {
    output: W,
    pending_copy: Option<PendingCopy>,
}

impl<W: Write> BinaryDeltaWriter<W> {
    /// Wrap an output stream.
    pub fn new(output: W) -> Self {
        Self {
            output,
            pending_copy: None,
        }
    }

    /// Recover the output stream (for example to flush a buffered writer).
    pub fn into_inner(self) -> W {
        self.output
    }

    fn emit_copy(output: &mut W, offset: u64, length: u64) -> Result<()> {
        output.write_all(&[wire::COPY_COMMAND])?;
        output.write_all(&(offset as i64).to_le_bytes())?;
        output.write_all(&(length as i64).to_le_bytes())?;
        Ok(())
    }
}

impl<W: Write> DeltaWriter for BinaryDeltaWriter<W> {
    fn write_metadata(
        &mut self,
        hash_algorithm: HashAlgorithm,
        expected_hash: &[u8],
    ) -> Result<()> {
        self.output.write_all(wire::DELTA_HEADER)?;
        self.output.write_all(&[wire::FORMAT_VERSION])?;
        wire::write_string(&mut self.output, hash_algorithm.name())?;
        self.output
            .write_all(&(expected_hash.len() as i32).to_le_bytes())?;
        self.output.write_all(expected_hash)?;
        self.output.write_all(wire::END_OF_METADATA)?;
        Ok(())
    }

    fn write_copy_command(&mut self, offset: u64, length: u64) -> Result<()> {
        match self.pending_copy.take() {
            None => self.pending_copy = Some(PendingCopy { offset, length }),
            Some(pending) if pending.offset + pending.length == offset => {
                self.pending_copy = Some(PendingCopy {
                    offset: pending.offset,
                    length: pending.length + length,
                });
            }
            Some(pending) => {
                Self::emit_copy(&mut self.output, pending.offset, pending.length)?;
                self.pending_copy = Some(PendingCopy { offset, length });
            }
        }
        Ok(())
    }

    fn write_data_command<S: Read + Seek>(
        &mut self,
        source: &mut S,
        offset: u64,
        length: u64,
    ) -> Result<()> {
        self.flush()?;

        self.output.write_all(&[wire::DATA_COMMAND])?;
        self.output.write_all(&(length as i64).to_le_bytes())?;

        // the caller relies on the source position being untouched, so it is
        // restored on both the success and the error path
        let original_position = source.stream_position()?;
        let copied = copy_payload(&mut self.output, source, offset, length);
        let restored = source.seek(SeekFrom::Start(original_position));
        copied?;
        restored?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(pending) = self.pending_copy.take() {
            Self::emit_copy(&mut self.output, pending.offset, pending.length)?;
        }
        Ok(())
    }
}

fn copy_payload<W: Write, S: Read + Seek>(
    output: &mut W,
    source: &mut S,
    offset: u64,
    length: u64,
) -> Result<()> {
    source.seek(SeekFrom::Start(offset))?;
    let mut iter = ByteIter::bounded(source, DATA_COPY_BUFFER_SIZE, length);
    while let Some(chunk) = iter.next_chunk()? {
        output.write_all(chunk)?;
    }
    Ok(())
}
