//! Sliding-window delta construction
//!
//! The builder slides a window over the new file, probing every offset
//! against the basis chunk set by rolling checksum and confirming candidate
//! matches by SHA1. Matched regions become copy commands; the gaps between
//! matches become literal-data commands.

use super::DeltaWriter;
use crate::error::Result;
use crate::iter::READ_BUFFER_SIZE;
use crate::progress::{NopProgressReporter, ProgressReporter};
use crate::signature::reader::read_signature;
use crate::signature::ChunkSignature;
use std::collections::HashMap;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Transient lookup structure over the sorted chunk list.
///
/// `first_index` maps each rolling checksum to the lowest index of its run of
/// equal-checksum chunks; the builder scans the run linearly from there.
struct ChunkIndex {
    first_index: HashMap<u32, usize>,
    min_chunk_size: usize,
    max_chunk_size: usize,
}

fn build_chunk_index(
    chunks: &[ChunkSignature],
    progress: &mut dyn ProgressReporter,
) -> ChunkIndex {
    let total = chunks.len() as u64;
    progress.report("Creating chunk map", 0, total);

    let mut min_chunk_size = usize::from(u16::MAX);
    let mut max_chunk_size = 0usize;
    let mut first_index = HashMap::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let length = usize::from(chunk.length);
        min_chunk_size = min_chunk_size.min(length);
        max_chunk_size = max_chunk_size.max(length);
        first_index.entry(chunk.rolling_checksum).or_insert(index);
        progress.report("Creating chunk map", index as u64, total);
    }

    ChunkIndex {
        first_index,
        min_chunk_size,
        max_chunk_size,
    }
}

/// Builds a delta encoding a new file against a basis file's signature.
pub struct DeltaBuilder {
    /// Progress sink
    pub progress: Box<dyn ProgressReporter>,
}

impl DeltaBuilder {
    /// Builder that discards progress.
    pub fn new() -> Self {
        Self {
            progress: Box::new(NopProgressReporter),
        }
    }

    /// Produce a delta that reconstructs `new_file` from the basis the
    /// signature was built over, writing commands through `writer`.
    ///
    /// `new_file` must be seekable with a known length: the search seeks
    /// backwards between buffer refills, and a short read is taken as
    /// end-of-stream.
    pub fn build<N, S, W>(
        &mut self,
        new_file: &mut N,
        new_file_length: u64,
        signature_file: &mut S,
        signature_file_length: u64,
        writer: &mut W,
    ) -> Result<()>
    where
        N: Read + Seek,
        S: Read,
        W: DeltaWriter,
    {
        let signature = read_signature(
            signature_file,
            signature_file_length,
            self.progress.as_mut(),
        )?;

        let hash_algorithm = signature.hash_algorithm;
        let rolling = signature.rolling_checksum;

        // the whole file is hashed up front so the expected hash can sit in
        // the metadata ahead of the command stream
        let new_file_hash = hash_algorithm.hash_reader(new_file)?;
        new_file.seek(SeekFrom::Start(0))?;

        writer.write_metadata(hash_algorithm, &new_file_hash)?;

        let mut chunks = signature.chunks;
        chunks.sort_unstable_by_key(|chunk| (chunk.rolling_checksum, chunk.start_offset));
        let index = build_chunk_index(&chunks, self.progress.as_mut());

        tracing::debug!(
            new_file_length,
            chunk_count = chunks.len(),
            min_chunk_size = index.min_chunk_size,
            max_chunk_size = index.max_chunk_size,
            "starting delta search"
        );

        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let mut last_match_position = 0u64;
        let mut matches_found = 0u64;
        self.progress.report("Building delta", 0, new_file_length);

        let mut start_position = 0u64;

        loop {
            let bytes_read = read_once(new_file, &mut buffer)?;

            if bytes_read > 0 {
                let mut checksum = 0u32;
                let mut window_size = index.max_chunk_size;

                // probe every window position that still has at least a
                // minimum-size window ahead of it
                for i in 0..(bytes_read + 1).saturating_sub(index.min_chunk_size) {
                    let read_so_far = start_position + i as u64;

                    let remaining = bytes_read - i;
                    if remaining < index.max_chunk_size {
                        window_size = index.min_chunk_size;
                    }

                    checksum = if i == 0 || remaining < index.max_chunk_size {
                        // start of buffer, or the tail region where the
                        // window just shrank: recompute from scratch
                        rolling.calculate(&buffer[i..i + window_size])
                    } else {
                        rolling.rotate(
                            checksum,
                            buffer[i - 1],
                            buffer[i + window_size - 1],
                            window_size,
                        )
                    };

                    self.progress
                        .report("Building delta", read_so_far, new_file_length);

                    // skip positions still covered by the copy command just
                    // emitted; rematching them would duplicate output
                    if (read_so_far as i64) - (last_match_position as i64 - window_size as i64)
                        < window_size as i64
                    {
                        continue;
                    }

                    let Some(&run_start) = index.first_index.get(&checksum) else {
                        continue;
                    };

                    let window_hash = hash_algorithm.hash_data(&buffer[i..i + window_size]);
                    for chunk in chunks[run_start..]
                        .iter()
                        .take_while(|chunk| chunk.rolling_checksum == checksum)
                    {
                        if chunk.hash == window_hash {
                            let match_end = read_so_far + window_size as u64;

                            // everything between the previous match and this
                            // one has no counterpart in the basis
                            let missing = match_end - last_match_position;
                            if missing > window_size as u64 {
                                writer.write_data_command(
                                    new_file,
                                    last_match_position,
                                    missing - window_size as u64,
                                )?;
                            }

                            writer.write_copy_command(
                                chunk.start_offset,
                                u64::from(chunk.length),
                            )?;
                            last_match_position = match_end;
                            matches_found += 1;
                            break;
                        }
                    }
                }
            }

            // a short read is the practical end of a file source; sources
            // that legitimately return short reads are not supported here
            if bytes_read < buffer.len() {
                break;
            }

            // overlap the next refill with the end of this one so no window
            // straddling the buffer boundary is missed
            start_position =
                new_file.seek(SeekFrom::Current(-(index.max_chunk_size as i64) + 1))?;
        }

        if new_file_length != last_match_position {
            writer.write_data_command(
                new_file,
                last_match_position,
                new_file_length - last_match_position,
            )?;
        }

        tracing::debug!(matches_found, "delta search complete");

        writer.flush()
    }
}

impl Default for DeltaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One read call, retrying interrupts; `Ok(0)` is end-of-stream.
fn read_once<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buffer) {
            Ok(n) => return Ok(n),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }
}
