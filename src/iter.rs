//! Pull iteration over byte sources
//!
//! Reading a stream to the end while tolerating short reads, interrupts and
//! optional byte limits is fiddly enough that every reader in the crate would
//! otherwise reimplement it. [`ByteIter`] wraps it up: each call to
//! [`next_chunk`](ByteIter::next_chunk) yields a non-empty slice of a reused
//! internal buffer, `Ok(None)` on clean termination, or the first error.

use crate::error::Result;
use std::io::{ErrorKind, Read};

/// Buffer size used for bulk file reads throughout the crate
pub const READ_BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// A pull iterator over a byte source producing non-empty chunks.
///
/// The returned slices alias one internal buffer, so each chunk must be
/// consumed before the next `next_chunk` call. The iterator is not
/// restartable; once it reports termination it stays terminated.
pub struct ByteIter<R> {
    reader: R,
    buffer: Vec<u8>,
    limit: Option<u64>,
    read_so_far: u64,
    done: bool,
}

impl<R: Read> ByteIter<R> {
    /// Iterate until the source reports end-of-stream.
    pub fn new(reader: R, buffer_size: usize) -> Self {
        Self::with_buffer(reader, vec![0u8; buffer_size], None)
    }

    /// Iterate until exactly `limit` cumulative bytes have been delivered,
    /// even if the underlying source has more.
    pub fn bounded(reader: R, buffer_size: usize, limit: u64) -> Self {
        Self::with_buffer(reader, vec![0u8; buffer_size], Some(limit))
    }

    /// Bounded iteration reusing an already-allocated buffer.
    pub fn bounded_with_buffer(reader: R, buffer: Vec<u8>, limit: u64) -> Self {
        Self::with_buffer(reader, buffer, Some(limit))
    }

    fn with_buffer(reader: R, buffer: Vec<u8>, limit: Option<u64>) -> Self {
        Self {
            reader,
            buffer,
            limit,
            read_so_far: 0,
            done: false,
        }
    }

    /// Recover the internal buffer for reuse by a later iterator.
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }

    /// Pull the next chunk from the source.
    ///
    /// Returns `Ok(Some(chunk))` with a non-empty slice, `Ok(None)` on clean
    /// termination, or the underlying I/O error. After termination (clean or
    /// failed) every further call returns `Ok(None)` without touching the
    /// source.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.done {
            return Ok(None);
        }

        let mut window = self.buffer.len();
        if let Some(limit) = self.limit {
            let remaining = limit - self.read_so_far;
            if remaining == 0 {
                self.done = true;
                return Ok(None);
            }
            window = window.min(remaining as usize);
        }

        loop {
            match self.reader.read(&mut self.buffer[..window]) {
                Ok(0) => {
                    self.done = true;
                    return Ok(None);
                }
                Ok(n) => {
                    self.read_so_far += n as u64;
                    if self.limit == Some(self.read_so_far) {
                        // the limit is met; deliver this chunk, then terminate
                        self.done = true;
                    }
                    return Ok(Some(&self.buffer[..n]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Err(err.into());
                }
            }
        }
    }
}
