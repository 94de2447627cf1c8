//! Delta construction, the binary delta format, and patching
//!
//! A delta encodes a new file against a basis file as a stream of commands:
//! `Copy(offset, length)` reuses bytes already present in the basis, and
//! `Data(bytes)` carries literal bytes. Applying the commands in order to the
//! basis reproduces the new file exactly.

pub mod apply;
pub mod builder;
pub mod reader;
pub mod writer;

pub use apply::{apply_delta, verify_new_file};
pub use builder::DeltaBuilder;
pub use reader::BinaryDeltaReader;
pub use writer::BinaryDeltaWriter;

use crate::error::Result;
use crate::hash::HashAlgorithm;
use std::io::{Read, Seek};

/// Sink for delta commands.
///
/// An implementation may hold back the most recent copy command so that runs
/// of adjacent copies collapse into one; callers must invoke
/// [`flush`](DeltaWriter::flush) once the command stream is complete.
pub trait DeltaWriter {
    /// Write the delta file metadata: header, version, hash algorithm and the
    /// expected hash of the reconstructed file.
    fn write_metadata(&mut self, hash_algorithm: HashAlgorithm, expected_hash: &[u8])
        -> Result<()>;

    /// Append a command copying `length` bytes from `offset` in the basis.
    fn write_copy_command(&mut self, offset: u64, length: u64) -> Result<()>;

    /// Append a command carrying `length` literal bytes, read from `source`
    /// starting at `offset`. The source's seek position is preserved across
    /// the call on every path, including errors.
    fn write_data_command<S: Read + Seek>(
        &mut self,
        source: &mut S,
        offset: u64,
        length: u64,
    ) -> Result<()>;

    /// Emit any held-back copy command.
    fn flush(&mut self) -> Result<()>;
}
