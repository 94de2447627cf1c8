//! octodelta - rsync-style binary deltas in the octodiff format
//!
//! This library produces and consumes signature and delta files that are
//! byte-for-byte interchangeable with the octodiff tools: a signature
//! summarizes a basis file as fixed-size chunk records, a delta encodes a
//! new file against that signature as copy and literal-data commands, and
//! patching replays the commands over the basis to reconstruct the new file,
//! verified by SHA1.

pub mod cli;
pub mod delta;
pub mod error;
pub mod hash;
pub mod iter;
pub mod progress;
pub mod rolling;
pub mod signature;
pub mod wire;

pub use delta::{apply_delta, verify_new_file, BinaryDeltaReader, BinaryDeltaWriter, DeltaBuilder};
pub use error::{Error, Result};
pub use hash::HashAlgorithm;
pub use rolling::RollingChecksumAlgorithm;
pub use signature::{Signature, SignatureBuilder, SignatureReader};
