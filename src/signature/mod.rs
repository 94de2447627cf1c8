//! Signature generation and parsing
//!
//! A signature summarizes a basis file as an ordered list of fixed-size chunk
//! records (the final chunk may be short). Each record carries the chunk
//! length, a weak rolling checksum for cheap candidate matching, and a SHA1
//! hash that authoritatively confirms a match.

pub mod builder;
pub mod reader;

pub use builder::SignatureBuilder;
pub use reader::{read_signature, SignatureReader};

use crate::hash::{HashAlgorithm, SHA1_LENGTH};
use crate::rolling::RollingChecksumAlgorithm;

/// Smallest accepted chunk size
pub const MIN_CHUNK_SIZE: usize = 128;

/// Chunk size used when none is configured
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Largest accepted chunk size
pub const MAX_CHUNK_SIZE: usize = 31 * 1024;

/// Serialized size of one chunk record: u16 length + u32 checksum + SHA1
pub const CHUNK_RECORD_SIZE: usize = 2 + 4 + SHA1_LENGTH;

/// A parsed signature: the algorithms it was built with and its chunks,
/// in basis-file order.
#[derive(Debug, Clone)]
pub struct Signature {
    /// Strong hash algorithm used for chunk hashes
    pub hash_algorithm: HashAlgorithm,
    /// Weak checksum algorithm used for rolling matches
    pub rolling_checksum: RollingChecksumAlgorithm,
    /// Chunk records covering the basis file contiguously from offset 0
    pub chunks: Vec<ChunkSignature>,
}

impl Signature {
    /// Number of chunk records.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total length of the basis file the signature describes.
    pub fn basis_length(&self) -> u64 {
        self.chunks
            .iter()
            .map(|chunk| u64::from(chunk.length))
            .sum()
    }
}

/// One chunk record of a signature.
///
/// `start_offset` is not serialized; readers derive it as the running sum of
/// preceding chunk lengths. The hash is stored inline to keep multi-million
/// entry chunk lists compact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSignature {
    /// Offset of the chunk in the basis file (derived at read time)
    pub start_offset: u64,
    /// Chunk length in bytes, at most [`MAX_CHUNK_SIZE`]
    pub length: u16,
    /// Weak rolling checksum of the chunk
    pub rolling_checksum: u32,
    /// SHA1 of the chunk contents
    pub hash: [u8; SHA1_LENGTH],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_length_sums_chunk_lengths() {
        let signature = Signature {
            hash_algorithm: HashAlgorithm::Sha1,
            rolling_checksum: RollingChecksumAlgorithm::Adler32,
            chunks: vec![
                ChunkSignature {
                    start_offset: 0,
                    length: 2048,
                    rolling_checksum: 1,
                    hash: [0; SHA1_LENGTH],
                },
                ChunkSignature {
                    start_offset: 2048,
                    length: 17,
                    rolling_checksum: 2,
                    hash: [0; SHA1_LENGTH],
                },
            ],
        };
        assert_eq!(signature.chunk_count(), 2);
        assert_eq!(signature.basis_length(), 2065);
    }
}
