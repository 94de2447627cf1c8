//! Strong hashing for chunk verification and whole-file integrity
//!
//! The wire formats fix the strong hash to SHA1; nothing else is recognized.

use crate::error::Result;
use crate::iter::ByteIter;
use sha1::{Digest, Sha1};
use std::io::Read;

/// Wire name of the SHA1 algorithm
pub const SHA1_NAME: &str = "SHA1";

/// Length in bytes of a SHA1 digest
pub const SHA1_LENGTH: usize = 20;

/// Strong hash over a slice or a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA1, the only algorithm octodiff-format files carry
    Sha1,
}

impl HashAlgorithm {
    /// Resolve an algorithm from its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SHA1_NAME => Some(Self::Sha1),
            _ => None,
        }
    }

    /// The name recorded in signature and delta files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => SHA1_NAME,
        }
    }

    /// Digest length in bytes.
    pub fn hash_len(self) -> usize {
        match self {
            Self::Sha1 => SHA1_LENGTH,
        }
    }

    /// Digest of an in-memory slice.
    pub fn hash_data(self, data: &[u8]) -> [u8; SHA1_LENGTH] {
        let mut hasher = Sha1::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Digest of a stream, fed in 1 KiB iterations.
    pub fn hash_reader<R: Read>(self, reader: &mut R) -> Result<[u8; SHA1_LENGTH]> {
        let mut hasher = Sha1::new();
        let mut iter = ByteIter::new(reader, 1024);
        while let Some(chunk) = iter.next_chunk()? {
            hasher.update(chunk);
        }
        Ok(hasher.finalize().into())
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_data;
    use std::io::Cursor;

    #[test]
    fn known_sha1_vectors() {
        let h = HashAlgorithm::Sha1;
        assert_eq!(
            hex::encode(h.hash_data(b"")),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            hex::encode(h.hash_data(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn reader_and_slice_digests_agree() {
        let h = HashAlgorithm::Sha1;
        let data = test_data(10_000);
        let streamed = h.hash_reader(&mut Cursor::new(&data)).unwrap();
        assert_eq!(streamed, h.hash_data(&data));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(HashAlgorithm::from_name("SHA256"), None);
        assert_eq!(HashAlgorithm::from_name("sha1"), None);
    }
}
