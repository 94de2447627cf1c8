//! Signature file parsing

use super::{ChunkSignature, Signature, CHUNK_RECORD_SIZE};
use crate::error::{Error, Result};
use crate::hash::{HashAlgorithm, SHA1_LENGTH};
use crate::progress::{NopProgressReporter, ProgressReporter};
use crate::rolling::RollingChecksumAlgorithm;
use crate::wire;
use std::io::Read;

/// Parse a complete signature file.
///
/// `input_length` must be the total byte length of the signature stream; the
/// chunk-record region is required to divide evenly into 26-byte records.
pub fn read_signature<R: Read>(
    input: &mut R,
    input_length: u64,
    progress: &mut dyn ProgressReporter,
) -> Result<Signature> {
    let mut pos = 0u64;
    progress.report("Reading signature", pos, input_length);

    wire::expect_bytes(
        input,
        wire::SIGNATURE_HEADER,
        "the signature file appears to be corrupt",
    )?;
    pos += wire::SIGNATURE_HEADER.len() as u64;

    wire::expect_bytes(
        input,
        &[wire::FORMAT_VERSION],
        "the signature file uses a newer file format than this program can handle",
    )?;
    pos += 1;

    let (hash_name, consumed) = wire::read_string(input)?;
    pos += consumed;

    let (rolling_name, consumed) = wire::read_string(input)?;
    pos += consumed;

    wire::expect_bytes(
        input,
        wire::END_OF_METADATA,
        "the signature file appears to be corrupt",
    )?;
    pos += wire::END_OF_METADATA.len() as u64;

    progress.report("Reading signature", pos, input_length);

    let hash_algorithm = HashAlgorithm::from_name(&hash_name).ok_or_else(|| {
        Error::corrupt(format!("signature uses unsupported hash algorithm {hash_name}"))
    })?;
    let rolling_checksum = RollingChecksumAlgorithm::from_name(&rolling_name).ok_or_else(|| {
        Error::corrupt(format!(
            "signature uses unsupported rolling checksum algorithm {rolling_name}"
        ))
    })?;

    let remaining = input_length as i64 - pos as i64;
    if remaining % CHUNK_RECORD_SIZE as i64 != 0 {
        return Err(Error::corrupt(
            "the signature file appears to be corrupt; at least one chunk has data missing",
        ));
    }

    let expected_chunks = (remaining / CHUNK_RECORD_SIZE as i64).max(0) as u64;
    let mut chunks = Vec::with_capacity(expected_chunks as usize);
    let mut chunk_start = 0u64;
    let mut record = [0u8; CHUNK_RECORD_SIZE];

    for _ in 0..expected_chunks {
        wire::read_full(input, &mut record)?;
        pos += CHUNK_RECORD_SIZE as u64;

        let length = u16::from_le_bytes([record[0], record[1]]);
        let rolling_checksum = u32::from_le_bytes([record[2], record[3], record[4], record[5]]);
        // the record buffer is reused, so the hash bytes must be copied out
        let mut hash = [0u8; SHA1_LENGTH];
        hash.copy_from_slice(&record[6..]);

        chunks.push(ChunkSignature {
            start_offset: chunk_start,
            length,
            rolling_checksum,
            hash,
        });

        chunk_start += u64::from(length);
        progress.report("Reading signature", pos, input_length);
    }

    Ok(Signature {
        hash_algorithm,
        rolling_checksum,
        chunks,
    })
}

/// Signature parser carrying its own progress sink, for callers that do not
/// thread one through.
pub struct SignatureReader {
    /// Progress sink
    pub progress: Box<dyn ProgressReporter>,
}

impl SignatureReader {
    /// Reader that discards progress.
    pub fn new() -> Self {
        Self {
            progress: Box::new(NopProgressReporter),
        }
    }

    /// Parse a complete signature file.
    pub fn read<R: Read>(&mut self, input: &mut R, input_length: u64) -> Result<Signature> {
        read_signature(input, input_length, self.progress.as_mut())
    }
}

impl Default for SignatureReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(hex_input: &str) -> Result<Signature> {
        let input = hex::decode(hex_input).unwrap();
        SignatureReader::new().read(&mut Cursor::new(&input), input.len() as u64)
    }

    fn assert_chunk(
        chunk: &ChunkSignature,
        start_offset: u64,
        rolling_checksum: u32,
        length: u16,
        hash_hex: &str,
    ) {
        assert_eq!(chunk.start_offset, start_offset);
        assert_eq!(chunk.rolling_checksum, rolling_checksum);
        assert_eq!(chunk.length, length);
        assert_eq!(hex::encode(chunk.hash), hash_hex);
    }

    #[test]
    fn reads_standard_signature() {
        let signature = parse(
            "4f43544f5349470104534841310741646c657233323e3e3e0802f79fa2f0330bd06982d3b5dbda6c1a6ad16687a0cdb03c0d",
        )
        .unwrap();

        assert_eq!(signature.hash_algorithm, HashAlgorithm::Sha1);
        assert_eq!(signature.rolling_checksum, RollingChecksumAlgorithm::Adler32);
        assert_eq!(signature.chunk_count(), 1);
        assert_chunk(
            &signature.chunks[0],
            0,
            4037189623,
            520,
            "330bd06982d3b5dbda6c1a6ad16687a0cdb03c0d",
        );
    }

    #[test]
    fn reads_standard_signature_adler_v2() {
        let signature = parse(
            "4f43544f5349470104534841310941646c6572333256323e3e3e0802f79fe5f8330bd06982d3b5dbda6c1a6ad16687a0cdb03c0d",
        )
        .unwrap();

        assert_eq!(signature.rolling_checksum, RollingChecksumAlgorithm::Adler32V2);
        assert_eq!(signature.chunk_count(), 1);
        assert_chunk(
            &signature.chunks[0],
            0,
            4175798263,
            520,
            "330bd06982d3b5dbda6c1a6ad16687a0cdb03c0d",
        );
    }

    #[test]
    fn reads_small_chunk_size_signature() {
        let signature = parse(concat!(
            "4f43544f5349470104534841310741646c657233323e3e3e",
            "8000951f26e719f3978cb607e80a9aab3abbcac8bb1ecbcecf3e",
            "80001f18260f0f73196c2aa57877ee5e31291a59b5afca449365",
            "8000e035f42a42c4a73471dea3b9746e22dd93893fd8549f11bd",
            "8000dd2ff46b72e00e30ecae4c70ee07721d221a3b8a6d1847fa",
            "08008a02860c21d4023a8ba580ecdba742e7400aa40b6e449bb3",
        ))
        .unwrap();

        assert_eq!(signature.chunk_count(), 5);
        assert_chunk(
            &signature.chunks[0],
            0,
            3878035349,
            128,
            "19f3978cb607e80a9aab3abbcac8bb1ecbcecf3e",
        );
        assert_chunk(
            &signature.chunks[1],
            128,
            254154783,
            128,
            "0f73196c2aa57877ee5e31291a59b5afca449365",
        );
        assert_chunk(
            &signature.chunks[2],
            256,
            720647648,
            128,
            "42c4a73471dea3b9746e22dd93893fd8549f11bd",
        );
        assert_chunk(
            &signature.chunks[3],
            384,
            1811165149,
            128,
            "72e00e30ecae4c70ee07721d221a3b8a6d1847fa",
        );
        assert_chunk(
            &signature.chunks[4],
            512,
            210109066,
            8,
            "21d4023a8ba580ecdba742e7400aa40b6e449bb3",
        );
    }

    #[test]
    fn reads_large_chunk_size_signature() {
        let signature = parse(concat!(
            "4f43544f5349470104534841310741646c657233323e3e3e",
            "007cb823382f5470f51bab46eeb3913379e7b70a0d7329a9afce",
            "007cb5278ac69c31becd9bcd36f9afbd350ec15f4c437fd0cb67",
            "007c7a20e05ec605af9c2fd5a61b60f65600f5849f6ce1c53cf1",
            "001cac9ce9f194d25de18f219fa7832df14593cade50d8b0d2a2",
        ))
        .unwrap();

        assert_eq!(signature.chunk_count(), 4);
        assert_chunk(
            &signature.chunks[0],
            0,
            792208312,
            31744,
            "5470f51bab46eeb3913379e7b70a0d7329a9afce",
        );
        assert_chunk(
            &signature.chunks[1],
            31744,
            3330942901,
            31744,
            "9c31becd9bcd36f9afbd350ec15f4c437fd0cb67",
        );
        assert_chunk(
            &signature.chunks[2],
            63488,
            1591746682,
            31744,
            "c605af9c2fd5a61b60f65600f5849f6ce1c53cf1",
        );
        assert_chunk(
            &signature.chunks[3],
            95232,
            4058619052,
            7168,
            "94d25de18f219fa7832df14593cade50d8b0d2a2",
        );
    }

    #[test]
    fn rejects_bad_header() {
        let err = parse("4e4f544f5349470104534841310741646c657233323e3e3e").unwrap_err();
        assert!(err.to_string().contains("appears to be corrupt"));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = parse("4f43544f5349470204534841310741646c657233323e3e3e").unwrap_err();
        assert!(err.to_string().contains("newer file format"));
    }

    #[test]
    fn rejects_unknown_hash_algorithm() {
        // "MD5!" in place of "SHA1"
        let err =
            parse("4f43544f53494701044d4435210741646c657233323e3e3e").unwrap_err();
        assert!(err.to_string().contains("unsupported hash algorithm"));
    }

    #[test]
    fn rejects_uneven_chunk_records() {
        // one record truncated to 25 bytes
        let err = parse(concat!(
            "4f43544f5349470104534841310741646c657233323e3e3e",
            "0802f79fa2f0330bd06982d3b5dbda6c1a6ad16687a0cdb03c",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("at least one chunk has data missing"));
    }
}
