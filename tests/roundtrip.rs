//! File-backed round trips through the same plumbing the CLI uses

use octodelta::delta::{apply_delta, verify_new_file};
use octodelta::iter::READ_BUFFER_SIZE;
use octodelta::{BinaryDeltaReader, BinaryDeltaWriter, DeltaBuilder, SignatureBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

/// Deterministic pseudo-random bytes.
fn test_data(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x5DEECE66D;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// signature -> delta -> patch -> verify, all through real files.
fn file_round_trip(basis_data: &[u8], new_data: &[u8], chunk_size: usize) {
    let basis = write_temp(basis_data);
    let new = write_temp(new_data);

    // signature
    let signature = NamedTempFile::new().unwrap();
    {
        let input = File::open(basis.path()).unwrap();
        let length = input.metadata().unwrap().len();
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, input);
        let mut writer = BufWriter::new(File::create(signature.path()).unwrap());

        let mut builder = SignatureBuilder::new();
        builder.chunk_size = chunk_size;
        builder.build(&mut reader, length, &mut writer).unwrap();
        writer.flush().unwrap();
    }

    // delta; the new file stays unbuffered because the search seeks it
    let delta = NamedTempFile::new().unwrap();
    {
        let signature_file = File::open(signature.path()).unwrap();
        let signature_length = signature_file.metadata().unwrap().len();
        let mut signature_reader = BufReader::with_capacity(READ_BUFFER_SIZE, signature_file);

        let mut new_file = File::open(new.path()).unwrap();
        let new_length = new_file.metadata().unwrap().len();

        let mut writer =
            BinaryDeltaWriter::new(BufWriter::new(File::create(delta.path()).unwrap()));
        DeltaBuilder::new()
            .build(
                &mut new_file,
                new_length,
                &mut signature_reader,
                signature_length,
                &mut writer,
            )
            .unwrap();
        writer.into_inner().flush().unwrap();
    }

    // patch
    let produced = NamedTempFile::new().unwrap();
    let mut delta_reader =
        BinaryDeltaReader::new(BufReader::new(File::open(delta.path()).unwrap()));
    {
        let mut basis_file = File::open(basis.path()).unwrap();
        let mut output = BufWriter::new(File::create(produced.path()).unwrap());
        apply_delta(&mut basis_file, &mut delta_reader, &mut output).unwrap();
        output.flush().unwrap();
    }

    let produced_data = std::fs::read(produced.path()).unwrap();
    assert_eq!(produced_data, new_data);

    // verify against the reopened result, like the CLI does
    let reopened = File::open(produced.path()).unwrap();
    let mut reopened = BufReader::with_capacity(READ_BUFFER_SIZE, reopened);
    verify_new_file(&mut reopened, &mut delta_reader).unwrap();
}

#[test]
fn small_edit_round_trips_through_files() {
    let basis = test_data(64 * 1024);
    let mut new = basis.clone();
    new[30_000..30_100].fill(0xAA);

    file_round_trip(&basis, &new, 2048);
}

#[test]
fn default_chunk_size_round_trips_through_files() {
    let basis = test_data(100_000);
    let mut new = basis.clone();
    new[1000] ^= 0x80;
    new.truncate(99_000);

    file_round_trip(&basis, &new, 2048);
}

#[test]
fn multi_buffer_file_exercises_the_refill_seek_back() {
    // larger than the 4 MiB read buffer, so the search refills and seeks back
    let basis = test_data(5 * 1024 * 1024);
    let mut new = basis.clone();
    new[3_000_000..3_000_050].fill(0x00);

    file_round_trip(&basis, &new, 4096);
}

#[test]
fn empty_files_round_trip_through_files() {
    file_round_trip(&[], &[], 2048);
}

#[test]
fn builder_leaves_the_new_file_position_where_the_trailing_data_ended() {
    // the data-command writer must restore the source position it was
    // handed, otherwise the search would resume at the wrong offset
    let basis = test_data(4096);
    let new_data = {
        let mut d = basis.clone();
        d[100] ^= 1;
        d
    };

    let basis_file = write_temp(&basis);
    let new = write_temp(&new_data);

    let signature = NamedTempFile::new().unwrap();
    {
        let input = File::open(basis_file.path()).unwrap();
        let length = input.metadata().unwrap().len();
        let mut reader = BufReader::new(input);
        let mut writer = BufWriter::new(File::create(signature.path()).unwrap());
        let mut builder = SignatureBuilder::new();
        builder.chunk_size = 512;
        builder.build(&mut reader, length, &mut writer).unwrap();
        writer.flush().unwrap();
    }

    let signature_file = File::open(signature.path()).unwrap();
    let signature_length = signature_file.metadata().unwrap().len();
    let mut signature_reader = BufReader::new(signature_file);

    let mut new_file = File::open(new.path()).unwrap();
    let mut writer = BinaryDeltaWriter::new(Vec::new());
    DeltaBuilder::new()
        .build(
            &mut new_file,
            new_data.len() as u64,
            &mut signature_reader,
            signature_length,
            &mut writer,
        )
        .unwrap();

    // sanity: the produced delta still reconstructs the new file
    let delta = writer.into_inner();
    let mut delta_reader = BinaryDeltaReader::new(std::io::Cursor::new(&delta));
    let mut produced = Vec::new();
    let mut basis_handle = File::open(basis_file.path()).unwrap();
    basis_handle.seek(SeekFrom::Start(0)).unwrap();
    apply_delta(&mut basis_handle, &mut delta_reader, &mut produced).unwrap();
    assert_eq!(produced, new_data);
}
