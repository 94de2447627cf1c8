//! octodelta - binary deltas for large opaque files

use clap::Parser;
use octodelta::cli::{
    Cli, Commands, DeltaArgs, ExplainDeltaArgs, PatchArgs, SignatureArgs,
};
use octodelta::delta::{apply_delta, verify_new_file, BinaryDeltaReader, BinaryDeltaWriter};
use octodelta::error::{Error, Result};
use octodelta::iter::READ_BUFFER_SIZE;
use octodelta::progress::{NopProgressReporter, ProgressReporter, StdoutProgressReporter};
use octodelta::signature::SignatureBuilder;
use octodelta::DeltaBuilder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("octodelta=warn"),
        1 => EnvFilter::new("octodelta=info"),
        2 => EnvFilter::new("octodelta=debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Signature(args) => run_signature(args),
        Commands::Delta(args) => run_delta(args),
        Commands::Patch(args) => run_patch(args),
        Commands::ExplainDelta(args) => run_explain_delta(args),
        Commands::Version => run_version(),
    }
}

/// Open an input file, turning a missing file into the standard message for
/// its role in the operation.
fn open_input(path: &Path, role: &'static str) -> Result<File> {
    File::open(path).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            Error::NotFound {
                role,
                path: path.to_path_buf(),
            }
        } else {
            Error::io(format!("opening {}", path.display()), err)
        }
    })
}

fn file_length(file: &File, path: &Path) -> Result<u64> {
    let metadata = file
        .metadata()
        .map_err(|err| Error::io(format!("reading metadata of {}", path.display()), err))?;
    Ok(metadata.len())
}

/// Default output path: the input path with an extra extension appended.
fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}

fn progress_reporter(progress: bool) -> Box<dyn ProgressReporter> {
    if progress {
        Box::new(StdoutProgressReporter::new())
    } else {
        Box::new(NopProgressReporter)
    }
}

fn run_signature(args: SignatureArgs) -> Result<()> {
    let chunk_size = args.chunk_size as usize;
    let progress = args.progress;
    let (basis_path, signature_path) = args.resolve();

    let basis_path = basis_path.ok_or_else(|| Error::argument("No basis file was specified"))?;
    let signature_path =
        signature_path.unwrap_or_else(|| with_appended_extension(&basis_path, ".octosig"));

    let basis = open_input(&basis_path, "basis")?;
    let basis_length = file_length(&basis, &basis_path)?;
    let signature_file = File::create(&signature_path)
        .map_err(|err| Error::io(format!("creating {}", signature_path.display()), err))?;

    let mut builder = SignatureBuilder::new();
    builder.chunk_size = chunk_size;
    builder.progress = progress_reporter(progress);

    let mut input = BufReader::with_capacity(READ_BUFFER_SIZE, basis);
    let mut output = BufWriter::new(signature_file);
    builder.build(&mut input, basis_length, &mut output)?;
    output.flush()?;
    Ok(())
}

fn run_delta(args: DeltaArgs) -> Result<()> {
    let progress = args.progress;
    let (signature_path, new_path, delta_path) = args.resolve();

    let signature_path =
        signature_path.ok_or_else(|| Error::argument("No signature file was specified"))?;
    let new_path = new_path.ok_or_else(|| Error::argument("No new file was specified"))?;
    let delta_path = delta_path.unwrap_or_else(|| with_appended_extension(&new_path, ".octodelta"));

    let signature_file = open_input(&signature_path, "signature")?;
    let signature_length = file_length(&signature_file, &signature_path)?;

    // the new file is seeked all over the place during the search, so it
    // stays unbuffered
    let mut new_file = open_input(&new_path, "new")?;
    let new_length = file_length(&new_file, &new_path)?;

    let delta_file = File::create(&delta_path)
        .map_err(|err| Error::io(format!("creating {}", delta_path.display()), err))?;

    let mut builder = DeltaBuilder::new();
    builder.progress = progress_reporter(progress);

    let mut signature_input = BufReader::with_capacity(READ_BUFFER_SIZE, signature_file);
    let mut writer = BinaryDeltaWriter::new(BufWriter::new(delta_file));
    builder.build(
        &mut new_file,
        new_length,
        &mut signature_input,
        signature_length,
        &mut writer,
    )?;
    writer.into_inner().flush()?;
    Ok(())
}

fn run_patch(args: PatchArgs) -> Result<()> {
    let skip_verification = args.skip_verification;
    let (basis_path, delta_path, new_path) = args.resolve();

    let basis_path = basis_path.ok_or_else(|| Error::argument("No basis file was specified"))?;
    let delta_path = delta_path.ok_or_else(|| Error::argument("No delta file was specified"))?;
    let new_path = new_path.ok_or_else(|| Error::argument("No new file was specified"))?;

    // the basis is seeked per copy command, so it stays unbuffered
    let mut basis = open_input(&basis_path, "basis")?;
    let delta_file = open_input(&delta_path, "delta")?;
    let mut delta_reader = BinaryDeltaReader::new(BufReader::new(delta_file));

    {
        let new_file = File::create(&new_path)
            .map_err(|err| Error::io(format!("creating {}", new_path.display()), err))?;
        let mut output = BufWriter::new(new_file);
        apply_delta(&mut basis, &mut delta_reader, &mut output)?;
        output.flush()?;
    }

    if skip_verification {
        return Ok(());
    }

    // reopen the result so the digest covers the bytes actually on disk
    let produced = open_input(&new_path, "new")?;
    let mut produced = BufReader::with_capacity(READ_BUFFER_SIZE, produced);
    verify_new_file(&mut produced, &mut delta_reader)
}

fn run_explain_delta(args: ExplainDeltaArgs) -> Result<()> {
    let delta_path = args
        .resolve()
        .ok_or_else(|| Error::argument("No delta file was specified"))?;

    let delta_file = open_input(&delta_path, "delta")?;
    let mut reader =
        BinaryDeltaReader::new(BufReader::with_capacity(READ_BUFFER_SIZE, delta_file));

    reader.apply(
        |chunk| {
            if chunk.len() > 20 {
                println!(
                    "Data: ({} bytes): {{{}}}...",
                    chunk.len(),
                    hex::encode(&chunk[..20])
                );
            } else {
                println!("Data: ({} bytes): {{{}}}", chunk.len(), hex::encode(chunk));
            }
            Ok(())
        },
        |start, length| {
            println!("Copy: {length} bytes from offset {start:X}");
            Ok(())
        },
    )
}

fn run_version() -> Result<()> {
    println!("App Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Commit Hash: {}", env!("BUILD_REVISION"));
    println!("Build Time: {}", env!("BUILD_TIME"));
    println!("Toolchain: {}", env!("BUILD_TOOLCHAIN"));
    Ok(())
}
