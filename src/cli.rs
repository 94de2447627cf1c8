//! CLI argument parsing for octodelta
//!
//! Every file argument can be given either positionally or through a named
//! flag; named flags win, and positional arguments fill whichever slots the
//! flags left open, in order. This matches octodiff's argument handling so
//! existing invocations keep working.

use crate::signature::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// octodelta - binary deltas for large opaque files
#[derive(Parser, Debug)]
#[command(name = "octodelta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Given a basis file, creates a signature file
    #[command(visible_alias = "sig")]
    Signature(SignatureArgs),

    /// Given a signature file and a new file, creates a delta file
    Delta(DeltaArgs),

    /// Given a basis file and a delta, produces the new file
    Patch(PatchArgs),

    /// Prints instructions from a delta file; useful when debugging
    ExplainDelta(ExplainDeltaArgs),

    /// Reports the version of octodelta
    Version,
}

/// Arguments for the signature command
#[derive(Args, Debug)]
pub struct SignatureArgs {
    /// Basis file (positional form)
    #[arg(value_name = "basis-file")]
    pub basis: Option<PathBuf>,

    /// Signature output file (positional form)
    #[arg(value_name = "signature-file")]
    pub signature: Option<PathBuf>,

    /// The file to read and create a signature from
    #[arg(short = 'f', long = "basis-file")]
    pub basis_file: Option<PathBuf>,

    /// The file to write the signature to [default: <basis-file>.octosig]
    #[arg(short = 'o', long = "signature-file")]
    pub signature_file: Option<PathBuf>,

    /// Maximum bytes per chunk
    #[arg(
        long,
        default_value_t = DEFAULT_CHUNK_SIZE as u64,
        value_parser = clap::value_parser!(u64).range(MIN_CHUNK_SIZE as u64..=MAX_CHUNK_SIZE as u64)
    )]
    pub chunk_size: u64,

    /// Whether progress should be written to stdout
    #[arg(long)]
    pub progress: bool,
}

impl SignatureArgs {
    /// Merge flags and positionals into (basis, signature) paths.
    pub fn resolve(self) -> (Option<PathBuf>, Option<PathBuf>) {
        let mut positional = [self.basis, self.signature].into_iter().flatten();
        let basis = self.basis_file.or_else(|| positional.next());
        let signature = self.signature_file.or_else(|| positional.next());
        (basis, signature)
    }
}

/// Arguments for the delta command
#[derive(Args, Debug)]
pub struct DeltaArgs {
    /// Signature file (positional form)
    #[arg(value_name = "signature-file")]
    pub signature: Option<PathBuf>,

    /// New file (positional form)
    #[arg(value_name = "new-file")]
    pub new: Option<PathBuf>,

    /// Delta output file (positional form)
    #[arg(value_name = "delta-file")]
    pub delta: Option<PathBuf>,

    /// The file containing the signature from the basis file
    #[arg(long = "signature-file")]
    pub signature_file: Option<PathBuf>,

    /// The file to create the delta from
    #[arg(long = "new-file")]
    pub new_file: Option<PathBuf>,

    /// The file to write the delta to [default: <new-file>.octodelta]
    #[arg(long = "delta-file")]
    pub delta_file: Option<PathBuf>,

    /// Whether progress should be written to stdout
    #[arg(long)]
    pub progress: bool,
}

impl DeltaArgs {
    /// Merge flags and positionals into (signature, new, delta) paths.
    pub fn resolve(self) -> (Option<PathBuf>, Option<PathBuf>, Option<PathBuf>) {
        let mut positional = [self.signature, self.new, self.delta].into_iter().flatten();
        let signature = self.signature_file.or_else(|| positional.next());
        let new = self.new_file.or_else(|| positional.next());
        let delta = self.delta_file.or_else(|| positional.next());
        (signature, new, delta)
    }
}

/// Arguments for the patch command
#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Basis file (positional form)
    #[arg(value_name = "basis-file")]
    pub basis: Option<PathBuf>,

    /// Delta file (positional form)
    #[arg(value_name = "delta-file")]
    pub delta: Option<PathBuf>,

    /// New output file (positional form)
    #[arg(value_name = "new-file")]
    pub new: Option<PathBuf>,

    /// The file that the delta was created for
    #[arg(long = "basis-file")]
    pub basis_file: Option<PathBuf>,

    /// The delta to apply to the basis file
    #[arg(long = "delta-file")]
    pub delta_file: Option<PathBuf>,

    /// The file to write the result to
    #[arg(long = "new-file")]
    pub new_file: Option<PathBuf>,

    /// Whether progress should be written to stdout
    #[arg(long)]
    pub progress: bool,

    /// Skip checking whether the basis file is the same as the file used to
    /// produce the signature that created the delta
    #[arg(long)]
    pub skip_verification: bool,
}

impl PatchArgs {
    /// Merge flags and positionals into (basis, delta, new) paths.
    pub fn resolve(self) -> (Option<PathBuf>, Option<PathBuf>, Option<PathBuf>) {
        let mut positional = [self.basis, self.delta, self.new].into_iter().flatten();
        let basis = self.basis_file.or_else(|| positional.next());
        let delta = self.delta_file.or_else(|| positional.next());
        let new = self.new_file.or_else(|| positional.next());
        (basis, delta, new)
    }
}

/// Arguments for the explain-delta command
#[derive(Args, Debug)]
pub struct ExplainDeltaArgs {
    /// Delta file (positional form)
    #[arg(value_name = "delta-file")]
    pub delta: Option<PathBuf>,

    /// The file to explain
    #[arg(long = "delta-file")]
    pub delta_file: Option<PathBuf>,
}

impl ExplainDeltaArgs {
    /// Merge flag and positional into the delta path.
    pub fn resolve(self) -> Option<PathBuf> {
        self.delta_file.or(self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positionals_fill_unclaimed_slots() {
        let args = SignatureArgs {
            basis: Some("a.bin".into()),
            signature: Some("a.sig".into()),
            basis_file: None,
            signature_file: None,
            chunk_size: 2048,
            progress: false,
        };
        let (basis, signature) = args.resolve();
        assert_eq!(basis, Some("a.bin".into()));
        assert_eq!(signature, Some("a.sig".into()));
    }

    #[test]
    fn flags_shift_positionals_to_later_slots() {
        let args = SignatureArgs {
            basis: Some("a.sig".into()),
            signature: None,
            basis_file: Some("a.bin".into()),
            signature_file: None,
            chunk_size: 2048,
            progress: false,
        };
        let (basis, signature) = args.resolve();
        assert_eq!(basis, Some("a.bin".into()));
        assert_eq!(signature, Some("a.sig".into()));
    }

    #[test]
    fn flags_win_over_positionals() {
        let args = DeltaArgs {
            signature: Some("pos.sig".into()),
            new: Some("pos.new".into()),
            delta: None,
            signature_file: Some("flag.sig".into()),
            new_file: Some("flag.new".into()),
            delta_file: None,
            progress: false,
        };
        let (signature, new, delta) = args.resolve();
        assert_eq!(signature, Some("flag.sig".into()));
        assert_eq!(new, Some("flag.new".into()));
        assert_eq!(delta, Some("pos.sig".into()));
    }
}
