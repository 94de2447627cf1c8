//! Error types for octodelta

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for octodelta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for octodelta
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (read/write/seek failures)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A required command-line input was not supplied
    #[error("{message}")]
    Argument { message: String },

    /// Named input file does not exist or could not be opened
    #[error("{role} file does not exist or could not be opened")]
    NotFound { role: &'static str, path: PathBuf },

    /// Signature or delta file violates the binary format
    #[error("{message}")]
    Corrupt { message: String },

    /// Fewer bytes were delivered than a fixed-size structure requires
    #[error("expecting to read {expected} bytes but only got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Configuration errors (chunk size out of range)
    #[error("{message}")]
    Config { message: String },

    /// SHA1 of the reconstructed file differs from the hash in the delta
    #[error(
        "verification of the patched file failed. The SHA1 hash of the patch result file, \
         and the file that was used as input for the delta, do not match. This can happen \
         if the basis file changed since the signatures were calculated"
    )]
    Verification,
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a corrupt-format error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing-argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
