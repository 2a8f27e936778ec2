use dlms_core::DlmsError;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit status for usage and validation errors
pub const EXIT_USAGE: i32 = 1;

/// Process exit status for transport open or link initialization failures
pub const EXIT_TRANSPORT: i32 = -1;

/// Errors that end a `dlms-read` run
#[derive(Error, Debug)]
pub enum ReaderError {
    /// `-h` was given
    #[error("usage requested")]
    HelpRequested,

    #[error("{0}")]
    Usage(String),

    #[error("invalid value '{token}': {reason}")]
    Validation { token: String, reason: String },

    #[error("{0}")]
    Incomplete(String),

    #[error("{}:{line}: tag '{tag}': {source}", .path.display())]
    Config {
        path: PathBuf,
        line: usize,
        tag: String,
        #[source]
        source: Box<ReaderError>,
    },

    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[source] DlmsError),
}

impl ReaderError {
    pub fn validation(token: &str, reason: impl Into<String>) -> Self {
        ReaderError::Validation {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Exit status the process terminates with
    pub fn exit_code(&self) -> i32 {
        match self {
            ReaderError::Transport(_) => EXIT_TRANSPORT,
            _ => EXIT_USAGE,
        }
    }

    /// Whether the usage text accompanies the diagnostic
    pub fn shows_usage(&self) -> bool {
        !matches!(self, ReaderError::Transport(_))
    }
}

/// Result type alias for the reader
pub type ReaderResult<T> = Result<T, ReaderError>;
