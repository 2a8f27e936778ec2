use thiserror::Error;

/// Main error type for DLMS operations
#[derive(Error, Debug)]
pub enum DlmsError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for DLMS operations
pub type DlmsResult<T> = Result<T, DlmsError>;
