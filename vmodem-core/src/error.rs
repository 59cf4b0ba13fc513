use thiserror::Error;

/// Main error type for vmodem operations
#[derive(Error, Debug)]
pub enum VmodemError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for vmodem operations
pub type VmodemResult<T> = Result<T, VmodemError>;
