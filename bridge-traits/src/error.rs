use thiserror::Error;

/// Failure reported by a host capability.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The capability cannot be reached right now (offline, no device).
    #[error("Not available: {0}")]
    NotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
