use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Receipt not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures reported by an object storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("upload rejected with status {status}")]
    Rejected { status: u16 },
}
