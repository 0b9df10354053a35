use thiserror::Error;

/// Errors that can occur during upload storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No blob is stored under the requested key.
    #[error("blob not found: {0}")]
    NotFound(String),
    /// A blob is already stored under the key.
    #[error("blob already exists: {0}")]
    AlreadyExists(String),
    /// The key is not a valid flat storage name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    /// The blob exceeds the configured size limit.
    #[error("blob exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}
