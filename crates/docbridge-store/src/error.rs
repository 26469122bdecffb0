/// Errors from document and blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed document or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A collection path or key is empty or malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The backend failed (network, quota, poisoned lock, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
