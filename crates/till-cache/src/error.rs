//! Cache error types.

use thiserror::Error;

/// Errors from the cache or its store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// A value could not be encoded, or a stored value has another shape.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The store rejected a read or write.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// Key not found.
    ///
    /// An expected outcome meaning "nothing written yet", as opposed to the
    /// other variants which are infrastructure faults.
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Check whether this error only signals a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}
