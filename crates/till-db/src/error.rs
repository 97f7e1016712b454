//! Database error types.

use thiserror::Error;

/// Errors from opening, querying or decoding.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to open database: {0}")]
    OpenError(String),

    /// The statement failed to prepare or run.
    #[error("Query execution failed: {0}")]
    QueryError(String),

    /// A row did not match the requested type.
    #[error("Row decoding failed: {0}")]
    DeserializeError(String),

    /// A scalar query returned a non-integer.
    #[error("Type conversion error: {0}")]
    TypeError(String),

    /// A single-row query matched nothing.
    #[error("No rows returned")]
    NotFound,
}

impl DbError {
    /// Whether the error only means the row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        DbError::QueryError(e.to_string())
    }
}
