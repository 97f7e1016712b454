//! API error types.

use thiserror::Error;

/// Errors raised while decoding requests or encoding responses.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body was not valid JSON for the expected payload.
    #[error("Invalid request body: {0}")]
    DecodeError(String),

    /// A response payload could not be serialized.
    #[error("Failed to encode response: {0}")]
    EncodeError(String),
}
