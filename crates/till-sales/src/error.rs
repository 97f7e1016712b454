//! Sales error types.

use thiserror::Error;
use till_api::{ApiError, StatusCode};
use till_cache::CacheError;
use till_db::DbError;
use uuid::Uuid;

/// Errors that can occur in cart and sale operations.
///
/// Store errors are wrapped transparently so callers see the underlying
/// message and can still classify a miss with [`is_not_found`](Self::is_not_found).
#[derive(Error, Debug)]
pub enum SalesError {
    /// Cache failure, including a missing key.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Database failure, including a missing row.
    #[error(transparent)]
    Database(#[from] DbError),

    /// Request decoding or response encoding failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cart with no items cannot be checked out.
    #[error("Cart is empty: {0}")]
    EmptyCart(Uuid),

    /// A cart item has no priced line in the checkout request.
    #[error("No price given for cart item: {0}")]
    UnpricedItem(Uuid),

    /// Malformed path or query parameter.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result alias for sales operations.
pub type SalesResult<T> = Result<T, SalesError>;

impl SalesError {
    /// Check whether this error only means the data does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            SalesError::Cache(e) => e.is_not_found(),
            SalesError::Database(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// HTTP status used when this error is sent to a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            SalesError::Api(ApiError::DecodeError(_))
            | SalesError::EmptyCart(_)
            | SalesError::UnpricedItem(_)
            | SalesError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_from_either_store() {
        let cache: SalesError = CacheError::NotFound("cart:x".into()).into();
        let db: SalesError = DbError::NotFound.into();
        assert!(cache.is_not_found());
        assert!(db.is_not_found());
        assert_eq!(cache.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(db.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_infrastructure_errors_are_500() {
        let cache: SalesError = CacheError::StoreError("io".into()).into();
        let db: SalesError = DbError::QueryError("locked".into()).into();
        assert!(!cache.is_not_found());
        assert_eq!(cache.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_errors_are_400() {
        let decode: SalesError = ApiError::DecodeError("eof".into()).into();
        assert_eq!(decode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SalesError::InvalidRequest("id".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_transparent_message() {
        let err: SalesError = DbError::NotFound.into();
        assert_eq!(err.to_string(), "No rows returned");
    }
}
