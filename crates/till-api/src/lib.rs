//! JSON response envelopes for Till.
//!
//! Every API operation answers with exactly one of two shapes:
//!
//! - success: `{"data": [payload], "token": "<uuid>"}` with status 200
//! - error: `{"errors": [{"status", "source", "title", "method", "detail"}]}`
//!
//! [`ApiExchange`] is created per request and guarantees that only the first
//! emit reaches the [`ResponseSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use till_api::{ApiExchange, BufferedResponse};
//! use http::StatusCode;
//!
//! let mut api = ApiExchange::from_request(BufferedResponse::new(), &request);
//! api.respond(repo.count_all(), StatusCode::INTERNAL_SERVER_ERROR);
//! api.handle_error(Some("ignored, already responded"), StatusCode::BAD_REQUEST);
//! ```

mod config;
mod envelope;
mod error;
mod exchange;
mod request;
mod response;

pub use config::ApiConfig;
pub use envelope::{ApiErrorObject, ApiErrors, ApiSuccess};
pub use error::ApiError;
pub use exchange::ApiExchange;
pub use request::{IdList, RequestDataIds, RequestDataImage};
pub use response::{BufferedResponse, ResponseSink};

pub use http::{Method, StatusCode};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiConfig, ApiError, ApiExchange, BufferedResponse, Method, RequestDataIds,
        RequestDataImage, ResponseSink, StatusCode,
    };
}
