//! Raw response sinks.

use crate::ApiError;
use http::{HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// The raw response an [`ApiExchange`](crate::ApiExchange) writes into.
///
/// Supplied by the transport layer. Implementations only store what they are
/// given; the single-write discipline lives in the exchange.
pub trait ResponseSink {
    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: &str, value: &str);

    /// Set the response status.
    fn write_status(&mut self, status: StatusCode);

    /// Append bytes to the response body.
    fn write_body(&mut self, body: &[u8]);
}

/// An in-memory response, built up by an exchange and handed back to the host.
#[derive(Debug, Clone)]
pub struct BufferedResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
    /// Number of body writes received.
    pub body_writes: usize,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferedResponse {
    /// An empty 200 response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: Vec::new(),
            body_writes: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<String, ApiError> {
        std::str::from_utf8(&self.body)
            .map(str::to_owned)
            .map_err(|e| ApiError::DecodeError(format!("Invalid UTF-8: {}", e)))
    }

    /// The body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::DecodeError(e.to_string()))
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }
}

impl ResponseSink for BufferedResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, body: &[u8]) {
        self.body.extend_from_slice(body);
        self.body_writes += 1;
    }
}

impl ResponseSink for http::Response<Vec<u8>> {
    fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
    }

    fn write_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn write_body(&mut self, body: &[u8]) {
        self.body_mut().extend_from_slice(body);
    }
}
