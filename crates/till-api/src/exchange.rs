//! Request-scoped exchange enforcing one response per request.

use crate::{ApiConfig, ApiError, ApiErrorObject, ApiErrors, ApiSuccess, ResponseSink};
use http::{header::CONTENT_TYPE, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One inbound request and the response it will produce.
///
/// The exchange moves from pending to responded on the first successful
/// [`emit_success`](Self::emit_success) or [`emit_error`](Self::emit_error).
/// Every later emit is a no-op, so handlers may report errors defensively
/// after a success without corrupting the body that was already written.
///
/// # Example
///
/// ```rust,ignore
/// let mut api = ApiExchange::from_request(BufferedResponse::new(), &request);
/// match repo.get(id) {
///     Ok(sale) => api.emit_success(&sale),
///     Err(e) => api.emit_error(&e, StatusCode::NOT_FOUND),
/// }
/// let response = api.into_sink();
/// ```
pub struct ApiExchange<S> {
    sink: S,
    method: Method,
    uri: String,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    content_type: String,
    responded: bool,
}

impl<S> fmt::Debug for ApiExchange<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiExchange")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("responded", &self.responded)
            .finish_non_exhaustive()
    }
}

impl<S: ResponseSink> ApiExchange<S> {
    /// Create an exchange for `method uri`, where `uri` is the path plus query.
    pub fn new(sink: S, method: Method, uri: impl Into<String>) -> Self {
        Self {
            sink,
            method,
            uri: uri.into(),
            params: HashMap::new(),
            query: HashMap::new(),
            content_type: ApiConfig::default().content_type(),
            responded: false,
        }
    }

    /// Create an exchange from the method and URI of an `http` request.
    pub fn from_request<B>(sink: S, request: &http::Request<B>) -> Self {
        let uri = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Self::new(sink, request.method().clone(), uri)
    }

    /// Use the media type from `config` for every envelope.
    pub fn with_config(mut self, config: &ApiConfig) -> Self {
        self.content_type = config.content_type();
        self
    }

    /// Attach the path parameters extracted by the router.
    pub fn with_path_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Attach the decoded query-string or form parameters.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Path parameter by name, or `""` when absent.
    pub fn path_var(&self, key: &str) -> &str {
        self.params.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Query or form parameter by name, or `""` when absent.
    pub fn form_value(&self, key: &str) -> &str {
        self.query.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Decode a JSON request body into `T`.
    ///
    /// Failures are logged at warn level and returned; they do not respond.
    pub fn decode_body<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ApiError> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(method = %self.method, uri = %self.uri, error = %e, "request body rejected");
            ApiError::DecodeError(e.to_string())
        })
    }

    /// Send `payload` as a success envelope with status 200.
    ///
    /// No-op once the exchange has responded. A payload that fails to
    /// serialize is answered with a 500 error envelope instead.
    pub fn emit_success<T: Serialize + ?Sized>(&mut self, payload: &T) {
        if self.responded {
            return;
        }

        match serde_json::to_vec(&ApiSuccess::new(payload)) {
            Ok(body) => self.write(StatusCode::OK, &body),
            Err(e) => {
                tracing::warn!(method = %self.method, uri = %self.uri, error = %e, "response payload not serializable");
                self.emit_error(
                    &ApiError::EncodeError(e.to_string()),
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
        }
    }

    /// Send `err` as an error envelope with the given status.
    ///
    /// No-op once the exchange has responded. Every error sent is logged at
    /// warn level with the request method and URI.
    pub fn emit_error<E: fmt::Display + ?Sized>(&mut self, err: &E, status: StatusCode) {
        if self.responded {
            return;
        }

        let detail = err.to_string();
        let errors = ApiErrors::from(ApiErrorObject::new(status, &self.method, &self.uri, &detail));
        let body = serde_json::to_vec(&errors).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "error envelope not serializable");
            Vec::new()
        });

        self.write(status, &body);
        tracing::warn!(
            method = %self.method,
            uri = %self.uri,
            status = status.as_u16(),
            detail = %detail,
            "api error"
        );
    }

    /// Send `err` if there is one.
    pub fn handle_error<E: fmt::Display>(&mut self, err: Option<E>, status: StatusCode) {
        if let Some(err) = err {
            self.emit_error(&err, status);
        }
    }

    /// Send the value of `result`, or its error with `error_status`.
    pub fn respond<T: Serialize, E: fmt::Display>(
        &mut self,
        result: Result<T, E>,
        error_status: StatusCode,
    ) {
        match result {
            Ok(value) => self.emit_success(&value),
            Err(err) => self.emit_error(&err, error_status),
        }
    }

    fn write(&mut self, status: StatusCode, body: &[u8]) {
        self.sink.set_header(CONTENT_TYPE.as_str(), &self.content_type);
        self.sink.write_status(status);
        self.sink.write_body(body);
        self.responded = true;
    }

    /// Whether a response has been written.
    pub fn is_responded(&self) -> bool {
        self.responded
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI (path plus query).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Finish the exchange and hand the sink back to the host.
    pub fn into_sink(self) -> S {
        self.sink
    }
}
