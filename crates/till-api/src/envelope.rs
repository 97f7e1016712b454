//! The two fixed JSON response shapes.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Success envelope: `{"data": [payload], "token": "<uuid>"}`.
///
/// The token is generated per response and is never looked up again.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<'a, T: ?Sized> {
    /// The payload, always wrapped in a single-element list.
    pub data: [&'a T; 1],
    /// Response-scoped token.
    pub token: Uuid,
}

impl<'a, T: Serialize + ?Sized> ApiSuccess<'a, T> {
    /// Wrap a payload with a fresh token.
    pub fn new(payload: &'a T) -> Self {
        Self {
            data: [payload],
            token: Uuid::new_v4(),
        }
    }
}

/// One entry of an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorObject {
    /// HTTP status code.
    pub status: u16,
    /// Request URI the error came from.
    pub source: String,
    /// Canonical status text, e.g. "Not Found".
    pub title: String,
    /// Request method.
    pub method: String,
    /// Human readable detail.
    pub detail: String,
}

impl ApiErrorObject {
    /// Describe a failure of `method uri` with the given status.
    pub fn new(status: StatusCode, method: &Method, uri: &str, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            source: uri.to_string(),
            title: status.canonical_reason().unwrap_or_default().to_string(),
            method: method.to_string(),
            detail: detail.into(),
        }
    }
}

/// Error envelope: `{"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrors {
    /// Error descriptors.
    pub errors: Vec<ApiErrorObject>,
}

impl From<ApiErrorObject> for ApiErrors {
    fn from(error: ApiErrorObject) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let payload = json!({"uid": "abc", "total": 12.5});
        let envelope = ApiSuccess::new(&payload);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["data"], json!([{"uid": "abc", "total": 12.5}]));
        assert!(Uuid::parse_str(value["token"].as_str().unwrap()).is_ok());
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_success_wraps_lists_once() {
        let payload = vec![1, 2, 3];
        let value = serde_json::to_value(ApiSuccess::new(&payload)).unwrap();
        assert_eq!(value["data"], json!([[1, 2, 3]]));
    }

    #[test]
    fn test_tokens_differ_per_envelope() {
        let a = ApiSuccess::new(&1);
        let b = ApiSuccess::new(&1);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_error_shape() {
        let errors = ApiErrors::from(ApiErrorObject::new(
            StatusCode::NOT_FOUND,
            &Method::GET,
            "/api/v1/sales/42?x=1",
            "No rows returned",
        ));
        let value = serde_json::to_value(&errors).unwrap();

        assert_eq!(
            value,
            json!({
                "errors": [{
                    "status": 404,
                    "source": "/api/v1/sales/42?x=1",
                    "title": "Not Found",
                    "method": "GET",
                    "detail": "No rows returned"
                }]
            })
        );
    }

    #[test]
    fn test_unknown_status_has_empty_title() {
        let error = ApiErrorObject::new(
            StatusCode::from_u16(599).unwrap(),
            &Method::POST,
            "/",
            "boom",
        );
        assert_eq!(error.title, "");
        assert_eq!(error.status, 599);
    }
}
