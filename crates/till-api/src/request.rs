//! Request payloads decoded by the transport layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier list carried by bulk requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdList {
    /// Target identifiers.
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

/// `{"data": {"ids": [...]}, "token": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDataIds {
    pub data: IdList,
    #[serde(default)]
    pub token: String,
}

/// `{"data": "<encoded image>", "token": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDataImage {
    pub data: String,
    #[serde(default)]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ids() {
        let body = r#"{"data":{"ids":["67e55044-10b1-426f-9247-bb680e5fe0c8"]},"token":"t"}"#;
        let request: RequestDataIds = serde_json::from_str(body).unwrap();
        assert_eq!(request.data.ids.len(), 1);
        assert_eq!(request.token, "t");
    }

    #[test]
    fn test_decode_ids_rejects_bad_uuid() {
        let body = r#"{"data":{"ids":["not-a-uuid"]}}"#;
        assert!(serde_json::from_str::<RequestDataIds>(body).is_err());
    }

    #[test]
    fn test_decode_image_without_token() {
        let request: RequestDataImage = serde_json::from_str(r#"{"data":"aGk="}"#).unwrap();
        assert_eq!(request.data, "aGk=");
        assert!(request.token.is_empty());
    }
}
