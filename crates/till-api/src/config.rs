//! Envelope configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape every response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Product name used in the vendor media type.
    #[serde(default = "default_product")]
    pub product: String,
}

fn default_product() -> String {
    "till".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
        }
    }
}

impl ApiConfig {
    /// Media type for both success and error envelopes.
    pub fn content_type(&self) -> String {
        format!("application/{}.api+json; charset=UTF-8", self.product)
    }
}
