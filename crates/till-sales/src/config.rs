//! Service configuration.

use crate::{CartStore, SalesApi, SqlSaleRepository, DEFAULT_PAGE_LENGTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use till_api::ApiConfig;
use till_cache::Cache;
use till_db::Db;

/// Configuration file for the sales service.
///
/// ```toml
/// [api]
/// product = "till"
///
/// [cache]
/// store = "carts"
///
/// [database]
/// name = "sales"
///
/// [sales]
/// default_page_length = 25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TillConfig {
    /// Envelope settings, applied by [`SalesApi::exchange`].
    #[serde(default)]
    pub api: ApiConfig,

    /// Cart cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Sale database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub sales: SalesConfig,
}

impl TillConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Open the configured cart cache.
    pub fn open_cache(&self) -> Result<Cache> {
        let cache = match &self.cache.store {
            Some(name) => Cache::open(name),
            None => Cache::open_default(),
        };
        cache.context("Failed to open cart cache")
    }

    /// Open the configured sale database.
    pub fn open_db(&self) -> Result<Db> {
        let db = match &self.database.name {
            Some(name) => Db::open(name),
            None => Db::open_default(),
        };
        db.context("Failed to open sale database")
    }

    /// Open both stores, create missing tables and build the handlers.
    pub fn build_api(&self) -> Result<SalesApi<SqlSaleRepository>> {
        let repo = SqlSaleRepository::new(self.open_db()?)
            .with_default_length(self.sales.default_page_length);
        repo.migrate().context("Failed to create sale tables")?;

        let carts = CartStore::new(self.open_cache()?);
        tracing::debug!(product = %self.api.product, "sales api ready");
        Ok(SalesApi::new(repo, carts).with_config(self.api.clone()))
    }
}

/// Cart cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key-Value store label; the default store when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// Sale database settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database label, or a file path on native builds. The default
    /// database when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Listing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesConfig {
    /// Page size when a listing asks for `length <= 0`.
    #[serde(default = "default_page_length")]
    pub default_page_length: i64,
}

fn default_page_length() -> i64 {
    DEFAULT_PAGE_LENGTH
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            default_page_length: default_page_length(),
        }
    }
}
