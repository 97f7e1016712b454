//! Key-value cache for Till carts.
//!
//! [`Cache`] stores any serde type as JSON under a string key. Spin's
//! Key-Value Store backs it on `wasm32`; native builds use an in-process
//! map with the same semantics.
//!
//! A key that was never written is a normal outcome: [`Cache::get`] returns
//! `None` and [`Cache::fetch`] returns [`CacheError::NotFound`].
//!
//! # Example
//!
//! ```rust,ignore
//! use till_cache::{cache_key, Cache};
//!
//! let cache = Cache::open_default()?;
//! let key = cache_key!("cart", sale_id);
//!
//! cache.set(&key, &items)?;
//! let items: Vec<Uuid> = cache.fetch(&key)?;
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError};
}
