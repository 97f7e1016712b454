//! JSON values over a key-value store.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Typed cache over a key-value store.
///
/// Values are stored as JSON. On `wasm32` the store is Spin's Key-Value
/// Store; on native targets it is an in-process map, where every `open`
/// returns an independent store and clones share one.
#[cfg_attr(not(target_arch = "wasm32"), derive(Clone))]
pub struct Cache {
    store: backend::Store,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    /// Open the default store.
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self {
            store: backend::open_default()?,
        })
    }

    /// Open a store by label.
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self {
            store: backend::open(name)?,
        })
    }

    /// Read and decode `key`, or `None` when it was never written.
    ///
    /// ```rust,ignore
    /// let cart: Option<Vec<Uuid>> = cache.get("cart:5f0c...")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        backend::read(&self.store, key)?
            .map(|bytes| serde_json::from_slice(&bytes))
            .transpose()
            .map_err(CacheError::from)
    }

    /// Read and decode `key`, which must be present.
    ///
    /// A missing key is [`CacheError::NotFound`], so callers can tell
    /// "nothing written yet" apart from a failing store.
    ///
    /// ```rust,ignore
    /// match cache.fetch::<Vec<Sale>>("usercarts:42") {
    ///     Ok(carts) => { /* ... */ }
    ///     Err(e) if e.is_not_found() => { /* first cart */ }
    ///     Err(e) => return Err(e),
    /// }
    /// ```
    pub fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get(key)?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Encode `value` and store it under `key`, replacing what was there.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        tracing::debug!(key, bytes = bytes.len(), "cache write");
        backend::write(&self.store, key, &bytes)
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        backend::delete(&self.store, key)
    }

    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        backend::exists(&self.store, key)
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use crate::CacheError;

    pub type Store = spin_sdk::key_value::Store;

    fn store_error(e: impl std::fmt::Display) -> CacheError {
        CacheError::StoreError(e.to_string())
    }

    pub fn open_default() -> Result<Store, CacheError> {
        Store::open_default().map_err(|e| CacheError::OpenError(e.to_string()))
    }

    pub fn open(name: &str) -> Result<Store, CacheError> {
        Store::open(name).map_err(|e| CacheError::OpenError(e.to_string()))
    }

    pub fn read(store: &Store, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        store.get(key).map_err(store_error)
    }

    pub fn write(store: &Store, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        store.set(key, bytes).map_err(store_error)
    }

    pub fn delete(store: &Store, key: &str) -> Result<(), CacheError> {
        store.delete(key).map_err(store_error)
    }

    pub fn exists(store: &Store, key: &str) -> Result<bool, CacheError> {
        store.exists(key).map_err(store_error)
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use crate::CacheError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard};

    pub type Store = Arc<Mutex<HashMap<String, Vec<u8>>>>;

    fn lock(store: &Store) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
        store
            .lock()
            .map_err(|_| CacheError::StoreError("cache lock poisoned".to_string()))
    }

    pub fn open_default() -> Result<Store, CacheError> {
        Ok(Store::default())
    }

    pub fn open(_name: &str) -> Result<Store, CacheError> {
        Ok(Store::default())
    }

    pub fn read(store: &Store, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(lock(store)?.get(key).cloned())
    }

    pub fn write(store: &Store, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        lock(store)?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    pub fn delete(store: &Store, key: &str) -> Result<(), CacheError> {
        lock(store)?.remove(key);
        Ok(())
    }

    pub fn exists(store: &Store, key: &str) -> Result<bool, CacheError> {
        Ok(lock(store)?.contains_key(key))
    }
}

/// Join a prefix and parts into a `prefix:part:...` key.
///
/// ```rust,ignore
/// let key = cache_key!("usercarts", user_id); // "usercarts:0b6c..."
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_is_none() {
        let cache = Cache::open_default().unwrap();
        let value: Option<Vec<String>> = cache.get("cart:missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_fetch_missing_key_is_not_found() {
        let cache = Cache::open_default().unwrap();
        let err = cache.fetch::<Vec<String>>("cart:missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, CacheError::NotFound(ref key) if key == "cart:missing"));
    }

    #[test]
    fn test_set_then_fetch() {
        let cache = Cache::open_default().unwrap();
        cache.set("cart:a", &vec!["x", "y"]).unwrap();
        let items: Vec<String> = cache.fetch("cart:a").unwrap();
        assert_eq!(items, vec!["x", "y"]);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = Cache::open_default().unwrap();
        cache.set("k", &1).unwrap();
        cache.set("k", &2).unwrap();
        assert_eq!(cache.fetch::<i32>("k").unwrap(), 2);
    }

    #[test]
    fn test_fetch_wrong_shape_is_serialize_error() {
        let cache = Cache::open_default().unwrap();
        cache.set("k", "not a list").unwrap();
        let err = cache.fetch::<Vec<i32>>("k").unwrap_err();
        assert!(matches!(err, CacheError::SerializeError(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_delete_and_exists() {
        let cache = Cache::open_default().unwrap();
        cache.set("k", &true).unwrap();
        assert!(cache.exists("k").unwrap());
        cache.delete("k").unwrap();
        assert!(!cache.exists("k").unwrap());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = Cache::open_default().unwrap();
        let other = cache.clone();
        cache.set("shared", &7).unwrap();
        assert_eq!(other.fetch::<i32>("shared").unwrap(), 7);
    }

    #[test]
    fn test_separate_opens_are_independent() {
        let a = Cache::open("carts").unwrap();
        let b = Cache::open("carts").unwrap();
        a.set("k", &1).unwrap();
        assert!(!b.exists("k").unwrap());
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("cart", "abc"), "cart:abc");
        assert_eq!(cache_key!("usercarts", 42, "x"), "usercarts:42:x");
    }
}
