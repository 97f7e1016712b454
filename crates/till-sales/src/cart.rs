//! Cache-backed carts.
//!
//! Two entities live in the cache:
//!
//! - `cart:{sale_uid}` holds the ordered product ids added to one cart.
//! - `usercarts:{user_id}` holds the stubs of a user's open carts.
//!
//! Both are updated read-modify-write without a lock. Two concurrent writers
//! for the same key race and the last write wins.

use crate::Sale;
use till_cache::{cache_key, Cache, CacheError};
use uuid::Uuid;

/// Key prefix for cart item lists.
pub const CART_PREFIX: &str = "cart";

/// Key prefix for a user's open carts.
pub const USER_CARTS_PREFIX: &str = "usercarts";

/// Reads and writes carts in the cache.
#[derive(Debug)]
pub struct CartStore {
    cache: Cache,
}

impl CartStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Append `product_id` to the cart, keeping insertion order.
    ///
    /// A product already in the cart is not added twice. Returns the
    /// cart's items after the add.
    pub fn add_cart_item(&self, cart: &Sale, product_id: Uuid) -> Result<Vec<Uuid>, CacheError> {
        let key = cache_key!(CART_PREFIX, cart.uid);
        let mut items = self.read_or_empty::<Uuid>(&key)?;

        if !items.contains(&product_id) {
            items.push(product_id);
            self.cache.set(&key, &items)?;
        }

        Ok(items)
    }

    /// Items added to the cart so far.
    ///
    /// A cart that never had an item yields [`CacheError::NotFound`].
    pub fn get_cart_items(&self, cart: &Sale) -> Result<Vec<Uuid>, CacheError> {
        self.cache.fetch(&cache_key!(CART_PREFIX, cart.uid))
    }

    /// Open a new cart for `user_id` and return its stub.
    ///
    /// The first cart for a user starts the list; later carts are appended.
    /// Any read failure other than a missing list aborts without writing.
    pub fn create_user_cart(&self, user_id: Uuid) -> Result<Sale, CacheError> {
        let key = cache_key!(USER_CARTS_PREFIX, user_id);
        let mut carts = self.read_or_empty::<Sale>(&key)?;

        let cart = Sale::stub();
        carts.push(cart.clone());
        self.cache.set(&key, &carts)?;

        tracing::debug!(user = %user_id, cart = %cart.uid, open = carts.len(), "cart created");
        Ok(cart)
    }

    /// Stubs of the user's open carts, oldest first.
    ///
    /// A user that never opened a cart yields [`CacheError::NotFound`].
    pub fn get_user_carts(&self, user_id: Uuid) -> Result<Vec<Sale>, CacheError> {
        self.cache.fetch(&cache_key!(USER_CARTS_PREFIX, user_id))
    }

    fn read_or_empty<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Vec<T>, CacheError> {
        match self.cache.fetch(key) {
            Ok(items) => Ok(items),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
