//! # Till Sales
//!
//! Point-of-sale carts and sale records.
//!
//! Open carts live in the cache as lists of product ids. Checked-out sales
//! live in SQLite as a `sales` row plus `sale_details` lines, and are
//! soft-deleted. Handlers join both stores to the response envelope.
//!
//! ## Example
//!
//! ```rust,ignore
//! use till_sales::prelude::*;
//!
//! let api = TillConfig::load("till.toml")?.build_api()?;
//!
//! let cart = api.carts().create_user_cart(user_id)?;
//! api.carts().add_cart_item(&cart, product_id)?;
//!
//! let mut exchange = ApiExchange::new(response, Method::GET, "/sales");
//! api.list_sales(&mut exchange);
//! ```

mod cart;
mod config;
mod error;
mod handlers;
mod model;
mod repository;

pub use cart::{CartStore, CART_PREFIX, USER_CARTS_PREFIX};
pub use config::{CacheConfig, DatabaseConfig, SalesConfig, TillConfig};
pub use error::{SalesError, SalesResult};
pub use handlers::{SalePage, SalesApi};
pub use model::{
    DiscountType, OrderDir, Paging, Sale, SaleDetail, SortColumn, DEFAULT_PAGE_LENGTH,
};
pub use repository::{SaleRepository, SqlSaleRepository, SCHEMA};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        CartStore, Paging, Sale, SaleDetail, SaleRepository, SalesApi, SalesError, SalesResult,
        SqlSaleRepository, TillConfig,
    };
    pub use till_api::prelude::*;
}
