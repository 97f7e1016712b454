//! Durable storage for sale aggregates.

mod sql;

pub use sql::{SqlSaleRepository, SCHEMA};

use crate::{Paging, Sale, SalesResult};
use uuid::Uuid;

/// Storage operations over sales and their line items.
///
/// Every read composes a sale with its non-deleted detail lines. Soft-deleted
/// sales are invisible to every method here.
pub trait SaleRepository {
    /// Number of sales that are not deleted.
    fn count_all(&self) -> SalesResult<i64>;

    /// Whether a non-deleted sale with `id` exists.
    fn exists(&self, id: Uuid) -> SalesResult<bool>;

    /// One page of sales. Any failure discards the whole page.
    fn list(&self, paging: &Paging) -> SalesResult<Vec<Sale>>;

    /// The sale with `id`, or a not-found error.
    fn get(&self, id: Uuid) -> SalesResult<Sale>;

    /// Store a new sale under a fresh identifier and return it.
    ///
    /// Any identifier already on `sale` is replaced.
    fn insert(&self, sale: Sale) -> SalesResult<Sale>;

    /// Overwrite the mutable fields of an existing sale and return the
    /// stored sale with its line items. Line items are left as they are.
    fn update(&self, sale: &Sale) -> SalesResult<Sale>;

    /// Soft-delete one sale.
    fn delete(&self, sale: &Sale) -> SalesResult<()>;

    /// Soft-delete every sale in `ids` at once.
    fn delete_bulk(&self, ids: &[Uuid]) -> SalesResult<()>;
}
