//! SQLite access for Till.
//!
//! [`Db`] runs positional-parameter statements and decodes rows into serde
//! types by column name. Spin's SQLite backs it on `wasm32`; native builds,
//! including every test suite, use an embedded SQLite.
//!
//! # Example
//!
//! ```rust,ignore
//! use till_db::{params, Db};
//!
//! let db = Db::open_default()?;
//! db.execute("UPDATE sales SET deleted = 1 WHERE uid = ?", params![sale_id])?;
//!
//! let open = db.query_scalar("SELECT COUNT(*) FROM sales WHERE deleted = 0", params![])?;
//! ```

mod db;
mod error;
mod types;

pub use db::Db;
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Build a `&[Value]` parameter list.
///
/// Each argument goes through `Value::from`, so identifiers, timestamps and
/// `Option`s can be passed as they are.
///
/// ```rust,ignore
/// db.execute(
///     "INSERT INTO sale_details (uid, product, quantity) VALUES (?, ?, ?)",
///     params![sale.uid, product_id, 2],
/// )?;
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
