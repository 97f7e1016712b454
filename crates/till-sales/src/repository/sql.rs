//! SQLite-backed sale repository.

use super::SaleRepository;
use crate::{Paging, Sale, SaleDetail, SalesResult, DEFAULT_PAGE_LENGTH};
use chrono::Utc;
use till_db::{params, Db, DbError, Value};
use uuid::Uuid;

/// Statements creating the `sales` and `sale_details` tables.
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS sales (
        uid TEXT PRIMARY KEY,
        customer TEXT NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
        user TEXT NOT NULL DEFAULT '00000000-0000-0000-0000-000000000000',
        discount REAL NOT NULL DEFAULT 0,
        discount_type TEXT NOT NULL DEFAULT 'fixed',
        total REAL NOT NULL DEFAULT 0,
        total_payment REAL NOT NULL DEFAULT 0,
        payment_type TEXT NOT NULL DEFAULT '',
        note TEXT NOT NULL DEFAULT '',
        created TEXT,
        updated TEXT,
        deleted INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS sale_details (
        uid TEXT NOT NULL REFERENCES sales (uid),
        product TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        price REAL NOT NULL DEFAULT 0,
        subtotal REAL NOT NULL DEFAULT 0,
        deleted INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS sale_details_uid ON sale_details (uid)",
];

const SALE_COLUMNS: &str =
    "uid, customer, user, discount, discount_type, total, total_payment, payment_type, note, created, updated";

const DETAIL_COLUMNS: &str = "uid, product, quantity, price, subtotal";

/// [`SaleRepository`] over a SQLite [`Db`].
///
/// # Example
///
/// ```rust,ignore
/// let repo = SqlSaleRepository::new(Db::open_default()?);
/// repo.migrate()?;
///
/// let sale = repo.insert(Sale { total: 12.0, ..Sale::default() })?;
/// assert!(repo.exists(sale.uid)?);
/// ```
#[derive(Debug)]
pub struct SqlSaleRepository {
    db: Db,
    default_length: i64,
}

impl SqlSaleRepository {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            default_length: DEFAULT_PAGE_LENGTH,
        }
    }

    /// Page size for listings that don't ask for one.
    pub fn with_default_length(mut self, length: i64) -> Self {
        if length > 0 {
            self.default_length = length;
        }
        self
    }

    /// Create the tables if they don't exist yet.
    pub fn migrate(&self) -> SalesResult<()> {
        for statement in SCHEMA {
            self.db.execute(statement, params![])?;
        }
        Ok(())
    }

    /// Non-deleted line items of the sale `sale_id`, in insertion order.
    pub fn get_detail(&self, sale_id: Uuid) -> SalesResult<Vec<SaleDetail>> {
        let sql = format!(
            "SELECT {DETAIL_COLUMNS} FROM sale_details WHERE uid = ? AND deleted = 0 ORDER BY rowid"
        );
        Ok(self.db.query_as(&sql, params![sale_id])?)
    }

    /// The underlying connection.
    pub fn db(&self) -> &Db {
        &self.db
    }

    fn insert_detail(&self, line: &SaleDetail) -> SalesResult<()> {
        self.db.execute(
            "INSERT INTO sale_details (uid, product, quantity, price, subtotal) VALUES (?, ?, ?, ?, ?)",
            params![line.uid, line.product, line.quantity, line.price, line.subtotal],
        )?;
        Ok(())
    }
}

impl SaleRepository for SqlSaleRepository {
    fn count_all(&self) -> SalesResult<i64> {
        Ok(self
            .db
            .query_scalar("SELECT COUNT(*) FROM sales WHERE deleted = 0", params![])?)
    }

    fn exists(&self, id: Uuid) -> SalesResult<bool> {
        let found = self.db.query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sales WHERE uid = ? AND deleted = 0)",
            params![id],
        )?;
        Ok(found != 0)
    }

    fn list(&self, paging: &Paging) -> SalesResult<Vec<Sale>> {
        let mut sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE deleted = 0");
        let mut args: Vec<Value> = Vec::new();

        if let Some(keyword) = paging.keyword() {
            sql.push_str(
                " AND (note LIKE ? ESCAPE '\\' OR payment_type LIKE ? ESCAPE '\\' OR customer LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(keyword));
            args.extend(std::iter::repeat(Value::from(pattern)).take(3));
        }

        if let Some(order) = paging.order {
            sql.push_str(&format!(" ORDER BY {} {}", order.column(), paging.order_dir));
        }

        sql.push_str(" LIMIT ? OFFSET ?");
        args.push(paging.limit(self.default_length).into());
        args.push(paging.offset().into());

        let mut sales: Vec<Sale> = self.db.query_as(&sql, &args)?;
        for sale in &mut sales {
            sale.detail = self.get_detail(sale.uid)?;
        }

        Ok(sales)
    }

    fn get(&self, id: Uuid) -> SalesResult<Sale> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE uid = ? AND deleted = 0");
        let mut sale: Sale = self.db.query_one(&sql, params![id])?;
        sale.detail = self.get_detail(sale.uid)?;
        Ok(sale)
    }

    fn insert(&self, sale: Sale) -> SalesResult<Sale> {
        let mut sale = sale;
        sale.uid = Uuid::new_v4();
        sale.created = Some(Utc::now());
        sale.updated = None;
        sale.deleted = false;

        self.db.execute(
            "INSERT INTO sales
                (uid, customer, user, discount, discount_type, total, total_payment, payment_type, note, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                sale.uid,
                sale.customer,
                sale.user,
                sale.discount,
                sale.discount_type.as_str(),
                sale.total,
                sale.total_payment,
                sale.payment_type.as_str(),
                sale.note.as_str(),
                sale.created,
            ],
        )?;

        // Lines are written one by one after the sale row, with no rollback.
        let uid = sale.uid;
        for line in &mut sale.detail {
            line.uid = uid;
            line.deleted = false;
            self.insert_detail(line)?;
        }

        tracing::debug!(sale = %sale.uid, lines = sale.detail.len(), "sale inserted");
        Ok(sale)
    }

    fn update(&self, sale: &Sale) -> SalesResult<Sale> {
        if !self.exists(sale.uid)? {
            return Err(DbError::NotFound.into());
        }

        self.db.execute(
            "UPDATE sales SET
                customer = ?, user = ?, discount = ?, discount_type = ?, total = ?,
                total_payment = ?, payment_type = ?, note = ?, updated = ?
             WHERE uid = ?",
            params![
                sale.customer,
                sale.user,
                sale.discount,
                sale.discount_type.as_str(),
                sale.total,
                sale.total_payment,
                sale.payment_type.as_str(),
                sale.note.as_str(),
                Utc::now(),
                sale.uid,
            ],
        )?;

        // Read back so the caller sees `created` and the stored lines.
        self.get(sale.uid)
    }

    fn delete(&self, sale: &Sale) -> SalesResult<()> {
        self.db.execute(
            "UPDATE sales SET deleted = 1 WHERE uid = ?",
            params![sale.uid],
        )?;
        Ok(())
    }

    fn delete_bulk(&self, ids: &[Uuid]) -> SalesResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let args: Vec<Value> = ids.iter().map(|id| Value::from(*id)).collect();
        self.db.execute(
            &format!("UPDATE sales SET deleted = 1 WHERE uid IN ({placeholders})"),
            &args,
        )?;

        tracing::debug!(count = ids.len(), "sales deleted");
        Ok(())
    }
}

fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
