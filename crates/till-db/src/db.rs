//! Database connection and query execution.

use crate::{DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;

/// SQLite connection with typed reads.
///
/// Statements use positional `?` parameters built with [`params!`](crate::params).
/// Rows are decoded into any `DeserializeOwned` type by column name.
///
/// On `wasm32` this is Spin's SQLite. On native targets it is an embedded
/// SQLite behind a mutex, so one `Db` can serve many threads.
/// [`Db::open_default`] gives a private in-memory database there, which
/// lives only as long as the `Db`; hosts that keep data open a file with
/// [`Db::open`] and share that `Db`.
pub struct Db {
    conn: backend::Connection,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl Db {
    /// Open the default database.
    ///
    /// ```rust,ignore
    /// let db = Db::open_default()?;
    /// ```
    pub fn open_default() -> Result<Self, DbError> {
        Ok(Self {
            conn: backend::open_default()?,
        })
    }

    /// Open a database by label (`wasm32`) or file path (native).
    pub fn open(name: &str) -> Result<Self, DbError> {
        Ok(Self {
            conn: backend::open(name)?,
        })
    }

    /// Run a statement that returns no rows.
    ///
    /// ```rust,ignore
    /// db.execute("UPDATE sales SET deleted = 1 WHERE uid = ?", params![sale.uid])?;
    /// ```
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<(), DbError> {
        tracing::debug!(sql, params = params.len(), "execute");
        backend::execute(&self.conn, sql, params)
    }

    /// Run a query and return its raw rows.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        tracing::debug!(sql, params = params.len(), "query");
        backend::query(&self.conn, sql, params)
    }

    /// Run a query and decode every row.
    ///
    /// ```rust,ignore
    /// let lines: Vec<SaleDetail> = db.query_as(
    ///     "SELECT uid, product, quantity FROM sale_details WHERE uid = ?",
    ///     params![sale_id],
    /// )?;
    /// ```
    pub fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params)?.decode_all()
    }

    /// Run a query and decode its first row.
    ///
    /// No row is [`DbError::NotFound`].
    pub fn query_one<T: DeserializeOwned>(&self, sql: &str, params: &[Value]) -> Result<T, DbError> {
        self.query(sql, params)?
            .first()
            .ok_or(DbError::NotFound)?
            .decode()
    }

    /// Run a query and decode its first row, if there is one.
    pub fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        self.query(sql, params)?.first().map(Row::decode).transpose()
    }

    /// Run a query returning one integer, such as `COUNT(*)`.
    pub fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        self.query(sql, params)?.scalar()
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use crate::{DbError, QueryResult, Row, Value};
    use spin_sdk::sqlite::Value as SpinValue;
    use std::sync::Arc;

    pub type Connection = spin_sdk::sqlite::Connection;

    pub fn open_default() -> Result<Connection, DbError> {
        Connection::open_default().map_err(|e| DbError::OpenError(e.to_string()))
    }

    pub fn open(name: &str) -> Result<Connection, DbError> {
        Connection::open(name).map_err(|e| DbError::OpenError(e.to_string()))
    }

    pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<(), DbError> {
        query(conn, sql, params).map(drop)
    }

    pub fn query(conn: &Connection, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let bound: Vec<SpinValue> = params.iter().map(to_spin).collect();
        let result = conn
            .execute(sql, bound.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let columns: Arc<[String]> = result.columns.into();
        let rows = result
            .rows
            .into_iter()
            .map(|row| Row::new(columns.clone(), row.values.into_iter().map(from_spin).collect()))
            .collect();
        Ok(QueryResult::new(rows))
    }

    fn to_spin(value: &Value) -> SpinValue {
        match value {
            Value::Null => SpinValue::Null,
            Value::Integer(i) => SpinValue::Integer(*i),
            Value::Real(f) => SpinValue::Real(*f),
            Value::Text(s) => SpinValue::Text(s.clone()),
            Value::Blob(b) => SpinValue::Blob(b.clone()),
        }
    }

    fn from_spin(value: SpinValue) -> Value {
        match value {
            SpinValue::Null => Value::Null,
            SpinValue::Integer(i) => Value::Integer(i),
            SpinValue::Real(f) => Value::Real(f),
            SpinValue::Text(s) => Value::Text(s),
            SpinValue::Blob(b) => Value::Blob(b),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use crate::{DbError, QueryResult, Row, Value};
    use rusqlite::types::{Value as SqlValue, ValueRef};
    use rusqlite::params_from_iter;
    use std::sync::{Arc, Mutex, MutexGuard};

    // One statement at a time per connection, so a `Db` can be shared
    // between request threads.
    pub type Connection = Mutex<rusqlite::Connection>;

    fn lock(conn: &Connection) -> Result<MutexGuard<'_, rusqlite::Connection>, DbError> {
        conn.lock()
            .map_err(|_| DbError::QueryError("connection lock poisoned".to_string()))
    }

    pub fn open_default() -> Result<Connection, DbError> {
        rusqlite::Connection::open_in_memory()
            .map(Mutex::new)
            .map_err(|e| DbError::OpenError(e.to_string()))
    }

    pub fn open(path: &str) -> Result<Connection, DbError> {
        rusqlite::Connection::open(path)
            .map(Mutex::new)
            .map_err(|e| DbError::OpenError(e.to_string()))
    }

    pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<(), DbError> {
        lock(conn)?.execute(sql, params_from_iter(params.iter().map(to_sql)))?;
        Ok(())
    }

    pub fn query(conn: &Connection, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let conn = lock(conn)?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params_from_iter(params.iter().map(to_sql)))?;
        while let Some(row) = cursor.next()? {
            let values = (0..columns.len())
                .map(|i| row.get_ref(i).map(from_sql))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(Row::new(columns.clone(), values));
        }
        Ok(QueryResult::new(rows))
    }

    fn to_sql(value: &Value) -> SqlValue {
        match value {
            Value::Null => SqlValue::Null,
            Value::Integer(i) => SqlValue::Integer(*i),
            Value::Real(f) => SqlValue::Real(*f),
            Value::Text(s) => SqlValue::Text(s.clone()),
            Value::Blob(b) => SqlValue::Blob(b.clone()),
        }
    }

    fn from_sql(value: ValueRef<'_>) -> Value {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}
