//! Column values and decoded rows.

use crate::DbError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

/// A value bound to a statement or read back from a column.
///
/// Identifiers are bound as hyphenated text and timestamps as RFC 3339
/// text, which is how the sale tables store them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// The value as an integer, truncating reals.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )+
    };
}

value_from! {
    i32 => |v| Value::Integer(v.into()),
    i64 => |v| Value::Integer(v),
    bool => |v| Value::Integer(v.into()),
    f64 => |v| Value::Real(v),
    &str => |v| Value::Text(v.to_owned()),
    String => |v| Value::Text(v),
    Vec<u8> => |v| Value::Blob(v),
    Uuid => |v| Value::Text(v.to_string()),
    DateTime<Utc> => |v| Value::Text(v.to_rfc3339()),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => (*i).into(),
            // NaN and infinities have no JSON form
            Value::Real(f) => {
                serde_json::Number::from_f64(*f).map_or(serde_json::Value::Null, Into::into)
            }
            Value::Text(s) => s.as_str().into(),
            Value::Blob(b) => b.as_slice().into(),
        }
    }
}

/// One result row. Rows of a result share their column names.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Decode the row into `T`, matching struct fields to column names.
    ///
    /// Columns the type does not name are ignored, so a struct with
    /// `#[serde(default)]` fields can be read from a narrower `SELECT`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.into()))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

/// All rows returned by a statement.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Decode every row into `T`, failing on the first bad row.
    pub fn decode_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(Row::decode).collect()
    }

    /// The first column of the first row as an integer.
    ///
    /// An empty result is [`DbError::NotFound`]; a non-numeric value is a
    /// [`DbError::TypeError`].
    pub fn scalar(&self) -> Result<i64, DbError> {
        let value = self
            .first()
            .and_then(|row| row.values.first())
            .ok_or(DbError::NotFound)?;
        value
            .as_integer()
            .ok_or_else(|| DbError::TypeError(format!("expected integer, got {:?}", value)))
    }
}
