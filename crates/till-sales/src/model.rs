//! Sale aggregate and listing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Page size used when a listing asks for `length <= 0`.
pub const DEFAULT_PAGE_LENGTH: i64 = 25;

/// How a sale's discount amount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// A flat amount off the total.
    #[default]
    Fixed,
    /// A percentage of the total.
    Percentage,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Fixed => "fixed",
            DiscountType::Percentage => "percentage",
        }
    }
}

/// A sale together with its line items.
///
/// A value with only `uid` set is a cart stub: it stands in for a sale that
/// has not been checked out yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Sale {
    /// Identifier, assigned by the repository on insert.
    pub uid: Uuid,
    /// Customer reference.
    pub customer: Uuid,
    /// Operator who rang up the sale.
    pub user: Uuid,
    /// Discount amount, interpreted by `discount_type`.
    pub discount: f64,
    pub discount_type: DiscountType,
    pub total: f64,
    pub total_payment: f64,
    pub payment_type: String,
    pub note: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub deleted: bool,
    /// Line items, in insertion order.
    pub detail: Vec<SaleDetail>,
}

impl Sale {
    /// A fresh cart stub with a random identifier.
    pub fn stub() -> Self {
        Self {
            uid: Uuid::new_v4(),
            ..Self::default()
        }
    }

    /// A stub referring to an existing identifier.
    pub fn with_uid(uid: Uuid) -> Self {
        Self {
            uid,
            ..Self::default()
        }
    }
}

/// One line item of a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaleDetail {
    /// Identifier of the owning sale.
    pub uid: Uuid,
    pub product: Uuid,
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
    pub subtotal: f64,
    pub deleted: bool,
}

impl SaleDetail {
    /// A line for `quantity` units of `product` at `price` each.
    pub fn new(product: Uuid, quantity: i64, price: f64) -> Self {
        Self {
            uid: Uuid::nil(),
            product,
            quantity,
            price,
            subtotal: price * quantity as f64,
            deleted: false,
        }
    }
}

/// Columns a sale listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Created,
    Total,
    Customer,
    PaymentType,
}

impl SortColumn {
    /// Column name in the `sales` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortColumn::Created => "created",
            SortColumn::Total => "total",
            SortColumn::Customer => "customer",
            SortColumn::PaymentType => "payment_type",
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(SortColumn::Created),
            "total" => Ok(SortColumn::Total),
            "customer" => Ok(SortColumn::Customer),
            "payment_type" => Ok(SortColumn::PaymentType),
            other => Err(format!("unknown sort column: {}", other)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderDir {
    #[default]
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDir::Asc),
            "desc" => Ok(OrderDir::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

impl fmt::Display for OrderDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Listing window and filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Paging {
    /// Rows to skip.
    pub start: i64,
    /// Page size; `<= 0` selects the default.
    pub length: i64,
    /// Free-text filter; empty means no filter.
    pub keyword: String,
    /// Sort column; `None` keeps the store's row order.
    pub order: Option<SortColumn>,
    pub order_dir: OrderDir,
}

impl Paging {
    /// A first page of `length` rows.
    pub fn new(length: i64) -> Self {
        Self {
            length,
            ..Self::default()
        }
    }

    /// Effective page size.
    pub fn limit(&self, default_length: i64) -> i64 {
        if self.length > 0 {
            self.length
        } else {
            default_length
        }
    }

    /// Effective offset, never negative.
    pub fn offset(&self) -> i64 {
        self.start.max(0)
    }

    /// The trimmed keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        let keyword = self.keyword.trim();
        (!keyword.is_empty()).then_some(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_has_only_uid() {
        let stub = Sale::stub();
        assert!(!stub.uid.is_nil());
        assert_eq!(
            Sale {
                uid: Uuid::nil(),
                ..stub
            },
            Sale::default()
        );
    }

    #[test]
    fn test_stubs_are_distinct() {
        assert_ne!(Sale::stub().uid, Sale::stub().uid);
    }

    #[test]
    fn test_sale_decodes_with_missing_fields() {
        let sale: Sale = serde_json::from_str(r#"{"total": 12.5, "discount_type": "percentage"}"#).unwrap();
        assert_eq!(sale.total, 12.5);
        assert_eq!(sale.discount_type, DiscountType::Percentage);
        assert!(sale.uid.is_nil());
        assert!(sale.detail.is_empty());
    }

    #[test]
    fn test_detail_subtotal() {
        let line = SaleDetail::new(Uuid::new_v4(), 3, 2.5);
        assert_eq!(line.subtotal, 7.5);
    }

    #[test]
    fn test_paging_defaults() {
        assert_eq!(Paging::default().limit(DEFAULT_PAGE_LENGTH), 25);
        assert_eq!(Paging::new(-3).limit(DEFAULT_PAGE_LENGTH), 25);
        assert_eq!(Paging::new(5).limit(DEFAULT_PAGE_LENGTH), 5);
    }

    #[test]
    fn test_paging_offset_and_keyword() {
        let paging = Paging {
            start: -10,
            keyword: "  ".to_string(),
            ..Paging::default()
        };
        assert_eq!(paging.offset(), 0);
        assert_eq!(paging.keyword(), None);

        let paging = Paging {
            keyword: " cash ".to_string(),
            ..Paging::default()
        };
        assert_eq!(paging.keyword(), Some("cash"));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("total".parse::<SortColumn>(), Ok(SortColumn::Total));
        assert!("uid; DROP TABLE sales".parse::<SortColumn>().is_err());
        assert_eq!("DESC".parse::<OrderDir>(), Ok(OrderDir::Desc));
    }
}
