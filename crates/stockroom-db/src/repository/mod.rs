//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.products().get_by_id("…")                                  │
//! │       ▼                                                                 │
//! │  ProductRepository (owns a pool handle)                                │
//! │  ├── get_by_id / get_by_sku / list_active                              │
//! │  ├── insert / archive / unarchive / delete                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Row struct (FromRow) ──TryFrom──► domain type (Money parsed)          │
//! │                                                                         │
//! │  Unit-of-work helpers (`pub(crate)`, generic over Executor) let the    │
//! │  poster run the same SQL on its own sqlx::Transaction.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog rows and stock positions
//! - [`TransactionRepository`](transaction::TransactionRepository) - Posted transactions and items
//! - [`AdjustmentRepository`](adjustment::AdjustmentRepository) - Manual stock corrections
//! - [`CustomerRepository`](party::CustomerRepository) / [`SupplierRepository`](party::SupplierRepository)
//! - [`UserRepository`](user::UserRepository)

use stockroom_core::Money;

use crate::error::{DbError, DbResult};

pub mod adjustment;
pub mod party;
pub mod product;
pub mod transaction;
pub mod user;

/// Parses a TEXT money column.
pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    raw.parse::<Money>()
        .map_err(|_| DbError::InvalidData(format!("{} = '{}' is not a decimal", column, raw)))
}

/// Canonical TEXT form for a money column.
pub(crate) fn money_text(amount: Money) -> String {
    amount.amount().to_string()
}

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

impl PageInfo {
    /// `page` is 1-based; `limit` is clamped to at least 1.
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let limit = i64::from(limit.max(1));
        let total_pages = (total.max(0) + limit - 1) / limit;
        PageInfo {
            total,
            page: page.max(1),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

/// Row offset for a 1-based page.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(limit.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info() {
        assert_eq!(PageInfo::new(0, 1, 10).total_pages, 0);
        assert_eq!(PageInfo::new(10, 1, 10).total_pages, 1);
        assert_eq!(PageInfo::new(11, 2, 10).total_pages, 2);
        assert_eq!(PageInfo::new(5, 0, 0).page, 1);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(0, 20), 0);
    }

    #[test]
    fn test_parse_money_column() {
        assert_eq!(parse_money("cost_price", "6.00").unwrap(), Money::from_cents(600));
        assert!(matches!(
            parse_money("cost_price", "six"),
            Err(DbError::InvalidData(_))
        ));
    }
}
