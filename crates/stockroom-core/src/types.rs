//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  kind           │──►│  product_id     │       │
//! │  │  sku (business) │   │  total          │   │  quantity       │       │
//! │  │  stock_qty  ◄── mutated by every posted line                │       │
//! │  │  cost_price ◄── mutated by PURCHASE lines (WAC)             │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Actor       │   │ Customer /      │   │   Adjustment    │       │
//! │  │  user_id, role  │   │ Supplier        │   │  qty_change     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A Transaction owns its items (created together, never split). Products
//! are only referenced; their `stock_qty`/`cost_price` are where history is
//! folded into current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::valuation::StockPosition;

// =============================================================================
// Role
// =============================================================================

/// A user's role. Read-only input to the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Clerk,
}

impl Role {
    /// All roles, for exhaustive checks.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Clerk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Clerk => "CLERK",
        }
    }

    /// Plural noun used in denial messages ("Clerks cannot ...").
    pub fn plural_label(&self) -> &'static str {
        match self {
            Role::Admin => "Admins",
            Role::Manager => "Managers",
            Role::Clerk => "Clerks",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// Whether a transaction moves stock out (SALE) or in (PURCHASE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Sale,
    Purchase,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Sale, TransactionKind::Purchase];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Sale => "SALE",
            TransactionKind::Purchase => "PURCHASE",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The authenticated identity making a call.
///
/// Supplied by the surrounding application's session layer and passed in
/// explicitly; the core never looks it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Actor {
            user_id: user_id.into(),
            role,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name.
    pub name: String,

    pub brand: Option<String>,
    pub category: Option<String>,

    /// Barcode (EAN-13, UPC-A, etc.), unique when present.
    pub barcode: Option<String>,

    /// Weighted-average acquisition cost. Mutated by purchases only.
    #[ts(type = "string")]
    pub cost_price: Money,

    /// Unit sale price.
    #[ts(type = "string")]
    pub sale_price: Money,

    /// Units on hand. May go negative on oversold sales.
    pub stock_qty: i64,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Archived products stay referenced by history but leave the catalog.
    pub is_archived: bool,

    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Current stock/cost pair, the input to the valuation rules.
    #[inline]
    pub fn position(&self) -> StockPosition {
        StockPosition::new(self.stock_qty, self.cost_price)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A posted SALE or PURCHASE. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Σ (quantity × price − discount) over the items.
    #[ts(type = "string")]
    pub total: Money,
    /// The actor who posted it.
    pub user_id: String,
    pub customer_id: Option<String>,
    pub supplier_id: Option<String>,
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line of a posted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit sale price (SALE) or unit acquisition cost (PURCHASE).
    #[ts(type = "string")]
    pub price: Money,
    /// Amount deducted from the line's gross.
    #[ts(type = "string")]
    pub discount: Money,
}

// =============================================================================
// Counterparties
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity this user acts as.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

// =============================================================================
// Adjustment
// =============================================================================

/// A manual stock correction (breakage, recount, shrinkage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub reason: String,
    /// Signed change applied to `stock_qty`.
    pub qty_change: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
