//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate is the **heart** of the transaction-posting engine. It contains
//! the business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (external)                            │   │
//! │  │     Cart ──► Record Sale / Record Purchase ──► Reports          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ TransactionDraft + Actor               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   authz   │  │ valuation │  │   money   │  │ validation│  │   │
//! │  │   │  can_post │  │    WAC    │  │  Decimal  │  │  Issues   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Store + Poster)                   │   │
//! │  │        SQLite unit of work, repositories, invalidation bus      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, Actor, etc.)
//! - [`money`] - Decimal money type (no floating point!)
//! - [`valuation`] - Stock and weighted-average cost rules
//! - [`authz`] - Role-based admission for posting
//! - [`validation`] - Field rules and transaction payload validation
//! - [`invalidation`] - Cache invalidation tags and sink trait
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//! use stockroom_core::valuation::apply_purchase_line;
//!
//! // 10 units on hand at $5.00, receive 10 more at $7.00
//! let next = apply_purchase_line(
//!     10,
//!     Money::from_cents(500),
//!     10,
//!     Money::from_cents(700),
//!     Money::zero(),
//! )
//! .unwrap();
//!
//! assert_eq!(next.stock_qty, 20);
//! assert_eq!(next.cost_price, Money::from_cents(600));
//! ```

pub mod authz;
pub mod error;
pub mod invalidation;
pub mod money;
pub mod types;
pub mod validation;
pub mod valuation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{
    ActionError, CoreError, CoreResult, ErrorCode, Operation, PostingError, ValidationError,
};
pub use invalidation::{InvalidationTag, Invalidator};
pub use money::Money;
pub use types::*;
pub use validation::{Issue, LineItemDraft, PathSegment, TransactionDraft};
pub use valuation::StockPosition;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reorder threshold given to products that don't specify one.
pub const DEFAULT_MIN_STOCK: i64 = 5;
