//! # Write Services
//!
//! Every state change that needs an actor goes through one of these.
//!
//! ```text
//! ┌──────────────────────┬─────────────────────────┬──────────────────────┐
//! │ Service              │ Gate                    │ Invalidates          │
//! ├──────────────────────┼─────────────────────────┼──────────────────────┤
//! │ TransactionPoster    │ SALE: any role          │ transactions,        │
//! │                      │ PURCHASE: ADMIN/MANAGER │ products, reports    │
//! │ AdjustmentService    │ ADMIN/MANAGER           │ products, reports    │
//! │ CatalogService       │ ADMIN/MANAGER           │ products, reports    │
//! └──────────────────────┴─────────────────────────┴──────────────────────┘
//! ```

pub mod adjustment;
pub mod catalog;
pub mod posting;
