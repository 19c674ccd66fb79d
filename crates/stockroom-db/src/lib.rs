//! # stockroom-db: Store and Transaction Poster for Stockroom
//!
//! This crate provides database access and the write services for the
//! Stockroom posting engine. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  Host action (record sale / record purchase)                           │
//! │       │  Actor + TransactionDraft                                       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ Poster        │───►│ ProductRepo   │    │ 001_initial  │  │   │
//! │  │   │ Adjustments   │    │ Transaction.. │    │ _schema.sql  │  │   │
//! │  │   │ Catalog       │    │ User / Party  │    │              │  │   │
//! │  │   └──────┬────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │          │ after commit        │                               │   │
//! │  │          ▼                     ▼                               │   │
//! │  │   InvalidationBus        Database (pool.rs, SqlitePool)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Configuration from environment variables
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`services`] - Transaction poster, stock adjustments, catalog changes
//! - [`invalidation`] - Broadcast bus for cache invalidation tags
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockroom_db::{Database, DbConfig, InvalidationBus, TransactionPoster};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let bus = InvalidationBus::default();
//! let poster = TransactionPoster::new(db.clone(), Arc::new(bus.clone()));
//!
//! let posted = poster.post(Some(&actor), draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod invalidation;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ConfigError;
pub use error::{DbError, DbResult};
pub use invalidation::InvalidationBus;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::adjustment::AdjustmentRepository;
pub use repository::party::{CustomerRepository, SupplierRepository};
pub use repository::product::ProductRepository;
pub use repository::transaction::{TransactionFilter, TransactionPage, TransactionRepository};
pub use repository::user::UserRepository;
pub use repository::PageInfo;

// Service re-exports
pub use services::adjustment::AdjustmentService;
pub use services::catalog::{CatalogError, CatalogService};
pub use services::posting::{PostedTransaction, ProductPosition, TransactionPoster};
