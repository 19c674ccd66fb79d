//! # Cache Invalidation
//!
//! After a write commits, views that read the affected data must refresh.
//! The core only names *what* went stale; the host decides how to refresh.
//!
//! ```text
//! post() ──commit──► invalidate(Transactions)
//!                    invalidate(Products)
//!                    invalidate(Reports)
//! ```
//!
//! Nothing is published for a rejected or rolled-back write.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A group of views that may be stale after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum InvalidationTag {
    /// Transaction listings.
    Transactions,
    /// Product list and inventory views.
    Products,
    /// Dashboards and reports.
    Reports,
}

impl InvalidationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationTag::Transactions => "transactions",
            InvalidationTag::Products => "products",
            InvalidationTag::Reports => "reports",
        }
    }
}

/// Tags refreshed after a committed posting.
pub const POSTING_TAGS: [InvalidationTag; 3] = [
    InvalidationTag::Transactions,
    InvalidationTag::Products,
    InvalidationTag::Reports,
];

/// Tags refreshed after a committed stock adjustment or catalog change.
pub const CATALOG_TAGS: [InvalidationTag; 2] = [InvalidationTag::Products, InvalidationTag::Reports];

/// Receives invalidation notices once a write is durable.
///
/// Implementations must not block; they are called from inside the async
/// write path right after commit.
pub trait Invalidator: Send + Sync {
    fn invalidate(&self, tag: InvalidationTag);
}

/// Discards every notice. Used by tools that have no views to refresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl Invalidator for NoopInvalidator {
    fn invalidate(&self, _tag: InvalidationTag) {}
}
