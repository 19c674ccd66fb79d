//! # Transaction Poster
//!
//! Records a SALE or PURCHASE and folds it into product stock and cost as
//! one all-or-nothing unit of work.
//!
//! ## Posting Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  post(actor, draft)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. authorize ─────────── deny ──► Unauthenticated / Forbidden          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. validate_draft ────── issues ─► Validation { issues }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. total = Σ (q × p − d)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────── BEGIN ─────────────────────────┐                │
//! │  │ 4a. INSERT transactions      ← first statement is a │                │
//! │  │                                write: takes the DB  │                │
//! │  │                                write lock up front  │                │
//! │  │ 4b. INSERT transaction_items (FK: product exists)   │                │
//! │  │ 4c. per line, in order:                             │                │
//! │  │       first touch → SELECT stock_qty, cost_price    │                │
//! │  │       apply SALE / PURCHASE rule to working copy    │                │
//! │  │ 4d. UPDATE each touched product once                │                │
//! │  └───────────── COMMIT ─── any error ─► ROLLBACK ──────┘                │
//! │       │                                  └─► Persistence                │
//! │       ▼                                                                 │
//! │  5. invalidate(transactions, products, reports)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Two posts touching the same product serialize on SQLite's write lock:
//! the second waits (up to `busy_timeout`) at its first INSERT and then
//! reads the first one's committed stock and cost. There is no retry loop.
//! Dropping the `post` future mid-flight drops the open transaction, which
//! rolls back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::{error, info, warn};

use stockroom_core::authz::authorize;
use stockroom_core::invalidation::POSTING_TAGS;
use stockroom_core::validation::{validate_draft, LineItem, ValidatedTransaction};
use stockroom_core::valuation::transaction_total;
use stockroom_core::{
    Actor, Invalidator, Issue, Operation, PostingError, StockPosition, Transaction,
    TransactionDraft, TransactionItem, TransactionKind,
};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::product::{fetch_position, write_position};
use crate::repository::transaction::{generate_transaction_id, insert_item, insert_transaction};

/// A product's stock and cost right after a posting committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPosition {
    pub product_id: String,
    #[serde(flatten)]
    pub position: StockPosition,
}

/// What a successful posting hands back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedTransaction {
    pub transaction: Transaction,
    /// In submitted order.
    pub items: Vec<TransactionItem>,
    /// One entry per distinct product, in first-touched order.
    pub positions: Vec<ProductPosition>,
}

impl PostedTransaction {
    /// Position of one touched product.
    pub fn position_of(&self, product_id: &str) -> Option<StockPosition> {
        self.positions
            .iter()
            .find(|p| p.product_id == product_id)
            .map(|p| p.position)
    }
}

/// Posts SALE and PURCHASE transactions.
///
/// ## Usage
/// ```rust,ignore
/// let poster = TransactionPoster::new(db.clone(), Arc::new(bus.clone()));
/// let posted = poster.post(Some(&actor), draft).await?;
/// println!("{} units left", posted.positions[0].position.stock_qty);
/// ```
#[derive(Clone)]
pub struct TransactionPoster {
    db: Database,
    invalidator: Arc<dyn Invalidator>,
}

impl TransactionPoster {
    pub fn new(db: Database, invalidator: Arc<dyn Invalidator>) -> Self {
        TransactionPoster { db, invalidator }
    }

    /// Authorizes, validates and atomically posts `draft` on behalf of `actor`.
    ///
    /// ## Errors
    /// - [`PostingError::Unauthenticated`] - no actor
    /// - [`PostingError::Forbidden`] - e.g. a CLERK recording a PURCHASE
    /// - [`PostingError::Validation`] - malformed items; nothing was written
    /// - [`PostingError::Persistence`] - the unit of work rolled back
    ///   (unknown product, store unavailable, lock wait timed out)
    pub async fn post(
        &self,
        actor: Option<&Actor>,
        draft: TransactionDraft,
    ) -> Result<PostedTransaction, PostingError> {
        let actor = authorize(actor, Operation::Record(draft.kind)).map_err(|e| {
            warn!(kind = %draft.kind, error = %e, "Posting denied");
            e
        })?;

        let validated = validate_draft(&draft).map_err(|issues| {
            warn!(
                kind = %draft.kind,
                user_id = %actor.user_id,
                issue_count = issues.len(),
                "Posting rejected: invalid data"
            );
            PostingError::Validation { issues }
        })?;

        let total = transaction_total(&validated.items).map_err(|e| PostingError::Validation {
            issues: vec![Issue::new(e.to_string(), vec!["items".into()])],
        })?;

        let transaction = Transaction {
            id: generate_transaction_id(),
            kind: validated.kind,
            date: Utc::now(),
            total,
            user_id: actor.user_id.clone(),
            customer_id: validated.customer_id.clone(),
            supplier_id: validated.supplier_id.clone(),
        };
        let items = build_items(&transaction.id, &validated.items);

        let positions = match self.run_unit_of_work(&transaction, &items, &validated).await {
            Ok(positions) => positions,
            Err(e) => {
                error!(
                    transaction_id = %transaction.id,
                    kind = %transaction.kind,
                    error = %e,
                    "Posting rolled back"
                );
                return Err(e.into());
            }
        };

        info!(
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            user_id = %transaction.user_id,
            total = %transaction.total,
            lines = items.len(),
            "Transaction posted"
        );

        for tag in POSTING_TAGS {
            self.invalidator.invalidate(tag);
        }

        Ok(PostedTransaction {
            transaction,
            items,
            positions,
        })
    }

    async fn run_unit_of_work(
        &self,
        transaction: &Transaction,
        items: &[TransactionItem],
        validated: &ValidatedTransaction,
    ) -> DbResult<Vec<ProductPosition>> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match write_posting(&mut *tx, transaction, items, validated.kind, &validated.items).await {
            Ok(positions) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                Ok(positions)
            }
            Err(e) => {
                // Report the original error, not a rollback failure.
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

fn build_items(transaction_id: &str, lines: &[LineItem]) -> Vec<TransactionItem> {
    lines
        .iter()
        .map(|line| TransactionItem {
            id: generate_transaction_id(),
            transaction_id: transaction_id.to_string(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            price: line.price,
            discount: line.discount,
        })
        .collect()
}

/// Statements of one posting, run on an open transaction.
///
/// Lines for the same product fold against one in-memory working position,
/// so each product is read once and written once, and the result equals
/// applying the lines one after another.
async fn write_posting(
    conn: &mut SqliteConnection,
    transaction: &Transaction,
    items: &[TransactionItem],
    kind: TransactionKind,
    lines: &[LineItem],
) -> DbResult<Vec<ProductPosition>> {
    insert_transaction(&mut *conn, transaction).await?;

    for (position, item) in items.iter().enumerate() {
        insert_item(&mut *conn, item, position).await?;
    }

    let mut working: Vec<ProductPosition> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        let slot = match index.get(line.product_id.as_str()) {
            Some(&slot) => slot,
            None => {
                let current = fetch_position(&mut *conn, &line.product_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;
                working.push(ProductPosition {
                    product_id: line.product_id.clone(),
                    position: current,
                });
                index.insert(line.product_id.as_str(), working.len() - 1);
                working.len() - 1
            }
        };

        let next = working[slot].position.apply(kind, line)?;
        working[slot].position = next;
    }

    for touched in &working {
        write_position(&mut *conn, &touched.product_id, touched.position, transaction.date).await?;
    }

    Ok(working)
}
