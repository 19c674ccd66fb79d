//! Manual stock corrections (breakage, recounts, shrinkage).
//!
//! Same shape as a posting: gate, validate, one unit of work, then
//! invalidate. Only `stock_qty` moves; cost stays where purchases left it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use stockroom_core::authz::authorize;
use stockroom_core::invalidation::CATALOG_TAGS;
use stockroom_core::validation::validate_adjustment;
use stockroom_core::{Actor, Adjustment, Invalidator, Operation, PostingError};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::adjustment::insert_adjustment;
use crate::repository::product::apply_stock_delta;
use crate::repository::transaction::generate_transaction_id;

#[derive(Clone)]
pub struct AdjustmentService {
    db: Database,
    invalidator: Arc<dyn Invalidator>,
}

impl AdjustmentService {
    pub fn new(db: Database, invalidator: Arc<dyn Invalidator>) -> Self {
        AdjustmentService { db, invalidator }
    }

    /// Records `qty_change` (signed, non-zero) against a product.
    ///
    /// ## Errors
    /// - `Unauthenticated` / `Forbidden` - only ADMIN and MANAGER adjust stock
    /// - `Validation` - zero change or blank reason
    /// - `Persistence` - unknown product or store failure; nothing written
    pub async fn record(
        &self,
        actor: Option<&Actor>,
        product_id: &str,
        qty_change: i64,
        reason: &str,
    ) -> Result<Adjustment, PostingError> {
        let actor = authorize(actor, Operation::AdjustStock).map_err(|e| {
            warn!(product_id = %product_id, error = %e, "Adjustment denied");
            e
        })?;

        validate_adjustment(qty_change, reason).map_err(|issues| {
            warn!(product_id = %product_id, issue_count = issues.len(), "Adjustment rejected");
            PostingError::Validation { issues }
        })?;

        let adjustment = Adjustment {
            id: generate_transaction_id(),
            product_id: product_id.trim().to_string(),
            user_id: actor.user_id.clone(),
            reason: reason.trim().to_string(),
            qty_change,
            created_at: Utc::now(),
        };

        if let Err(e) = self.write(&adjustment).await {
            error!(product_id = %adjustment.product_id, error = %e, "Adjustment rolled back");
            return Err(e.into());
        }

        info!(
            product_id = %adjustment.product_id,
            user_id = %adjustment.user_id,
            qty_change,
            "Stock adjusted"
        );

        for tag in CATALOG_TAGS {
            self.invalidator.invalidate(tag);
        }

        Ok(adjustment)
    }

    async fn write(&self, adjustment: &Adjustment) -> DbResult<()> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // The insert goes first so the write lock is held before stock moves.
        insert_adjustment(&mut *tx, adjustment).await?;
        apply_stock_delta(
            &mut *tx,
            &adjustment.product_id,
            adjustment.qty_change,
            adjustment.created_at,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}
