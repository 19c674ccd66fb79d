//! Adjustment repository.
//!
//! Adjustments are written by [`AdjustmentService`](crate::services::adjustment::AdjustmentService)
//! together with the stock change they describe; this repository is the
//! read side.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::Adjustment;

#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    pool: SqlitePool,
}

impl AdjustmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentRepository { pool }
    }

    /// Adjustments for a product, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<Adjustment>> {
        let adjustments = sqlx::query_as::<_, Adjustment>(
            r#"
            SELECT id, product_id, user_id, reason, qty_change, created_at
            FROM adjustments
            WHERE product_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(adjustments)
    }

    pub async fn count_for_product(&self, product_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM adjustments WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub(crate) async fn insert_adjustment<'e, E>(executor: E, adjustment: &Adjustment) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(
        product_id = %adjustment.product_id,
        qty_change = adjustment.qty_change,
        "Inserting adjustment"
    );

    sqlx::query(
        r#"
        INSERT INTO adjustments (id, product_id, user_id, reason, qty_change, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&adjustment.id)
    .bind(&adjustment.product_id)
    .bind(&adjustment.user_id)
    .bind(&adjustment.reason)
    .bind(adjustment.qty_change)
    .bind(adjustment.created_at)
    .execute(executor)
    .await?;

    Ok(())
}
