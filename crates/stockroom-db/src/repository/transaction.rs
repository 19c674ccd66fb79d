//! # Transaction Repository
//!
//! Read side of posted history, plus the insert helpers the poster runs
//! inside its unit of work.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TransactionPoster::post()                                              │
//! │     └── insert_transaction()   ← helper, runs on the open sqlx tx       │
//! │     └── insert_item() × N      ← helper, runs on the open sqlx tx       │
//! │                                                                         │
//! │  Afterwards (read only, this repository):                               │
//! │     └── get_by_id() / get_items() / list() / count_for_product()        │
//! │                                                                         │
//! │  Transactions are create-only. There is no update or void.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{money_text, page_offset, parse_money, PageInfo};
use stockroom_core::{Transaction, TransactionItem, TransactionKind};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    kind: TransactionKind,
    date: DateTime<Utc>,
    total: String,
    user_id: String,
    customer_id: Option<String>,
    supplier_id: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        Ok(Transaction {
            total: parse_money("total", &row.total)?,
            id: row.id,
            kind: row.kind,
            date: row.date,
            user_id: row.user_id,
            customer_id: row.customer_id,
            supplier_id: row.supplier_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionItemRow {
    id: String,
    transaction_id: String,
    product_id: String,
    quantity: i64,
    price: String,
    discount: String,
}

impl TryFrom<TransactionItemRow> for TransactionItem {
    type Error = DbError;

    fn try_from(row: TransactionItemRow) -> DbResult<Self> {
        Ok(TransactionItem {
            price: parse_money("price", &row.price)?,
            discount: parse_money("discount", &row.discount)?,
            id: row.id,
            transaction_id: row.transaction_id,
            product_id: row.product_id,
            quantity: row.quantity,
        })
    }
}

/// Narrows a transaction listing. Unset fields match everything.
///
/// ## Usage
/// ```rust,ignore
/// let filter = TransactionFilter::kind(TransactionKind::Purchase).with_supplier("s1");
/// let page = db.transactions().list(&filter, 1, 20).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub customer_id: Option<String>,
    pub supplier_id: Option<String>,
}

impl TransactionFilter {
    /// Only transactions of `kind`.
    pub fn kind(kind: TransactionKind) -> Self {
        TransactionFilter {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_supplier(mut self, supplier_id: impl Into<String>) -> Self {
        self.supplier_id = Some(supplier_id.into());
        self
    }
}

/// One page of transactions, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    #[serde(flatten)]
    pub page_info: PageInfo,
}

/// Repository for posted transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, type AS kind, date, total, user_id, customer_id, supplier_id
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    /// Gets all items of a transaction, in submitted order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<TransactionItem>> {
        let rows: Vec<TransactionItemRow> = sqlx::query_as(
            r#"
            SELECT id, transaction_id, product_id, quantity, price, discount
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionItem::try_from).collect()
    }

    /// Lists transactions, newest first, optionally filtered by kind.
    ///
    /// ## Arguments
    /// * `kind` - `None` lists both SALE and PURCHASE
    /// * `page` - 1-based page number
    /// * `limit` - page size
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: u32,
        limit: u32,
    ) -> DbResult<TransactionPage> {
        debug!(?filter, page, limit, "Listing transactions");

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE (?1 IS NULL OR type = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR supplier_id = ?3)
            "#,
        )
        .bind(filter.kind)
        .bind(&filter.customer_id)
        .bind(&filter.supplier_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, type AS kind, date, total, user_id, customer_id, supplier_id
            FROM transactions
            WHERE (?1 IS NULL OR type = ?1)
              AND (?2 IS NULL OR customer_id = ?2)
              AND (?3 IS NULL OR supplier_id = ?3)
            ORDER BY date DESC, rowid DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )
        .bind(filter.kind)
        .bind(&filter.customer_id)
        .bind(&filter.supplier_id)
        .bind(limit.max(1))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let transactions = rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(TransactionPage {
            transactions,
            page_info: PageInfo::new(total, page, limit),
        })
    }

    /// Counts line items referencing a product (the delete guard's check).
    pub async fn count_for_product(&self, product_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transaction_items WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit-of-Work Helpers
// =============================================================================

pub(crate) async fn insert_transaction<'e, E>(executor: E, tx: &Transaction) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(id = %tx.id, kind = %tx.kind, "Inserting transaction");

    sqlx::query(
        r#"
        INSERT INTO transactions (id, type, date, total, user_id, customer_id, supplier_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&tx.id)
    .bind(tx.kind)
    .bind(tx.date)
    .bind(money_text(tx.total))
    .bind(&tx.user_id)
    .bind(&tx.customer_id)
    .bind(&tx.supplier_id)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item<'e, E>(
    executor: E,
    item: &TransactionItem,
    position: usize,
) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!(
        transaction_id = %item.transaction_id,
        product_id = %item.product_id,
        quantity = item.quantity,
        "Inserting transaction item"
    );

    sqlx::query(
        r#"
        INSERT INTO transaction_items (
            id, transaction_id, product_id, position, quantity, price, discount
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.transaction_id)
    .bind(&item.product_id)
    .bind(i64::try_from(position).unwrap_or(i64::MAX))
    .bind(item.quantity)
    .bind(money_text(item.price))
    .bind(money_text(item.discount))
    .execute(executor)
    .await?;

    Ok(())
}

/// Generates a new transaction or item ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}
