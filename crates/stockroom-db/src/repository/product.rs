//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - CRUD on the catalog
//! - Archive / unarchive (products with history leave the catalog this way)
//! - Guarded delete (refused while history references the product)
//! - Stock position read/write inside a posting unit of work
//!
//! ## Delete Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete(id)                                                             │
//! │       │                                                                 │
//! │       ├── transaction_items referencing id? ──► HasDependents          │
//! │       │       "existing sales or purchases"                            │
//! │       ├── adjustments referencing id? ────────► HasDependents          │
//! │       │       "inventory adjustments"                                  │
//! │       └── otherwise ──► DELETE                                         │
//! │                                                                         │
//! │  Checks and delete run in one transaction, so a concurrent posting     │
//! │  cannot slip a line in between.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{money_text, parse_money};
use stockroom_core::validation::validate_product;
use stockroom_core::{Product, StockPosition};

/// SELECT list shared by every product query.
const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, brand, category, barcode,
    cost_price, sale_price, stock_qty, min_stock, is_archived,
    supplier_id, created_at, updated_at
"#;

/// Raw `products` row; money columns are still TEXT.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    brand: Option<String>,
    category: Option<String>,
    barcode: Option<String>,
    cost_price: String,
    sale_price: String,
    stock_qty: i64,
    min_stock: i64,
    is_archived: bool,
    supplier_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        Ok(Product {
            cost_price: parse_money("cost_price", &row.cost_price)?,
            sale_price: parse_money("sale_price", &row.sale_price)?,
            id: row.id,
            sku: row.sku,
            name: row.name,
            brand: row.brand,
            category: row.category,
            barcode: row.barcode,
            stock_qty: row.stock_qty,
            min_stock: row.min_stock,
            is_archived: row.is_archived,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.get_by_sku("COKE-330").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its SKU (e.g. "COKE-330").
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE sku = ?1", PRODUCT_COLUMNS);
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Lists catalog (non-archived) products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_archived = 0 ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Lists catalog products at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_archived = 0 AND stock_qty <= min_stock ORDER BY stock_qty, name",
            PRODUCT_COLUMNS
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::Invalid)` - bad SKU or name, negative price or threshold
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        validate_product(product).map_err(|issues| DbError::Invalid {
            entity: "product".to_string(),
            issues,
        })?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, brand, category, barcode,
                cost_price, sale_price, stock_qty, min_stock, is_archived,
                supplier_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(&product.barcode)
        .bind(money_text(product.cost_price))
        .bind(money_text(product.sale_price))
        .bind(product.stock_qty)
        .bind(product.min_stock)
        .bind(product.is_archived)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Archives a product: it leaves the catalog but history keeps it.
    pub async fn archive(&self, id: &str) -> DbResult<()> {
        self.set_archived(id, true).await
    }

    /// Returns an archived product to the catalog.
    pub async fn unarchive(&self, id: &str) -> DbResult<()> {
        self.set_archived(id, false).await
    }

    async fn set_archived(&self, id: &str, archived: bool) -> DbResult<()> {
        debug!(id = %id, archived, "Setting product archive flag");

        let result = sqlx::query("UPDATE products SET is_archived = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(archived)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product that nothing references.
    ///
    /// ## Errors
    /// * `DbError::HasDependents` - transaction items or adjustments exist
    /// * `DbError::NotFound` - no such product
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let item_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transaction_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if item_count > 0 {
            return Err(DbError::has_dependents("product", "existing sales or purchases"));
        }

        let adjustment_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM adjustments WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if adjustment_count > 0 {
            return Err(DbError::has_dependents("product", "inventory adjustments"));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    /// Counts catalog products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_archived = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit-of-Work Helpers
// =============================================================================

/// Reads a product's stock position.
pub(crate) async fn fetch_position<'e, E>(executor: E, id: &str) -> DbResult<Option<StockPosition>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT stock_qty, cost_price FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

    row.map(|(stock_qty, cost_price)| {
        Ok(StockPosition::new(
            stock_qty,
            parse_money("cost_price", &cost_price)?,
        ))
    })
    .transpose()
}

/// Overwrites a product's stock position.
pub(crate) async fn write_position<'e, E>(
    executor: E,
    id: &str,
    position: StockPosition,
    now: DateTime<Utc>,
) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE products SET stock_qty = ?2, cost_price = ?3, updated_at = ?4 WHERE id = ?1",
    )
    .bind(id)
    .bind(position.stock_qty)
    .bind(money_text(position.cost_price))
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Applies a signed stock delta; cost is untouched.
pub(crate) async fn apply_stock_delta<'e, E>(
    executor: E,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("UPDATE products SET stock_qty = stock_qty + ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(delta)
            .bind(now)
            .execute(executor)
            .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", id));
    }

    Ok(())
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
