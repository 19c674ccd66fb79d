//! Role-gated catalog maintenance: archive, unarchive, delete.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use stockroom_core::authz::authorize;
use stockroom_core::invalidation::CATALOG_TAGS;
use stockroom_core::{Actor, Invalidator, Operation, PostingError};

use crate::error::DbError;
use crate::pool::Database;

/// Why a catalog change was refused.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No actor, or a role that cannot manage the catalog.
    #[error(transparent)]
    Denied(#[from] PostingError),

    /// Store refusal, e.g. `HasDependents` on delete.
    #[error(transparent)]
    Store(#[from] DbError),
}

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    invalidator: Arc<dyn Invalidator>,
}

impl CatalogService {
    pub fn new(db: Database, invalidator: Arc<dyn Invalidator>) -> Self {
        CatalogService { db, invalidator }
    }

    pub async fn archive(&self, actor: Option<&Actor>, product_id: &str) -> Result<(), CatalogError> {
        self.gate(actor, "archive", product_id)?;
        self.db.products().archive(product_id).await?;
        self.committed("archive", product_id);
        Ok(())
    }

    pub async fn unarchive(&self, actor: Option<&Actor>, product_id: &str) -> Result<(), CatalogError> {
        self.gate(actor, "unarchive", product_id)?;
        self.db.products().unarchive(product_id).await?;
        self.committed("unarchive", product_id);
        Ok(())
    }

    /// Deletes a product with no history.
    ///
    /// Products that appear in transactions or adjustments are refused with
    /// [`DbError::HasDependents`]; archive them instead.
    pub async fn delete(&self, actor: Option<&Actor>, product_id: &str) -> Result<(), CatalogError> {
        self.gate(actor, "delete", product_id)?;
        if let Err(e) = self.db.products().delete(product_id).await {
            warn!(product_id = %product_id, error = %e, "Product delete refused");
            return Err(e.into());
        }
        self.committed("delete", product_id);
        Ok(())
    }

    fn gate(&self, actor: Option<&Actor>, action: &str, product_id: &str) -> Result<(), CatalogError> {
        authorize(actor, Operation::ManageCatalog).map_err(|e| {
            warn!(action, product_id = %product_id, error = %e, "Catalog change denied");
            e
        })?;
        Ok(())
    }

    fn committed(&self, action: &str, product_id: &str) {
        info!(action, product_id = %product_id, "Catalog updated");
        for tag in CATALOG_TAGS {
            self.invalidator.invalidate(tag);
        }
    }
}
