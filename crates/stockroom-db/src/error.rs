//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── repository callers see DbError directly                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostingError::Persistence ← Posting/adjustment boundary              │
//! │       │                       (detail logged, message stays opaque)    │
//! │       ▼                                                                 │
//! │  ActionError { code, error } ← Serialized for the UI                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, Issue, PostingError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting duplicate SKU or barcode
    /// - Duplicate user email
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A line references a product that does not exist
    /// - Posting as a user id that is not in `users`
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Deletion refused because other rows still reference the entity.
    ///
    /// ## When This Occurs
    /// - Deleting a product that appears in transaction items
    /// - Deleting a product with recorded stock adjustments
    #[error("Cannot delete {entity} with {dependents}. Please archive it instead.")]
    HasDependents { entity: String, dependents: String },

    /// A row was refused before it reached the table.
    ///
    /// ## When This Occurs
    /// - Inserting a product with a malformed SKU, blank name,
    ///   negative price or negative reorder threshold
    #[error("Invalid {entity}: {}", join_issues(.issues))]
    Invalid { entity: String, issues: Vec<Issue> },

    /// A stored value could not be decoded into its domain type.
    ///
    /// ## When This Occurs
    /// - A money column holds something that is not a decimal
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - Runtime SQL error
    /// - `database is locked` after the busy timeout elapsed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin/commit/rollback failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a HasDependents error.
    pub fn has_dependents(entity: impl Into<String>, dependents: impl Into<String>) -> Self {
        DbError::HasDependents {
            entity: entity.into(),
            dependents: dependents.into(),
        }
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::InvalidData(format!("column {}: {}", index, source))
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Domain arithmetic failing mid-unit-of-work aborts it like any store error.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidMoney(raw) => DbError::InvalidData(format!("money '{}'", raw)),
            CoreError::ProductNotFound(id) => DbError::not_found("Product", id),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Every store failure surfaces to posting callers as the same opaque
/// `"Transaction failed"`; the detail rides along for logs.
impl From<DbError> for PostingError {
    fn from(err: DbError) -> Self {
        PostingError::Persistence(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_dependents_message() {
        let err = DbError::has_dependents("product", "existing sales or purchases");
        assert_eq!(
            err.to_string(),
            "Cannot delete product with existing sales or purchases. Please archive it instead."
        );
    }

    #[test]
    fn test_db_error_is_opaque_to_posting_callers() {
        let posting: PostingError = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .into();
        assert_eq!(posting.to_string(), "Transaction failed");
        assert!(matches!(posting, PostingError::Persistence(detail) if detail.contains("FOREIGN KEY")));
    }

    #[test]
    fn test_invalid_lists_every_issue() {
        let err = DbError::Invalid {
            entity: "product".to_string(),
            issues: vec![
                Issue::new("sku is required", vec!["sku".into()]),
                Issue::new("minStock must not be negative", vec!["minStock".into()]),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid product: sku is required; minStock must not be negative"
        );
    }

    #[test]
    fn test_invalid_money_maps_to_invalid_data() {
        let err: DbError = CoreError::InvalidMoney("abc".to_string()).into();
        assert!(matches!(err, DbError::InvalidData(_)));
    }
}
