//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Arithmetic and domain rule failures            │
//! │  ├── ValidationError  - Single field rule failures                     │
//! │  ├── PostingError     - Outcome of a rejected posting/adjustment       │
//! │  └── ActionError      - What the caller renders (serialized)           │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → Issue → PostingError → ActionError → UI       │
//! │        DbError ─────────────────► PostingError::Persistence            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use crate::types::{Role, TransactionKind};
use crate::validation::Issue;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A line quantity that is not strictly positive reached the valuation rules.
    ///
    /// ## When This Occurs
    /// Never through the poster (quantities are validated first). Guards
    /// direct callers against dividing by zero.
    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Decimal or integer arithmetic overflowed.
    #[error("Arithmetic overflow while computing {operation}")]
    Overflow { operation: &'static str },

    /// A stored or submitted amount could not be parsed as a decimal.
    #[error("Invalid monetary amount: '{0}'")]
    InvalidMoney(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustNotBeZero { field: String },

    /// A discount larger than the `quantity × price` it applies to.
    #[error("{field} must not exceed the line total")]
    ExceedsLineTotal { field: String },

    /// Collection must contain at least `min` entries.
    #[error("{field} must contain at least {min} entry")]
    TooFew { field: String, min: usize },

    /// Invalid format (e.g. characters outside the allowed set).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Posting Error
// =============================================================================

/// A write operation that can be denied by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Posting a SALE or PURCHASE transaction.
    Record(TransactionKind),
    /// Manual stock correction.
    AdjustStock,
    /// Archive, unarchive or delete catalog entries.
    ManageCatalog,
}

impl Operation {
    /// Verb phrase used in denial messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::Record(TransactionKind::Sale) => "record sales",
            Operation::Record(TransactionKind::Purchase) => "record purchases",
            Operation::AdjustStock => "adjust stock",
            Operation::ManageCatalog => "manage the catalog",
        }
    }
}

/// Why a posting (or stock adjustment) was not committed.
///
/// The `Display` text is the user-visible message. Callers should branch on
/// the variant, never parse the message.
///
/// ## Flow
/// ```text
/// post_transaction()
///      │
///      ├── no actor ─────────────► Unauthenticated  "Unauthorized"
///      ├── role denied ──────────► Forbidden        "Unauthorized. Clerks cannot record purchases."
///      ├── bad items ────────────► Validation       "Invalid data" + issues
///      └── store failed/rolled back ► Persistence   "Transaction failed"
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PostingError {
    /// No authenticated actor was supplied.
    #[error("Unauthorized")]
    Unauthenticated,

    /// The actor's role may not perform this operation.
    #[error("Unauthorized. {} cannot {}.", .role.plural_label(), .operation.describe())]
    Forbidden { role: Role, operation: Operation },

    /// The submitted payload failed structural validation.
    #[error("Invalid data")]
    Validation { issues: Vec<Issue> },

    /// The unit of work failed and was rolled back.
    ///
    /// The detail is for logs only; the message stays opaque.
    #[error("Transaction failed")]
    Persistence(String),
}

impl PostingError {
    /// Machine-readable code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            PostingError::Unauthenticated => ErrorCode::Unauthenticated,
            PostingError::Forbidden { .. } => ErrorCode::Forbidden,
            PostingError::Validation { .. } => ErrorCode::ValidationError,
            PostingError::Persistence(_) => ErrorCode::PersistenceFailed,
        }
    }

    /// Converts into the structured result handed back to the UI.
    pub fn to_action_error(&self) -> ActionError {
        let issues = match self {
            PostingError::Validation { issues } => Some(issues.clone()),
            _ => None,
        };
        ActionError {
            code: self.code(),
            error: self.to_string(),
            issues,
        }
    }
}

// =============================================================================
// Action Error
// =============================================================================

/// Error codes for action results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No identity on the request
    Unauthenticated,
    /// Role not allowed
    Forbidden,
    /// Input validation failed
    ValidationError,
    /// Unit of work rolled back
    PersistenceFailed,
}

/// Structured failure result returned across the posting boundary.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "error": "Invalid data",
///   "issues": [{ "message": "quantity must be positive", "path": ["items", 0, "quantity"] }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ActionError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub error: String,

    /// Field-level problems, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub issues: Option<Vec<Issue>>,
}

impl From<PostingError> for ActionError {
    fn from(err: PostingError) -> Self {
        err.to_action_error()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::PathSegment;

    #[test]
    fn test_forbidden_message_names_role_and_operation() {
        let err = PostingError::Forbidden {
            role: Role::Clerk,
            operation: Operation::Record(TransactionKind::Purchase),
        };
        assert_eq!(err.to_string(), "Unauthorized. Clerks cannot record purchases.");
    }

    #[test]
    fn test_opaque_messages() {
        assert_eq!(PostingError::Unauthenticated.to_string(), "Unauthorized");
        assert_eq!(
            PostingError::Persistence("FOREIGN KEY constraint failed".to_string()).to_string(),
            "Transaction failed"
        );
    }

    #[test]
    fn test_action_error_carries_issues_only_for_validation() {
        let issue = Issue::new(
            "quantity must be positive",
            vec![
                PathSegment::from("items"),
                PathSegment::from(0usize),
                PathSegment::from("quantity"),
            ],
        );
        let action = PostingError::Validation {
            issues: vec![issue],
        }
        .to_action_error();
        assert_eq!(action.code, ErrorCode::ValidationError);
        assert_eq!(action.error, "Invalid data");

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["issues"][0]["path"], serde_json::json!(["items", 0, "quantity"]));

        let action: ActionError = PostingError::Unauthenticated.into();
        let json = serde_json::to_value(&action).unwrap();
        assert!(json.get("issues").is_none());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        };
        assert_eq!(err.to_string(), "discount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
