//! # Validation Module
//!
//! Input validation for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web form (external)                                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization (serde)                                      │
//! │  └── Payload shape → TransactionDraft                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  └── validate_draft() → ValidatedTransaction | Vec<Issue>              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints (missing product → rollback)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing reaches the valuation rules without passing through
//! [`validate_draft`]. Every problem is reported, with a path pointing at the
//! offending field, so a form can highlight all of them at once.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, TransactionKind};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Issues
// =============================================================================

/// One step of the path to an invalid field: an object key or array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Issue {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl Issue {
    pub fn new(message: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Issue {
            message: message.into(),
            path,
        }
    }

    fn from_error(err: ValidationError, path: Vec<PathSegment>) -> Self {
        Issue::new(err.to_string(), path)
    }
}

// =============================================================================
// Transaction Payload
// =============================================================================

/// A transaction as submitted by the cart UI, not yet trusted.
///
/// Field names follow the web payload: `type`, `items`, `customerId`,
/// `supplierId`, `productId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, items: Vec<LineItemDraft>) -> Self {
        TransactionDraft {
            kind,
            items,
            customer_id: None,
            supplier_id: None,
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

/// One submitted line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub product_id: String,
    pub quantity: i64,
    #[ts(type = "string")]
    pub price: Money,
    /// Omitted means no discount.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub discount: Option<Money>,
}

impl LineItemDraft {
    pub fn new(product_id: impl Into<String>, quantity: i64, price: Money) -> Self {
        LineItemDraft {
            product_id: product_id.into(),
            quantity,
            price,
            discount: None,
        }
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = Some(discount);
        self
    }
}

/// A line that passed validation: quantity > 0, price and discount ≥ 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
    pub price: Money,
    pub discount: Money,
}

/// A transaction that passed validation. Items are non-empty and kept in
/// submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub kind: TransactionKind,
    pub items: Vec<LineItem>,
    pub customer_id: Option<String>,
    pub supplier_id: Option<String>,
}

/// Validates a submitted transaction, collecting every issue.
///
/// ## Rules
/// - `items` must contain at least one line
/// - `productId` is required
/// - `quantity` must be a positive integer
/// - `price` and `discount` must not be negative; a missing discount is 0
/// - `discount` must not exceed `quantity × price`
/// - blank counterparty ids are treated as absent
///
/// Counterparty ids are not checked against the transaction type.
///
/// ## Example
/// ```rust
/// use stockroom_core::money::Money;
/// use stockroom_core::types::TransactionKind;
/// use stockroom_core::validation::{validate_draft, LineItemDraft, TransactionDraft};
///
/// let draft = TransactionDraft::new(
///     TransactionKind::Sale,
///     vec![LineItemDraft::new("p1", 0, Money::from_cents(100))],
/// );
/// let issues = validate_draft(&draft).unwrap_err();
/// assert_eq!(issues[0].message, "quantity must be positive");
/// ```
pub fn validate_draft(draft: &TransactionDraft) -> Result<ValidatedTransaction, Vec<Issue>> {
    let mut issues = Vec::new();

    if draft.items.is_empty() {
        issues.push(Issue::from_error(
            ValidationError::TooFew {
                field: "items".to_string(),
                min: 1,
            },
            vec!["items".into()],
        ));
    }

    let mut items = Vec::with_capacity(draft.items.len());
    for (index, item) in draft.items.iter().enumerate() {
        let path = |field: &str| -> Vec<PathSegment> {
            vec!["items".into(), index.into(), field.into()]
        };
        let before = issues.len();

        if let Err(e) = validate_required("productId", &item.product_id) {
            issues.push(Issue::from_error(e, path("productId")));
        }
        if let Err(e) = validate_quantity(item.quantity) {
            issues.push(Issue::from_error(e, path("quantity")));
        }
        if let Err(e) = validate_non_negative("price", item.price) {
            issues.push(Issue::from_error(e, path("price")));
        }
        let discount = item.discount.unwrap_or_else(Money::zero);
        if let Err(e) = validate_non_negative("discount", discount) {
            issues.push(Issue::from_error(e, path("discount")));
        }
        if issues.len() == before {
            if let Err(e) = validate_discount(item.quantity, item.price, discount) {
                issues.push(Issue::from_error(e, path("discount")));
            }
        }

        if issues.len() == before {
            items.push(LineItem {
                product_id: item.product_id.trim().to_string(),
                quantity: item.quantity,
                price: item.price,
                discount,
            });
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ValidatedTransaction {
        kind: draft.kind,
        items,
        customer_id: normalize_optional_id(draft.customer_id.as_deref()),
        supplier_id: normalize_optional_id(draft.supplier_id.as_deref()),
    })
}

fn normalize_optional_id(id: Option<&str>) -> Option<String> {
    id.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present and not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    validate_required("sku", sku)?;

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, customer, supplier, user).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    validate_required("name", name)?;

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Line                                                         │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Issue: "quantity must be positive"               │
/// │       │                                                                 │
/// │       └── OK → line is safe to divide by in the WAC rule               │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a monetary amount that may be zero but not negative.
///
/// ## Example
/// ```rust
/// use stockroom_core::money::Money;
/// use stockroom_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_non_negative("price", Money::zero()).is_ok()); // Free item
/// assert!(validate_non_negative("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that a line discount fits inside the line's gross amount.
///
/// A larger discount would make the line total negative and, on a PURCHASE,
/// drive the product's unit cost below zero. Overflowing gross amounts are
/// left to the total computation.
pub fn validate_discount(quantity: i64, price: Money, discount: Money) -> ValidationResult<()> {
    match price.checked_mul_quantity(quantity) {
        Some(gross) if discount > gross => Err(ValidationError::ExceedsLineTotal {
            field: "discount".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a count (stock, reorder threshold) that may be zero.
pub fn validate_non_negative_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a catalog product before it is stored.
///
/// Stock may be negative (oversold goods stay on the books); prices and the
/// reorder threshold may not.
pub fn validate_product(product: &Product) -> Result<(), Vec<Issue>> {
    let checks = [
        ("sku", validate_sku(&product.sku)),
        ("name", validate_name(&product.name)),
        ("costPrice", validate_non_negative("costPrice", product.cost_price)),
        ("salePrice", validate_non_negative("salePrice", product.sale_price)),
        ("minStock", validate_non_negative_count("minStock", product.min_stock)),
    ];

    let issues: Vec<Issue> = checks
        .into_iter()
        .filter_map(|(field, result)| result.err().map(|e| Issue::from_error(e, vec![field.into()])))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Validates a manual stock correction.
pub fn validate_adjustment(qty_change: i64, reason: &str) -> Result<(), Vec<Issue>> {
    let mut issues = Vec::new();
    if qty_change == 0 {
        issues.push(Issue::from_error(
            ValidationError::MustNotBeZero {
                field: "qtyChange".to_string(),
            },
            vec!["qtyChange".into()],
        ));
    }
    if let Err(e) = validate_required("reason", reason) {
        issues.push(Issue::from_error(e, vec!["reason".into()]));
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sale(items: Vec<LineItemDraft>) -> TransactionDraft {
        TransactionDraft::new(TransactionKind::Sale, items)
    }

    #[test]
    fn test_valid_draft_defaults_discount() {
        let draft = sale(vec![LineItemDraft::new("p1", 2, Money::from_cents(1999))]);
        let validated = validate_draft(&draft).unwrap();
        assert_eq!(validated.items.len(), 1);
        assert_eq!(validated.items[0].discount, Money::zero());
        assert_eq!(validated.kind, TransactionKind::Sale);
    }

    #[test]
    fn test_empty_items_rejected() {
        let issues = validate_draft(&sale(vec![])).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec![PathSegment::from("items")]);
    }

    #[test]
    fn test_collects_every_issue_with_paths() {
        let draft = sale(vec![
            LineItemDraft::new("p1", 1, Money::from_cents(100)),
            LineItemDraft::new(" ", 0, Money::new(dec!(-1)))
                .with_discount(Money::new(dec!(-0.5))),
        ]);
        let issues = validate_draft(&draft).unwrap_err();
        let paths: Vec<_> = issues.iter().map(|i| i.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["items".into(), 1usize.into(), "productId".into()],
                vec!["items".into(), 1usize.into(), "quantity".into()],
                vec!["items".into(), 1usize.into(), "price".into()],
                vec!["items".into(), 1usize.into(), "discount".into()],
            ]
        );
    }

    #[test]
    fn test_same_input_same_issues() {
        let draft = sale(vec![LineItemDraft::new("p1", -3, Money::zero())]);
        assert_eq!(validate_draft(&draft), validate_draft(&draft));
    }

    #[test]
    fn test_blank_counterparty_is_absent() {
        let draft = sale(vec![LineItemDraft::new("p1", 1, Money::zero())]).with_customer("  ");
        assert_eq!(validate_draft(&draft).unwrap().customer_id, None);
    }

    #[test]
    fn test_draft_from_web_payload() {
        let json = serde_json::json!({
            "type": "PURCHASE",
            "supplierId": "s1",
            "items": [{ "productId": "p1", "quantity": 10, "price": "7.00" }]
        });
        let draft: TransactionDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.kind, TransactionKind::Purchase);
        assert_eq!(draft.items[0].price, Money::from_cents(700));
        assert_eq!(draft.items[0].discount, None);
        assert_eq!(draft.supplier_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_discount_larger_than_line_rejected() {
        let draft = TransactionDraft::new(
            TransactionKind::Purchase,
            vec![
                LineItemDraft::new("p1", 2, Money::from_cents(100)).with_discount(Money::from_cents(200)),
                LineItemDraft::new("p2", 2, Money::from_cents(100)).with_discount(Money::from_cents(1000)),
            ],
        );
        let issues = validate_draft(&draft).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "discount must not exceed the line total");
        assert_eq!(
            issues[0].path,
            vec!["items".into(), 1usize.into(), "discount".into()]
        );
    }

    #[test]
    fn test_validate_product() {
        let now = chrono::Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            sku: "COKE-330".to_string(),
            name: "Coca-Cola 330ml".to_string(),
            brand: None,
            category: None,
            barcode: None,
            cost_price: Money::from_cents(85),
            sale_price: Money::from_cents(199),
            stock_qty: -2,
            min_stock: 5,
            is_archived: false,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_product(&product).is_ok());

        product.sku = "has space".to_string();
        product.name = " ".to_string();
        product.min_stock = -1;
        let issues = validate_product(&product).unwrap_err();
        let paths: Vec<_> = issues.iter().map(|i| i.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec![PathSegment::from("sku")],
                vec![PathSegment::from("name")],
                vec![PathSegment::from("minStock")],
            ]
        );
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Coca-Cola 330ml").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_adjustment() {
        assert!(validate_adjustment(-2, "Broken in transit").is_ok());
        let issues = validate_adjustment(0, "").unwrap_err();
        assert_eq!(issues.len(), 2);
    }
}
