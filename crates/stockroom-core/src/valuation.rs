//! # Valuation Engine
//!
//! Stock and weighted-average cost (WAC) rules for posted lines.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SALE line (q)                                                          │
//! │    stock' = stock − q            cost' = cost                           │
//! │                                                                         │
//! │  PURCHASE line (q, p, d)                                                │
//! │    effective = q × p − d         (batch cost after discount)            │
//! │    stock'    = stock + q                                                │
//! │                                                                         │
//! │    stock <= 0 ──► cost' = effective / q                                 │
//! │                   (nothing on hand to weight against: baseline reset)   │
//! │                                                                         │
//! │    stock  > 0 ──► cost' = (stock × cost + effective) / stock'           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Oversold sales leave stock negative, and the next purchase then resets
//! cost to the incoming batch's unit cost. That is existing, relied-upon
//! behavior and is kept as is.
//!
//! Everything here is pure. The poster reads a [`StockPosition`] inside its
//! unit of work, folds lines through these functions, then writes back.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TransactionKind;
use crate::validation::LineItem;

/// A product's stock quantity and unit cost at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    pub stock_qty: i64,
    #[ts(type = "string")]
    pub cost_price: Money,
}

impl StockPosition {
    #[inline]
    pub const fn new(stock_qty: i64, cost_price: Money) -> Self {
        StockPosition {
            stock_qty,
            cost_price,
        }
    }

    /// Applies one validated line of the given kind.
    pub fn apply(&self, kind: TransactionKind, line: &LineItem) -> CoreResult<StockPosition> {
        match kind {
            TransactionKind::Sale => apply_sale_line(*self, line.quantity),
            TransactionKind::Purchase => apply_purchase_line(
                self.stock_qty,
                self.cost_price,
                line.quantity,
                line.price,
                line.discount,
            ),
        }
    }
}

/// Computes the position after receiving a purchase line.
///
/// ## Example
/// ```rust
/// use stockroom_core::money::Money;
/// use stockroom_core::valuation::apply_purchase_line;
///
/// // Nothing on hand: the batch's unit cost becomes the cost.
/// let next = apply_purchase_line(0, Money::zero(), 4, Money::from_cents(250), Money::from_cents(100))
///     .unwrap();
/// assert_eq!(next.stock_qty, 4);
/// assert_eq!(next.cost_price, Money::from_cents(225)); // (4 × 2.50 − 1.00) / 4
/// ```
pub fn apply_purchase_line(
    current_stock_qty: i64,
    current_cost_price: Money,
    quantity: i64,
    price: Money,
    discount: Money,
) -> CoreResult<StockPosition> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity { quantity });
    }

    let new_stock_qty = current_stock_qty
        .checked_add(quantity)
        .ok_or(CoreError::Overflow {
            operation: "stock quantity",
        })?;

    let effective_line_cost = line_total(quantity, price, discount)?;

    let new_cost_price = if current_stock_qty <= 0 {
        effective_line_cost
            .checked_div_quantity(quantity)
            .ok_or(CoreError::Overflow {
                operation: "unit cost",
            })?
    } else {
        // new_stock_qty > current_stock_qty > 0 here, so the divisor is non-zero.
        current_cost_price
            .checked_mul_quantity(current_stock_qty)
            .and_then(|held| held.checked_add(effective_line_cost))
            .and_then(|value| value.checked_div_quantity(new_stock_qty))
            .ok_or(CoreError::Overflow {
                operation: "weighted-average cost",
            })?
    };

    Ok(StockPosition::new(new_stock_qty, new_cost_price))
}

/// Computes the position after a sale line. Cost is untouched and stock
/// may go below zero.
pub fn apply_sale_line(current: StockPosition, quantity: i64) -> CoreResult<StockPosition> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity { quantity });
    }

    let new_stock_qty = current
        .stock_qty
        .checked_sub(quantity)
        .ok_or(CoreError::Overflow {
            operation: "stock quantity",
        })?;

    Ok(StockPosition::new(new_stock_qty, current.cost_price))
}

/// `quantity × price − discount` for one line.
pub fn line_total(quantity: i64, price: Money, discount: Money) -> CoreResult<Money> {
    price
        .checked_mul_quantity(quantity)
        .and_then(|gross| gross.checked_sub(discount))
        .ok_or(CoreError::Overflow {
            operation: "line total",
        })
}

/// Σ line totals for a transaction.
pub fn transaction_total(lines: &[LineItem]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |acc, line| {
        let line = line_total(line.quantity, line.price, line.discount)?;
        acc.checked_add(line).ok_or(CoreError::Overflow {
            operation: "transaction total",
        })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount)
    }

    fn line(quantity: i64, price: Money, discount: Money) -> LineItem {
        LineItem {
            product_id: "p1".to_string(),
            quantity,
            price,
            discount,
        }
    }

    #[test]
    fn test_blended_cost() {
        let next = apply_purchase_line(10, money(dec!(5.00)), 10, money(dec!(7.00)), Money::zero())
            .unwrap();
        assert_eq!(next.stock_qty, 20);
        assert_eq!(next.cost_price, money(dec!(6.00)));
    }

    #[test]
    fn test_first_stock_takes_batch_unit_cost() {
        let next = apply_purchase_line(0, money(dec!(99.00)), 3, money(dec!(10.00)), money(dec!(1.50)))
            .unwrap();
        assert_eq!(next.stock_qty, 3);
        // (3 × 10.00 − 1.50) / 3 = 9.50
        assert_eq!(next.cost_price, money(dec!(9.50)));
    }

    #[test]
    fn test_negative_stock_resets_cost_history() {
        let next = apply_purchase_line(-4, money(dec!(3.00)), 10, money(dec!(8.00)), Money::zero())
            .unwrap();
        assert_eq!(next.stock_qty, 6);
        assert_eq!(next.cost_price, money(dec!(8.00)));
    }

    #[test]
    fn test_discount_lowers_blended_cost() {
        // 5 @ 4.00 held, receive 5 @ 6.00 with 5.00 off the line
        let next = apply_purchase_line(5, money(dec!(4.00)), 5, money(dec!(6.00)), money(dec!(5.00)))
            .unwrap();
        // (20.00 + 25.00) / 10 = 4.50
        assert_eq!(next.cost_price, money(dec!(4.50)));
    }

    #[test]
    fn test_non_terminating_average_keeps_precision() {
        let next = apply_purchase_line(1, money(dec!(1.00)), 2, money(dec!(1.00)), money(dec!(0.01)))
            .unwrap();
        // (1.00 + 1.99) / 3 = 0.99666...
        assert_eq!(next.cost_price.round_to_cents(), money(dec!(1.00)));
        assert!(next.cost_price.amount() > dec!(0.9966));
        assert!(next.cost_price.amount() < dec!(0.9967));
    }

    #[test]
    fn test_many_small_purchases_do_not_drift() {
        // Receiving 1 unit at 0.10 a hundred times must average exactly 0.10.
        let mut pos = StockPosition::new(0, Money::zero());
        for _ in 0..100 {
            pos = apply_purchase_line(pos.stock_qty, pos.cost_price, 1, money(dec!(0.10)), Money::zero())
                .unwrap();
        }
        assert_eq!(pos.stock_qty, 100);
        assert_eq!(pos.cost_price, money(dec!(0.10)));
    }

    #[test]
    fn test_sale_only_moves_stock() {
        let before = StockPosition::new(10, money(dec!(12.34)));
        let after = apply_sale_line(before, 2).unwrap();
        assert_eq!(after, StockPosition::new(8, money(dec!(12.34))));

        let oversold = apply_sale_line(StockPosition::new(1, Money::zero()), 3).unwrap();
        assert_eq!(oversold.stock_qty, -2);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        assert_eq!(
            apply_purchase_line(1, Money::zero(), 0, Money::zero(), Money::zero()),
            Err(CoreError::InvalidQuantity { quantity: 0 })
        );
        assert!(apply_sale_line(StockPosition::new(1, Money::zero()), -1).is_err());
    }

    #[test]
    fn test_stock_overflow_is_an_error() {
        let result = apply_purchase_line(i64::MAX, Money::zero(), 1, Money::zero(), Money::zero());
        assert!(matches!(result, Err(CoreError::Overflow { .. })));
    }

    #[test]
    fn test_apply_dispatches_on_kind() {
        let start = StockPosition::new(10, money(dec!(5.00)));
        let l = line(10, money(dec!(7.00)), Money::zero());
        assert_eq!(
            start.apply(TransactionKind::Purchase, &l).unwrap(),
            StockPosition::new(20, money(dec!(6.00)))
        );
        assert_eq!(
            start.apply(TransactionKind::Sale, &l).unwrap(),
            StockPosition::new(0, money(dec!(5.00)))
        );
    }

    #[test]
    fn test_transaction_total() {
        let lines = vec![
            line(2, money(dec!(19.99)), Money::zero()),
            line(3, money(dec!(0.10)), money(dec!(0.05))),
        ];
        // 39.98 + 0.25
        assert_eq!(transaction_total(&lines).unwrap(), money(dec!(40.23)));
        assert_eq!(transaction_total(&[]).unwrap(), Money::zero());
    }
}
