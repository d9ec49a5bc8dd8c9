//! # Pricing Calculator
//!
//! Pure total computation over captured prices.
//!
//! ## Price Capture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout reads the catalog ONCE:                                       │
//! │                                                                         │
//! │    cart snapshot ──► (unit price, quantity) pairs ──► order_total()    │
//! │                                                                         │
//! │  The resulting numbers are written into the order and its lines and    │
//! │  are NEVER recomputed from the live catalog afterwards. A price edit   │
//! │  tomorrow does not change yesterday's order.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No taxes or discounts in scope; a line subtotal is price × quantity
//! and the order total is the plain sum of subtotals.

use crate::money::Money;
use crate::types::CartLineSnapshot;

/// Per-line subtotal: unit price × quantity.
#[inline]
pub fn line_subtotal(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Order total: Σ (unit price × quantity) over the given pairs.
pub fn order_total<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .fold(Money::zero(), |acc, (price, qty)| {
            acc + line_subtotal(price, qty)
        })
}

/// Order total for a cart snapshot, using the captured catalog prices.
pub fn snapshot_total(lines: &[CartLineSnapshot]) -> Money {
    order_total(lines.iter().map(|l| (l.unit_price(), l.quantity)))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(product_id: &str, price_cents: i64, quantity: i64) -> CartLineSnapshot {
        CartLineSnapshot {
            product_id: product_id.to_string(),
            name: product_id.to_string(),
            unit_price_cents: price_cents,
            quantity,
            stock: 100,
        }
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line_subtotal(Money::from_cents(1000), 2).cents(), 2000);
        assert_eq!(line_subtotal(Money::from_cents(500), 1).cents(), 500);
    }

    #[test]
    fn test_order_total_empty_is_zero() {
        assert_eq!(order_total(std::iter::empty()).cents(), 0);
    }

    /// 2 × $10.00 + 1 × $5.00 = $25.00
    #[test]
    fn test_order_total_mixed_lines() {
        let total = order_total(vec![
            (Money::from_cents(1000), 2),
            (Money::from_cents(500), 1),
        ]);
        assert_eq!(total, Money::from_cents(2500));
    }

    #[test]
    fn test_snapshot_total() {
        let lines = vec![snapshot("a", 1000, 2), snapshot("b", 500, 1)];
        assert_eq!(snapshot_total(&lines).cents(), 2500);
    }
}
