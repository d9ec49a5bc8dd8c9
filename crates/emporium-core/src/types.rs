//! # Domain Types
//!
//! Core domain types used throughout Emporium.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  (user,product) │   │  id (UUID)      │       │
//! │  │  price_cents    │   │  quantity       │   │  status         │       │
//! │  │  stock          │   │                 │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌─────────────────┐                            │
//! │  │ CartLineSnapshot │   │   OrderLine     │                            │
//! │  │  ──────────────  │   │  ─────────────  │                            │
//! │  │  checkout view   │   │  frozen price   │                            │
//! │  │  of cart+catalog │   │  + name         │                            │
//! │  └──────────────────┘   └─────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order lines copy the product's name and unit price at purchase time.
//! Catalog edits after the fact never change historical orders, and a
//! deactivated product does not orphan the orders that sold it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::OrderStatus;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to buyers.
    pub name: String,

    /// Optional long-form description.
    pub description: Option<String>,

    /// Optional category tag.
    pub category: Option<String>,

    /// Optional image URL.
    pub image_url: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units on hand. Never negative; the database enforces this too.
    pub stock: i64,

    /// Whether product is purchasable (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Advisory stock check. The authoritative guard is the atomic
    /// decrement inside the checkout transaction.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Input for creating a catalog product (admin operation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// One (user, product) line in a cart.
///
/// A user holds at most one line per product; adding an already-carted
/// product merges quantities instead of duplicating the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable view of one cart line joined with its current catalog
/// row, read at the instant of checkout (or for display).
///
/// `unit_price_cents` and `name` come from the live catalog; they become
/// the frozen snapshot on the order line if checkout succeeds. `stock`
/// backs the advisory pre-flight check only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLineSnapshot {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub stock: i64,
}

impl CartLineSnapshot {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// Shipping details captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// A placed order.
///
/// Immutable after creation except for `status`. `total_cents` always
/// equals the sum of the order's line subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub shipping_name: String,
    pub shipping_phone: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of purchase (frozen).
    pub name_snapshot: String,
    /// Quantity purchased.
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal (unit price × quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Widget".to_string(),
            description: None,
            category: None,
            image_url: None,
            price_cents: 1000,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_fulfill() {
        assert!(product(5).can_fulfill(5));
        assert!(product(5).can_fulfill(1));
        assert!(!product(5).can_fulfill(6));
        assert!(!product(0).can_fulfill(1));
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            id: "l-1".to_string(),
            order_id: "o-1".to_string(),
            product_id: "p-1".to_string(),
            name_snapshot: "Widget".to_string(),
            quantity: 3,
            unit_price_cents: 299,
            created_at: Utc::now(),
        };
        assert_eq!(line.line_total().cents(), 897);
    }
}
