//! # Checkout Repository
//!
//! The single all-or-nothing write of the system: turn a priced cart
//! into a placed order.
//!
//! ## Transaction Shape
//! ```text
//! BEGIN
//!   INSERT order (pending_payment)
//!   for each line:
//!     INSERT order_line (frozen name + price)
//!     UPDATE products SET stock = stock - qty WHERE stock >= qty
//!       └─ zero rows → abort, whole transaction rolls back
//!   DELETE user's cart lines
//! COMMIT
//! ```
//! If any reservation fails the caller sees `InsufficientStock` and the
//! database is exactly as it was: no order, no lines, no stock change,
//! cart intact.

use emporium_core::{Order, OrderLine};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;
use crate::repository::{cart, inventory};

/// Repository for atomic order placement.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    /// Creates a new checkout repository.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    /// Persists an order with its lines, reserves stock for every line,
    /// and clears the buyer's cart, all in one transaction.
    ///
    /// The caller (the checkout service) builds the `Order` and
    /// `OrderLine` values from a cart snapshot; this method only makes
    /// them durable.
    ///
    /// ## Errors
    /// - `DbError::InsufficientStock` if any line's reservation fails;
    ///   nothing is persisted
    /// - `DbError::NotFound` if a carted product vanished
    pub async fn place_order(&self, order: &Order, lines: &[OrderLine]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_cents,
                 shipping_name, shipping_phone, shipping_address,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(&order.shipping_name)
        .bind(&order.shipping_phone)
        .bind(&order.shipping_address)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (id, order_id, product_id, name_snapshot,
                     quantity, unit_price_cents, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(&line.name_snapshot)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;

            // The atomic decrement is the real stock check; an error
            // here rolls back everything above.
            inventory::reserve_in(&mut tx, &line.product_id, line.quantity).await?;
        }

        cart::clear_in(&mut tx, &order.user_id).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            lines = lines.len(),
            total_cents = order.total_cents,
            "Order placed"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
