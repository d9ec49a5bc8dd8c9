//! # Inventory Ledger
//!
//! The single authority for stock movements. Two operations:
//!
//! - `reserve`: atomically subtract stock, failing if not enough remains
//! - `release`: add stock back (cancellation restock)
//!
//! ## Why One UPDATE Statement
//! ```text
//! UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2
//! ```
//! The guard and the decrement are one statement, so two transactions
//! racing for the last unit cannot both see "enough stock" and both
//! subtract. SQLite serializes the writes; the loser's UPDATE matches
//! zero rows and its transaction rolls back. A read-then-write pair
//! would leave a window between the check and the decrement.
//!
//! The connection-scoped `*_in` variants exist so checkout and
//! cancellation can run stock movements inside their own transaction.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for atomic stock reservations and releases.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    /// Creates a new inventory ledger.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    /// Atomically reserves `quantity` units of a product.
    ///
    /// ## Errors
    /// - `DbError::InsufficientStock` if stock < quantity
    /// - `DbError::NotFound` if the product does not exist
    pub async fn reserve(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        reserve_in(&mut conn, product_id, quantity).await
    }

    /// Adds `quantity` units back to a product's stock.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the product does not exist.
    pub async fn release(&self, product_id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        release_in(&mut conn, product_id, quantity).await
    }
}

/// Connection-scoped reserve, for composing into a larger transaction.
pub async fn reserve_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    // Guard and decrement in one statement; this is the authoritative
    // stock check under concurrency.
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish "missing product" from "not enough stock"
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

        return match exists {
            Some(_) => Err(DbError::insufficient_stock(product_id)),
            None => Err(DbError::not_found("Product", product_id)),
        };
    }

    debug!(product_id, quantity, "Stock reserved");
    Ok(())
}

/// Connection-scoped release, for composing into a larger transaction.
pub async fn release_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE products SET stock = stock + ?2 WHERE id = ?1")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }

    debug!(product_id, quantity, "Stock released");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
