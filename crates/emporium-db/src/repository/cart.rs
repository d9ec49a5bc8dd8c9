//! # Cart Repository
//!
//! Per-user cart lines. The table enforces one line per (user, product);
//! adding an already-carted product merges quantities via upsert.
//!
//! ## Snapshot Read
//! `snapshot()` joins cart lines with the live catalog and returns the
//! immutable per-line view checkout works from: current name, current
//! unit price, requested quantity, current stock. Checkout freezes the
//! name and price from this read onto the order lines.

use chrono::Utc;
use emporium_core::{CartLine, CartLineSnapshot};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for cart line operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new cart repository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Adds a product to a user's cart, merging into an existing line.
    ///
    /// If the user already has this product carted, the quantities are
    /// summed; otherwise a new line is created. Returns the resulting line.
    pub async fn add_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<CartLine> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cart_lines (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(user_id, product_id, quantity, "Cart line added/merged");
        self.get_line(user_id, product_id).await
    }

    /// Replaces the quantity on an existing cart line.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the user has no line for this product.
    pub async fn set_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<CartLine> {
        let result = sqlx::query(
            r#"
            UPDATE cart_lines
            SET quantity = ?3, updated_at = ?4
            WHERE user_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", product_id));
        }

        self.get_line(user_id, product_id).await
    }

    /// Removes one line from a user's cart.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the user has no line for this product.
    pub async fn remove_line(&self, user_id: &str, product_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM cart_lines WHERE user_id = ?1 AND product_id = ?2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", product_id));
        }

        debug!(user_id, product_id, "Cart line removed");
        Ok(())
    }

    /// Empties a user's cart. Removing nothing is not an error.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Fetches a single cart line.
    pub async fn get_line(&self, user_id: &str, product_id: &str) -> DbResult<CartLine> {
        let line = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_lines
            WHERE user_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("CartLine", product_id))?;

        Ok(line)
    }

    /// Lists a user's cart lines, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT id, user_id, product_id, quantity, created_at, updated_at
            FROM cart_lines
            WHERE user_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts a user's cart lines.
    pub async fn line_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Reads the cart joined with current catalog data.
    ///
    /// Only active products appear. Name and price in the result are the
    /// live catalog values; checkout freezes them onto the order lines.
    pub async fn snapshot(&self, user_id: &str) -> DbResult<Vec<CartLineSnapshot>> {
        let mut conn = self.pool.acquire().await?;
        snapshot_in(&mut conn, user_id).await
    }
}

/// Connection-scoped snapshot read, for use inside the checkout transaction.
pub async fn snapshot_in(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> DbResult<Vec<CartLineSnapshot>> {
    let snapshot = sqlx::query_as::<_, CartLineSnapshot>(
        r#"
        SELECT c.product_id,
               p.name,
               p.price_cents AS unit_price_cents,
               c.quantity,
               p.stock
        FROM cart_lines c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = ?1 AND p.is_active = 1
        ORDER BY c.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(snapshot)
}

/// Connection-scoped cart clear, for use inside the checkout transaction.
pub async fn clear_in(conn: &mut SqliteConnection, user_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use emporium_core::NewProduct;

    async fn db_with_product(name: &str, price_cents: i64, stock: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = insert_product(&db, name, price_cents, stock).await;
        (db, id)
    }

    async fn insert_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> String {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                description: None,
                category: None,
                image_url: None,
                price_cents,
                stock,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_line() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;

        let line = db.carts().add_line("alice", &pid, 2).await.unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.product_id, pid);
    }

    #[tokio::test]
    async fn test_add_line_merges_quantity() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &pid, 2).await.unwrap();
        let merged = carts.add_line("alice", &pid, 3).await.unwrap();

        assert_eq!(merged.quantity, 5);
        assert_eq!(carts.line_count("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &pid, 2).await.unwrap();
        carts.add_line("bob", &pid, 7).await.unwrap();

        assert_eq!(carts.get_line("alice", &pid).await.unwrap().quantity, 2);
        assert_eq!(carts.get_line("bob", &pid).await.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn test_set_quantity() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &pid, 2).await.unwrap();
        let line = carts.set_quantity("alice", &pid, 9).await.unwrap();
        assert_eq!(line.quantity, 9);
    }

    #[tokio::test]
    async fn test_set_quantity_missing_line() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;

        let result = db.carts().set_quantity("alice", &pid, 9).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_line() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &pid, 2).await.unwrap();
        carts.remove_line("alice", &pid).await.unwrap();

        assert_eq!(carts.line_count("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = insert_product(&db, "Widget", 1000, 10).await;
        let b = insert_product(&db, "Gadget", 500, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &a, 1).await.unwrap();
        carts.add_line("alice", &b, 2).await.unwrap();

        let removed = carts.clear("alice").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(carts.line_count("alice").await.unwrap(), 0);

        // Clearing an empty cart is fine
        assert_eq!(carts.clear("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_joins_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = insert_product(&db, "Widget", 1000, 10).await;
        let b = insert_product(&db, "Gadget", 500, 3).await;
        let carts = db.carts();

        carts.add_line("alice", &a, 2).await.unwrap();
        carts.add_line("alice", &b, 1).await.unwrap();

        let snapshot = carts.snapshot("alice").await.unwrap();
        assert_eq!(snapshot.len(), 2);

        let widget = snapshot.iter().find(|s| s.name == "Widget").unwrap();
        assert_eq!(widget.unit_price_cents, 1000);
        assert_eq!(widget.quantity, 2);
        assert_eq!(widget.stock, 10);
    }

    #[tokio::test]
    async fn test_snapshot_skips_inactive_products() {
        let (db, pid) = db_with_product("Widget", 1000, 10).await;
        let carts = db.carts();

        carts.add_line("alice", &pid, 2).await.unwrap();
        db.products().soft_delete(&pid).await.unwrap();

        let snapshot = carts.snapshot("alice").await.unwrap();
        assert!(snapshot.is_empty());
    }
}
