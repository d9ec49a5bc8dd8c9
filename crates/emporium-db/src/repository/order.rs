//! # Order Repository
//!
//! Order reads and status writes. Orders are created only by the
//! checkout repository; this one never inserts them.
//!
//! ## Guarded Updates
//! Status writes carry the expected current status in the WHERE clause.
//! `rows_affected == 0` means another writer got there first (or the
//! order is missing), so a stale transition can never clobber a newer
//! one. The same pattern makes cancellation idempotent: the restock
//! runs only when the guarded UPDATE actually flipped the row.

use chrono::Utc;
use emporium_core::{Order, OrderLine, OrderStatus};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::inventory;

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new order repository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Fetches an order by ID.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if no order has this ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_cents,
                   shipping_name, shipping_phone, shipping_address,
                   created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))?;

        Ok(order)
    }

    /// Fetches an order by ID, scoped to its owner.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the order does not exist OR belongs
    /// to a different user; callers cannot tell the two apart.
    pub async fn get_for_user(&self, id: &str, user_id: &str) -> DbResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_cents,
                   shipping_name, shipping_phone, shipping_address,
                   created_at, updated_at
            FROM orders
            WHERE id = ?1 AND user_id = ?2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))?;

        Ok(order)
    }

    /// Fetches the line items for an order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, name_snapshot,
                   quantity, unit_price_cents, created_at
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists a user's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, status, total_cents,
                   shipping_name, shipping_phone, shipping_address,
                   created_at, updated_at
            FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists all orders, optionally filtered by status (admin view).
    pub async fn list_all(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let orders = match status {
            Some(s) => {
                sqlx::query_as::<_, Order>(
                    r#"
                    SELECT id, user_id, status, total_cents,
                           shipping_name, shipping_phone, shipping_address,
                           created_at, updated_at
                    FROM orders
                    WHERE status = ?1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(
                    r#"
                    SELECT id, user_id, status, total_cents,
                           shipping_name, shipping_phone, shipping_address,
                           created_at, updated_at
                    FROM orders
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    // =========================================================================
    // Status Writes
    // =========================================================================

    /// Moves an order from `from` to `to`, guarded on the current status.
    ///
    /// ## Returns
    /// `true` if the row flipped; `false` if the order was not in `from`
    /// (someone else transitioned it first) or does not exist.
    pub async fn update_status_guarded(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let flipped = result.rows_affected() == 1;
        if flipped {
            info!(order_id = %id, %from, %to, "Order status updated");
        } else {
            debug!(order_id = %id, %from, %to, "Guarded status update matched no row");
        }
        Ok(flipped)
    }

    /// Cancels an order and restocks its lines, in one transaction.
    ///
    /// The guard excludes terminal states, so calling this twice (or
    /// racing two calls) restocks exactly once: the second caller's
    /// UPDATE matches no row and nothing else runs.
    ///
    /// ## Returns
    /// `true` if the order was cancelled and restocked by this call;
    /// `false` if it was already in a terminal state.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if the order does not exist.
    pub async fn cancel_with_restock(&self, id: &str) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status NOT IN (?4, ?2)
            "#,
        )
        .bind(id)
        .bind(OrderStatus::Cancelled)
        .bind(Utc::now())
        .bind(OrderStatus::Completed)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return match exists {
                Some(_) => Ok(false),
                None => Err(DbError::not_found("Order", id)),
            };
        }

        // Restock every line inside the same transaction, so a partial
        // restock can never be observed.
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, name_snapshot,
                   quantity, unit_price_cents, created_at
            FROM order_lines
            WHERE order_id = ?1
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            inventory::release_in(&mut tx, &line.product_id, line.quantity).await?;
        }

        tx.commit().await?;

        info!(order_id = %id, lines = lines.len(), "Order cancelled and restocked");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
//
// Order creation goes through CheckoutRepository; its tests (and the
// integration suite) cover cancel_with_restock end to end. Here we
// exercise the guarded update against hand-inserted rows.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn insert_order(db: &Database, id: &str, status: OrderStatus) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_cents,
                 shipping_name, shipping_phone, shipping_address,
                 created_at, updated_at)
            VALUES (?1, 'alice', ?2, 2500, 'Alice', '555-0100', '1 Main St', ?3, ?3)
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_by_id_roundtrip() {
        let db = test_db().await;
        insert_order(&db, "o-1", OrderStatus::PendingPayment).await;

        let order = db.orders().get_by_id("o-1").await.unwrap();
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.total_cents, 2500);
        assert_eq!(order.user_id, "alice");
    }

    #[tokio::test]
    async fn test_get_for_user_scopes_ownership() {
        let db = test_db().await;
        insert_order(&db, "o-1", OrderStatus::PendingPayment).await;

        assert!(db.orders().get_for_user("o-1", "alice").await.is_ok());
        let result = db.orders().get_for_user("o-1", "mallory").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_guarded_update_flips_matching_status() {
        let db = test_db().await;
        insert_order(&db, "o-1", OrderStatus::PendingPayment).await;

        let flipped = db
            .orders()
            .update_status_guarded("o-1", OrderStatus::PendingPayment, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(flipped);

        let order = db.orders().get_by_id("o-1").await.unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_guarded_update_rejects_stale_expectation() {
        let db = test_db().await;
        insert_order(&db, "o-1", OrderStatus::Paid).await;

        // Expecting pending_payment, but the order is already paid
        let flipped = db
            .orders()
            .update_status_guarded("o-1", OrderStatus::PendingPayment, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(!flipped);
    }

    #[tokio::test]
    async fn test_cancel_missing_order() {
        let db = test_db().await;
        let result = db.orders().cancel_with_restock("no-such-order").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cancel_terminal_order_is_noop() {
        let db = test_db().await;
        insert_order(&db, "o-done", OrderStatus::Completed).await;
        insert_order(&db, "o-gone", OrderStatus::Cancelled).await;

        assert!(!db.orders().cancel_with_restock("o-done").await.unwrap());
        assert!(!db.orders().cancel_with_restock("o-gone").await.unwrap());

        // Statuses untouched
        assert_eq!(
            db.orders().get_by_id("o-done").await.unwrap().status,
            OrderStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_list_all_filters_by_status() {
        let db = test_db().await;
        insert_order(&db, "o-1", OrderStatus::PendingPayment).await;
        insert_order(&db, "o-2", OrderStatus::Paid).await;
        insert_order(&db, "o-3", OrderStatus::Paid).await;

        let paid = db.orders().list_all(Some(OrderStatus::Paid)).await.unwrap();
        assert_eq!(paid.len(), 2);

        let all = db.orders().list_all(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
