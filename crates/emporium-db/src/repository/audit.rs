//! # Purchase Audit Repository
//!
//! Append-only log of purchase activity. Written AFTER the checkout
//! transaction commits; a failed audit write never unwinds an order.
//! The service layer logs and swallows errors from this repository.

use chrono::{DateTime, Utc};
use emporium_core::OrderLine;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Action recorded when an order is placed.
pub const ACTION_PURCHASE: &str = "purchase";

/// One row in the purchase log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub order_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Repository for the purchase audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new audit repository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Records a purchase: one entry per order line.
    pub async fn record_purchase(
        &self,
        user_id: &str,
        order_id: &str,
        lines: &[OrderLine],
    ) -> DbResult<()> {
        let now = Utc::now();

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_log
                    (id, user_id, action, order_id, product_id, quantity, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(ACTION_PURCHASE)
            .bind(order_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }

        debug!(user_id, order_id, entries = lines.len(), "Purchase logged");
        Ok(())
    }

    /// Returns a user's most recent audit entries, newest first.
    pub async fn recent_for_user(&self, user_id: &str, limit: i64) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, user_id, action, order_id, product_id, quantity, created_at
            FROM purchase_log
            WHERE user_id = ?1
            ORDER BY created_at DESC, id
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn line(product_id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            id: Uuid::new_v4().to_string(),
            order_id: "o-1".to_string(),
            product_id: product_id.to_string(),
            name_snapshot: "Widget".to_string(),
            quantity,
            unit_price_cents: 1000,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let audit = db.audit();

        let lines = vec![line("p-1", 2), line("p-2", 1)];
        audit.record_purchase("alice", "o-1", &lines).await.unwrap();

        let entries = audit.recent_for_user("alice", 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.action == ACTION_PURCHASE));
        assert!(entries.iter().all(|e| e.order_id.as_deref() == Some("o-1")));
    }

    #[tokio::test]
    async fn test_recent_is_scoped_to_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let audit = db.audit();

        audit.record_purchase("alice", "o-1", &[line("p-1", 1)]).await.unwrap();
        audit.record_purchase("bob", "o-2", &[line("p-2", 1)]).await.unwrap();

        let entries = audit.recent_for_user("alice", 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, "alice");
    }
}
