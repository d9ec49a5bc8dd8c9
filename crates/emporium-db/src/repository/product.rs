//! # Product Repository
//!
//! Catalog access: browse queries for buyers, create/update/soft-delete
//! for admins. Stock changes do NOT go through this repository; the
//! inventory ledger owns those.

use chrono::Utc;
use emporium_core::{NewProduct, Product};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Fetches a product by ID, active or not.
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if no product has this ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, image_url,
                   price_cents, stock, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Lists active products, optionally filtered by category.
    ///
    /// Ordered by name for stable browse pages.
    pub async fn list_active(&self, category: Option<&str>) -> DbResult<Vec<Product>> {
        let products = match category {
            Some(cat) => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, category, image_url,
                           price_cents, stock, is_active, created_at, updated_at
                    FROM products
                    WHERE is_active = 1 AND category = ?1
                    ORDER BY name
                    "#,
                )
                .bind(cat)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, category, image_url,
                           price_cents, stock, is_active, created_at, updated_at
                    FROM products
                    WHERE is_active = 1
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Write Operations (admin)
    // =========================================================================

    /// Inserts a new product and returns it.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, category, image_url,
                 price_cents, stock, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(&new.image_url)
        .bind(new.price_cents)
        .bind(new.stock)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(product_id = %id, name = %new.name, "Product created");
        self.get_by_id(&id).await
    }

    /// Updates a product's catalog fields (not stock).
    ///
    /// ## Errors
    /// Returns `DbError::NotFound` if no product has this ID.
    pub async fn update(&self, id: &str, changes: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?2,
                description = ?3,
                category = ?4,
                image_url = ?5,
                price_cents = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.category)
        .bind(&changes.image_url)
        .bind(changes.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product updated");
        self.get_by_id(id).await
    }

    /// Replaces a product's stock level (admin restock/correction).
    ///
    /// Checkout never calls this; it goes through the inventory ledger.
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, stock, "Stock level set");
        Ok(())
    }

    /// Soft-deletes a product (marks inactive).
    ///
    /// The row stays so historical order lines keep a valid reference.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deactivated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn widget(price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: Some("A fine widget".to_string()),
            category: Some("tools".to_string()),
            image_url: None,
            price_cents,
            stock,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert(&widget(1099, 5)).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price_cents, 1099);
        assert_eq!(product.stock, 5);
        assert!(product.is_active);

        let fetched = repo.get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched.id, product.id);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let db = test_db().await;
        let result = db.products().get_by_id("no-such-id").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_active_excludes_deleted() {
        let db = test_db().await;
        let repo = db.products();

        let a = repo.insert(&widget(100, 1)).await.unwrap();
        let mut other = widget(200, 2);
        other.name = "Gadget".to_string();
        repo.insert(&other).await.unwrap();

        repo.soft_delete(&a.id).await.unwrap();

        let active = repo.list_active(None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Gadget");

        // Soft-deleted product still fetchable directly
        let deleted = repo.get_by_id(&a.id).await.unwrap();
        assert!(!deleted.is_active);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&widget(100, 1)).await.unwrap();
        let mut toy = widget(200, 2);
        toy.name = "Yo-yo".to_string();
        toy.category = Some("toys".to_string());
        repo.insert(&toy).await.unwrap();

        let toys = repo.list_active(Some("toys")).await.unwrap();
        assert_eq!(toys.len(), 1);
        assert_eq!(toys[0].name, "Yo-yo");
    }

    #[tokio::test]
    async fn test_update_changes_catalog_fields() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert(&widget(1000, 5)).await.unwrap();

        let mut changes = widget(1500, 999);
        changes.name = "Deluxe Widget".to_string();
        let updated = repo.update(&product.id, &changes).await.unwrap();

        assert_eq!(updated.name, "Deluxe Widget");
        assert_eq!(updated.price_cents, 1500);
        // update() does not touch stock
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn test_set_stock() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.insert(&widget(1000, 5)).await.unwrap();
        repo.set_stock(&product.id, 42).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched.stock, 42);
    }
}
