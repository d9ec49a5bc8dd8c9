//! # Catalog Service
//!
//! Browse operations for buyers and catalog management for admins.
//! Stock changes here are admin corrections only; checkout's stock
//! movements go through the inventory ledger.

use emporium_core::validation;
use emporium_core::{CoreError, NewProduct, Product};
use emporium_db::{Database, DbError};
use tracing::instrument;

use crate::error::StoreResult;

/// Service for catalog reads and admin writes.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // =========================================================================
    // Browse (buyer)
    // =========================================================================

    /// Lists purchasable products, optionally filtered by category.
    pub async fn browse(&self, category: Option<&str>) -> StoreResult<Vec<Product>> {
        Ok(self.db.products().list_active(category).await?)
    }

    /// Fetches a single purchasable product.
    ///
    /// ## Errors
    /// `CoreError::ProductNotFound` if the product is missing OR
    /// deactivated; buyers cannot tell the two apart.
    pub async fn get_product(&self, id: &str) -> StoreResult<Product> {
        let product = self
            .db
            .products()
            .get_by_id(id)
            .await
            .map_err(|e| hide_missing(e, id))?;

        if !product.is_active {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        Ok(product)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Creates a catalog product.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &NewProduct) -> StoreResult<Product> {
        validation::validate_new_product(input).map_err(CoreError::from)?;
        Ok(self.db.products().insert(input).await?)
    }

    /// Updates a product's catalog fields.
    #[instrument(skip(self, changes))]
    pub async fn update_product(&self, id: &str, changes: &NewProduct) -> StoreResult<Product> {
        validation::validate_new_product(changes).map_err(CoreError::from)?;
        Ok(self
            .db
            .products()
            .update(id, changes)
            .await
            .map_err(|e| hide_missing(e, id))?)
    }

    /// Replaces a product's stock level (restock or correction).
    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: &str, stock: i64) -> StoreResult<()> {
        validation::validate_stock(stock).map_err(CoreError::from)?;
        self.db
            .products()
            .set_stock(id, stock)
            .await
            .map_err(|e| hide_missing(e, id))?;
        Ok(())
    }

    /// Deactivates a product. Existing orders keep their snapshots.
    #[instrument(skip(self))]
    pub async fn retire_product(&self, id: &str) -> StoreResult<()> {
        self.db
            .products()
            .soft_delete(id)
            .await
            .map_err(|e| hide_missing(e, id))?;
        Ok(())
    }
}

/// Maps a storage NotFound onto the domain error for products.
fn hide_missing(err: DbError, id: &str) -> crate::StoreError {
    match err {
        DbError::NotFound { .. } => CoreError::ProductNotFound(id.to_string()).into(),
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use emporium_db::DbConfig;

    async fn service() -> CatalogService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogService::new(db)
    }

    fn widget() -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            description: None,
            category: Some("tools".to_string()),
            image_url: None,
            price_cents: 1099,
            stock: 5,
        }
    }

    #[tokio::test]
    async fn test_create_and_browse() {
        let catalog = service().await;
        let product = catalog.create_product(&widget()).await.unwrap();

        let listed = catalog.browse(None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, product.id);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let catalog = service().await;

        let mut bad = widget();
        bad.name = "".to_string();
        let result = catalog.create_product(&bad).await;
        assert!(matches!(
            result,
            Err(StoreError::Core(CoreError::Validation(_)))
        ));

        let mut bad = widget();
        bad.price_cents = -1;
        assert!(catalog.create_product(&bad).await.is_err());
    }

    #[tokio::test]
    async fn test_retired_product_hidden_from_buyers() {
        let catalog = service().await;
        let product = catalog.create_product(&widget()).await.unwrap();

        catalog.retire_product(&product.id).await.unwrap();

        let result = catalog.get_product(&product.id).await;
        assert!(matches!(
            result,
            Err(StoreError::Core(CoreError::ProductNotFound(_)))
        ));
        assert!(catalog.browse(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_is_domain_error() {
        let catalog = service().await;
        let result = catalog.get_product("no-such-id").await;
        assert!(matches!(
            result,
            Err(StoreError::Core(CoreError::ProductNotFound(_)))
        ));
    }
}
