//! # Cart Service
//!
//! Per-user cart operations: add (with merge), change quantity, remove,
//! clear, and the priced cart view.
//!
//! ## Soft Stock Checks
//! Adding and updating lines check stock against the live catalog as a
//! courtesy to the buyer. These checks are advisory; the authoritative
//! check is the atomic decrement inside the checkout transaction.

use emporium_core::validation;
use emporium_core::{pricing, CartLine, CartLineSnapshot, CoreError, Money, MAX_CART_LINES};
use emporium_db::{Database, DbError};
use tracing::instrument;

use crate::error::{StoreError, StoreResult};

/// A priced view of a user's cart.
#[derive(Debug, Clone)]
pub struct CartView {
    /// Cart lines joined with live catalog name, price, and stock.
    pub lines: Vec<CartLineSnapshot>,
    /// Sum of line subtotals at current catalog prices.
    pub total: Money,
}

/// Service for cart operations.
#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    /// Creates a new cart service.
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    /// Returns the user's cart priced at current catalog values.
    pub async fn view(&self, user_id: &str) -> StoreResult<CartView> {
        let lines = self.db.carts().snapshot(user_id).await?;
        let total = pricing::snapshot_total(&lines);
        Ok(CartView { lines, total })
    }

    /// Adds a product to the cart, merging with any existing line.
    ///
    /// ## Errors
    /// - `ProductNotFound` if the product is missing or retired
    /// - `InsufficientStock` if the merged quantity exceeds current stock
    /// - `Validation` if the quantity is out of range or the cart is full
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: &str, product_id: &str, quantity: i64) -> StoreResult<CartLine> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await
            .map_err(|e| product_missing(e, product_id))?;
        if !product.is_active {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        // Soft check against the merged quantity
        let existing = match self.db.carts().get_line(user_id, product_id).await {
            Ok(line) => line.quantity,
            Err(DbError::NotFound { .. }) => {
                let count = self.db.carts().line_count(user_id).await?;
                if count as usize >= MAX_CART_LINES {
                    return Err(CoreError::Validation(
                        emporium_core::ValidationError::OutOfRange {
                            field: "cart_lines".to_string(),
                            min: 0,
                            max: MAX_CART_LINES as i64,
                        },
                    )
                    .into());
                }
                0
            }
            Err(e) => return Err(e.into()),
        };

        let requested = existing + quantity;
        if !product.can_fulfill(requested) {
            return Err(CoreError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested,
            }
            .into());
        }

        Ok(self.db.carts().add_line(user_id, product_id, quantity).await?)
    }

    /// Replaces the quantity on an existing cart line.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> StoreResult<CartLine> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await
            .map_err(|e| product_missing(e, product_id))?;

        if !product.can_fulfill(quantity) {
            return Err(CoreError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested: quantity,
            }
            .into());
        }

        self.db
            .carts()
            .set_quantity(user_id, product_id, quantity)
            .await
            .map_err(|e| line_missing(e, product_id))
    }

    /// Removes one product from the cart.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: &str, product_id: &str) -> StoreResult<()> {
        self.db
            .carts()
            .remove_line(user_id, product_id)
            .await
            .map_err(|e| line_missing(e, product_id))?;
        Ok(())
    }

    /// Empties the cart. Emptying an empty cart is fine.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: &str) -> StoreResult<u64> {
        Ok(self.db.carts().clear(user_id).await?)
    }
}

fn product_missing(err: DbError, id: &str) -> StoreError {
    match err {
        DbError::NotFound { .. } => CoreError::ProductNotFound(id.to_string()).into(),
        other => other.into(),
    }
}

fn line_missing(err: DbError, product_id: &str) -> StoreError {
    match err {
        DbError::NotFound { .. } => CoreError::CartLineNotFound(product_id.to_string()).into(),
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
