//! # Checkout Coordinator
//!
//! Turns a cart into a placed order.
//!
//! ## The Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       place_order(user, shipping)                       │
//! │                                                                         │
//! │  1. validate shipping                 (reject bad input early)          │
//! │  2. read cart snapshot                (live name, price, stock)         │
//! │  3. empty?            ──► EmptyCart                                     │
//! │  4. advisory stock check ──► InsufficientStock (fast fail, no write)    │
//! │  5. price the snapshot                (pure, emporium-core)             │
//! │  6. ONE TRANSACTION: insert order + lines, reserve stock, clear cart    │
//! │  7. post-commit, best effort: audit log, confirmation notification     │
//! │                                                                         │
//! │  Steps 1-5 never write. Step 6 is all-or-nothing. Step 7 can fail       │
//! │  without unwinding anything.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The advisory check in step 4 catches the common case with a clear
//! message; the reservation inside the transaction is the check that
//! actually decides races.

use std::sync::Arc;

use chrono::Utc;
use emporium_core::validation;
use emporium_core::{
    pricing, CartLineSnapshot, CoreError, Order, OrderLine, OrderStatus, ShippingInfo,
};
use emporium_db::{Database, DbError};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::notify::NotificationSink;

/// The result of a successful checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Coordinates order placement.
#[derive(Clone)]
pub struct CheckoutService {
    db: Database,
    sink: Arc<dyn NotificationSink>,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(db: Database, sink: Arc<dyn NotificationSink>) -> Self {
        CheckoutService { db, sink }
    }

    /// Places an order from the user's current cart.
    ///
    /// On success the order exists in `pending_payment`, stock is
    /// reserved, and the cart is empty. On any error, durable state is
    /// exactly as it was before the call.
    #[instrument(skip(self, shipping))]
    pub async fn place_order(
        &self,
        user_id: &str,
        shipping: &ShippingInfo,
    ) -> StoreResult<PlacedOrder> {
        validation::validate_shipping_info(shipping).map_err(CoreError::from)?;

        let snapshot = self.db.carts().snapshot(user_id).await?;
        if snapshot.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        // Advisory pre-flight; the reservation in the transaction is
        // the authoritative check.
        for line in &snapshot {
            if line.stock < line.quantity {
                return Err(CoreError::InsufficientStock {
                    name: line.name.clone(),
                    available: line.stock,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let total = pricing::snapshot_total(&snapshot);
        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let order = Order {
            id: order_id.clone(),
            user_id: user_id.to_string(),
            status: OrderStatus::PendingPayment,
            total_cents: total.cents(),
            shipping_name: shipping.name.clone(),
            shipping_phone: shipping.phone.clone(),
            shipping_address: shipping.address.clone(),
            created_at: now,
            updated_at: now,
        };

        // Freeze name and price from the snapshot onto the lines
        let lines: Vec<OrderLine> = snapshot
            .iter()
            .map(|s| OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: s.product_id.clone(),
                name_snapshot: s.name.clone(),
                quantity: s.quantity,
                unit_price_cents: s.unit_price_cents,
                created_at: now,
            })
            .collect();

        self.db
            .checkout()
            .place_order(&order, &lines)
            .await
            .map_err(|e| self.stock_race_error(e, &snapshot))?;

        // Best effort from here on; the order is already durable.
        if let Err(e) = self.db.audit().record_purchase(user_id, &order_id, &lines).await {
            warn!(order_id = %order_id, error = %e, "Purchase audit write failed");
        }

        if let Err(e) = self.sink.send_confirmation(&order, &lines).await {
            warn!(order_id = %order_id, error = %e, "Order confirmation failed");
        }

        Ok(PlacedOrder { order, lines })
    }

    /// Translates a lost stock race back into the domain error, using
    /// the snapshot for the product name.
    fn stock_race_error(&self, err: DbError, snapshot: &[CartLineSnapshot]) -> StoreError {
        match err {
            DbError::InsufficientStock { product_id } => {
                match snapshot.iter().find(|s| s.product_id == product_id) {
                    Some(line) => CoreError::InsufficientStock {
                        name: line.name.clone(),
                        available: line.stock,
                        requested: line.quantity,
                    }
                    .into(),
                    None => CoreError::ProductNotFound(product_id).into(),
                }
            }
            DbError::NotFound { id, .. } => CoreError::ProductNotFound(id).into(),
            other => other.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
//
// The full checkout properties (atomic rollback, concurrency, price
// immutability) live in the integration suite under tests/. These
// cover the coordinator's own short-circuits.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{LogNotificationSink, RecordingSink};
    use emporium_core::NewProduct;
    use emporium_db::DbConfig;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Alice".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&NewProduct {
                name: "Widget".to_string(),
                description: None,
                category: None,
                image_url: None,
                price_cents: 1000,
                stock: 5,
            })
            .await
            .unwrap();
        (db, product.id)
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (db, _pid) = setup().await;
        let checkout = CheckoutService::new(db, Arc::new(LogNotificationSink));

        let result = checkout.place_order("alice", &shipping()).await;
        assert!(matches!(
            result,
            Err(StoreError::Core(CoreError::EmptyCart))
        ));
    }

    #[tokio::test]
    async fn test_invalid_shipping_is_rejected_before_reads() {
        let (db, pid) = setup().await;
        db.carts().add_line("alice", &pid, 1).await.unwrap();
        let checkout = CheckoutService::new(db.clone(), Arc::new(LogNotificationSink));

        let mut bad = shipping();
        bad.address = "".to_string();
        let result = checkout.place_order("alice", &bad).await;
        assert!(matches!(
            result,
            Err(StoreError::Core(CoreError::Validation(_)))
        ));

        // Cart untouched
        assert_eq!(db.carts().line_count("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_successful_checkout_notifies_and_audits() {
        let (db, pid) = setup().await;
        db.carts().add_line("alice", &pid, 2).await.unwrap();

        let sink = Arc::new(RecordingSink::new());
        let checkout = CheckoutService::new(db.clone(), sink.clone());

        let placed = checkout.place_order("alice", &shipping()).await.unwrap();
        assert_eq!(placed.order.status, OrderStatus::PendingPayment);
        assert_eq!(placed.order.total_cents, 2000);
        assert_eq!(placed.lines.len(), 1);
        assert_eq!(placed.lines[0].name_snapshot, "Widget");

        assert_eq!(sink.sent_order_ids(), vec![placed.order.id.clone()]);

        let audit = db.audit().recent_for_user("alice", 10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].order_id.as_deref(), Some(placed.order.id.as_str()));
    }

    #[tokio::test]
    async fn test_preflight_insufficient_stock_names_the_product() {
        let (db, pid) = setup().await;
        // Cart 3, then stock drops to 2 behind the cart's back
        db.carts().add_line("alice", &pid, 3).await.unwrap();
        db.products().set_stock(&pid, 2).await.unwrap();

        let checkout = CheckoutService::new(db.clone(), Arc::new(LogNotificationSink));
        let result = checkout.place_order("alice", &shipping()).await;

        match result {
            Err(StoreError::Core(CoreError::InsufficientStock {
                name,
                available,
                requested,
            })) => {
                assert_eq!(name, "Widget");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing placed, cart intact
        assert_eq!(db.carts().line_count("alice").await.unwrap(), 1);
        assert!(db.orders().list_for_user("alice").await.unwrap().is_empty());
    }
}
