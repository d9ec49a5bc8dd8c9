//! # Order Lifecycle Service
//!
//! Payment and status transitions over placed orders. The legal moves
//! live in `emporium_core::OrderStatus`; this service enforces them and
//! pairs cancellation with the restock.
//!
//! ## Two Layers of Enforcement
//! The state machine check here gives the caller a precise
//! `InvalidTransition` error. The guarded UPDATE underneath re-checks
//! the status at write time, so a race between two admins cannot apply
//! a transition that was legal only against a stale read.

use emporium_core::{CoreError, Order, OrderLine, OrderStatus};
use emporium_db::{Database, DbError};
use tracing::instrument;

use crate::error::{StoreError, StoreResult};

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Service for order queries and lifecycle transitions.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Creates a new order service.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetches one of the user's orders with its lines.
    ///
    /// ## Errors
    /// `OrderNotFound` if the order is missing or belongs to another
    /// user; callers cannot tell the two apart.
    pub async fn get_order(&self, user_id: &str, order_id: &str) -> StoreResult<OrderDetail> {
        let order = self
            .db
            .orders()
            .get_for_user(order_id, user_id)
            .await
            .map_err(|e| order_missing(e, order_id))?;
        let lines = self.db.orders().lines(order_id).await?;
        Ok(OrderDetail { order, lines })
    }

    /// Lists the user's orders, newest first.
    pub async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        Ok(self.db.orders().list_for_user(user_id).await?)
    }

    /// Lists all orders, optionally by status (admin view).
    pub async fn list_all(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        Ok(self.db.orders().list_all(status).await?)
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Marks one of the user's orders as paid.
    ///
    /// Legal only from `pending_payment`. Any other state returns
    /// `InvalidTransition` and changes nothing.
    #[instrument(skip(self))]
    pub async fn pay(&self, user_id: &str, order_id: &str) -> StoreResult<Order> {
        let order = self
            .db
            .orders()
            .get_for_user(order_id, user_id)
            .await
            .map_err(|e| order_missing(e, order_id))?;

        if !order.status.can_pay() {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Paid,
            }
            .into());
        }

        let flipped = self
            .db
            .orders()
            .update_status_guarded(order_id, OrderStatus::PendingPayment, OrderStatus::Paid)
            .await?;

        if !flipped {
            // Someone transitioned it between our read and our write
            let current = self.db.orders().get_by_id(order_id).await?;
            return Err(CoreError::InvalidTransition {
                from: current.status,
                to: OrderStatus::Paid,
            }
            .into());
        }

        Ok(self.db.orders().get_by_id(order_id).await?)
    }

    // =========================================================================
    // Admin Transitions
    // =========================================================================

    /// Moves an order to a new status (admin operation).
    ///
    /// ## Semantics
    /// - Setting the current status again is a no-op, not an error
    /// - Entering `cancelled` restocks every line, atomically with the
    ///   status flip; repeated cancellations restock exactly once
    /// - Anything the state machine forbids returns `InvalidTransition`
    #[instrument(skip(self))]
    pub async fn set_status(&self, order_id: &str, next: OrderStatus) -> StoreResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await
            .map_err(|e| order_missing(e, order_id))?;

        if order.status == next {
            return Ok(order);
        }

        if !order.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: next,
            }
            .into());
        }

        let flipped = if next == OrderStatus::Cancelled {
            self.db.orders().cancel_with_restock(order_id).await?
        } else {
            self.db
                .orders()
                .update_status_guarded(order_id, order.status, next)
                .await?
        };

        if !flipped {
            let current = self.db.orders().get_by_id(order_id).await?;
            return Err(CoreError::InvalidTransition {
                from: current.status,
                to: next,
            }
            .into());
        }

        Ok(self.db.orders().get_by_id(order_id).await?)
    }
}

fn order_missing(err: DbError, order_id: &str) -> StoreError {
    match err {
        DbError::NotFound { .. } => CoreError::OrderNotFound(order_id.to_string()).into(),
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
//
// End-to-end lifecycle paths (checkout -> pay -> ship -> ...) are in the
// integration suite; these exercise the service against hand-built orders.
