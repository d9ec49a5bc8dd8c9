//! # Order Lifecycle
//!
//! The order status state machine.
//!
//! ```text
//! PendingPayment ──► Paid ──► Shipped ──► Completed
//!        │            │          │
//!        └────────────┴──────────┴──► Cancelled
//! ```
//!
//! Rules:
//! - Forward transitions may skip states (an admin can mark a
//!   pending order Shipped directly).
//! - `Cancelled` is reachable from every non-terminal state.
//! - `Completed` and `Cancelled` are terminal: nothing leaves them.
//! - Entering `Cancelled` for the first time restocks the order's
//!   lines; that side effect is owned by the order service, not here.
//!   This module only answers "is this transition legal?".

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order created, awaiting payment.
    #[default]
    PendingPayment,

    /// Payment confirmed.
    Paid,

    /// Order handed to the carrier.
    Shipped,

    /// Order delivered and closed (terminal state).
    Completed,

    /// Order was cancelled; its stock has been released (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if this is a terminal state (no further transitions).
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns true if the order can be paid in this state.
    ///
    /// Payment is stricter than the administrative transition rules:
    /// it is only valid from `PendingPayment`.
    pub const fn can_pay(&self) -> bool {
        matches!(self, OrderStatus::PendingPayment)
    }

    /// Returns true if moving to `next` is a legal transition.
    ///
    /// Same-state "transitions" are NOT legal moves; callers treat them
    /// as no-ops before consulting this function.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }

        match next {
            // Cancellation is allowed from any non-terminal state.
            OrderStatus::Cancelled => true,
            // Otherwise only forward movement through the lifecycle.
            _ => next.sequence() > self.sequence(),
        }
    }

    /// Position in the forward lifecycle. `Cancelled` sits outside the
    /// forward ordering and is handled explicitly by `can_transition_to`.
    const fn sequence(&self) -> u8 {
        match self {
            OrderStatus::PendingPayment => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Completed => 3,
            OrderStatus::Cancelled => u8::MAX,
        }
    }

    /// Returns the status name as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
