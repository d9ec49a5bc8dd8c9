//! # Error Types
//!
//! Domain-specific error types for emporium-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  emporium-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  emporium-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  emporium-store errors (separate crate)                                 │
//! │  └── StoreError       - Composes CoreError and DbError                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, order id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant is recoverable; nothing here is fatal to the process

use thiserror::Error;

use crate::status::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are reported to
/// the caller verbatim and always leave durable state unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with no cart lines.
    ///
    /// ## Caller Guidance
    /// Redirect the buyer back to browsing; there is nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line's demand exceeds available stock.
    ///
    /// ## When This Occurs
    /// - Pre-flight check at checkout (advisory, fast fail)
    /// - The authoritative atomic decrement losing a race
    /// - Soft check when adding to or updating the cart
    ///
    /// The cart is left untouched so the buyer can adjust quantities
    /// and retry.
    #[error("Insufficient stock for \"{name}\": available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A requested status change violates the order state machine.
    ///
    /// ## Caller Guidance
    /// Treat as a no-op; durable state has not changed.
    #[error("Invalid order status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Product cannot be found (or is deactivated).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found (or belongs to another user).
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Cart line cannot be found for the given product.
    #[error("Cart line not found for product: {0}")]
    CartLineNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
