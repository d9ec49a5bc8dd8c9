//! # emporium-store: Storefront Services
//!
//! The orchestration layer of Emporium. Each service wires pure rules
//! from `emporium-core` to storage in `emporium-db`; none of them
//! contain SQL or money math of their own.
//!
//! ## Service Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        emporium-store                                   │
//! │                                                                         │
//! │  CatalogService    browse + admin catalog management                    │
//! │  CartService       per-user cart with merge-on-add                      │
//! │  CheckoutService   cart snapshot ──► priced order, one transaction      │
//! │  OrderService      pay, lifecycle transitions, cancel-with-restock      │
//! │                                                                         │
//! │  NotificationSink  post-commit confirmation (best effort)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use emporium_db::{Database, DbConfig};
//! use emporium_store::{CheckoutService, LogNotificationSink};
//! use emporium_core::ShippingInfo;
//!
//! let db = Database::new(DbConfig::new("emporium.db")).await?;
//! let checkout = CheckoutService::new(db.clone(), Arc::new(LogNotificationSink));
//!
//! let placed = checkout
//!     .place_order("user-1", &ShippingInfo {
//!         name: "Alice".into(),
//!         phone: "555-0100".into(),
//!         address: "1 Main St".into(),
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod notify;
pub mod orders;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::{CartService, CartView};
pub use catalog::CatalogService;
pub use checkout::{CheckoutService, PlacedOrder};
pub use error::{StoreError, StoreResult};
pub use notify::{FailingSink, LogNotificationSink, NotificationSink, RecordingSink};
pub use orders::{OrderDetail, OrderService};
