//! # Repository Pattern Implementation
//!
//! Repositories encapsulate all SQL for a specific aggregate.
//! Services never see SQL; they call typed repository methods.
//!
//! ## Repository Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Repository Responsibilities                         │
//! │                                                                         │
//! │  ProductRepository      Catalog reads and writes, soft delete           │
//! │  InventoryLedger        Atomic stock reserve/release (the stock guard)  │
//! │  CartRepository         Per-user cart lines, merge-on-add, snapshots    │
//! │  OrderRepository        Order reads, guarded status transitions,        │
//! │                         cancel-with-restock                             │
//! │  CheckoutRepository     Single-transaction order placement              │
//! │  AuditRepository        Append-only purchase log                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Composition
//! Ledger operations come in pool-scoped and connection-scoped flavors.
//! The connection-scoped ones (`*_in`) take `&mut SqliteConnection` so the
//! checkout and cancellation paths can run them inside their own
//! transaction and keep the all-or-nothing guarantee.

pub mod audit;
pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod order;
pub mod product;
