//! # Store Error Types
//!
//! `StoreError` composes the domain errors from `emporium-core` with the
//! infrastructure errors from `emporium-db`. Services translate storage
//! failures that have a business meaning (stock guard loss, missing
//! rows) back into `CoreError` before they reach the caller, so `Db`
//! mostly carries genuine infrastructure trouble.

use emporium_core::CoreError;
use emporium_db::DbError;
use thiserror::Error;

/// Errors returned by the storefront services.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule rejected the request. State is unchanged.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failed for infrastructure reasons.
    #[error("Storage error: {0}")]
    Db(#[from] DbError),
}

impl StoreError {
    /// Whether the error is a business rule rejection (vs infrastructure).
    pub fn is_domain(&self) -> bool {
        matches!(self, StoreError::Core(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
