//! # Notification Sink
//!
//! Post-commit order confirmation. The checkout coordinator calls the
//! sink AFTER the transaction commits and swallows its errors: a dead
//! mail server must never unwind a placed order.
//!
//! The trait is the seam for real delivery backends (email, webhook).
//! `LogNotificationSink` is the default; the in-memory sinks exist for
//! tests that need to observe or fail deliveries.

use async_trait::async_trait;
use emporium_core::{Order, OrderLine};
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

/// Notification delivery failure.
#[derive(Debug, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivery backend for order confirmations.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sends an order confirmation to the buyer.
    async fn send_confirmation(&self, order: &Order, lines: &[OrderLine])
        -> Result<(), NotifyError>;
}

// =============================================================================
// Log Sink (default)
// =============================================================================

/// Sink that writes confirmations to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send_confirmation(
        &self,
        order: &Order,
        lines: &[OrderLine],
    ) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total(),
            lines = lines.len(),
            "Order confirmation"
        );
        Ok(())
    }
}

// =============================================================================
// In-Memory Sinks (test doubles)
// =============================================================================

/// Sink that records every confirmation it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order IDs confirmed so far, in delivery order.
    pub fn sent_order_ids(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send_confirmation(
        &self,
        order: &Order,
        _lines: &[OrderLine],
    ) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(order.id.clone());
        }
        Ok(())
    }
}

/// Sink that fails every delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn send_confirmation(
        &self,
        _order: &Order,
        _lines: &[OrderLine],
    ) -> Result<(), NotifyError> {
        Err(NotifyError("sink unavailable".to_string()))
    }
}
