//! Consumer port for authenticated, decoded deliveries.

use crate::webhook::domain::ReceivedEvent;
use async_trait::async_trait;

/// Receives every delivery that passed authentication and decoding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Handles one decoded delivery.
    async fn handle(&self, received: ReceivedEvent);
}
