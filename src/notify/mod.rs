pub mod discord;
pub mod format;

use std::sync::Mutex;

use crate::error::DeliveryError;
pub use discord::DiscordWebhook;
pub use format::{format_review, WebhookEmbed, WebhookMessage};

/// Outbound side of the pipeline: one call per admitted review.
/// A failed delivery is reported, never retried.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, msg: &WebhookMessage) -> Result<(), DeliveryError>;
}

// --- Test helper ---
/// Keeps every message it is handed. With `failing()` it still records the
/// message but reports a rejected delivery.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<WebhookMessage>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<WebhookMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, msg: &WebhookMessage) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg.clone());
        if self.fail {
            return Err(DeliveryError::Status(500));
        }
        Ok(())
    }
}
