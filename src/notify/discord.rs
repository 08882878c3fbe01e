use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode};
use std::time::Duration;

use super::{NotificationSink, WebhookMessage};
use crate::config::AppConfig;
use crate::error::DeliveryError;

/// Posts webhook messages to a Discord channel.
/// https://discord.com/developers/docs/resources/webhook#execute-webhook
#[derive(Clone)]
pub struct DiscordWebhook {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordWebhook {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.webhook_url.clone()).with_timeout(cfg.http_timeout_secs)
    }

    /// JSON POST of `msg` to the webhook URL.
    pub fn request(&self, msg: &WebhookMessage) -> Result<Request, DeliveryError> {
        let req = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(msg)
            .build()?;
        Ok(req)
    }
}

/// Discord answers an accepted execute-webhook call with 204.
pub fn check_status(status: StatusCode) -> Result<(), DeliveryError> {
    if status == StatusCode::NO_CONTENT {
        Ok(())
    } else {
        Err(DeliveryError::Status(status.as_u16()))
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn deliver(&self, msg: &WebhookMessage) -> Result<(), DeliveryError> {
        let req = self.request(msg)?;
        let rsp = self.client.execute(req).await?;
        check_status(rsp.status())
    }
}
