//! Slack incoming webhook client.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

use super::error::SlackError;
use super::types::{Block, WebhookMessage};
use crate::config::SlackConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts Block Kit messages to a single incoming webhook.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    /// Webhook URL; anyone holding it can post to the channel.
    webhook_url: SecretString,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("webhook_url", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    ///
    /// # Errors
    ///
    /// Returns error if the webhook URL is not an absolute http(s) URL or the
    /// HTTP client fails to build.
    pub fn new(config: &SlackConfig) -> Result<Self, SlackError> {
        let parsed = url::Url::parse(config.webhook_url.expose_secret())
            .map_err(|e| SlackError::Config(format!("invalid webhook URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SlackError::Config(
                "webhook URL must use http or https".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Config(e.to_string()))?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// Post a message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the webhook responds with a
    /// non-success status.
    #[instrument(skip(self, blocks), fields(block_count = blocks.len()))]
    pub async fn post_message(
        &self,
        fallback_text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError> {
        let message = WebhookMessage {
            text: fallback_text.to_string(),
            blocks,
        };

        let response = self
            .client
            .post(self.webhook_url.expose_secret())
            .json(&message)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Api {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        debug!("Message posted to Slack");
        Ok(())
    }

    /// Post a message on a background task, logging any failure.
    pub fn post_in_background(&self, fallback_text: String, blocks: Vec<Block>) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.post_message(&fallback_text, blocks).await {
                tracing::warn!(error = %e, "Failed to send Slack notification");
            }
        });
    }
}
