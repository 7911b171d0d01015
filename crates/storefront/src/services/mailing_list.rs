//! `MailerLite` API client for newsletter subscriptions.
//!
//! New subscribers are added to the configured group. If the API rejects the
//! group (a 422 whose body mentions groups), the subscription is retried once
//! without it so the address is still captured.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use noor_core::Email;

use crate::config::MailingListConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when interacting with the `MailerLite` API.
#[derive(Debug, Error)]
pub enum MailingListError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result of a successful subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub subscriber_id: Option<String>,
    /// False when the group was rejected and the fallback request was used.
    pub group_assigned: bool,
}

#[derive(Debug, Deserialize)]
struct SubscriberResponse {
    data: Option<SubscriberData>,
}

#[derive(Debug, Deserialize)]
struct SubscriberData {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

impl ErrorBody {
    fn concerns_groups(&self) -> bool {
        self.message.to_ascii_lowercase().contains("group")
            || self.errors.keys().any(|key| key.starts_with("groups"))
    }
}

/// `MailerLite` API client.
#[derive(Clone)]
pub struct MailingListClient {
    client: reqwest::Client,
    base_url: String,
    group_id: Option<String>,
}

impl MailingListClient {
    /// Create a new `MailerLite` client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &MailingListConfig) -> Result<Self, MailingListError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| MailingListError::Config(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            group_id: config.group_id.clone().filter(|id| !id.trim().is_empty()),
        })
    }

    /// Subscribe an email, assigning it to the configured group.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the subscriber
    /// (after the single group fallback, when applicable).
    #[instrument(skip(self, email), fields(domain = %email.domain()))]
    pub async fn subscribe(&self, email: &Email) -> Result<Subscription, MailingListError> {
        let Some(group_id) = &self.group_id else {
            return self.create_subscriber(email, None).await;
        };

        match self.create_subscriber(email, Some(group_id)).await {
            Err(MailingListError::Api { status, message })
                if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
                    && parse_error(&message).concerns_groups() =>
            {
                tracing::warn!(
                    group_id = %group_id,
                    message = %message,
                    "Mailing list group rejected, retrying without group"
                );
                self.create_subscriber(email, None).await
            }
            other => other,
        }
    }

    async fn create_subscriber(
        &self,
        email: &Email,
        group_id: Option<&str>,
    ) -> Result<Subscription, MailingListError> {
        let url = format!("{}/api/subscribers", self.base_url);

        let body = group_id.map_or_else(
            || serde_json::json!({ "email": email.as_str() }),
            |group| serde_json::json!({ "email": email.as_str(), "groups": [group] }),
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(MailingListError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let subscriber_id = serde_json::from_str::<SubscriberResponse>(&text)
            .ok()
            .and_then(|r| r.data)
            .and_then(|d| d.id);

        Ok(Subscription {
            subscriber_id,
            group_assigned: group_id.is_some(),
        })
    }
}

fn parse_error(body: &str) -> ErrorBody {
    serde_json::from_str(body).unwrap_or_else(|_| ErrorBody {
        message: body.to_string(),
        ..ErrorBody::default()
    })
}
