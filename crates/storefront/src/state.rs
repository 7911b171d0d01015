//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{
    AnalyticsTracker, GeoClient, GeoError, MailingListClient, MailingListError, OrderStore,
    SlackClient, SlackError, StripeClient, StripeError,
};

/// Error building an external-service client at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("geolocation client: {0}")]
    Geo(#[from] GeoError),
    #[error("stripe client: {0}")]
    Stripe(#[from] StripeError),
    #[error("slack client: {0}")]
    Slack(#[from] SlackError),
    #[error("mailing list client: {0}")]
    MailingList(#[from] MailingListError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    geo: GeoClient,
    stripe: StripeClient,
    slack: Option<SlackClient>,
    mailing_list: Option<MailingListClient>,
    orders: OrderStore,
    analytics: AnalyticsTracker,
}

impl AppState {
    /// Create the application state and its service clients.
    ///
    /// Slack and the mailing list are optional; without configuration their
    /// notifications and subscriptions are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let geo = GeoClient::new(&config.geo)?;
        let stripe = StripeClient::new(&config.stripe)?;
        let slack = config.slack.as_ref().map(SlackClient::new).transpose()?;
        let mailing_list = config
            .mailing_list
            .as_ref()
            .map(MailingListClient::new)
            .transpose()?;

        if slack.is_none() {
            tracing::warn!("SLACK_WEBHOOK_URL not set, notifications disabled");
        }
        if mailing_list.is_none() {
            tracing::warn!("MAILERLITE_API_KEY not set, newsletter sign-ups are not forwarded");
        }

        let analytics = AnalyticsTracker::new(slack.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                geo,
                stripe,
                slack,
                mailing_list,
                orders: OrderStore::new(),
                analytics,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn geo(&self) -> &GeoClient {
        &self.inner.geo
    }

    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Slack client, when a webhook is configured.
    #[must_use]
    pub fn slack(&self) -> Option<&SlackClient> {
        self.inner.slack.as_ref()
    }

    /// Mailing list client, when an API key is configured.
    #[must_use]
    pub fn mailing_list(&self) -> Option<&MailingListClient> {
        self.inner.mailing_list.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }

    #[must_use]
    pub fn analytics(&self) -> &AnalyticsTracker {
        &self.inner.analytics
    }
}
