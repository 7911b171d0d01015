//! Slack-related errors.

use thiserror::Error;

/// Errors that can occur when posting to Slack.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed.
    #[error("Slack request failed: {0}")]
    Request(String),

    /// Webhook rejected the message.
    #[error("Slack webhook error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Configuration error.
    #[error("Slack configuration error: {0}")]
    Config(String),
}
