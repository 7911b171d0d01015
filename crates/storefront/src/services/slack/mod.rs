//! Slack notifications for storefront activity.
//!
//! This module provides:
//! - [`SlackClient`] for posting to an incoming webhook
//! - Block Kit types for building rich messages
//! - Message builders for contact requests, subscriptions, orders and
//!   visitor activity

mod client;
mod error;
mod messages;
mod types;

pub use client::SlackClient;
pub use error::SlackError;
pub use messages::{
    build_contact_message, build_newsletter_message, build_order_message,
    build_visitor_message,
};
pub use types::{Block, ContextElement, PlainText, Text, WebhookMessage};
