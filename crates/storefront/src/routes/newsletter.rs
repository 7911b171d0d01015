//! Newsletter subscription route handler.
//!
//! The address goes to `MailerLite` and the team is told on Slack either
//! way. A mailing-list failure does not fail the request; the response says
//! what happened.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use noor_core::Email;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::slack::build_newsletter_message;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingListStatus {
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub mailing_list: MailingListStatus,
}

/// POST /api/subscribe
#[instrument(skip(state, body), fields(email_domain))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<Json<SubscribeResponse>> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?
        .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_string()))?;
    tracing::Span::current().record("email_domain", email.domain());

    let status = match state.mailing_list() {
        Some(client) => match client.subscribe(&email).await {
            Ok(subscription) => {
                tracing::info!(
                    group_assigned = subscription.group_assigned,
                    "Newsletter subscriber added"
                );
                MailingListStatus {
                    subscribed: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mailing list subscription failed");
                MailingListStatus {
                    subscribed: false,
                    error: Some(e.to_string()),
                }
            }
        },
        None => MailingListStatus {
            subscribed: false,
            error: Some("Mailing list is not configured".to_string()),
        },
    };

    if let Some(slack) = state.slack() {
        let label = if status.subscribed { "subscribed" } else { "not subscribed" };
        slack.post_in_background(
            format!("New newsletter subscriber: {email}"),
            build_newsletter_message(&email, label),
        );
    }

    add_breadcrumb("newsletter", "Newsletter sign-up", &[("domain", email.domain())]);
    Ok(Json(SubscribeResponse {
        success: true,
        mailing_list: status,
    }))
}
