//! Contact form route handler.
//!
//! Submissions are relayed to Slack; nothing is stored.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use noor_core::Email;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::slack::build_contact_message;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5_000;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/contact
#[instrument(skip(state, form), fields(email_domain))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ContactResponse>> {
    let email = Email::parse(&form.email)
        .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_string()))?;
    tracing::Span::current().record("email_domain", email.domain());

    let name = form.name.trim();
    let message = form.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest(
            "Name and message are required.".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN || message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::BadRequest("Message is too long.".to_string()));
    }

    match state.slack() {
        Some(slack) => slack.post_in_background(
            format!("New contact message from {name}"),
            build_contact_message(
                name,
                &email,
                non_blank(form.phone.as_deref()),
                non_blank(form.subject.as_deref()),
                message,
            ),
        ),
        None => tracing::warn!("Contact message received but Slack is not configured"),
    }

    add_breadcrumb("contact", "Contact form submitted", &[("domain", email.domain())]);
    Ok(Json(ContactResponse { success: true }))
}
