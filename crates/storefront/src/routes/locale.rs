//! Locale detection and the locale confirmation popup.
//!
//! Geolocation runs once per visitor session; the outcome (including "no
//! data") is cached under `detected_locale` so later requests never hit the
//! geolocation API again.

use std::str::FromStr;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::CurrencyCode;

use crate::error::{AppError, Result};
use crate::middleware::ClientIp;
use crate::models::session::keys;
use crate::models::{CookieConsent, DetectedLocale};
use crate::services::LocaleSuggestion;
use crate::state::AppState;
use crate::storage::Storage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleResponse {
    pub detected: DetectedLocale,
    pub suggestion: LocaleSuggestion,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissRequest {
    /// Currency the visitor accepted in the popup, if any.
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentBody {
    pub consent: Option<CookieConsent>,
}

async fn read_session_value<T, S>(storage: &S, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Storage,
{
    storage.fetch(key).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, key, "Failed to read session value");
        None
    })
}

/// GET /api/locale
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    session: Session,
) -> Json<LocaleResponse> {
    let cached =
        read_session_value::<DetectedLocale, _>(&session, keys::DETECTED_LOCALE).await;
    let detected = match cached {
        Some(detected) => detected,
        None => {
            let geo = match ip {
                Some(addr) => state.geo().fetch_geo_data(Some(addr)).await,
                None => None,
            };
            let detected = DetectedLocale::from_geo(geo.as_ref(), Utc::now());
            if let Err(e) = session.put(keys::DETECTED_LOCALE, &detected).await {
                tracing::warn!(error = %e, "Failed to cache detected locale");
            }
            detected
        }
    };

    let persisted_currency = read_session_value(&session, keys::CURRENCY).await;
    let dismissed = read_session_value(&session, keys::LOCALE_POPUP_DISMISSED)
        .await
        .unwrap_or(false);

    Json(LocaleResponse {
        suggestion: LocaleSuggestion::resolve(&detected, persisted_currency, dismissed),
        detected,
    })
}

/// POST /api/locale/dismiss
///
/// Records that the visitor answered the popup, saving the accepted currency
/// when one is given.
#[instrument(skip(session))]
pub async fn dismiss(session: Session, body: Option<Json<DismissRequest>>) -> Result<StatusCode> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    if let Some(code) = body.currency.as_deref() {
        let code =
            CurrencyCode::from_str(code).map_err(|e| AppError::BadRequest(e.to_string()))?;
        session.put(keys::CURRENCY, &code).await?;
    }
    session.put(keys::LOCALE_POPUP_DISMISSED, &true).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/consent
#[instrument(skip(session))]
pub async fn consent(session: Session) -> Json<ConsentBody> {
    Json(ConsentBody {
        consent: read_session_value(&session, keys::COOKIE_CONSENT).await,
    })
}

/// POST /api/consent
#[instrument(skip(session))]
pub async fn set_consent(session: Session, Json(body): Json<ConsentBody>) -> Result<StatusCode> {
    match body.consent {
        Some(consent) => session.put(keys::COOKIE_CONSENT, &consent).await?,
        None => session.evict(keys::COOKIE_CONSENT).await?,
    }
    Ok(StatusCode::NO_CONTENT)
}
