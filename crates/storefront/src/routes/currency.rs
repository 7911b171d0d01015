//! Display currency selection.
//!
//! Conversion is display-only. The selection persists in the visitor session
//! and beats whatever the geolocation suggested.

use std::str::FromStr;

use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use noor_core::{Currency, CurrencyCode, resolve_currency};

use crate::error::{AppError, Result};
use crate::models::DetectedLocale;
use crate::models::session::keys;
use crate::storage::Storage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyView {
    pub code: CurrencyCode,
    pub symbol: &'static str,
    pub name: &'static str,
    pub rate: Decimal,
}

impl From<&Currency> for CurrencyView {
    fn from(currency: &Currency) -> Self {
        Self {
            code: currency.code,
            symbol: currency.symbol,
            name: currency.display_name,
            rate: currency.rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    pub selected: CurrencyCode,
    pub base: CurrencyCode,
    pub currencies: Vec<CurrencyView>,
}

#[derive(Debug, Deserialize)]
pub struct SetCurrencyRequest {
    pub code: String,
}

/// Display currency for this visitor: persisted choice, else the detected
/// suggestion, else the base currency.
pub async fn selected_currency<S: Storage>(storage: &S) -> CurrencyCode {
    let persisted = storage
        .fetch::<CurrencyCode>(keys::CURRENCY)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read currency preference");
            None
        });
    let detected = storage
        .fetch::<DetectedLocale>(keys::DETECTED_LOCALE)
        .await
        .ok()
        .flatten()
        .map(|locale| locale.currency);

    resolve_currency(persisted, detected)
}

fn response(selected: CurrencyCode) -> CurrencyResponse {
    CurrencyResponse {
        selected,
        base: CurrencyCode::BASE,
        currencies: Currency::all().iter().map(CurrencyView::from).collect(),
    }
}

/// GET /api/currency
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CurrencyResponse> {
    Json(response(selected_currency(&session).await))
}

/// POST /api/currency
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(body): Json<SetCurrencyRequest>,
) -> Result<Json<CurrencyResponse>> {
    let code = CurrencyCode::from_str(&body.code)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    session.put(keys::CURRENCY, &code).await?;
    tracing::debug!(currency = %code, "Currency preference saved");

    Ok(Json(response(code)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use noor_core::Language;

    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn test_defaults_to_base() {
        assert_eq!(selected_currency(&MemoryStorage::new()).await, CurrencyCode::AED);
    }

    #[tokio::test]
    async fn test_persisted_beats_detected() {
        let storage = MemoryStorage::new();
        storage
            .put(
                keys::DETECTED_LOCALE,
                &DetectedLocale {
                    country_code: Some("SA".to_string()),
                    language: Language::Ar,
                    currency: CurrencyCode::SAR,
                    detected_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(selected_currency(&storage).await, CurrencyCode::SAR);

        storage.put(keys::CURRENCY, &CurrencyCode::USD).await.unwrap();
        assert_eq!(selected_currency(&storage).await, CurrencyCode::USD);
    }
}
