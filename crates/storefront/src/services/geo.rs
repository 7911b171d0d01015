//! IP geolocation and locale suggestion.
//!
//! Looks up a visitor's country through an ipapi-style JSON API and maps it
//! to a suggested language and display currency. Lookups are best effort:
//! every failure is logged and reported as "no data", and the storefront
//! keeps its defaults.
//!
//! Successful lookups are cached per IP for an hour.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use noor_core::{
    CurrencyCode, Language, currency_for_country, language_for_country, resolve_currency,
    should_show_locale_confirm_popup,
};

use crate::config::GeoConfig;
use crate::models::DetectedLocale;

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const CACHE_CAPACITY: u64 = 10_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cache key used when looking up the caller's own address.
const SELF_LOOKUP_KEY: &str = "self";

/// Errors from the geolocation API.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}")]
    Status { status: u16 },

    #[error("lookup rejected: {0}")]
    Rejected(String),

    #[error("response has no country")]
    MissingCountry,

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw ipapi response body.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    ip: Option<String>,
    city: Option<String>,
    country_code: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Geolocation result with locale suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoResult {
    pub country_code: String,
    pub country_name: String,
    pub city: Option<String>,
    pub ip: Option<String>,
    pub suggested_language: Language,
    pub suggested_currency: CurrencyCode,
}

impl GeoResult {
    fn from_response(body: IpApiResponse) -> Result<Self, GeoError> {
        if body.error {
            return Err(GeoError::Rejected(
                body.reason.unwrap_or_else(|| "unknown".to_string()),
            ));
        }

        let country_code = body
            .country_code
            .map(|code| code.trim().to_ascii_uppercase())
            .filter(|code| !code.is_empty())
            .ok_or(GeoError::MissingCountry)?;

        Ok(Self {
            suggested_language: language_for_country(&country_code),
            suggested_currency: currency_for_country(&country_code),
            country_name: body.country_name.unwrap_or_else(|| country_code.clone()),
            country_code,
            city: body.city.filter(|city| !city.is_empty()),
            ip: body.ip,
        })
    }
}

/// What the storefront should show a visitor for language and currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleSuggestion {
    pub language: Language,
    pub currency: CurrencyCode,
    pub country_code: Option<String>,
    pub show_popup: bool,
}

impl LocaleSuggestion {
    /// Combine a detection with the visitor's persisted choices.
    ///
    /// A persisted currency wins over the detected one, and the popup is
    /// offered only once per visitor.
    #[must_use]
    pub fn resolve(
        detected: &DetectedLocale,
        persisted_currency: Option<CurrencyCode>,
        popup_dismissed: bool,
    ) -> Self {
        Self {
            language: detected.language,
            currency: resolve_currency(persisted_currency, Some(detected.currency)),
            country_code: detected.country_code.clone(),
            show_popup: !popup_dismissed && should_show_locale_confirm_popup(detected.language),
        }
    }
}

impl DetectedLocale {
    /// Record a lookup result; no result records the defaults.
    #[must_use]
    pub fn from_geo(geo: Option<&GeoResult>, now: DateTime<Utc>) -> Self {
        Self {
            country_code: geo.map(|g| g.country_code.clone()),
            language: geo.map(|g| g.suggested_language).unwrap_or_default(),
            currency: geo.map_or(CurrencyCode::BASE, |g| g.suggested_currency),
            detected_at: now,
        }
    }
}

/// Client for the geolocation API.
#[derive(Clone)]
pub struct GeoClient {
    inner: Arc<GeoClientInner>,
}

struct GeoClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, GeoResult>,
}

impl GeoClient {
    /// Create a new geolocation client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &GeoConfig) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(GeoClientInner {
                client,
                base_url: config.api_base.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Look up `ip`, or the caller's own address when `None`.
    ///
    /// Private and loopback addresses are never sent to the API.
    pub async fn fetch_geo_data(&self, ip: Option<IpAddr>) -> Option<GeoResult> {
        if ip.is_some_and(|addr| !is_public(addr)) {
            tracing::debug!(ip = ?ip, "Skipping geolocation for non-public address");
            return None;
        }

        let key = ip.map_or_else(|| SELF_LOOKUP_KEY.to_string(), |addr| addr.to_string());
        if let Some(cached) = self.inner.cache.get(&key).await {
            return Some(cached);
        }

        match self.lookup(ip).await {
            Ok(result) => {
                self.inner.cache.insert(key, result.clone()).await;
                Some(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, ip = ?ip, "Geolocation lookup failed");
                None
            }
        }
    }

    /// Single uncached request to the API.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, an unparseable
    /// body, an API-reported error, or a missing country.
    #[instrument(skip(self))]
    pub async fn lookup(&self, ip: Option<IpAddr>) -> Result<GeoResult, GeoError> {
        let url = match ip {
            Some(addr) => format!("{}/{addr}/json/", self.inner.base_url),
            None => format!("{}/json/", self.inner.base_url),
        };

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body: IpApiResponse = serde_json::from_str(&text)?;
        GeoResult::from_response(body)
    }
}

const fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}
