//! Session-stored visitor state.
//!
//! Everything a returning visitor keeps between visits lives in their
//! session under one of the [`keys`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use noor_core::{CurrencyCode, Language};

/// Locale decision cached after the first geolocation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedLocale {
    pub country_code: Option<String>,
    pub language: Language,
    pub currency: CurrencyCode,
    pub detected_at: DateTime<Utc>,
}

/// Visitor's answer to the cookie banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieConsent {
    Accepted,
    Declined,
}

/// Session keys for visitor data.
pub mod keys {
    /// Cart lines.
    pub const CART: &str = "cart";

    /// Saved wishlist entries.
    pub const WISHLIST: &str = "wishlist";

    /// Selected display currency code.
    pub const CURRENCY: &str = "currency";

    /// Durable anonymous visitor id.
    pub const VISITOR_ID: &str = "visitor_id";

    /// Number of analytics sessions started by this visitor.
    pub const VISIT_COUNT: &str = "visit_count";

    /// Timestamp of the first recorded visit.
    pub const FIRST_VISIT: &str = "first_visit";

    /// Set once the visitor has answered the locale popup.
    pub const LOCALE_POPUP_DISMISSED: &str = "locale_popup_dismissed";

    /// Cached [`super::DetectedLocale`].
    pub const DETECTED_LOCALE: &str = "detected_locale";

    /// Cookie banner answer.
    pub const COOKIE_CONSENT: &str = "cookie_consent";
}
