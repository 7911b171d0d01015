//! Supported languages and country-based locale suggestions.
//!
//! Country mappings are raw ISO 639-1 codes and may name languages the site is
//! not translated into; [`language_for_country`] folds those back to
//! [`DEFAULT_LANGUAGE`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::currency::CurrencyCode;

/// Languages the storefront is translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
    Ru,
    Zh,
}

/// Language used when nothing better is known.
pub const DEFAULT_LANGUAGE: Language = Language::En;

impl Language {
    /// Every supported language, default first.
    pub const ALL: [Self; 5] = [Self::En, Self::Ar, Self::Fr, Self::Ru, Self::Zh];

    /// ISO 639-1 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
            Self::Fr => "fr",
            Self::Ru => "ru",
            Self::Zh => "zh",
        }
    }

    /// Name of the language in the language itself.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ar => "العربية",
            Self::Fr => "Français",
            Self::Ru => "Русский",
            Self::Zh => "中文",
        }
    }

    /// Whether the language is written right-to-left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == lower)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

/// Error returned for a language code outside the supported set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

/// Country code -> raw language code.
const COUNTRY_LANGUAGES: &[(&str, &str)] = &[
    // Gulf and wider Arabic-speaking markets
    ("AE", "ar"),
    ("SA", "ar"),
    ("QA", "ar"),
    ("KW", "ar"),
    ("BH", "ar"),
    ("OM", "ar"),
    ("EG", "ar"),
    ("JO", "ar"),
    ("LB", "ar"),
    ("IQ", "ar"),
    ("MA", "ar"),
    ("DZ", "ar"),
    ("TN", "ar"),
    // French
    ("FR", "fr"),
    ("BE", "fr"),
    ("LU", "fr"),
    ("MC", "fr"),
    ("SN", "fr"),
    // Russian
    ("RU", "ru"),
    ("BY", "ru"),
    ("KZ", "ru"),
    // Chinese
    ("CN", "zh"),
    ("TW", "zh"),
    ("HK", "zh"),
    // Untranslated markets
    ("DE", "de"),
    ("AT", "de"),
    ("ES", "es"),
    ("IT", "it"),
    ("TR", "tr"),
    ("ID", "id"),
    ("MY", "ms"),
];

/// Country code -> display currency.
const COUNTRY_CURRENCIES: &[(&str, CurrencyCode)] = &[
    ("AE", CurrencyCode::AED),
    ("SA", CurrencyCode::SAR),
    ("QA", CurrencyCode::QAR),
    ("KW", CurrencyCode::KWD),
    ("BH", CurrencyCode::BHD),
    ("OM", CurrencyCode::OMR),
    ("US", CurrencyCode::USD),
    ("CA", CurrencyCode::USD),
    ("GB", CurrencyCode::GBP),
    ("FR", CurrencyCode::EUR),
    ("DE", CurrencyCode::EUR),
    ("BE", CurrencyCode::EUR),
    ("NL", CurrencyCode::EUR),
    ("LU", CurrencyCode::EUR),
    ("MC", CurrencyCode::EUR),
    ("AT", CurrencyCode::EUR),
    ("ES", CurrencyCode::EUR),
    ("IT", CurrencyCode::EUR),
    ("IE", CurrencyCode::EUR),
];

/// Raw language code for a country, if the country is mapped.
#[must_use]
pub fn raw_language_for_country(country_code: &str) -> Option<&'static str> {
    let upper = country_code.trim().to_ascii_uppercase();
    COUNTRY_LANGUAGES
        .iter()
        .find(|(country, _)| *country == upper)
        .map(|(_, lang)| *lang)
}

/// Suggested site language for a country.
///
/// Unmapped countries and mapped-but-untranslated languages both fall back
/// to [`DEFAULT_LANGUAGE`].
#[must_use]
pub fn language_for_country(country_code: &str) -> Language {
    raw_language_for_country(country_code)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Suggested display currency for a country, base currency when unmapped.
#[must_use]
pub fn currency_for_country(country_code: &str) -> CurrencyCode {
    let upper = country_code.trim().to_ascii_uppercase();
    COUNTRY_CURRENCIES
        .iter()
        .find(|(country, _)| *country == upper)
        .map_or(CurrencyCode::BASE, |(_, currency)| *currency)
}

/// Whether a detected language warrants the "stay in X or switch" prompt.
///
/// The default language never prompts.
#[must_use]
pub const fn should_show_locale_confirm_popup(detected: Language) -> bool {
    matches!(detected, Language::Ar | Language::Fr | Language::Ru)
}
