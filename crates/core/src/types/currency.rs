//! Display currencies and base-currency conversion.
//!
//! All prices are stored and charged in the base currency (AED). Other
//! currencies exist for display only: amounts are converted with a fixed rate
//! and rendered according to a per-currency convention.
//!
//! ```
//! use noor_core::{Currency, CurrencyCode};
//! use rust_decimal::Decimal;
//!
//! let usd = Currency::get(CurrencyCode::USD);
//! assert_eq!(usd.format(Decimal::new(1000, 0)), "$270.00");
//!
//! let aed = Currency::get(CurrencyCode::AED);
//! assert_eq!(aed.format(Decimal::new(1250, 0)), "1,250.00 AED");
//! ```

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 codes of the supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    AED,
    SAR,
    QAR,
    USD,
    EUR,
    GBP,
    KWD,
    BHD,
    OMR,
}

impl CurrencyCode {
    /// Every supported currency, base currency first.
    pub const ALL: [Self; 9] = [
        Self::AED,
        Self::SAR,
        Self::QAR,
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::KWD,
        Self::BHD,
        Self::OMR,
    ];

    /// The currency every price is stored and charged in.
    pub const BASE: Self = Self::AED;

    /// The ISO code as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AED => "AED",
            Self::SAR => "SAR",
            Self::QAR => "QAR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::KWD => "KWD",
            Self::BHD => "BHD",
            Self::OMR => "OMR",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a currency code is not in the catalog.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for CurrencyCode {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| ParseCurrencyError(s.to_string()))
    }
}

/// Where the symbol goes when rendering an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyStyle {
    /// `1,250.00 AED` - grouped thousands, symbol after the number.
    Suffix,
    /// `$270.00` - symbol before the number, no grouping.
    Prefix,
}

/// A display currency with its fixed conversion rate from the base currency.
///
/// `price_in_base * rate = price_in_currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub code: CurrencyCode,
    pub symbol: &'static str,
    pub display_name: &'static str,
    pub rate: Decimal,
    pub style: CurrencyStyle,
}

const fn rate(units: u32, scale: u32) -> Decimal {
    Decimal::from_parts(units, 0, 0, false, scale)
}

static CATALOG: [Currency; 9] = [
    Currency {
        code: CurrencyCode::AED,
        symbol: "AED",
        display_name: "UAE Dirham",
        rate: rate(1, 0),
        style: CurrencyStyle::Suffix,
    },
    Currency {
        code: CurrencyCode::SAR,
        symbol: "SAR",
        display_name: "Saudi Riyal",
        rate: rate(102, 2),
        style: CurrencyStyle::Suffix,
    },
    Currency {
        code: CurrencyCode::QAR,
        symbol: "QAR",
        display_name: "Qatari Riyal",
        rate: rate(99, 2),
        style: CurrencyStyle::Suffix,
    },
    Currency {
        code: CurrencyCode::USD,
        symbol: "$",
        display_name: "US Dollar",
        rate: rate(27, 2),
        style: CurrencyStyle::Prefix,
    },
    Currency {
        code: CurrencyCode::EUR,
        symbol: "€",
        display_name: "Euro",
        rate: rate(25, 2),
        style: CurrencyStyle::Prefix,
    },
    Currency {
        code: CurrencyCode::GBP,
        symbol: "£",
        display_name: "British Pound",
        rate: rate(21, 2),
        style: CurrencyStyle::Prefix,
    },
    Currency {
        code: CurrencyCode::KWD,
        symbol: "KD",
        display_name: "Kuwaiti Dinar",
        rate: rate(83, 3),
        style: CurrencyStyle::Prefix,
    },
    Currency {
        code: CurrencyCode::BHD,
        symbol: "BD",
        display_name: "Bahraini Dinar",
        rate: rate(10, 2),
        style: CurrencyStyle::Prefix,
    },
    Currency {
        code: CurrencyCode::OMR,
        symbol: "OMR",
        display_name: "Omani Rial",
        rate: rate(10, 2),
        style: CurrencyStyle::Prefix,
    },
];

impl Currency {
    /// Look up the catalog entry for a code.
    #[must_use]
    pub fn get(code: CurrencyCode) -> &'static Self {
        CATALOG
            .iter()
            .find(|c| c.code == code)
            .unwrap_or(&CATALOG[0])
    }

    /// The full catalog, base currency first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &CATALOG
    }

    /// Convert a base-currency amount, rounded to two decimal places.
    #[must_use]
    pub fn convert(&self, amount_in_base: Decimal) -> Decimal {
        (amount_in_base * self.rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Convert and render a base-currency amount for display.
    #[must_use]
    pub fn format(&self, amount_in_base: Decimal) -> String {
        let converted = self.convert(amount_in_base);
        match self.style {
            CurrencyStyle::Suffix => format!("{} {}", group_thousands(converted), self.symbol),
            CurrencyStyle::Prefix => {
                let separator = if self.symbol.chars().all(char::is_alphabetic) {
                    " "
                } else {
                    ""
                };
                format!("{}{separator}{converted:.2}", self.symbol)
            }
        }
    }
}

/// Pick the display currency at startup.
///
/// A choice the visitor made earlier always wins over a geo-detected
/// suggestion; with neither, the base currency is used.
#[must_use]
pub fn resolve_currency(
    persisted: Option<CurrencyCode>,
    suggested: Option<CurrencyCode>,
) -> CurrencyCode {
    persisted.or(suggested).unwrap_or(CurrencyCode::BASE)
}

/// Render with two decimals and comma-grouped thousands.
fn group_thousands(value: Decimal) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((&rendered, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}
