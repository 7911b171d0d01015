//! Price conversion from the base currency.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use noor_core::{Currency, CurrencyCode, ParseCurrencyError};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Currency(#[from] ParseCurrencyError),
}

/// Format an AED `amount` in each of `codes`, or every currency when empty.
pub fn run(amount: &str, codes: &[String]) -> Result<(), ConvertError> {
    let amount =
        Decimal::from_str(amount.trim())
            .map_err(|_| ConvertError::InvalidAmount(amount.to_owned()))?;

    let currencies: Vec<&Currency> = if codes.is_empty() {
        Currency::all().iter().collect()
    } else {
        codes
            .iter()
            .map(|code| CurrencyCode::from_str(code).map(Currency::get))
            .collect::<Result<_, _>>()?
    };

    for line in render(amount, &currencies) {
        #[allow(clippy::print_stdout)]
        {
            println!("{line}");
        }
    }
    Ok(())
}

fn render(amount: Decimal, currencies: &[&Currency]) -> Vec<String> {
    currencies
        .iter()
        .map(|c| format!("{:<4} {}", c.code.as_str(), c.format(amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_base_currency() {
        let lines = render(Decimal::new(450, 0), &[Currency::get(CurrencyCode::BASE)]);
        assert_eq!(lines.len(), 1);
        assert!(lines.first().is_some_and(|l| l.starts_with("AED")));
    }

    #[test]
    fn test_rejects_bad_amount() {
        assert!(matches!(
            run("lots", &[]),
            Err(ConvertError::InvalidAmount(_))
        ));
        assert!(matches!(
            run("10", &["XYZ".to_string()]),
            Err(ConvertError::Currency(_))
        ));
    }
}
