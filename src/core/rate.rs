//! Exchange rate abstractions and cross-rate arithmetic

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a rate could not be obtained. Callers treat all of them as
/// "no rate available"; the variant only matters for logging.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("empty response body")]
    EmptyBody,

    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API reported an error: {0}")]
    Api(String),

    #[error("response has no rates")]
    MissingRates,

    #[error("no usable quote for {0}")]
    MissingCurrency(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64, FetchError>;
}

/// Derives the `from -> to` rate from two quotes against a common reference
/// currency.
///
/// Returns `None` when either code is missing, when the `from` quote is zero
/// or not finite, or when the division does not produce a finite number.
pub fn cross_rate(from: &str, to: &str, quotes: &HashMap<String, f64>) -> Option<f64> {
    let from_quote = *quotes.get(from)?;
    let to_quote = *quotes.get(to)?;
    if from_quote == 0.0 || !from_quote.is_finite() {
        return None;
    }
    let rate = to_quote / from_quote;
    rate.is_finite().then_some(rate)
}

#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("invalid value: {0}")]
    InvalidAmount(f64),
}

/// Rejects negative, NaN and infinite amounts.
pub fn validate_amount(amount: f64) -> Result<f64, ConversionError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConversionError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Converts `amount` at `rate`, rounded to two decimal places.
pub fn convert(amount: f64, rate: f64) -> Result<f64, ConversionError> {
    let amount = validate_amount(amount)?;
    Ok((amount * rate * 100.0).round() / 100.0)
}

/// A pair of three-letter currency codes, stored upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPair")]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
struct RawPair {
    from: String,
    to: String,
}

impl TryFrom<RawPair> for CurrencyPair {
    type Error = anyhow::Error;

    fn try_from(raw: RawPair) -> Result<Self, Self::Error> {
        CurrencyPair::new(&raw.from, &raw.to)
    }
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> anyhow::Result<Self> {
        Ok(Self {
            from: parse_code(from)?,
            to: parse_code(to)?,
        })
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

impl FromStr for CurrencyPair {
    type Err = anyhow::Error;

    /// Accepts `BRL/COP`, `BRL-COP` or `BRLCOP`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (from, to) = match s.split_once(['/', '-']) {
            Some(parts) => parts,
            None if s.len() == 6 && s.is_ascii() => s.split_at(3),
            None => anyhow::bail!("Invalid currency pair: {}", s),
        };
        CurrencyPair::new(from, to)
    }
}

fn parse_code(code: &str) -> anyhow::Result<String> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!("Invalid currency code: {:?}", code);
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotes(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_cross_rate_divides_target_by_source() {
        let q = quotes(&[("BRL", 5.0), ("COP", 3637.0)]);
        let rate = cross_rate("BRL", "COP", &q).unwrap();
        assert!((rate - 727.4).abs() < 1e-9);

        let inverse = cross_rate("COP", "BRL", &q).unwrap();
        assert!((inverse - 5.0 / 3637.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_rate_missing_code() {
        let q = quotes(&[("BRL", 5.0)]);
        assert_eq!(cross_rate("BRL", "COP", &q), None);
        assert_eq!(cross_rate("COP", "BRL", &q), None);
        assert_eq!(cross_rate("USD", "EUR", &HashMap::new()), None);
    }

    #[test]
    fn test_cross_rate_same_code() {
        let q = quotes(&[("EUR", 1.0)]);
        assert_eq!(cross_rate("EUR", "EUR", &q), Some(1.0));
    }

    #[test]
    fn test_cross_rate_zero_source_quote() {
        let q = quotes(&[("BRL", 0.0), ("COP", 3637.0)]);
        assert_eq!(cross_rate("BRL", "COP", &q), None);

        let q = quotes(&[("BRL", f64::NAN), ("COP", 3637.0)]);
        assert_eq!(cross_rate("BRL", "COP", &q), None);
    }

    #[test]
    fn test_convert_rounds_to_cents() {
        assert_eq!(convert(100.0, 727.4), Ok(72740.0));
        assert_eq!(convert(1.0, 0.123456), Ok(0.12));
        assert_eq!(convert(0.0, 727.4), Ok(0.0));
    }

    #[test]
    fn test_convert_rejects_invalid_amounts() {
        assert_eq!(convert(-1.0, 2.0), Err(ConversionError::InvalidAmount(-1.0)));
        assert!(convert(f64::NAN, 2.0).is_err());
        assert!(convert(f64::INFINITY, 2.0).is_err());
        assert_eq!(
            convert(-1.0, 2.0).unwrap_err().to_string(),
            "invalid value: -1"
        );
    }

    #[test]
    fn test_currency_pair_parsing() {
        let pair: CurrencyPair = "brl/cop".parse().unwrap();
        assert_eq!(pair.from, "BRL");
        assert_eq!(pair.to, "COP");
        assert_eq!(pair.to_string(), "BRL/COP");

        assert_eq!("USD-EUR".parse::<CurrencyPair>().unwrap().to, "EUR");
        assert_eq!("usdeur".parse::<CurrencyPair>().unwrap().from, "USD");
        assert!("US/EUR".parse::<CurrencyPair>().is_err());
        assert!("USDEURO".parse::<CurrencyPair>().is_err());
        assert!("U1D/EUR".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_currency_pair_deserialization_validates() {
        let pair: CurrencyPair = serde_yaml::from_str("from: brl\nto: cop").unwrap();
        assert_eq!(pair, CurrencyPair::new("BRL", "COP").unwrap());

        let bad: Result<CurrencyPair, _> = serde_yaml::from_str("from: BRLX\nto: COP");
        assert!(bad.is_err());
    }
}
