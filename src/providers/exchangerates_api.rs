use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::rate::{FetchError, RateProvider, cross_rate};

/// Fetches quotes from an exchangeratesapi.io style `latest` endpoint and
/// derives the cross rate from them.
pub struct ExchangeRatesApiProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

impl ExchangeRatesApiProvider {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("cambio/0.1")
            .build()?;
        Ok(ExchangeRatesApiProvider {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
            client,
        })
    }

    fn request_url(&self, from: &str, to: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("access_key", &self.access_key);
        // codes are plain ASCII letters; the comma stays literal
        let query = format!("{}&symbols={from},{to}", url.query().unwrap_or_default());
        url.set_query(Some(&query));
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: Option<bool>,
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<serde_json::Value>,
    info: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl ApiError {
    fn describe(&self) -> String {
        let text = self
            .info
            .clone()
            .or_else(|| self.kind.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        match &self.code {
            Some(code) => format!("{text} (code {code})"),
            None => text,
        }
    }
}

fn parse_rates(from: &str, to: &str, body: &str) -> Result<f64, FetchError> {
    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    let data: LatestRatesResponse = serde_json::from_str(body)?;

    if data.success == Some(false) {
        let info = data
            .error
            .map(|e| e.describe())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(FetchError::Api(info));
    }

    let rates = data.rates.ok_or(FetchError::MissingRates)?;
    debug!(base = ?data.base, quotes = rates.len(), "Received quotes");
    for code in [from, to] {
        if !rates.contains_key(code) {
            return Err(FetchError::MissingCurrency(code.to_string()));
        }
    }
    cross_rate(from, to, &rates).ok_or_else(|| FetchError::MissingCurrency(from.to_string()))
}

#[async_trait]
impl RateProvider for ExchangeRatesApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64, FetchError> {
        let url = self.request_url(from, to)?;
        debug!("Requesting quotes from {}", url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().await?;
        let rate = parse_rates(from, to, &text)?;
        debug!(rate, "Derived cross rate");
        Ok(rate)
    }
}
