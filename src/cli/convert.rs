use super::ui;
use crate::core::rate::{self, CurrencyPair, RateProvider};
use anyhow::{Result, anyhow};
use tracing::warn;

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub pair: CurrencyPair,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
}

impl Conversion {
    pub fn display(&self) -> String {
        format!(
            "{:.2} {} = {} {}",
            self.amount,
            self.pair.from,
            ui::style_text(&format!("{:.2}", self.converted), ui::StyleType::TotalValue),
            self.pair.to
        )
    }
}

/// Fetches the current rate for `pair` and converts `amount` with it.
///
/// Failures are reported to the user with a fixed message; the cause is
/// only logged.
pub async fn convert_amount(
    provider: &dyn RateProvider,
    pair: &CurrencyPair,
    amount: f64,
) -> Result<Conversion> {
    if let Err(e) = rate::validate_amount(amount) {
        warn!("{}", e);
        return Err(anyhow!("invalid value"));
    }

    let pb = ui::new_spinner(&format!("Fetching {pair} rate..."));
    let fetched = provider.fetch_rate(&pair.from, &pair.to).await;
    pb.finish_and_clear();

    let rate = fetched.map_err(|e| {
        warn!("Rate fetch for {} failed: {}", pair, e);
        anyhow!("conversion error")
    })?;
    let converted = rate::convert(amount, rate).map_err(|_| anyhow!("invalid value"))?;

    Ok(Conversion {
        pair: pair.clone(),
        amount,
        rate,
        converted,
    })
}

pub async fn run(provider: &dyn RateProvider, pair: &CurrencyPair, amount: f64) -> Result<()> {
    match convert_amount(provider, pair, amount).await {
        Ok(conversion) => {
            println!("{}", conversion.display());
            println!(
                "{}",
                ui::style_text(
                    &format!("1 {} = {:.4} {}", pair.from, conversion.rate, pair.to),
                    ui::StyleType::Subtle
                )
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            Err(e)
        }
    }
}
