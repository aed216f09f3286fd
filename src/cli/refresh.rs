use super::ui;
use crate::monitor::{RateMonitor, RefreshOutcome};
use anyhow::Result;

pub fn describe_outcome(monitor: &RateMonitor, outcome: &RefreshOutcome) -> String {
    let pair = monitor.pair();
    let rate = format!("{:.2} {}", outcome.observation.rate, pair.to);
    let change = match outcome.previous {
        Some(previous) => format!(
            " {} {:+.2}",
            ui::trend_arrow(outcome.trend),
            outcome.observation.rate - previous
        ),
        None => String::new(),
    };
    format!(
        "1 {} = {}{}",
        pair.from,
        ui::style_rate(&rate, outcome.trend),
        ui::style_text(&change, ui::StyleType::Subtle)
    )
}

/// Runs one fetch/record/notify cycle.
pub async fn run(monitor: &RateMonitor) -> Result<()> {
    let pb = ui::new_spinner(&format!("Fetching {} rate...", monitor.pair()));
    let result = monitor.refresh().await;
    pb.finish_and_clear();

    match result {
        Ok(outcome) => {
            println!("{}", describe_outcome(monitor, &outcome));
            Ok(())
        }
        Err(e) => {
            println!("{}", ui::style_text("conversion error", ui::StyleType::Error));
            Err(e.into())
        }
    }
}
