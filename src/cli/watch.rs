use super::refresh::describe_outcome;
use super::ui;
use crate::monitor::RateMonitor;
use crate::scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs scheduled refreshes until Ctrl-C.
pub async fn run(monitor: Arc<RateMonitor>, mut scheduler: Scheduler, poll_interval: Duration) {
    let hours: Vec<String> = scheduler.rule().hours().map(|h| format!("{h:02}:00")).collect();
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Watching {} on weekdays at {} (Ctrl-C to stop)",
                monitor.pair(),
                hours.join(", ")
            ),
            ui::StyleType::Subtle
        )
    );

    let on_fire = || {
        let monitor = Arc::clone(&monitor);
        async move {
            match monitor.refresh().await {
                Ok(outcome) => println!("{}", describe_outcome(&monitor, &outcome)),
                Err(e) => println!(
                    "{}",
                    ui::style_text(&format!("conversion error: {e}"), ui::StyleType::Error)
                ),
            }
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            info!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    scheduler.run(poll_interval, on_fire, shutdown).await;
}
