pub mod cli;
pub mod core;
pub mod monitor;
pub mod providers;
pub mod scheduler;
pub mod store;

use crate::core::config::{AppConfig, NotifierKind};
use crate::core::{CurrencyPair, HistoryStore, Notifier};
use anyhow::Result;
use monitor::RateMonitor;
use scheduler::Scheduler;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Convert an amount, optionally for a pair other than the configured one
    Convert {
        amount: f64,
        pair: Option<CurrencyPair>,
    },
    Refresh,
    History,
    Watch,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        pair = %config.pair,
        base_url = %config.provider.base_url,
        capacity = config.history.capacity,
        hours = ?config.schedule.hours,
        "Loaded config"
    );
    Ok(config)
}

fn build_provider(config: &AppConfig) -> Result<providers::ExchangeRatesApiProvider> {
    Ok(providers::ExchangeRatesApiProvider::new(
        &config.provider.base_url,
        &config.provider.access_key,
    )?)
}

fn build_notifier(kind: NotifierKind) -> Arc<dyn Notifier> {
    match kind {
        NotifierKind::Console => Arc::new(cli::notifier::ConsoleNotifier),
        NotifierKind::Log => Arc::new(crate::core::notify::LogNotifier),
    }
}

fn load_history(config: &AppConfig) -> Result<HistoryStore> {
    let store = store::open_default(config)?;
    HistoryStore::load(store, config.history.capacity)
}

/// Wires the provider, history and notifier described by `config`.
pub fn build_monitor(config: &AppConfig) -> Result<RateMonitor> {
    Ok(RateMonitor::new(
        config.pair.clone(),
        Arc::new(build_provider(config)?),
        build_notifier(config.notifier),
        load_history(config)?,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cambio starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Convert { amount, pair } => {
            let pair = pair.unwrap_or_else(|| config.pair.clone());
            let provider = build_provider(&config)?;
            cli::convert::run(&provider, &pair, amount).await
        }
        AppCommand::Refresh => {
            let monitor = build_monitor(&config)?;
            cli::refresh::run(&monitor).await
        }
        AppCommand::History => {
            let history = load_history(&config)?;
            cli::history::run(history.buffer(), &config.pair);
            Ok(())
        }
        AppCommand::Watch => {
            let monitor = Arc::new(build_monitor(&config)?);
            let scheduler = Scheduler::new(config.schedule.rule()?);
            cli::watch::run(monitor, scheduler, config.schedule.poll_interval()).await;
            Ok(())
        }
    }
}
