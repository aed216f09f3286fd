//! Notification boundary. Delivery and permissions belong to the platform.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::core::rate::CurrencyPair;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn rate_update(pair: &CurrencyPair, rate: f64) -> Self {
        Self {
            title: "Exchange rate update".to_string(),
            body: format!("1 {} is now worth {:.2} {}.", pair.from, rate, pair.to),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Emits notifications as tracing events.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(title = %notification.title, "{}", notification.body);
        Ok(())
    }
}
