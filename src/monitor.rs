//! Fetch, record and announce a single rate observation.
use crate::core::{
    CurrencyPair, FetchError, HistoryBuffer, HistoryStore, Notification, Notifier, Observation,
    RateProvider, Trend,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("no rate available: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to persist rate history: {0:#}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshOutcome {
    pub observation: Observation,
    pub previous: Option<f64>,
    pub trend: Trend,
}

/// Owns the history for one currency pair. The history lock is held for the
/// whole refresh, so only one fetch is ever in flight.
pub struct RateMonitor {
    pair: CurrencyPair,
    provider: Arc<dyn RateProvider>,
    notifier: Arc<dyn Notifier>,
    history: Mutex<HistoryStore>,
}

impl RateMonitor {
    pub fn new(
        pair: CurrencyPair,
        provider: Arc<dyn RateProvider>,
        notifier: Arc<dyn Notifier>,
        history: HistoryStore,
    ) -> Self {
        Self {
            pair,
            provider,
            notifier,
            history: Mutex::new(history),
        }
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    #[instrument(name = "Refresh", skip(self), fields(pair = %self.pair))]
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let mut history = self.history.lock().await;

        let rate = match self
            .provider
            .fetch_rate(&self.pair.from, &self.pair.to)
            .await
        {
            Ok(rate) => rate,
            Err(e) => {
                warn!("Rate fetch failed: {}", e);
                return Err(e.into());
            }
        };

        let previous = history.buffer().latest();
        let observation = history.append(rate);
        history.save()?;
        info!(index = observation.index, rate, "Recorded new rate");

        let notification = Notification::rate_update(&self.pair, rate);
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!("Failed to deliver notification: {:#}", e);
        }

        Ok(RefreshOutcome {
            observation,
            previous,
            trend: Trend::between(rate, previous),
        })
    }

    /// A copy of the current history.
    pub async fn snapshot(&self) -> HistoryBuffer {
        self.history.lock().await.buffer().clone()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::core::KeyValueStore;
    use crate::core::history::RATES_KEY;
    use crate::store::memory::MemoryStore;

    fn monitor_with(
        provider: Arc<ScriptedProvider>,
        notifier: Arc<RecordingNotifier>,
        store: Arc<dyn KeyValueStore>,
    ) -> RateMonitor {
        let history = HistoryStore::load(store, 30).unwrap();
        RateMonitor::new(
            CurrencyPair::new("BRL", "COP").unwrap(),
            provider,
            notifier,
            history,
        )
    }

    #[tokio::test]
    async fn test_refresh_appends_saves_and_notifies() {
        let provider = Arc::new(ScriptedProvider::new([Some(727.4)]));
        let notifier = Arc::new(RecordingNotifier::default());
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let monitor = monitor_with(provider, Arc::clone(&notifier), Arc::clone(&store));

        let outcome = monitor.refresh().await.unwrap();
        assert_eq!(outcome.observation, Observation { index: 4, rate: 727.4 });
        assert_eq!(outcome.previous, Some(730.0));
        assert_eq!(outcome.trend, Trend::Down);

        let saved: Vec<f64> =
            serde_json::from_slice(&store.get(RATES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, vec![700.0, 715.0, 730.0, 727.4]);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "1 BRL is now worth 727.40 COP.");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_history_untouched() {
        let provider = Arc::new(ScriptedProvider::new([None::<f64>]));
        let notifier = Arc::new(RecordingNotifier::default());
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let monitor = monitor_with(provider, Arc::clone(&notifier), Arc::clone(&store));

        let result = monitor.refresh().await;
        assert!(matches!(
            result,
            Err(RefreshError::Fetch(FetchError::MissingRates))
        ));
        assert_eq!(monitor.snapshot().await.rates(), vec![700.0, 715.0, 730.0]);
        assert!(store.get(RATES_KEY).unwrap().is_none());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifier_failure_keeps_observation() {
        let provider = Arc::new(ScriptedProvider::new([Some(740.0)]));
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let monitor = monitor_with(provider, notifier, store);

        let outcome = monitor.refresh().await.unwrap();
        assert_eq!(outcome.trend, Trend::Up);
        assert_eq!(monitor.snapshot().await.latest(), Some(740.0));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_are_serialized() {
        let provider = Arc::new(ScriptedProvider::new([Some(1.0), Some(2.0), Some(3.0)]));
        let notifier = Arc::new(RecordingNotifier::default());
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let monitor = Arc::new(monitor_with(Arc::clone(&provider), notifier, store));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move { monitor.refresh().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = monitor.snapshot().await;
        let indices: Vec<u64> = snapshot.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(&snapshot.rates()[3..], &[1.0, 2.0, 3.0]);
    }
}
