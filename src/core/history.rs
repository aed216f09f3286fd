//! Rolling history of observed rates.
use crate::core::store::KeyValueStore;
use anyhow::{Context, Result, bail};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

pub const RATES_KEY: &str = "history.rates";
pub const INDICES_KEY: &str = "history.indices";
pub const DEFAULT_CAPACITY: usize = 160;
const DEFAULT_SEED: [f64; 3] = [700.0, 715.0, 730.0];

/// A single observed rate and its position in the observation sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub index: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn between(current: f64, previous: Option<f64>) -> Self {
        match previous {
            Some(p) if current > p => Trend::Up,
            Some(p) if current < p => Trend::Down,
            _ => Trend::Flat,
        }
    }
}

/// Fixed-capacity FIFO of observations, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    entries: VecDeque<Observation>,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            bail!("History capacity must be greater than zero");
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        })
    }

    /// Buffer holding the default seed observations, trimmed to `capacity`.
    pub fn seeded(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new(capacity)?;
        for rate in DEFAULT_SEED {
            buffer.append(rate);
        }
        Ok(buffer)
    }

    fn from_entries(
        capacity: usize,
        entries: impl IntoIterator<Item = Observation>,
    ) -> Result<Self> {
        let mut buffer = Self::new(capacity)?;
        for entry in entries {
            buffer.push(entry);
        }
        Ok(buffer)
    }

    fn push(&mut self, entry: Observation) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Appends `rate` with the next sequence index and returns the stored
    /// observation.
    pub fn append(&mut self, rate: f64) -> Observation {
        let index = self.entries.back().map_or(1, |last| last.index + 1);
        let observation = Observation { index, rate };
        self.push(observation);
        observation
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.entries.iter().map(|o| o.rate).collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.entries.back().map(|o| o.rate)
    }

    pub fn previous(&self) -> Option<f64> {
        self.entries.iter().rev().nth(1).map(|o| o.rate)
    }

    pub fn trend(&self) -> Trend {
        match self.latest() {
            Some(latest) => Trend::between(latest, self.previous()),
            None => Trend::Flat,
        }
    }

    /// Lowest and highest stored rate.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.entries.iter().map(|o| o.rate).fold(None, |acc, r| match acc {
            None => Some((r, r)),
            Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
        })
    }
}

/// History buffer bound to a key-value store.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    buffer: HistoryBuffer,
}

impl HistoryStore {
    /// Restores the history from `store`, seeding defaults when nothing
    /// usable is persisted.
    pub fn load(store: Arc<dyn KeyValueStore>, capacity: usize) -> Result<Self> {
        let buffer = match read_persisted(store.as_ref())? {
            Some(entries) => {
                debug!(count = entries.len(), "Restored rate history");
                HistoryBuffer::from_entries(capacity, entries)?
            }
            None => {
                debug!("No rate history found, seeding defaults");
                HistoryBuffer::seeded(capacity)?
            }
        };
        Ok(Self { store, buffer })
    }

    pub fn append(&mut self, rate: f64) -> Observation {
        self.buffer.append(rate)
    }

    /// Writes both sequences in one atomic store write.
    pub fn save(&self) -> Result<()> {
        let rates: Vec<f64> = self.buffer.iter().map(|o| o.rate).collect();
        let indices: Vec<u64> = self.buffer.iter().map(|o| o.index).collect();
        let rates_json = serde_json::to_vec(&rates)?;
        let indices_json = serde_json::to_vec(&indices)?;
        self.store
            .set_many(&[
                (RATES_KEY, rates_json.as_slice()),
                (INDICES_KEY, indices_json.as_slice()),
            ])
            .with_context(|| format!("Failed to write {RATES_KEY} and {INDICES_KEY}"))?;
        debug!(count = rates.len(), "Saved rate history");
        Ok(())
    }

    pub fn buffer(&self) -> &HistoryBuffer {
        &self.buffer
    }
}

fn read_persisted(store: &dyn KeyValueStore) -> Result<Option<Vec<Observation>>> {
    let (Some(rates), Some(indices)) = (store.get(RATES_KEY)?, store.get(INDICES_KEY)?) else {
        return Ok(None);
    };
    let decoded = serde_json::from_slice::<Vec<f64>>(&rates)
        .and_then(|r| serde_json::from_slice::<Vec<u64>>(&indices).map(|i| (r, i)));
    match decoded {
        Ok((rates, indices)) if rates.len() == indices.len() => Ok(Some(
            indices
                .into_iter()
                .zip(rates)
                .map(|(index, rate)| Observation { index, rate })
                .collect(),
        )),
        Ok((rates, indices)) => {
            // rates are the observations; indices only number them
            warn!(
                rates = rates.len(),
                indices = indices.len(),
                "Persisted history sequences differ in length, renumbering rates"
            );
            let first = indices.first().copied().unwrap_or(1);
            Ok(Some(
                (first..)
                    .zip(rates)
                    .map(|(index, rate)| Observation { index, rate })
                    .collect(),
            ))
        }
        Err(e) => {
            warn!("Persisted history is not readable, ignoring: {}", e);
            Ok(None)
        }
    }
}
