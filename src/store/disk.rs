use crate::core::store::KeyValueStore;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "history";

/// Key-value store backed by a fjall keyspace.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open history partition")?;
        debug!("Opened disk store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl KeyValueStore for DiskStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .partition
            .get(key)
            .with_context(|| format!("Failed to read key {key}"))?;
        debug!(key, hit = value.is_some(), "Disk store GET");
        Ok(value.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.partition
            .insert(key, value)
            .with_context(|| format!("Failed to write key {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist journal")?;
        debug!(key, "Disk store SET");
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &[u8])]) -> Result<()> {
        let mut batch = self.keyspace.batch();
        for &(key, value) in entries {
            batch.insert(&self.partition, key, value);
        }
        batch.commit().context("Failed to commit write batch")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist journal")?;
        debug!(count = entries.len(), "Disk store batch SET");
        Ok(())
    }
}
