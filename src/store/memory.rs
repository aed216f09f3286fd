use crate::core::store::KeyValueStore;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory key-value store using HashMap and RwLock
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self
            .inner
            .read()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        let value = map.get(key).cloned();
        debug!(key, hit = value.is_some(), "Memory store GET");
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        debug!(key, "Memory store SET");
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &[u8])]) -> Result<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        for &(key, value) in entries {
            debug!(key, "Memory store SET");
            map.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }
}
