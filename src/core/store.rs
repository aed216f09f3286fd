//! Key-value persistence abstraction

use anyhow::Result;

/// A minimal byte-oriented get/set store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Writes all entries or none of them.
    fn set_many(&self, entries: &[(&str, &[u8])]) -> Result<()>;
}
