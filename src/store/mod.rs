pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::KeyValueStore;
use anyhow::Result;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the on-disk store under the configured data directory, falling back
/// to an in-memory store when the directory cannot be opened.
pub fn open_default(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    let path = config.data_dir()?.join("history");
    match DiskStore::open(&path) {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) => {
            warn!(
                "Could not open history store at {}, history will not be kept: {}",
                path.display(),
                e
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
