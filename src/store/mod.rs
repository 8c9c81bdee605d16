pub mod disk;
pub mod memory;

use crate::core::kv::KeyValueCollection;
use anyhow::{Context, Result};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple collections.
///
/// Persistent collections live in a fjall keyspace, the rest in memory.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Arc<Keyspace>,
}

impl KeyValueStore {
    /// Opens (or creates) the keyspace under `data_path/store`.
    pub fn open(data_path: &Path) -> Result<Self> {
        let store_dir = data_path.join("store");
        std::fs::create_dir_all(&store_dir)
            .with_context(|| format!("Failed to create directory: {}", store_dir.display()))?;
        let keyspace = fjall::Config::new(&store_dir)
            .open()
            .with_context(|| format!("Failed to open store at {}", store_dir.display()))?;
        debug!("Opened store at {}", store_dir.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Arc::new(keyspace),
        })
    }

    /// Returns the collection called `name`, creating it on first use.
    pub fn get_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>> {
        if let Some(collection) = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(Arc::clone(collection));
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let collection: Arc<dyn KeyValueCollection> = if persist {
            let partition = self
                .keyspace
                .open_partition(name, PartitionCreateOptions::default())
                .with_context(|| format!("Failed to open collection: {name}"))?;
            Arc::new(DiskCollection::new(Arc::clone(&self.keyspace), partition))
        } else {
            Arc::new(MemoryCollection::new())
        };
        collections.insert(name.to_string(), Arc::clone(&collection));
        Ok(collection)
    }
}
