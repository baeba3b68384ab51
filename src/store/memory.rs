use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use anyhow::{anyhow, Result};

use super::KeyValueStore;

/// In-process store. Clones share the same map, so a test can hand one clone
/// to a session and inspect writes through another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        guard.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
