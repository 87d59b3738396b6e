use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;

/// In-process store. Clones share the same slots, which lets a caller keep a
/// handle for inspection after boxing one copy.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<DashMap<String, String>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with_slot(key: &str, value: &str) -> MemoryStore {
        let store = MemoryStore::default();
        store.slots.insert(key.to_string(), value.to_string());

        return store;
    }

    pub fn writes(&self) -> usize {
        return self.writes.load(Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.slots.get(key).map(|e| return e.value().to_string()));
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);

        return Ok(());
    }
}
