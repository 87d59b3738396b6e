use anyhow::Result;

/// Durable key-value slots used to keep state across restarts.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore + Send + Sync>;
