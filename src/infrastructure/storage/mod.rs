pub mod file;
#[cfg(test)]
pub mod memory;

use std::path;

use crate::domain::models::KeyValueStoreBox;

pub struct StorageManager {}

impl StorageManager {
    pub fn get(state_dir: &str) -> KeyValueStoreBox {
        return Box::new(file::FileStore::new(path::PathBuf::from(state_dir)));
    }
}
