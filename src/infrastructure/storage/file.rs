#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io::Write;
use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::KeyValueStore;

/// Stores each key as `<dir>/<key>.json`.
pub struct FileStore {
    dir: path::PathBuf,
}

impl FileStore {
    pub fn new(dir: path::PathBuf) -> FileStore {
        return FileStore { dir };
    }

    fn get_file_path(&self, key: &str) -> Result<path::PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            bail!(format!("Invalid storage key {key}"));
        }

        return Ok(self.dir.join(format!("{key}.json")));
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.get_file_path(key)?;
        if !file_path.exists() {
            return Ok(None);
        }

        return Ok(Some(fs::read_to_string(file_path)?));
    }

    // Writes happen synchronously on every selection change, the payloads are
    // small enough that blocking the UI loop is not noticeable.
    fn write(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.get_file_path(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let tmp_path = file_path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(tmp_path, file_path)?;

        return Ok(());
    }
}
