#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;

use crate::domain::models::Catalog;
use crate::domain::models::CatalogSource;
use crate::domain::models::CatalogSourceName;

pub struct FileCatalog {
    path: String,
}

impl FileCatalog {
    pub fn new(path: &str) -> FileCatalog {
        return FileCatalog {
            path: path.to_string(),
        };
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> CatalogSourceName {
        return CatalogSourceName::File;
    }

    #[allow(clippy::implicit_return)]
    async fn load(&self) -> Result<Catalog> {
        let payload = fs::read_to_string(&self.path)
            .await
            .with_context(|| return format!("Failed to read catalog file {}", self.path))?;

        return Catalog::parse(&payload);
    }
}
