use anyhow::Result;
use async_trait::async_trait;
use strum::EnumVariantNames;

use super::Catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CatalogSourceName {
    Embedded,
    File,
    Http,
}

impl CatalogSourceName {
    pub fn from_location(location: &str) -> CatalogSourceName {
        if location.is_empty() {
            return CatalogSourceName::Embedded;
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            return CatalogSourceName::Http;
        }

        return CatalogSourceName::File;
    }
}

#[async_trait]
pub trait CatalogSource {
    fn name(&self) -> CatalogSourceName;

    /// Loads the full catalog. Called again on every category change, sources
    /// are not expected to cache.
    async fn load(&self) -> Result<Catalog>;
}

pub type CatalogSourceBox = Box<dyn CatalogSource + Send + Sync>;
