#[cfg(test)]
#[path = "embedded_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use rust_embed::RustEmbed;

use crate::domain::models::Catalog;
use crate::domain::models::CatalogSource;
use crate::domain::models::CatalogSourceName;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Catalog shipped inside the binary, used when no catalog is configured.
#[derive(Default)]
pub struct EmbeddedCatalog {}

#[async_trait]
impl CatalogSource for EmbeddedCatalog {
    fn name(&self) -> CatalogSourceName {
        return CatalogSourceName::Embedded;
    }

    #[allow(clippy::implicit_return)]
    async fn load(&self) -> Result<Catalog> {
        let file = Assets::get("products.json")
            .ok_or_else(|| return anyhow!("Embedded catalog is missing"))?;
        let payload = std::str::from_utf8(&file.data)?;

        return Catalog::parse(payload);
    }
}
