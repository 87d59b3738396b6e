#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::Catalog;
use crate::domain::models::CatalogSource;
use crate::domain::models::CatalogSourceName;

pub struct HttpCatalog {
    url: String,
}

impl HttpCatalog {
    pub fn new(url: &str) -> HttpCatalog {
        return HttpCatalog {
            url: url.to_string(),
        };
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    fn name(&self) -> CatalogSourceName {
        return CatalogSourceName::Http;
    }

    #[allow(clippy::implicit_return)]
    async fn load(&self) -> Result<Catalog> {
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), url = self.url, "Failed to fetch catalog");
            bail!(format!("Catalog request failed with status {}", res.status().as_u16()));
        }

        let payload = res.text().await?;
        return Catalog::parse(&payload);
    }
}
