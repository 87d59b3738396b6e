pub mod embedded;
pub mod file;
pub mod http;

use crate::domain::models::CatalogSourceBox;
use crate::domain::models::CatalogSourceName;

pub struct CatalogManager {}

impl CatalogManager {
    pub fn get(location: &str) -> CatalogSourceBox {
        match CatalogSourceName::from_location(location) {
            CatalogSourceName::Embedded => return Box::<embedded::EmbeddedCatalog>::default(),
            CatalogSourceName::File => return Box::new(file::FileCatalog::new(location)),
            CatalogSourceName::Http => return Box::new(http::HttpCatalog::new(location)),
        }
    }
}
