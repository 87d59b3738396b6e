#[cfg(test)]
#[path = "product_test.rs"]
mod tests;

use std::collections::HashSet;
use std::fmt;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

pub type ProductId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image: String,
    pub description: String,
}

impl Product {
    fn normalize(mut self) -> Option<Product> {
        self.name = self.name.trim().to_string();
        self.brand = self.brand.trim().to_string();
        self.category = self.category.trim().to_string();
        self.image = self.image.trim().to_string();
        self.description = self.description.trim().to_string();

        if self.name.is_empty() || self.category.is_empty() {
            return None;
        }

        return Some(self);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    None,
    Category(String),
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CategoryFilter::None => return write!(f, "none"),
            CategoryFilter::Category(category) => return write!(f, "{category}"),
        }
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    products: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Catalog {
        return Catalog { products };
    }

    /// Parses a `{ "products": [...] }` document. Entries that don't match the
    /// product schema are skipped, and duplicate ids keep the first entry.
    pub fn parse(payload: &str) -> Result<Catalog> {
        let doc = match serde_json::from_str::<CatalogDocument>(payload) {
            Ok(doc) => doc,
            Err(err) => bail!(format!("catalog is not a valid products document: {err}")),
        };

        let mut seen = HashSet::new();
        let mut products = vec![];
        for (idx, entry) in doc.products.into_iter().enumerate() {
            let product = match serde_json::from_value::<Product>(entry) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(index = idx, error = %err, "Skipping malformed catalog entry");
                    continue;
                }
            };

            let Some(product) = product.normalize() else {
                tracing::warn!(index = idx, "Skipping catalog entry without a name or category");
                continue;
            };

            if !seen.insert(product.id) {
                tracing::warn!(id = product.id, "Skipping duplicate catalog entry");
                continue;
            }

            products.push(product);
        }

        return Ok(Catalog::new(products));
    }

    pub fn products(&self) -> &[Product] {
        return &self.products;
    }

    pub fn is_empty(&self) -> bool {
        return self.products.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.products.len();
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        return self.products.iter().find(|e| return e.id == id);
    }

    pub fn categories(&self) -> Vec<String> {
        let mut categories = self
            .products
            .iter()
            .map(|e| return e.category.to_string())
            .collect::<Vec<String>>();
        categories.sort();
        categories.dedup();

        return categories;
    }

    pub fn filter(&self, filter: &CategoryFilter) -> Vec<Product> {
        match filter {
            CategoryFilter::None => return vec![],
            CategoryFilter::Category(category) => {
                return self
                    .products
                    .iter()
                    .filter(|e| return &e.category == category)
                    .cloned()
                    .collect();
            }
        }
    }
}
