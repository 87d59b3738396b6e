#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;

use std::collections::HashSet;

use anyhow::Result;

use super::Catalog;
use super::Product;
use super::ProductId;

/// Selected products in the order they were picked, unique by id.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    products: Vec<Product>,
    ids: HashSet<ProductId>,
}

impl SelectionSet {
    pub fn from_products(products: Vec<Product>) -> SelectionSet {
        let mut selection = SelectionSet::default();
        for product in products {
            selection.insert(product);
        }

        return selection;
    }

    /// Decodes the persisted JSON form. Duplicate ids are dropped.
    pub fn from_json(payload: &str) -> Result<SelectionSet> {
        let products: Vec<Product> = serde_json::from_str(payload)?;
        return Ok(SelectionSet::from_products(products));
    }

    pub fn to_json(&self) -> Result<String> {
        return Ok(serde_json::to_string(&self.products)?);
    }

    pub fn contains(&self, id: ProductId) -> bool {
        return self.ids.contains(&id);
    }

    /// Returns false if the product was already selected.
    pub fn insert(&mut self, product: Product) -> bool {
        if !self.ids.insert(product.id) {
            return false;
        }

        self.products.push(product);
        return true;
    }

    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        if !self.ids.remove(&id) {
            return None;
        }

        let idx = self.products.iter().position(|e| return e.id == id)?;
        return Some(self.products.remove(idx));
    }

    pub fn clear(&mut self) {
        self.products.clear();
        self.ids.clear();
    }

    /// Drops entries missing from the catalog and refreshes the rest with the
    /// catalog's copy. Returns true if anything changed.
    pub fn retain_in(&mut self, catalog: &Catalog) -> bool {
        let mut changed = false;
        let mut products = vec![];
        for product in self.products.drain(..) {
            match catalog.get(product.id) {
                Some(fresh) => {
                    if fresh != &product {
                        changed = true;
                    }
                    products.push(fresh.clone());
                }
                None => {
                    changed = true;
                    self.ids.remove(&product.id);
                }
            }
        }

        self.products = products;
        return changed;
    }

    pub fn ids(&self) -> Vec<ProductId> {
        return self.products.iter().map(|e| return e.id).collect();
    }

    pub fn products(&self) -> &[Product] {
        return &self.products;
    }

    pub fn len(&self) -> usize {
        return self.products.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.products.is_empty();
    }
}
