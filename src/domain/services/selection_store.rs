#[cfg(test)]
#[path = "selection_store_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Catalog;
use crate::domain::models::KeyValueStoreBox;
use crate::domain::models::Product;
use crate::domain::models::ProductId;
use crate::domain::models::RoutineError;
use crate::domain::models::SelectionSet;

pub const SELECTION_KEY: &str = "selectedProducts";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    Added(ProductId),
    Removed(ProductId),
    Cleared,
    Revalidated,
}

/// Owns the selected products. Every mutation is written to the key-value
/// slot and broadcast to subscribers before it returns.
pub struct SelectionStore {
    selection: SelectionSet,
    storage: KeyValueStoreBox,
    subscribers: Vec<mpsc::UnboundedSender<SelectionChange>>,
}

impl SelectionStore {
    /// Restores the persisted selection. A missing or unreadable slot starts
    /// empty without reporting anything to the user.
    pub fn load(storage: KeyValueStoreBox) -> SelectionStore {
        let selection = match storage.read(SELECTION_KEY) {
            Ok(Some(payload)) => match SelectionSet::from_json(&payload) {
                Ok(selection) => selection,
                Err(err) => {
                    tracing::debug!(error = ?err, "Discarding corrupt persisted selection");
                    SelectionSet::default()
                }
            },
            Ok(None) => SelectionSet::default(),
            Err(err) => {
                tracing::debug!(error = ?err, "Unable to read persisted selection");
                SelectionSet::default()
            }
        };

        tracing::debug!(count = selection.len(), "Restored selection");

        return SelectionStore {
            selection,
            storage,
            subscribers: vec![],
        };
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SelectionChange> {
        let (tx, rx) = mpsc::unbounded_channel::<SelectionChange>();
        self.subscribers.push(tx);

        return rx;
    }

    /// Removes the product if selected, otherwise appends it from the catalog.
    /// Returns whether the product is selected afterwards.
    pub fn toggle(&mut self, id: ProductId, catalog: &Catalog) -> Result<bool> {
        if self.selection.remove(id).is_some() {
            self.commit(SelectionChange::Removed(id))?;
            return Ok(false);
        }

        let Some(product) = catalog.get(id) else {
            return Err(RoutineError::UnknownProduct(id).into());
        };

        self.selection.insert(product.clone());
        self.commit(SelectionChange::Added(id))?;

        return Ok(true);
    }

    /// Per-item removal from the selected list. A no-op when not selected.
    pub fn remove(&mut self, id: ProductId) -> Result<()> {
        if self.selection.remove(id).is_some() {
            self.commit(SelectionChange::Removed(id))?;
        }

        return Ok(());
    }

    pub fn clear(&mut self) -> Result<()> {
        self.selection.clear();
        return self.commit(SelectionChange::Cleared);
    }

    /// Drops entries that no longer exist in a freshly loaded full catalog.
    pub fn revalidate(&mut self, catalog: &Catalog) -> Result<()> {
        if catalog.is_empty() || !self.selection.retain_in(catalog) {
            return Ok(());
        }

        tracing::info!(count = self.selection.len(), "Selection revalidated against catalog");
        return self.commit(SelectionChange::Revalidated);
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        return self.selection.contains(id);
    }

    pub fn snapshot(&self) -> Vec<Product> {
        return self.selection.products().to_vec();
    }

    pub fn selection(&self) -> &SelectionSet {
        return &self.selection;
    }

    fn commit(&mut self, change: SelectionChange) -> Result<()> {
        let res = self
            .selection
            .to_json()
            .and_then(|payload| return self.storage.write(SELECTION_KEY, &payload));

        if let Err(err) = &res {
            tracing::error!(error = ?err, "Failed to persist selection");
        }

        self.subscribers
            .retain(|subscriber| return subscriber.send(change.clone()).is_ok());

        return res;
    }
}
