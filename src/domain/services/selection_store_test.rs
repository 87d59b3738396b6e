use anyhow::bail;
use anyhow::Result;
use test_utils::catalog_fixture;

use super::SelectionChange;
use super::SelectionStore;
use super::SELECTION_KEY;
use crate::domain::models::Catalog;
use crate::domain::models::KeyValueStore;
use crate::domain::models::RoutineError;
use crate::infrastructure::storage::memory::MemoryStore;

struct FailingStore {}

impl KeyValueStore for FailingStore {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        bail!("disk unavailable");
    }

    fn write(&self, _key: &str, _value: &str) -> Result<()> {
        bail!("disk unavailable");
    }
}

fn catalog() -> Catalog {
    return Catalog::parse(catalog_fixture()).unwrap();
}

#[test]
fn it_starts_empty_without_persisted_state() {
    let store = SelectionStore::load(Box::<MemoryStore>::default());
    assert!(store.snapshot().is_empty());
}

#[test]
fn it_starts_empty_with_corrupt_state() {
    let storage = MemoryStore::with_slot(SELECTION_KEY, "{not valid json");
    let store = SelectionStore::load(Box::new(storage.clone()));

    assert!(store.snapshot().is_empty());
    assert_eq!(storage.writes(), 0);
}

#[test]
fn it_starts_empty_when_storage_is_unreadable() {
    let store = SelectionStore::load(Box::new(FailingStore {}));
    assert!(store.snapshot().is_empty());
}

#[test]
fn it_toggles_membership_by_parity() -> Result<()> {
    let catalog = catalog();
    let mut store = SelectionStore::load(Box::<MemoryStore>::default());
    let sequence = [1, 7, 1, 9, 7, 7, 2, 1, 9, 9];

    for id in sequence {
        store.toggle(id, &catalog)?;
    }

    for id in [1, 2, 3, 7, 9] {
        let toggled = sequence.iter().filter(|e| return **e == id).count();
        assert_eq!(store.is_selected(id), toggled % 2 == 1, "product {id}");
    }

    assert_eq!(store.selection().ids(), vec![7, 2, 1, 9]);

    return Ok(());
}

#[test]
fn it_resets_parity_after_clear() -> Result<()> {
    let catalog = catalog();
    let mut store = SelectionStore::load(Box::<MemoryStore>::default());
    store.toggle(1, &catalog)?;
    store.toggle(2, &catalog)?;
    store.clear()?;
    store.toggle(2, &catalog)?;

    assert!(!store.is_selected(1));
    assert!(store.is_selected(2));

    return Ok(());
}

#[test]
fn it_writes_once_per_toggle() -> Result<()> {
    let catalog = catalog();
    let storage = MemoryStore::default();
    let mut store = SelectionStore::load(Box::new(storage.clone()));

    store.toggle(7, &catalog)?;
    store.toggle(7, &catalog)?;

    assert!(store.snapshot().is_empty());
    assert_eq!(storage.writes(), 2);
    assert_eq!(storage.read(SELECTION_KEY)?, Some("[]".to_string()));

    return Ok(());
}

#[test]
fn it_restores_persisted_selection() -> Result<()> {
    let catalog = catalog();
    let storage = MemoryStore::default();

    let mut store = SelectionStore::load(Box::new(storage.clone()));
    store.toggle(9, &catalog)?;
    store.toggle(2, &catalog)?;
    store.toggle(3, &catalog)?;

    let restored = SelectionStore::load(Box::new(storage.clone()));
    assert_eq!(restored.selection().ids(), vec![9, 2, 3]);

    return Ok(());
}

#[test]
fn it_rejects_unknown_products() -> Result<()> {
    let catalog = catalog();
    let storage = MemoryStore::default();
    let mut store = SelectionStore::load(Box::new(storage.clone()));

    let err = store.toggle(404, &catalog).unwrap_err();

    assert_eq!(
        err.downcast_ref::<RoutineError>(),
        Some(&RoutineError::UnknownProduct(404))
    );
    assert_eq!(storage.writes(), 0);

    return Ok(());
}

#[test]
fn it_notifies_subscribers_before_returning() -> Result<()> {
    let catalog = catalog();
    let mut store = SelectionStore::load(Box::<MemoryStore>::default());
    let mut rx = store.subscribe();

    store.toggle(1, &catalog)?;
    assert_eq!(rx.try_recv()?, SelectionChange::Added(1));

    store.remove(1)?;
    assert_eq!(rx.try_recv()?, SelectionChange::Removed(1));

    store.clear()?;
    assert_eq!(rx.try_recv()?, SelectionChange::Cleared);
    assert!(rx.try_recv().is_err());

    return Ok(());
}

#[test]
fn it_prunes_closed_subscribers() -> Result<()> {
    let catalog = catalog();
    let mut store = SelectionStore::load(Box::<MemoryStore>::default());
    drop(store.subscribe());
    let mut rx = store.subscribe();

    store.toggle(1, &catalog)?;

    assert_eq!(store.subscribers.len(), 1);
    assert_eq!(rx.try_recv()?, SelectionChange::Added(1));

    return Ok(());
}

#[test]
fn it_skips_write_when_removing_unselected() -> Result<()> {
    let storage = MemoryStore::default();
    let mut store = SelectionStore::load(Box::new(storage.clone()));

    store.remove(1)?;

    assert_eq!(storage.writes(), 0);
    return Ok(());
}

#[test]
fn it_keeps_mutation_and_notifies_when_write_fails() {
    let catalog = catalog();
    let mut store = SelectionStore::load(Box::new(FailingStore {}));
    let mut rx = store.subscribe();

    assert!(store.toggle(1, &catalog).is_err());
    assert!(store.is_selected(1));
    assert_eq!(rx.try_recv().ok(), Some(SelectionChange::Added(1)));
}

#[test]
fn it_revalidates_against_catalog() -> Result<()> {
    let payload = r#"[
      {"id": 7, "name": "Old name", "brand": "L'Oreal Paris", "category": "moisturizer", "image": "", "description": ""},
      {"id": 404, "name": "Discontinued", "brand": "Gone", "category": "cleanser", "image": "", "description": ""}
    ]"#;
    let storage = MemoryStore::with_slot(SELECTION_KEY, payload);
    let mut store = SelectionStore::load(Box::new(storage.clone()));
    assert_eq!(store.selection().ids(), vec![7, 404]);

    store.revalidate(&catalog())?;

    assert_eq!(store.selection().ids(), vec![7]);
    assert_eq!(store.snapshot()[0].name, "Revitalift Derm Intensives Serum");
    assert_eq!(storage.writes(), 1);

    store.revalidate(&catalog())?;
    assert_eq!(storage.writes(), 1);

    return Ok(());
}
