//! Selection persistence tests

use tempfile::tempdir;

use glow::catalog::Catalog;
use glow::selection::SelectionStore;
use glow::storage::{STORAGE_KEY, SelectionStorage};

use crate::common::write_sample_catalog;

fn sample_catalog(dir: &std::path::Path) -> Catalog {
    let path = write_sample_catalog(dir);
    Catalog::load(&path).expect("load catalog fixture")
}

#[test]
fn save_then_load_restores_selection_order() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    let mut selection = SelectionStore::new();
    selection.toggle(3, &catalog);
    selection.toggle(1, &catalog);

    let storage = SelectionStorage::new(dir.path());
    storage.save(&selection).expect("save");

    let restored = storage.load(&catalog);
    let ids: Vec<u32> = restored.iter().map(|p| p.id).collect();
    assert_eq!(ids, [3, 1]);
    assert_eq!(restored[0].name, "Vitamin C Serum");
}

#[test]
fn store_writes_only_ids_under_storage_key() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    let mut selection = SelectionStore::new();
    selection.toggle(2, &catalog);

    let storage = SelectionStorage::new(dir.path());
    storage.save(&selection).expect("save");

    let raw = std::fs::read_to_string(dir.path().join(format!("{STORAGE_KEY}.json")))
        .expect("storage file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value, serde_json::json!([2]));
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    let storage = SelectionStorage::new(&dir.path().join("never-written"));
    assert!(storage.load(&catalog).is_empty());
}

#[test]
fn corrupt_file_loads_empty() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    std::fs::write(dir.path().join(format!("{STORAGE_KEY}.json")), "{not json")
        .expect("write corrupt file");

    let storage = SelectionStorage::new(dir.path());
    assert!(storage.load(&catalog).is_empty());
}

#[test]
fn repeated_stored_ids_rehydrate_without_duplicates() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    std::fs::write(dir.path().join(format!("{STORAGE_KEY}.json")), "[1, 2, 1]")
        .expect("write ids");

    let storage = SelectionStorage::new(dir.path());
    let mut selection = SelectionStore::new();
    selection.replace(storage.load(&catalog));

    let ids: Vec<u32> = selection.all().iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[test]
fn ids_absent_from_catalog_are_dropped() {
    let dir = tempdir().expect("tempdir");
    let catalog = sample_catalog(dir.path());

    std::fs::write(dir.path().join(format!("{STORAGE_KEY}.json")), "[1, 99, 4]")
        .expect("write ids");

    let storage = SelectionStorage::new(dir.path());
    let restored = storage.load(&catalog);
    let ids: Vec<u32> = restored.iter().map(|p| p.id).collect();
    assert_eq!(ids, [1, 4]);
}
