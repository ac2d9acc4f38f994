//! Integration tests for file-backed storage.

use serde::{Deserialize, Serialize};
use storage::{FileStorage, PersistedRecord, StateStorage, StateStorageExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    email: String,
    visits: u32,
}

#[test]
fn records_survive_reopening_the_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let profile = Profile {
        email: "a@example.com".to_string(),
        visits: 3,
    };

    {
        let storage = FileStorage::open(tmp.path()).unwrap();
        storage
            .save_record("user-store", &PersistedRecord::new(profile.clone(), 0))
            .unwrap();
    }

    let reopened = FileStorage::open(tmp.path()).unwrap();
    let record = reopened
        .load_record::<Profile>("user-store")
        .unwrap()
        .expect("record should exist");

    assert_eq!(record.state, profile);
    assert!(record.saved_at.is_some());
}

#[test]
fn records_are_plain_json_documents() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(tmp.path()).unwrap();

    storage
        .save_record("counter", &PersistedRecord::new(9_u32, 4))
        .unwrap();

    let raw = std::fs::read_to_string(tmp.path().join("counter.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["state"], 9);
    assert_eq!(value["version"], 4);
    assert!(value["savedAt"].is_string());
}

#[test]
fn separate_keys_are_independent() {
    let tmp = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(tmp.path()).unwrap();

    storage.set_item("data-storage", "cart").unwrap();
    storage.set_item("user-store", "session").unwrap();
    storage.remove_item("data-storage").unwrap();

    assert_eq!(storage.get_item("data-storage").unwrap(), None);
    assert_eq!(
        storage.get_item("user-store").unwrap().as_deref(),
        Some("session")
    );
}
