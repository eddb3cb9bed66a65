mod common;

use common::{legacy_slot, registration};
use eventroster::storage::DEFAULT_KEY;
use eventroster::{FileStorage, LockMode, MemoryStorage, Storage, StorageError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_load_round_trip() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();

    let regs = vec![registration("a", 1), registration("b", 2), registration("c", 3)];
    storage.save(&regs).unwrap();

    assert_eq!(storage.load().unwrap(), regs);
}

#[test]
fn test_load_nonexistent() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    assert!(storage.load().unwrap().is_empty());
}

#[test]
fn test_save_is_total_overwrite() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();

    storage
        .save(&[registration("a", 1), registration("b", 2)])
        .unwrap();
    let only = vec![registration("c", 3)];
    storage.save(&only).unwrap();

    assert_eq!(storage.load().unwrap(), only);
}

#[test]
fn test_slot_is_json_array_of_records() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    storage.save(&[registration("Meetup", 10)]).unwrap();

    let text = fs::read_to_string(dir.path().join("registrations.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["eventName"], "Meetup");
    assert_eq!(records[0]["eventDate"], "2030-01-11");
    assert_eq!(records[0]["organizer"], "Ana");
    assert_eq!(records[0]["capacity"], 10);
    assert_eq!(records[0]["cost"], 150);
    assert_eq!(records[0]["email"], "ana@x.com");
    assert!(records[0]["id"].is_string());
}

#[test]
fn test_no_tmp_file_after_save() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    storage.save(&[]).unwrap();

    assert!(storage.slot_path().exists());
    assert!(!dir.path().join("registrations.json.tmp").exists());
}

#[test]
fn test_empty_list_saved_as_empty_array() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::None).unwrap();
    storage.save(&[registration("a", 1)]).unwrap();
    storage.save(&[]).unwrap();

    let text = fs::read_to_string(storage.slot_path()).unwrap();
    assert_eq!(text, "[]");
    assert!(storage.load().unwrap().is_empty());
}

#[test]
fn test_clear_removes_slot() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    storage.save(&[registration("a", 1)]).unwrap();
    assert!(storage.slot_path().exists());

    storage.clear().unwrap();
    assert!(!storage.slot_path().exists());
    assert!(storage.load().unwrap().is_empty());

    // Idempotent
    storage.clear().unwrap();
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    fs::write(storage.slot_path(), "[{\"eventName\": 3").unwrap();

    let err = storage.load().unwrap_err();
    assert!(matches!(err, StorageError::Corrupt { .. }));
    assert!(err.to_string().contains("registrations"));

    // Left untouched for inspection
    assert_eq!(
        fs::read_to_string(storage.slot_path()).unwrap(),
        "[{\"eventName\": 3"
    );
}

#[test]
fn test_wrong_shape_is_corrupt() {
    let storage = MemoryStorage::with_contents(r#"{"eventName":"not a list"}"#);
    assert!(matches!(
        storage.load().unwrap_err(),
        StorageError::Corrupt { .. }
    ));
}

#[test]
fn test_legacy_slot_loads() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    fs::write(storage.slot_path(), legacy_slot(&[150, 300])).unwrap();

    let regs = storage.load().unwrap();
    assert_eq!(regs.len(), 2);
    assert_eq!(regs[0].event_name(), "event_0");
    assert_eq!(regs[1].cost(), 300);
    assert_ne!(regs[0].id(), regs[1].id());
}

#[test]
fn test_memory_storage_round_trip() {
    let mut storage = MemoryStorage::new();
    assert_eq!(storage.contents(), None);
    assert!(storage.load().unwrap().is_empty());

    let regs = vec![registration("a", 1), registration("b", 2)];
    storage.save(&regs).unwrap();
    assert!(storage.contents().unwrap().starts_with('['));
    assert_eq!(storage.load().unwrap(), regs);

    storage.clear().unwrap();
    assert_eq!(storage.contents(), None);
}

#[test]
fn test_memory_and_file_storage_share_format() {
    let dir = tempdir().unwrap();
    let mut file = FileStorage::open(dir.path(), DEFAULT_KEY, LockMode::Flock).unwrap();
    let regs = vec![registration("a", 1)];
    file.save(&regs).unwrap();

    let text = fs::read_to_string(file.slot_path()).unwrap();
    let memory = MemoryStorage::with_contents(text);
    assert_eq!(memory.load().unwrap(), regs);
}

#[test]
fn test_keys_with_path_parts_rejected() {
    let root = tempdir().unwrap();
    let dir = root.path().join("data");
    for key in ["../escape", "a/b", "a\\b", "", ".", ".."] {
        let err = FileStorage::open(&dir, key, LockMode::Flock).unwrap_err();
        match err {
            StorageError::InvalidKey { key: rejected } => assert_eq!(rejected, key),
            other => panic!("expected InvalidKey for {key:?}, got {other:?}"),
        }
    }

    // Rejected before anything touches the disk
    assert!(!dir.exists());
    assert!(!root.path().join("escape.json").exists());
}

#[test]
fn test_plain_keys_with_dots_accepted() {
    let dir = tempdir().unwrap();
    let mut storage = FileStorage::open(dir.path(), "spring.2030", LockMode::Flock).unwrap();
    storage.save(&[registration("a", 1)]).unwrap();
    assert!(dir.path().join("spring.2030.json").exists());
}

#[test]
fn test_memory_storage_custom_key() {
    let storage = MemoryStorage::new().with_key("spring");
    assert_eq!(storage.key(), "spring");
    assert_eq!(MemoryStorage::new().key(), DEFAULT_KEY);

    let corrupt = MemoryStorage::with_contents("{bad").with_key("spring");
    let err = corrupt.load().unwrap_err();
    match &err {
        StorageError::Corrupt { key, .. } => assert_eq!(key, "spring"),
        other => panic!("expected Corrupt, got {other:?}"),
    }
    assert!(err.to_string().contains("'spring'"));
}
