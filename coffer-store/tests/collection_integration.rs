//! End-to-end tests of the encrypted collection store against a real
//! temporary directory.

use std::fs;
use std::thread;

use chrono::{DateTime, Utc};
use coffer_store::{Collection, Document, Patch, Predicate, StoragePaths, StoreKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(title: &str, status: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            status: status.to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Document for Entry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}

fn open_collection(dir: &TempDir, key: &StoreKey, name: &str) -> Collection<Entry> {
    Collection::open(&StoragePaths::new(dir.path()), key.clone(), name)
}

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn write_all_read_all_round_trip_preserves_order() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let records = vec![
        record(json!({"id": "c", "title": "third"})),
        record(json!({"id": "a", "title": "first", "extra": [1, 2, 3]})),
        record(json!({"id": "b", "title": "second", "nested": {"k": "v"}})),
    ];
    entries.write_all(&records).expect("write");

    assert_eq!(entries.read_all(), records);
}

#[test]
fn insert_then_count() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    for i in 0..5 {
        let status = if i < 2 { "approved" } else { "pending" };
        let mut entry = Entry::new(&format!("entry {i}"), status);
        entries.save(&mut entry).expect("save");
    }

    assert_eq!(entries.count(&Predicate::new()), 5);
    assert_eq!(entries.count(&Predicate::new().field("status", "approved")), 2);
    assert_eq!(entries.count(&Predicate::new().field("status", "rejected")), 0);
}

#[test]
fn insert_update_find_delete_scenario() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let mut zelda = Entry::new("Zelda", "draft");
    zelda.id = Some("a1".to_string());
    entries.insert(&zelda).expect("insert");

    let updated = entries
        .update(
            &Predicate::new().field("id", "a1"),
            &Patch::new().field("status", "published"),
        )
        .expect("update");
    assert!(updated);

    let found = entries.find_by_id("a1").expect("record exists");
    assert_eq!(found.title, "Zelda");
    assert_eq!(found.status, "published");
    // The store refreshes updatedAt on every update.
    assert!(found.updated_at.is_some());

    let removed = entries
        .delete(&Predicate::new().field("id", "a1"))
        .expect("delete");
    assert_eq!(removed, 1);
    assert!(entries.find_by_id("a1").is_none());
}

#[test]
fn update_merges_partially_and_keeps_unnamed_fields() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    entries
        .write_all(&[record(json!({
            "id": "x1",
            "title": "T",
            "status": "pending",
            "legacyField": "still here"
        }))])
        .expect("write");

    let updated = entries
        .update(
            &Predicate::new().field("id", "x1"),
            &Patch::new().field("status", "approved"),
        )
        .expect("update");
    assert!(updated);

    let raw = entries.read_all();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["status"], json!("approved"));
    assert_eq!(raw[0]["title"], json!("T"));
    assert_eq!(raw[0]["legacyField"], json!("still here"));
}

#[test]
fn update_without_match_reports_false() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let updated = entries
        .update(
            &Predicate::new().field("id", "missing"),
            &Patch::new().field("status", "approved"),
        )
        .expect("update call itself succeeds");
    assert!(!updated);
}

#[test]
fn delete_is_idempotent() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let mut keep = Entry::new("keep", "draft");
    entries.save(&mut keep).expect("save");

    let gone = Predicate::new().field("id", "nope");
    assert_eq!(entries.delete(&gone).expect("first delete"), 0);
    assert_eq!(entries.delete(&gone).expect("second delete"), 0);
    assert_eq!(entries.count(&Predicate::new()), 1);
}

#[test]
fn delete_removes_all_matches() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    for title in ["a", "b", "c"] {
        let mut entry = Entry::new(title, "spam");
        entries.save(&mut entry).expect("save");
    }
    let mut ham = Entry::new("d", "ham");
    entries.save(&mut ham).expect("save");

    let removed = entries
        .delete(&Predicate::new().field("status", "spam"))
        .expect("delete");
    assert_eq!(removed, 3);
    assert_eq!(entries.count(&Predicate::new()), 1);
}

#[test]
fn corrupt_file_reads_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let paths = StoragePaths::new(dir.path());
    let entries: Collection<Entry> = Collection::open(&paths, key, "entries");

    fs::write(paths.encrypted_path("entries"), b"not hex:also not hex \xff\xfe")
        .expect("write garbage");

    assert!(entries.find(&Predicate::new()).is_empty());
    assert_eq!(entries.count(&Predicate::new()), 0);
    assert!(entries.find_one(&Predicate::new()).is_none());
}

#[test]
fn empty_blob_reads_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let paths = StoragePaths::new(dir.path());
    let entries: Collection<Entry> = Collection::open(&paths, key, "entries");

    fs::write(paths.encrypted_path("entries"), "  \n").expect("write blank");
    assert!(entries.find(&Predicate::new()).is_empty());
}

#[test]
fn wrong_key_reads_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let writer = open_collection(&dir, &StoreKey::generate(), "entries");
    let mut entry = Entry::new("secret", "draft");
    writer.save(&mut entry).expect("save");

    let reader = open_collection(&dir, &StoreKey::generate(), "entries");
    assert!(reader.find(&Predicate::new()).is_empty());
    assert_eq!(reader.count(&Predicate::new()), 0);
}

#[test]
fn legacy_plaintext_file_is_read_and_upgraded_on_write() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let paths = StoragePaths::new(dir.path());
    let entries: Collection<Entry> = Collection::open(&paths, key.clone(), "entries");

    fs::write(
        paths.legacy_path("entries"),
        r#"[{"id": "old1", "title": "from the plaintext era", "status": "published"}]"#,
    )
    .expect("write legacy file");

    let found = entries.find_by_id("old1").expect("legacy record readable");
    assert_eq!(found.title, "from the plaintext era");

    let mut fresh = Entry::new("new one", "draft");
    entries.save(&mut fresh).expect("save");

    // The write upgraded the collection to the encrypted format, and the
    // encrypted file now takes precedence over the stale legacy file.
    assert!(paths.encrypted_path("entries").exists());
    assert_eq!(entries.count(&Predicate::new()), 2);
    let reopened: Collection<Entry> = Collection::open(&paths, key, "entries");
    assert!(reopened.find_by_id("old1").is_some());
}

#[test]
fn save_assigns_identity_and_timestamps() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let mut entry = Entry::new("fresh", "draft");
    entries.save(&mut entry).expect("first save");

    let id = entry.id.clone().expect("id assigned");
    assert_eq!(id.len(), 32);
    let created = entry.created_at.expect("createdAt stamped");
    let first_updated = entry.updated_at.expect("updatedAt stamped");

    entry.status = "published".to_string();
    entries.save(&mut entry).expect("second save");

    assert_eq!(entry.id.as_deref(), Some(id.as_str()));
    assert_eq!(entry.created_at, Some(created));
    assert!(entry.updated_at.expect("updatedAt refreshed") >= first_updated);

    // Saving twice updated in place instead of appending.
    assert_eq!(entries.count(&Predicate::new()), 1);
    let stored = entries.find_by_id(&id).expect("stored record");
    assert_eq!(stored.status, "published");
}

#[test]
fn save_honors_caller_assigned_id() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    let mut entry = Entry::new("preassigned", "draft");
    entry.id = Some("chosen-id".to_string());
    entries.save(&mut entry).expect("save");

    assert!(entries.find_by_id("chosen-id").is_some());
    assert_eq!(entries.count(&Predicate::new()), 1);
}

#[test]
fn concurrent_saves_lose_no_records() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let paths = StoragePaths::new(dir.path());

    thread::scope(|scope| {
        for worker in 0..8 {
            let key = key.clone();
            let paths = paths.clone();
            scope.spawn(move || {
                // Each worker opens its own handle; handles to the same
                // collection file share one lock.
                let entries: Collection<Entry> = Collection::open(&paths, key, "entries");
                for i in 0..5 {
                    let mut entry = Entry::new(&format!("w{worker}-{i}"), "draft");
                    entries.save(&mut entry).expect("save");
                }
            });
        }
    });

    let entries: Collection<Entry> = Collection::open(&paths, key, "entries");
    assert_eq!(entries.count(&Predicate::new()), 40);
}

#[test]
fn never_written_collection_reads_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let key = StoreKey::generate();
    let entries = open_collection(&dir, &key, "entries");

    assert!(entries.find(&Predicate::new()).is_empty());
    assert!(entries.find_one(&Predicate::new()).is_none());
    assert_eq!(entries.count(&Predicate::new()), 0);
}
