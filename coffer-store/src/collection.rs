//! Encrypted per-collection persistence.
//!
//! A [`Collection`] owns one encrypted file holding a JSON array of
//! records. Every read decrypts and parses the whole file; every mutation
//! is a full read-modify-write cycle that re-encrypts and atomically
//! replaces the file. There is no index and no partial I/O — the design
//! assumes collections stay small (hundreds of records, not millions).
//!
//! # Concurrency
//!
//! Mutations serialize through one process-wide lock per collection file,
//! so concurrent writers within a process never lose each other's updates.
//! Reads are lock-free: file replacement is atomic (write-to-temp, then
//! rename), so a reader sees either the old array or the new one, never a
//! torn file. Writers in *other* processes are not coordinated — the last
//! whole-file write wins. That is a known limitation, acceptable under the
//! expected load of a single admin acting serially.
//!
//! # Read-path tolerance
//!
//! A missing file, a wrong key, truncated ciphertext, or malformed JSON
//! all read as the empty collection, with a `tracing` warning. Callers of
//! `find`/`find_one`/`count` always get an answer; only writes fail
//! explicitly.

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::warn;

use crate::cipher;
use crate::document::{generate_record_id, Document, Patch, Predicate};
use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;
use crate::paths::StoragePaths;

/// Conventional identity field of a record.
const ID_FIELD: &str = "id";
/// Conventional last-modified timestamp field of a record.
const UPDATED_AT_FIELD: &str = "updatedAt";

/// One process-wide lock per collection file, so that every handle to the
/// same collection serializes its mutations through the same owner.
static COLLECTION_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    OnceLock::new();

fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let registry = COLLECTION_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = registry.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

/// A named collection of documents backed by one encrypted file.
///
/// The type parameter fixes the document shape at the API surface while
/// the on-disk representation stays an open JSON array — records written
/// by older code keep any extra fields they carry through shallow-merge
/// updates.
pub struct Collection<T> {
    name: String,
    root: PathBuf,
    encrypted_path: PathBuf,
    legacy_path: PathBuf,
    key: StoreKey,
    lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    /// Opens the collection `name` under the storage root in `paths`.
    ///
    /// The storage directory is created on first write, not here; opening
    /// a collection that was never written reads as empty.
    #[must_use]
    pub fn open(paths: &StoragePaths, key: StoreKey, name: impl Into<String>) -> Self {
        let name = name.into();
        let encrypted_path = paths.encrypted_path(&name);
        let lock = lock_for(&encrypted_path);
        Self {
            legacy_path: paths.legacy_path(&name),
            root: paths.root().to_path_buf(),
            name,
            encrypted_path,
            key,
            lock,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all documents matching `predicate`, in file order.
    ///
    /// The empty predicate returns the whole collection. Records that do
    /// not deserialize into `T` are skipped with a warning.
    #[must_use]
    pub fn find(&self, predicate: &Predicate) -> Vec<T> {
        self.read_records()
            .into_iter()
            .filter(|record| predicate.matches(record))
            .filter_map(|record| self.decode(record))
            .collect()
    }

    /// Returns the first document matching `predicate`, if any.
    #[must_use]
    pub fn find_one(&self, predicate: &Predicate) -> Option<T> {
        self.read_records()
            .into_iter()
            .find(|record| predicate.matches(record))
            .and_then(|record| self.decode(record))
    }

    /// Returns the document whose `id` field equals `id`, if any.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<T> {
        self.find_one(&Predicate::new().field(ID_FIELD, id))
    }

    /// Returns the number of records matching `predicate`.
    ///
    /// Counts raw records, including any that would not deserialize
    /// into `T`.
    #[must_use]
    pub fn count(&self, predicate: &Predicate) -> usize {
        self.read_records()
            .iter()
            .filter(|record| predicate.matches(record))
            .count()
    }

    /// Appends `document` to the collection as-is.
    ///
    /// Identity and timestamps are not assigned here; use [`Self::save`]
    /// for the full record lifecycle.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization, encryption, or the file
    /// replacement fails. The previous on-disk state is unchanged on
    /// failure.
    pub fn insert(&self, document: &T) -> StoreResult<()> {
        let record = to_record(document)?;
        let _guard = self.guard();
        let mut records = self.read_records();
        records.push(record);
        self.write_records(&records)
    }

    /// Shallow-merges `patch` onto the first record matching `predicate`
    /// and refreshes its `updatedAt` timestamp.
    ///
    /// Returns `Ok(false)` when no record matches.
    ///
    /// # Errors
    ///
    /// Returns an error when the rewrite of the collection file fails; the
    /// previous on-disk state is unchanged on failure.
    pub fn update(&self, predicate: &Predicate, patch: &Patch) -> StoreResult<bool> {
        let _guard = self.guard();
        let mut records = self.read_records();
        let Some(position) = records.iter().position(|record| predicate.matches(record))
        else {
            return Ok(false);
        };
        patch.apply(&mut records[position]);
        records[position].insert(UPDATED_AT_FIELD.to_string(), serde_json::to_value(Utc::now())?);
        self.write_records(&records)?;
        Ok(true)
    }

    /// Removes every record matching `predicate` and returns how many
    /// were removed.
    ///
    /// Removing zero records is not an error — delete is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the rewrite of the collection file fails.
    pub fn delete(&self, predicate: &Predicate) -> StoreResult<usize> {
        let _guard = self.guard();
        let mut records = self.read_records();
        let before = records.len();
        records.retain(|record| !predicate.matches(record));
        let removed = before - records.len();
        self.write_records(&records)?;
        Ok(removed)
    }

    /// Saves `document` through the full record lifecycle.
    ///
    /// Runs the document's [`prepare`](Document::prepare) hook, assigns a
    /// fresh random hex id and `createdAt` when the document is new,
    /// always refreshes `updatedAt`, then appends the record or
    /// shallow-merges it over the stored record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the file rewrite fails.
    pub fn save(&self, document: &mut T) -> StoreResult<()> {
        let _guard = self.guard();
        document.prepare();
        let id = match document.id() {
            Some(id) => id.to_string(),
            None => {
                let id = generate_record_id();
                document.set_id(id.clone());
                id
            }
        };
        document.stamp(Utc::now());
        let record = to_record(document)?;

        let mut records = self.read_records();
        let existing = records
            .iter()
            .position(|stored| stored.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()));
        if let Some(position) = existing {
            for (field, value) in record {
                records[position].insert(field, value);
            }
        } else {
            records.push(record);
        }
        self.write_records(&records)
    }

    /// Returns the raw records of the collection, in file order.
    ///
    /// Never fails: any read-path corruption reads as empty.
    #[must_use]
    pub fn read_all(&self) -> Vec<Map<String, Value>> {
        self.read_records()
    }

    /// Replaces the whole collection with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization, encryption, or the file
    /// replacement fails.
    pub fn write_all(&self, records: &[Map<String, Value>]) -> StoreResult<()> {
        let _guard = self.guard();
        self.write_records(records)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode(&self, record: Map<String, Value>) -> Option<T> {
        match serde_json::from_value(Value::Object(record)) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!(
                    collection = %self.name,
                    error = %err,
                    "skipping record that does not match the document shape"
                );
                None
            }
        }
    }

    /// Reads and decrypts the whole collection, mapping every failure to
    /// the empty collection.
    fn read_records(&self) -> Vec<Map<String, Value>> {
        match self.try_read() {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    collection = %self.name,
                    error = %err,
                    "treating unreadable collection file as empty"
                );
                Vec::new()
            }
        }
    }

    fn try_read(&self) -> StoreResult<Vec<Map<String, Value>>> {
        if self.encrypted_path.exists() {
            let blob = fs::read_to_string(&self.encrypted_path)
                .map_err(|err| StoreError::io("reading collection file", err))?;
            if blob.trim().is_empty() {
                return Ok(Vec::new());
            }
            let plaintext = cipher::decrypt(&self.key, &blob)?;
            Ok(serde_json::from_slice(&plaintext)?)
        } else if self.legacy_path.exists() {
            // Legacy plaintext fallback; the next write upgrades the
            // collection to the encrypted format.
            let data = fs::read_to_string(&self.legacy_path)
                .map_err(|err| StoreError::io("reading legacy collection file", err))?;
            if data.trim().is_empty() {
                return Ok(Vec::new());
            }
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Vec::new())
        }
    }

    /// Serializes, encrypts, and atomically replaces the collection file.
    fn write_records(&self, records: &[Map<String, Value>]) -> StoreResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|err| StoreError::io("creating storage directory", err))?;

        let json = serde_json::to_string_pretty(records)?;
        let blob = cipher::encrypt(&self.key, json.as_bytes());

        // Write-to-temp then rename: a reader (or a crash) never observes
        // a partially written file. The temp name is stable because the
        // collection lock is held for the whole cycle.
        let tmp_path = self.encrypted_path.with_extension("encrypted.tmp");
        fs::write(&tmp_path, blob)
            .map_err(|err| StoreError::io("writing collection file", err))?;
        fs::rename(&tmp_path, &self.encrypted_path)
            .map_err(|err| StoreError::io("replacing collection file", err))?;

        self.verify_write(records.len());
        Ok(())
    }

    /// Best-effort read-back check. A mismatch is logged but does not
    /// change the outcome of the write that already succeeded.
    fn verify_write(&self, expected: usize) {
        let actual = self.read_records().len();
        if actual != expected {
            warn!(
                collection = %self.name,
                expected,
                actual,
                "post-write verification mismatch"
            );
        }
    }
}

fn to_record<T: Document>(document: &T) -> StoreResult<Map<String, Value>> {
    match serde_json::to_value(document)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::NotAnObject),
    }
}
