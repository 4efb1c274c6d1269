//! Typed documents and the equality predicates used to query them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A record type stored in a collection.
///
/// The store stays collection-agnostic: it only needs identity access and
/// timestamp stamping, everything else is the document's own shape. Types
/// implementing this trait get the save-when-new lifecycle for free —
/// [`Collection::save`](crate::Collection::save) assigns a fresh id and
/// `createdAt` on first save and refreshes `updatedAt` on every save.
///
/// Identity uniqueness is a caller convention: the store treats the id as
/// just another queryable field and never enforces it.
pub trait Document: Serialize + DeserializeOwned {
    /// Returns the record id, if one has been assigned.
    fn id(&self) -> Option<&str>;

    /// Assigns the record id.
    fn set_id(&mut self, id: String);

    /// Stamps timestamps: set `createdAt` when unset, always refresh
    /// `updatedAt`.
    fn stamp(&mut self, now: DateTime<Utc>);

    /// Hook run at the start of every save, before identity assignment.
    ///
    /// Used by documents that derive fields from their own content (e.g.
    /// slug generation). The default does nothing.
    fn prepare(&mut self) {}
}

/// Generates a new record id: 16 random bytes, hex encoded.
#[must_use]
pub fn generate_record_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A field/value equality filter.
///
/// A record matches when every requested field is present and strictly
/// equal to the given JSON value — no range or partial-match operators.
/// The empty predicate matches every record.
#[derive(Debug, Clone, Default)]
pub struct Predicate(BTreeMap<String, Value>);

impl Predicate {
    /// Creates the empty predicate (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality requirement on `field`.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns whether the predicate has no requirements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether `record` satisfies every requirement.
    pub(crate) fn matches(&self, record: &Map<String, Value>) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// A shallow-merge update: patched fields overwrite, all other fields of
/// the stored record survive untouched.
#[derive(Debug, Clone, Default)]
pub struct Patch(Map<String, Value>);

impl Patch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to `value` in the patch.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Builds a patch from the full serialized form of a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotAnObject`] when the document does not
    /// serialize to a JSON object, or [`StoreError::Serialization`] when
    /// serialization itself fails.
    pub fn from_document<T: Serialize>(document: &T) -> StoreResult<Self> {
        match serde_json::to_value(document)? {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Merges the patch onto `record` in place.
    pub(crate) fn apply(&self, record: &mut Map<String, Value>) {
        for (field, value) in &self.0 {
            record.insert(field.clone(), value.clone());
        }
    }
}
