//! Embedded encrypted document store.
//!
//! Coffer simulates a document database (find/insert/update/delete/count)
//! on top of one symmetrically encrypted JSON file per named collection.
//! It exists so a small content-management application can run without an
//! external database: collections are read and rewritten whole, queries
//! are linear scans over exact-match field predicates, and the only shared
//! state is the file itself.
//!
//! ```no_run
//! use coffer_store::{Collection, Document, Predicate, StoragePaths, StoreKey};
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Note {
//!     #[serde(default, skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     text: String,
//!     #[serde(default)]
//!     created_at: Option<DateTime<Utc>>,
//!     #[serde(default)]
//!     updated_at: Option<DateTime<Utc>>,
//! }
//!
//! impl Document for Note {
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//!     fn set_id(&mut self, id: String) {
//!         self.id = Some(id);
//!     }
//!     fn stamp(&mut self, now: DateTime<Utc>) {
//!         self.created_at.get_or_insert(now);
//!         self.updated_at = Some(now);
//!     }
//! }
//!
//! # fn main() -> Result<(), coffer_store::StoreError> {
//! let paths = StoragePaths::new("./data");
//! let key = StoreKey::from_env("COFFER_KEY")?;
//! let notes = Collection::<Note>::open(&paths, key, "notes");
//!
//! let mut note = Note { id: None, text: "hello".into(), created_at: None, updated_at: None };
//! notes.save(&mut note)?;
//! assert_eq!(notes.count(&Predicate::new()), 1);
//! # Ok(())
//! # }
//! ```

pub mod cipher;
mod collection;
mod document;
pub mod error;
mod key;
mod paths;

pub use collection::Collection;
pub use document::{generate_record_id, Document, Patch, Predicate};
pub use error::{StoreError, StoreResult};
pub use key::StoreKey;
pub use paths::StoragePaths;
