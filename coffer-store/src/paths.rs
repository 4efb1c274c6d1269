//! Storage path helpers.

use std::path::{Path, PathBuf};

/// Extension of the canonical encrypted collection file.
const ENCRYPTED_EXT: &str = "encrypted";
/// Extension of the legacy plaintext collection file (read-only fallback).
const LEGACY_EXT: &str = "json";

/// Paths for collection files under a shared storage root.
///
/// Every collection `name` maps to two candidate files:
/// `<root>/<name>.encrypted` (canonical) and `<root>/<name>.json`
/// (legacy plaintext, read as a migration fallback and upgraded on the
/// next write).
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Builds storage paths rooted at `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the storage root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the canonical encrypted file path for `collection`.
    #[must_use]
    pub fn encrypted_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.{ENCRYPTED_EXT}"))
    }

    /// Returns the legacy plaintext file path for `collection`.
    #[must_use]
    pub fn legacy_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.{LEGACY_EXT}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_both_candidate_paths() {
        let paths = StoragePaths::new("/var/lib/coffer");
        assert_eq!(
            paths.encrypted_path("reviews"),
            PathBuf::from("/var/lib/coffer/reviews.encrypted")
        );
        assert_eq!(
            paths.legacy_path("reviews"),
            PathBuf::from("/var/lib/coffer/reviews.json")
        );
    }
}
