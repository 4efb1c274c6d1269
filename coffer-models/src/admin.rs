//! The `admins` collection: accounts allowed into the admin panel.
//!
//! The password field holds a bcrypt hash, never plaintext. Token issuance
//! lives in the calling application; this model only answers "does this
//! candidate password match".

use chrono::{DateTime, Utc};
use coffer_store::{Collection, Document, StoragePaths, StoreKey};
use serde::{Deserialize, Serialize};

use crate::ModelResult;

fn default_true() -> bool {
    true
}

fn default_role() -> String {
    "admin".to_string()
}

/// An admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Record identity, assigned on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login email, unique by caller convention.
    pub email: String,
    /// bcrypt hash of the password (`$2…`).
    #[serde(default)]
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role label (e.g. `admin`, `super_admin`).
    #[serde(default = "default_role")]
    pub role: String,
    /// Deactivated accounts keep their record but cannot log in.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Timestamp of the most recent successful login.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    /// Set on first save.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Admin {
    /// Name of the backing collection.
    pub const COLLECTION: &'static str = "admins";

    /// Opens the `admins` collection.
    #[must_use]
    pub fn collection(paths: &StoragePaths, key: StoreKey) -> Collection<Self> {
        Collection::open(paths, key, Self::COLLECTION)
    }

    /// Creates an active admin with no password set.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            password: String::new(),
            name: name.into(),
            role: default_role(),
            is_active: true,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Hashes `plain` with bcrypt and stores the hash.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::PasswordHash`] when hashing fails.
    pub fn set_password(&mut self, plain: &str) -> ModelResult<()> {
        self.password = bcrypt::hash(plain, bcrypt::DEFAULT_COST)?;
        Ok(())
    }

    /// Returns whether `candidate` matches the stored hash.
    ///
    /// An account without a password, or a stored value that is not a
    /// bcrypt hash, never matches.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        if self.password.is_empty() {
            return false;
        }
        bcrypt::verify(candidate, &self.password).unwrap_or(false)
    }
}

impl Document for Admin {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let mut admin = Admin::new("admin@example.com", "Admin");
        admin.set_password("correct horse").expect("hash");
        assert!(admin.password.starts_with("$2"));
        assert!(admin.verify_password("correct horse"));
        assert!(!admin.verify_password("wrong horse"));
    }

    #[test]
    fn missing_password_never_matches() {
        let admin = Admin::new("admin@example.com", "Admin");
        assert!(!admin.verify_password(""));
        assert!(!admin.verify_password("anything"));
    }

    #[test]
    fn accounts_default_to_active() {
        let admin: Admin =
            serde_json::from_str(r#"{"email": "a@b.c"}"#).expect("deserialize");
        assert!(admin.is_active);
        assert_eq!(admin.role, "admin");
    }
}
