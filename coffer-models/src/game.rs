//! The `games` collection: the catalog entries reviews link to.

use chrono::{DateTime, Utc};
use coffer_store::{Collection, Document, StoragePaths, StoreKey};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// A game catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Record identity, assigned on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Game name, unique by caller convention.
    pub name: String,
    /// URL slug, derived from the name when empty.
    #[serde(default)]
    pub slug: String,
    /// Catalog description.
    #[serde(default)]
    pub description: String,
    /// Cover image reference.
    #[serde(default)]
    pub cover_image: String,
    /// Screenshot references.
    #[serde(default)]
    pub screenshots: Vec<String>,
    /// Platform names.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Primary genre.
    #[serde(default)]
    pub genre: String,
    /// Developer name.
    #[serde(default)]
    pub developer: String,
    /// Publisher name.
    #[serde(default)]
    pub publisher: String,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    /// Aggregate score on a 0–10 scale.
    #[serde(default)]
    pub rating: f64,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Official site link.
    #[serde(default)]
    pub official_website: String,
    /// Steam store link.
    #[serde(default)]
    pub steam_link: String,
    /// Set on first save.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Name of the backing collection.
    pub const COLLECTION: &'static str = "games";

    /// Opens the `games` collection.
    #[must_use]
    pub fn collection(paths: &StoragePaths, key: StoreKey) -> Collection<Self> {
        Collection::open(paths, key, Self::COLLECTION)
    }

    /// Creates a catalog entry with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            cover_image: String::new(),
            screenshots: Vec::new(),
            platforms: Vec::new(),
            genre: String::new(),
            developer: String::new(),
            publisher: String::new(),
            release_date: None,
            rating: 0.0,
            tags: Vec::new(),
            official_website: String::new(),
            steam_link: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Document for Game {
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

    fn prepare(&mut self) {
        if self.slug.is_empty() && !self.name.is_empty() {
            self.slug = slugify(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_derives_slug_from_name() {
        let mut game = Game::new("Baldur's Gate 3");
        game.prepare();
        assert_eq!(game.slug, "baldur-s-gate-3");
    }
}
