//! The `reviews` collection: one game review per record.

use chrono::{DateTime, Utc};
use coffer_store::{Collection, Document, StoragePaths, StoreKey};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// Publication state of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Being written; not publicly visible.
    #[default]
    Draft,
    /// Publicly visible.
    Published,
    /// Withdrawn from the public site but retained.
    Archived,
}

/// A platform a game is available on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Platform name (e.g. "PC", "PS5").
    pub name: String,
    /// Icon asset reference.
    #[serde(default)]
    pub icon: String,
}

/// A game review.
///
/// The slug is derived from the title on first save when absent, and the
/// caller never sets identity or timestamps — [`Collection::save`] does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Record identity, assigned on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Review headline.
    pub title: String,
    /// Name of the reviewed game.
    pub game_name: String,
    /// URL slug, derived from the title when empty.
    #[serde(default)]
    pub slug: String,
    /// Short teaser shown in listings.
    #[serde(default)]
    pub summary: String,
    /// Review body.
    pub content: String,
    /// Cover image reference.
    #[serde(default)]
    pub cover_image: String,
    /// Hero image reference.
    #[serde(default)]
    pub main_image: String,
    /// Screenshot references.
    #[serde(default)]
    pub screenshots: Vec<String>,
    /// Score on a 0–10 scale.
    #[serde(default)]
    pub rating: f64,
    /// Platforms covered by the review.
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Primary genre.
    #[serde(default)]
    pub genre: String,
    /// Game developer.
    #[serde(default)]
    pub developer: String,
    /// Game publisher.
    #[serde(default)]
    pub publisher: String,
    /// Game release date.
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    /// What the reviewer liked.
    #[serde(default)]
    pub pros: Vec<String>,
    /// What the reviewer disliked.
    #[serde(default)]
    pub cons: Vec<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Companion video link.
    #[serde(default)]
    pub youtube: String,
    /// Publication state.
    #[serde(default)]
    pub status: ReviewStatus,
    /// View counter.
    #[serde(default)]
    pub views: u64,
    /// Whether the review is pinned on the front page.
    #[serde(default)]
    pub featured: bool,
    /// Id of the authoring admin.
    #[serde(default)]
    pub author: Option<String>,
    /// Set on first save.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Name of the backing collection.
    pub const COLLECTION: &'static str = "reviews";

    /// Opens the `reviews` collection.
    #[must_use]
    pub fn collection(paths: &StoragePaths, key: StoreKey) -> Collection<Self> {
        Collection::open(paths, key, Self::COLLECTION)
    }

    /// Creates a draft review with the required fields; everything else
    /// starts at its default.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        game_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            game_name: game_name.into(),
            slug: String::new(),
            summary: String::new(),
            content: content.into(),
            cover_image: String::new(),
            main_image: String::new(),
            screenshots: Vec::new(),
            rating: 0.0,
            platforms: Vec::new(),
            genre: String::new(),
            developer: String::new(),
            publisher: String::new(),
            release_date: None,
            pros: Vec::new(),
            cons: Vec::new(),
            tags: Vec::new(),
            youtube: String::new(),
            status: ReviewStatus::default(),
            views: 0,
            featured: false,
            author: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Document for Review {
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
        if self.slug.is_empty() && !self.title.is_empty() {
            self.slug = slugify(&self.title);
        }
    }
}
