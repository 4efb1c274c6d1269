//! The `comments` collection: visitor comments on reviews, moderated by
//! an admin before they become visible.

use chrono::{DateTime, Utc};
use coffer_store::{Collection, Document, StoragePaths, StoreKey};
use serde::{Deserialize, Serialize};

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Awaiting moderation; not publicly visible.
    #[default]
    Pending,
    /// Approved and visible.
    Approved,
    /// Rejected by a moderator.
    Rejected,
    /// Flagged by visitors and awaiting re-moderation.
    Reported,
}

/// A visitor report against a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Free-form reason given by the reporter.
    #[serde(default)]
    pub reason: String,
    /// When the report was filed.
    #[serde(default)]
    pub reported_at: Option<DateTime<Utc>>,
}

/// A comment on a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Record identity, assigned on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the review this comment belongs to.
    pub review_id: String,
    /// Display name of the commenter.
    pub user_name: String,
    /// Email of the commenter (not shown publicly).
    #[serde(default)]
    pub user_email: String,
    /// Comment body.
    pub content: String,
    /// Optional 1–5 visitor rating.
    #[serde(default)]
    pub rating: Option<u8>,
    /// Moderation state.
    #[serde(default)]
    pub status: CommentStatus,
    /// Whether the comment is highlighted under the review.
    #[serde(default)]
    pub featured: bool,
    /// Like counter.
    #[serde(default)]
    pub likes: u64,
    /// Visitor reports filed against this comment.
    #[serde(default)]
    pub reports: Vec<Report>,
    /// Submitter address, kept for abuse handling.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Submitter user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Set on first save.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Name of the backing collection.
    pub const COLLECTION: &'static str = "comments";

    /// Opens the `comments` collection.
    #[must_use]
    pub fn collection(paths: &StoragePaths, key: StoreKey) -> Collection<Self> {
        Collection::open(paths, key, Self::COLLECTION)
    }

    /// Creates a pending comment.
    #[must_use]
    pub fn new(
        review_id: impl Into<String>,
        user_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            review_id: review_id.into(),
            user_name: user_name.into(),
            user_email: String::new(),
            content: content.into(),
            rating: None,
            status: CommentStatus::default(),
            featured: false,
            likes: 0,
            reports: Vec::new(),
            ip_address: None,
            user_agent: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Document for Comment {
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
    fn new_comments_start_pending_and_unfeatured() {
        let comment = Comment::new("r1", "visitor", "great review");
        assert_eq!(comment.status, CommentStatus::Pending);
        assert!(!comment.featured);
        assert_eq!(comment.likes, 0);
    }

    #[test]
    fn legacy_records_without_new_fields_deserialize() {
        let comment: Comment = serde_json::from_str(
            r#"{"reviewId": "r1", "userName": "old", "content": "from before"}"#,
        )
        .expect("deserialize legacy record");
        assert_eq!(comment.status, CommentStatus::Pending);
        assert!(comment.reports.is_empty());
    }
}
