//! Typed documents for the four Coffer collections.
//!
//! Each model is a plain serde struct implementing
//! [`coffer_store::Document`], so the generic store handles identity,
//! timestamps, and persistence. Field names serialize as camelCase to stay
//! readable by records written before the typed layer existed; unknown
//! legacy fields survive updates because the store merges shallowly.

use thiserror::Error;

mod admin;
mod comment;
mod game;
mod review;
mod slug;

pub use admin::Admin;
pub use comment::{Comment, CommentStatus, Report};
pub use game::Game;
pub use review::{Platform, Review, ReviewStatus};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the model layer on top of the store.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Password hashing or verification failed structurally.
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The underlying store reported a failure.
    #[error(transparent)]
    Store(#[from] coffer_store::StoreError),
}
