//! Error types for the encrypted document store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the encrypted document store.
///
/// Read operations (`find`, `find_one`, `count`) never surface these: any
/// read-path failure is mapped to an empty collection. Write operations
/// report them explicitly so callers can decide whether a failed mutation
/// is user-visible.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The encryption key environment variable is not set.
    #[error("encryption key is not configured ({0} is unset)")]
    KeyMissing(String),

    /// The encryption key is present but not a 64-character hex string.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// The on-disk blob is not in `hex(iv):hex(ciphertext)` form.
    #[error("malformed ciphertext blob: {0}")]
    MalformedBlob(String),

    /// Decryption failed — wrong key or corrupt ciphertext.
    #[error("decryption failed (wrong key or corrupt data)")]
    DecryptionFailed,

    /// A record or record set could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document serialized to something other than a JSON object.
    #[error("document did not serialize to a JSON object")]
    NotAnObject,

    /// An I/O operation on the collection file failed.
    #[error("i/o error while {context}: {source}")]
    Io {
        /// What the store was doing when the error occurred.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl StoreError {
    /// Wraps an I/O error with a short description of the operation.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
