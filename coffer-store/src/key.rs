//! Store encryption key (256-bit).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{StoreError, StoreResult};

/// Symmetric key used to encrypt every collection file.
///
/// The key is 32 bytes, configured as a 64-character hex string. It is an
/// explicit constructor argument of the store — there is no ambient or
/// per-process fallback key, because data written under a throwaway key is
/// permanently unreadable once the process exits.
///
/// # Security
///
/// - The key bytes are zeroized on drop.
/// - `Debug` output redacts the key material.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StoreKey([u8; 32]);

impl StoreKey {
    /// Length of the hex encoding of a key.
    pub const HEX_LEN: usize = 64;

    /// Creates a key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a key from its 64-character hex encoding.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] if the input is not exactly
    /// 64 hex characters.
    pub fn from_hex(hex_key: &str) -> StoreResult<Self> {
        let hex_key = hex_key.trim();
        if hex_key.len() != Self::HEX_LEN {
            return Err(StoreError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                hex_key.len()
            )));
        }
        let raw = hex::decode(hex_key)
            .map_err(|err| StoreError::InvalidKey(err.to_string()))?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Reads a key from the environment variable `var`.
    ///
    /// An absent variable is a hard error, never a silent fallback to a
    /// generated key: refusing to start beats writing data nobody can read
    /// back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyMissing`] when `var` is unset and
    /// [`StoreError::InvalidKey`] when it is set but malformed.
    pub fn from_env(var: &str) -> StoreResult<Self> {
        let value =
            std::env::var(var).map_err(|_| StoreError::KeyMissing(var.to_string()))?;
        Self::from_hex(&value)
    }

    /// Generates a random key.
    ///
    /// Intended for tests and throwaway stores. Collections written under a
    /// generated key cannot be read by any process that does not hold the
    /// same key, so persist the hex encoding externally if the data matters.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the raw key bytes.
    pub(crate) const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
