//! AES-256-CBC blob encryption.
//!
//! A collection file is a single UTF-8 line of the form
//! `hex(iv):hex(ciphertext)`. The IV is 16 random bytes, fresh per write;
//! the ciphertext is the PKCS#7-padded AES-256-CBC encryption of the
//! serialized record array. CBC carries no authentication tag, so a wrong
//! key or a corrupted blob is detected as a padding failure (or as JSON
//! that does not parse) rather than as a MAC mismatch — callers on the
//! read path treat both the same way.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the CBC initialization vector in bytes.
const IV_SIZE: usize = 16;

/// Encrypts `plaintext` into the on-disk blob format.
///
/// Infallible: the key is validated at construction and padding encryption
/// cannot fail for any input length.
#[must_use]
pub fn encrypt(key: &StoreKey, plaintext: &[u8]) -> String {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
}

/// Decrypts an on-disk blob back into plaintext bytes.
///
/// # Errors
///
/// Returns [`StoreError::MalformedBlob`] when the blob is not two hex
/// fields joined by `:`, and [`StoreError::DecryptionFailed`] when the
/// padding check fails (wrong key or truncated/corrupt ciphertext).
pub fn decrypt(key: &StoreKey, blob: &str) -> StoreResult<Vec<u8>> {
    let (iv_hex, cipher_hex) = blob
        .trim()
        .split_once(':')
        .ok_or_else(|| StoreError::MalformedBlob("missing ':' separator".into()))?;

    let iv_raw = hex::decode(iv_hex)
        .map_err(|err| StoreError::MalformedBlob(format!("iv: {err}")))?;
    let iv: [u8; IV_SIZE] = iv_raw.try_into().map_err(|_| {
        StoreError::MalformedBlob(format!("iv must be {IV_SIZE} bytes"))
    })?;
    let ciphertext = hex::decode(cipher_hex)
        .map_err(|err| StoreError::MalformedBlob(format!("ciphertext: {err}")))?;

    Aes256CbcDec::new(key.as_bytes().into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| StoreError::DecryptionFailed)
}
