//! AES-256-GCM sealing and opening
//!
//! The sealed form is `ciphertext || tag`; the 16-byte tag is appended by
//! the cipher and checked before any plaintext is released. No associated
//! data is bound.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use crate::kdf::DerivedKey;
use crate::{NONCE_LEN, TAG_LEN};

fn cipher_for(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext`, returning `ciphertext || tag`.
///
/// A given `(key, nonce)` pair must never seal two messages; callers draw
/// a fresh nonce for every call.
pub fn seal(key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher_for(key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| {
            SealtextError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::Cipher,
                "AES-GCM refused to seal the plaintext",
            )
        })
}

/// Verify and decrypt `ciphertext || tag`.
///
/// Returns nothing but an error unless the tag verifies.
pub fn open(key: &DerivedKey, nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < TAG_LEN {
        return Err(authentication_failed());
    }
    cipher_for(key)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| authentication_failed())
}

fn authentication_failed() -> SealtextError {
    SealtextError::with_kind(
        ErrorCategory::User,
        ErrorKind::Authentication,
        "corrupt input, tampered-with data, or wrong secret",
    )
}
