//! Transport text encoding
//!
//! The transport text is standard base64 (with padding) of
//! `salt(16) || nonce(12) || ciphertext || tag(16)`. Salt and nonce have
//! fixed lengths, so there are no length prefixes and no version marker:
//! everything after the first 28 bytes is the sealed body.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use crate::{MIN_BLOB_LEN, NONCE_LEN, SALT_LEN};

/// The decoded parts of a transport text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the authentication tag appended.
    pub sealed: Vec<u8>,
}

/// Concatenate the parts and encode them as transport text.
pub fn pack(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], sealed: &[u8]) -> String {
    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
    blob.extend_from_slice(salt);
    blob.extend_from_slice(nonce);
    blob.extend_from_slice(sealed);
    STANDARD.encode(&blob)
}

/// Decode transport text into its parts.
///
/// Surrounding ASCII whitespace is ignored; anything else outside the
/// base64 alphabet is an error.
pub fn unpack(text: &str) -> Result<Envelope> {
    let blob = STANDARD.decode(text.trim_ascii()).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::FormatDecode,
            format!("base64 decoding failed: {}", e),
            e,
        )
    })?;

    if blob.len() < MIN_BLOB_LEN {
        return Err(SealtextError::with_kind(
            ErrorCategory::User,
            ErrorKind::FormatTruncated,
            format!(
                "input decodes to {} bytes, fewer than the minimum of {}; likely truncated",
                blob.len(),
                MIN_BLOB_LEN
            ),
        ));
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    Ok(Envelope {
        salt: salt.try_into().map_err(|_| invariant("salt"))?,
        nonce: nonce.try_into().map_err(|_| invariant("nonce"))?,
        sealed: sealed.to_vec(),
    })
}

fn invariant(part: &str) -> SealtextError {
    SealtextError::new(
        ErrorCategory::Internal,
        format!("{} slice has unexpected length", part),
    )
}
