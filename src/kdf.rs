//! Secret-to-key derivation
//!
//! A [`KeyDerivation`] maps `(secret, salt)` to a 32-byte AES key. Two
//! schemes are available:
//! - scrypt with a caller-chosen cost (the default)
//! - a single SHA-256 pass over `secret || salt`, for compatibility with
//!   transport texts produced by deployments that never stretched the secret
//!
//! The transport text records neither the scheme nor the cost, so the
//! encrypting and decrypting side must be configured identically.

use std::fmt;

use scrypt::{Params, scrypt};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use crate::{KEY_LEN, SALT_LEN};

/// Default scrypt log2(N) parameter (N = 32768)
const SCRYPT_LOG_N: u8 = 15;

/// Default scrypt r parameter (block size)
const SCRYPT_R: u32 = 8;

/// Default scrypt p parameter (parallelization)
const SCRYPT_P: u32 = 1;

/// A derived AES-256 key. Zeroized on drop.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Work factor for scrypt. Validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    log_n: u8,
    r: u32,
    p: u32,
}

impl ScryptCost {
    /// Build a cost, rejecting combinations scrypt itself would refuse.
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self> {
        Params::new(log_n, r, p, KEY_LEN).map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::KeyDerivation,
                format!("invalid scrypt cost (log_n={}, r={}, p={})", log_n, r, p),
                e,
            )
        })?;
        Ok(Self { log_n, r, p })
    }

    pub fn log_n(&self) -> u8 {
        self.log_n
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }
}

impl Default for ScryptCost {
    fn default() -> Self {
        Self {
            log_n: SCRYPT_LOG_N,
            r: SCRYPT_R,
            p: SCRYPT_P,
        }
    }
}

/// How a secret and salt become a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDerivation {
    /// scrypt with the given cost.
    Scrypt(ScryptCost),
    /// One SHA-256 pass over `utf8(secret) || salt`. No stretching.
    Sha256,
}

impl Default for KeyDerivation {
    fn default() -> Self {
        KeyDerivation::Scrypt(ScryptCost::default())
    }
}

impl KeyDerivation {
    /// Short name used in logs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            KeyDerivation::Scrypt(_) => "scrypt",
            KeyDerivation::Sha256 => "sha256",
        }
    }

    /// Derive the key for `secret` under `salt`. Pure: equal inputs give equal keys.
    pub fn derive_key(&self, secret: &str, salt: &[u8; SALT_LEN]) -> Result<DerivedKey> {
        match self {
            KeyDerivation::Scrypt(cost) => derive_scrypt(cost, secret.as_bytes(), salt),
            KeyDerivation::Sha256 => Ok(derive_sha256(secret.as_bytes(), salt)),
        }
    }
}

fn derive_scrypt(cost: &ScryptCost, secret: &[u8], salt: &[u8; SALT_LEN]) -> Result<DerivedKey> {
    let params = Params::new(cost.log_n, cost.r, cost.p, KEY_LEN).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::KeyDerivation,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = DerivedKey::from_bytes([0u8; KEY_LEN]);
    scrypt(secret, salt, &params, &mut key.bytes).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::KeyDerivation,
            "scrypt key derivation failed",
            e,
        )
    })?;

    Ok(key)
}

fn derive_sha256(secret: &[u8], salt: &[u8; SALT_LEN]) -> DerivedKey {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(salt);
    let mut key = DerivedKey::from_bytes([0u8; KEY_LEN]);
    key.bytes.copy_from_slice(&hasher.finalize());
    key
}
