//! Sealtext - secret-based text encryption using AES-256-GCM
//!
//! A plaintext string and a user secret go in, a self-contained base64
//! transport text comes out. The transport text is
//! `base64(salt(16) || nonce(12) || ciphertext || tag(16))`; salt and nonce
//! are drawn fresh for every encryption.

#![forbid(unsafe_code)]

pub mod armor;
pub mod cipher;
pub mod error;
pub mod kdf;
pub mod random;
pub mod secret;
pub mod secretgen;
pub mod text_ops;
pub mod textcrypt;

pub use error::{ErrorCategory, ErrorKind, Result, SealtextError};
pub use kdf::{DerivedKey, KeyDerivation, ScryptCost};
pub use random::RandomSource;
pub use secretgen::{generate_secret, generate_secret_with};
pub use textcrypt::{decrypt, decrypt_with, encrypt, encrypt_deterministic, encrypt_with};

/// Length of the per-message key derivation salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of the AES-GCM nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the derived AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Smallest decodable blob: salt, nonce and the tag of an empty plaintext
pub const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Length in characters of a secret produced by [`generate_secret`]
pub const GENERATED_SECRET_LEN: usize = 64;
