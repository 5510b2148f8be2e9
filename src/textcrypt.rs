//! Text encryption/decryption: key derivation + AES-256-GCM + transport armor
//!
//! `encrypt` draws a fresh salt and nonce, derives the key from the secret
//! and salt, seals the UTF-8 plaintext and packs everything into one
//! transport text. `decrypt` reverses each step and fails closed: either
//! the complete verified plaintext comes back or a classified error does.

use rand::rngs::OsRng;
use tracing::debug;

use crate::armor;
use crate::cipher;
use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use crate::kdf::KeyDerivation;
use crate::random::{RandomSource, random_array};
use crate::{NONCE_LEN, SALT_LEN};

/// Encrypt `plaintext` under `secret` with the default key derivation and
/// the operating system's random source.
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String> {
    encrypt_with(&mut OsRng, &KeyDerivation::default(), plaintext, secret)
}

/// Decrypt a transport text produced by [`encrypt`].
pub fn decrypt(text: &str, secret: &str) -> Result<String> {
    decrypt_with(&KeyDerivation::default(), text, secret)
}

/// Encrypt with an explicit random source and key derivation.
pub fn encrypt_with(
    rng: &mut dyn RandomSource,
    kdf: &KeyDerivation,
    plaintext: &str,
    secret: &str,
) -> Result<String> {
    let salt: [u8; SALT_LEN] = random_array(rng).map_err(|e| e.with_context("encryption failed"))?;
    let nonce: [u8; NONCE_LEN] =
        random_array(rng).map_err(|e| e.with_context("encryption failed"))?;

    encrypt_deterministic(kdf, plaintext, secret, &salt, &nonce)
}

/// Encrypt using the provided salt and nonce.
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` or `encrypt_with()`,
/// which draw a random salt and nonce.
pub fn encrypt_deterministic(
    kdf: &KeyDerivation,
    plaintext: &str,
    secret: &str,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<String> {
    debug!(kdf = kdf.name(), plaintext_len = plaintext.len(), "encrypting");

    let key = kdf
        .derive_key(secret, salt)
        .map_err(|e| e.with_context("encryption failed"))?;
    let sealed = cipher::seal(&key, nonce, plaintext.as_bytes())
        .map_err(|e| e.with_context("encryption failed"))?;

    Ok(armor::pack(salt, nonce, &sealed))
}

/// Decrypt with an explicit key derivation.
pub fn decrypt_with(kdf: &KeyDerivation, text: &str, secret: &str) -> Result<String> {
    let envelope = armor::unpack(text).map_err(|e| e.with_context("decryption failed"))?;
    debug!(
        kdf = kdf.name(),
        sealed_len = envelope.sealed.len(),
        "decrypting"
    );

    let key = kdf
        .derive_key(secret, &envelope.salt)
        .map_err(|e| e.with_context("decryption failed"))?;
    let plaintext = cipher::open(&key, &envelope.nonce, &envelope.sealed)
        .map_err(|e| e.with_context("decryption failed"))?;

    String::from_utf8(plaintext).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Encoding,
            "decrypted data is not valid UTF-8 text",
            e,
        )
        .with_context("decryption failed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::ScryptCost;
    use crate::{MIN_BLOB_LEN, TAG_LEN};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cheap() -> KeyDerivation {
        KeyDerivation::Scrypt(ScryptCost::new(10, 8, 1).unwrap())
    }

    fn roundtrip(kdf: &KeyDerivation, plaintext: &str, secret: &str) -> String {
        let text = encrypt_with(&mut OsRng, kdf, plaintext, secret).unwrap();
        decrypt_with(kdf, &text, secret).unwrap()
    }

    #[test]
    fn test_hello_world() {
        let text = encrypt("hello world", "my-secret").unwrap();
        assert_eq!(decrypt(&text, "my-secret").unwrap(), "hello world");

        let err = decrypt(&text, "wrong").expect_err("expected authentication failure");
        assert_eq!(err.kind, Some(ErrorKind::Authentication));
    }

    #[test]
    fn test_empty_plaintext() {
        let kdf = cheap();
        let text = encrypt_with(&mut OsRng, &kdf, "", "test").unwrap();
        assert_eq!(STANDARD.decode(&text).unwrap().len(), MIN_BLOB_LEN);
        assert_eq!(decrypt_with(&kdf, &text, "test").unwrap(), "");
    }

    #[test]
    fn test_roundtrip_assorted() {
        let kdf = cheap();
        for (plaintext, secret) in [
            ("hello", "test"),
            ("line one\nline two\r\n", "pässwörd"),
            ("日本語のテキスト 🔐", ""),
            ("\0\u{1}\u{7f}", "  spaces  "),
        ] {
            assert_eq!(roundtrip(&kdf, plaintext, secret), plaintext);
        }
    }

    #[test]
    fn test_roundtrip_sha256() {
        assert_eq!(
            roundtrip(&KeyDerivation::Sha256, "legacy text", "s"),
            "legacy text"
        );
    }

    #[test]
    fn test_large_plaintext() {
        let plaintext = "x".repeat(128 * 1024);
        let kdf = cheap();
        let text = encrypt_with(&mut OsRng, &kdf, &plaintext, "test").unwrap();
        assert_eq!(
            STANDARD.decode(&text).unwrap().len(),
            SALT_LEN + NONCE_LEN + plaintext.len() + TAG_LEN
        );
        assert_eq!(decrypt_with(&kdf, &text, "test").unwrap(), plaintext);
    }

    #[test]
    fn test_non_deterministic() {
        let kdf = cheap();
        let a = encrypt_with(&mut OsRng, &kdf, "same", "same").unwrap();
        let b = encrypt_with(&mut OsRng, &kdf, "same", "same").unwrap();
        assert_ne!(a, b);

        let ea = armor::unpack(&a).unwrap();
        let eb = armor::unpack(&b).unwrap();
        assert_ne!(ea.salt, eb.salt);
        assert_ne!(ea.nonce, eb.nonce);
    }

    #[test]
    fn test_injected_source_is_reproducible() {
        let kdf = cheap();
        let a = encrypt_with(&mut StdRng::seed_from_u64(11), &kdf, "p", "s").unwrap();
        let b = encrypt_with(&mut StdRng::seed_from_u64(11), &kdf, "p", "s").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic_known_answer() {
        let salt = [0x42u8; SALT_LEN];
        let nonce = [0x24u8; NONCE_LEN];

        let text = encrypt_deterministic(
            &KeyDerivation::default(),
            "test payload",
            "test",
            &salt,
            &nonce,
        )
        .unwrap();
        assert_eq!(
            text,
            "QkJCQkJCQkJCQkJCQkJCQiQkJCQkJCQkJCQkJMbmhdlvxROk/+yZtqRkh+yl3mN6DOFGc3fO1JQ="
        );

        let text =
            encrypt_deterministic(&KeyDerivation::Sha256, "test payload", "test", &salt, &nonce)
                .unwrap();
        assert_eq!(
            text,
            "QkJCQkJCQkJCQkJCQkJCQiQkJCQkJCQkJCQkJJTEzc5uBceH/0kmq131ahkXYE+eDRYskUi6mQg="
        );
        assert_eq!(
            decrypt_with(&KeyDerivation::Sha256, &text, "test").unwrap(),
            "test payload"
        );
    }

    #[test]
    fn test_every_flipped_byte_detected() {
        let kdf = KeyDerivation::Sha256;
        let text = encrypt_with(&mut OsRng, &kdf, "tamper", "key").unwrap();
        let blob = STANDARD.decode(&text).unwrap();

        for i in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x80;
            let err = decrypt_with(&kdf, &STANDARD.encode(&tampered), "key")
                .expect_err("tampering must be detected");
            assert_eq!(err.kind, Some(ErrorKind::Authentication), "byte {}", i);
        }
    }

    #[test]
    fn test_truncated_blob() {
        let kdf = KeyDerivation::Sha256;
        let text = encrypt_with(&mut OsRng, &kdf, "", "key").unwrap();
        let blob = STANDARD.decode(&text).unwrap();

        let err = decrypt_with(&kdf, &STANDARD.encode(&blob[..MIN_BLOB_LEN - 1]), "key")
            .expect_err("expected truncated error");
        assert_eq!(err.kind, Some(ErrorKind::FormatTruncated));
        assert_eq!(err.message(), "decryption failed");
    }

    #[test]
    fn test_garbage_text() {
        let err = decrypt_with(&cheap(), "%%% not base64 %%%", "key").expect_err("expected error");
        assert_eq!(err.kind, Some(ErrorKind::FormatDecode));
    }

    #[test]
    fn test_mismatched_kdf() {
        let text = encrypt_with(&mut OsRng, &KeyDerivation::Sha256, "hi", "key").unwrap();
        let err = decrypt_with(&cheap(), &text, "key").expect_err("expected failure");
        assert_eq!(err.kind, Some(ErrorKind::Authentication));
    }

    #[test]
    fn test_invalid_utf8_plaintext() {
        // Only reachable when a peer seals non-text bytes with a valid key.
        let kdf = KeyDerivation::Sha256;
        let salt = [1u8; SALT_LEN];
        let nonce = [2u8; NONCE_LEN];
        let key = kdf.derive_key("key", &salt).unwrap();
        let sealed = cipher::seal(&key, &nonce, &[0xff, 0xfe, 0x00]).unwrap();
        let text = armor::pack(&salt, &nonce, &sealed);

        let err = decrypt_with(&kdf, &text, "key").expect_err("expected encoding error");
        assert_eq!(err.kind, Some(ErrorKind::Encoding));
    }

    #[test]
    fn test_random_failure() {
        struct Broken;
        impl RandomSource for Broken {
            fn try_fill(&mut self, _dest: &mut [u8]) -> Result<()> {
                Err(SealtextError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::RandomSource,
                    "simulated outage",
                ))
            }
        }

        let err = encrypt_with(&mut Broken, &cheap(), "p", "s").expect_err("expected failure");
        assert_eq!(err.kind, Some(ErrorKind::RandomSource));
        assert_eq!(err.display_chain(), "encryption failed: simulated outage");
    }

    #[test]
    fn test_concurrent_calls_independent() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let plaintext = format!("message {}", i);
                    let secret = format!("secret {}", i % 2);
                    let text = encrypt_with(&mut OsRng, &KeyDerivation::Sha256, &plaintext, &secret)
                        .unwrap();
                    (plaintext, secret, text)
                })
            })
            .collect();

        for handle in handles {
            let (plaintext, secret, text) = handle.join().unwrap();
            assert_eq!(
                decrypt_with(&KeyDerivation::Sha256, &text, &secret).unwrap(),
                plaintext
            );
        }
    }
}
