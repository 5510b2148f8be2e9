//! Fresh secret generation
//!
//! 32 random bytes are hashed with SHA-256 and rendered as lowercase hex.
//! The result is an ordinary secret; nothing downstream treats it specially.

use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::GENERATED_SECRET_LEN;
use crate::error::Result;
use crate::random::RandomSource;

/// Number of random bytes fed into the hash
const SEED_LEN: usize = 32;

/// Generate a secret from the operating system's random source.
pub fn generate_secret() -> Result<String> {
    generate_secret_with(&mut OsRng)
}

/// Generate a secret from the given random source.
pub fn generate_secret_with(rng: &mut dyn RandomSource) -> Result<String> {
    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    rng.try_fill(&mut seed[..])?;
    let secret = hex::encode(Sha256::digest(&seed[..]));
    debug_assert_eq!(secret.len(), GENERATED_SECRET_LEN);
    debug!(len = secret.len(), "generated secret");
    Ok(secret)
}
