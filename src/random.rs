//! Source of cryptographically secure random bytes
//!
//! Salts, nonces and generated secrets all come from a [`RandomSource`]
//! handed in by the caller. Production code passes `rand::rngs::OsRng`;
//! tests pass a seeded `StdRng` to get reproducible output.

use rand::{CryptoRng, RngCore};

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};

/// Capability to fill buffers with secure random bytes.
pub trait RandomSource {
    /// Fill `dest` entirely, or fail without partial success being observable.
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<()>;
}

impl<R: RngCore + CryptoRng> RandomSource for R {
    fn try_fill(&mut self, dest: &mut [u8]) -> Result<()> {
        self.try_fill_bytes(dest).map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomSource,
                format!("secure random source unavailable: {}", e),
                e,
            )
        })
    }
}

/// Draw a fixed-size array of random bytes.
pub fn random_array<const N: usize>(rng: &mut dyn RandomSource) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    rng.try_fill(&mut out)?;
    Ok(out)
}
