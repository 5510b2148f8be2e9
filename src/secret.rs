//! Secret reading functionality

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading secrets from various sources
pub trait SecretReader {
    /// Read a secret as text.
    ///
    /// Returns the secret wrapped in `Zeroizing` to ensure it is securely
    /// wiped from memory when dropped.
    fn read_secret(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed secret (for testing and for freshly generated secrets)
pub struct ConstantSecretReader {
    secret: Zeroizing<String>,
}

impl ConstantSecretReader {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }
}

impl SecretReader for ConstantSecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.secret.clone())
    }
}

/// Reads the secret from any io::Read source, verbatim up to EOF
pub struct ReaderSecretReader {
    reader: Box<dyn Read>,
}

impl ReaderSecretReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl SecretReader for ReaderSecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading secret: {}", e),
                e,
            )
        })?;

        match String::from_utf8(std::mem::take(&mut *data)) {
            Ok(secret) => Ok(Zeroizing::new(secret)),
            Err(e) => {
                drop(Zeroizing::new(e.into_bytes()));
                Err(SealtextError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::SecretUnavailable,
                    "secret is not valid UTF-8 text",
                ))
            }
        }
    }
}

/// Reads the secret from terminal with no echo
pub struct TerminalSecretReader;

impl TerminalSecretReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalSecretReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretReader for TerminalSecretReader {
    fn read_secret(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(SealtextError::with_kind(
                ErrorCategory::User,
                ErrorKind::SecretUnavailable,
                "cannot read secret from terminal - stdin is not a terminal",
            ));
        }

        io::stderr().write_all(b"Secret (sealtext): ").map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write prompt: {}", e),
                e,
            )
        })?;
        io::stderr().flush().map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to flush prompt: {}", e),
                e,
            )
        })?;

        // Read secret *without echo*
        let secret = rpassword::read_password().map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::SecretUnavailable,
                format!("failure reading secret: {}", e),
                e,
            )
        })?;

        Ok(Zeroizing::new(secret))
    }
}
