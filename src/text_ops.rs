//! Encrypt/decrypt text held in files or standard streams
//!
//! Input comes from a file or stdin, output goes to a file or stdout.
//! Files are written atomically (tempfile + fsync + rename) and, on Unix,
//! with mode 0o600 since they may hold plaintext.

use crate::error::{ErrorCategory, ErrorKind, Result, SealtextError};
use crate::kdf::KeyDerivation;
use crate::secret::SecretReader;
use crate::textcrypt;
use std::fs;
use std::io::{self, Read, Write};
use rand::rngs::OsRng;
use std::path::Path;
use tracing::{debug, info};

/// Encrypt text from `input` (stdin when `None`) and write the transport
/// text to `output` (stdout when `None`).
pub fn encrypt_text(
    input: Option<&Path>,
    output: Option<&Path>,
    kdf: &KeyDerivation,
    secret_reader: &mut dyn SecretReader,
) -> Result<()> {
    let plaintext = read_text(input)?;
    let secret = secret_reader.read_secret()?;
    let transport = textcrypt::encrypt_with(&mut OsRng, kdf, &plaintext, &secret)?;

    match output {
        Some(path) => {
            write_file_secure(path, transport.as_bytes())?;
            info!(path = %path.display(), "wrote transport text");
        }
        None => write_stdout(format!("{}\n", transport).as_bytes())?,
    }
    Ok(())
}

/// Decrypt the transport text from `input` (stdin when `None`) and write
/// the plaintext to `output` (stdout when `None`).
///
/// Nothing is written unless decryption fully succeeds.
pub fn decrypt_text(
    input: Option<&Path>,
    output: Option<&Path>,
    kdf: &KeyDerivation,
    secret_reader: &mut dyn SecretReader,
) -> Result<()> {
    let transport = read_text(input)?;
    let secret = secret_reader.read_secret()?;
    let plaintext = textcrypt::decrypt_with(kdf, &transport, &secret)?;

    match output {
        Some(path) => {
            write_file_secure(path, plaintext.as_bytes())?;
            info!(path = %path.display(), "wrote plaintext");
        }
        None => write_stdout(plaintext.as_bytes())?,
    }
    Ok(())
}

fn read_text(input: Option<&Path>) -> Result<String> {
    let bytes = match input {
        Some(path) => fs::read(path).map_err(|e| read_error(path, e))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).map_err(|e| {
                SealtextError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to read from stdin",
                    e,
                )
            })?;
            buf
        }
    };
    debug!(len = bytes.len(), "read input");

    String::from_utf8(bytes).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Encoding,
            "input is not valid UTF-8 text",
            e,
        )
    })
}

fn write_stdout(contents: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(contents)
        .and_then(|()| stdout.flush())
        .map_err(|e| {
            SealtextError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write to stdout",
                e,
            )
        })
}

/// Replace `path` atomically with `contents`, readable only by the owner on Unix.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                SealtextError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        SealtextError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> SealtextError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    SealtextError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
