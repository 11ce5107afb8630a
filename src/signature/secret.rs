//! Private key holder.

use std::fmt;
use std::path::Path;

use crate::error::SigningError;

/// The shared secret used to sign payloads.
///
/// An empty key is representable (it is what an unconfigured signer holds)
/// but every sign or verify attempt with it fails.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// A key with no bytes, i.e. "not configured".
    pub fn unset() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The key bytes, or a configuration error if none are set.
    pub fn expose(&self) -> Result<&[u8], SigningError> {
        if self.0.is_empty() {
            return Err(SigningError::config("private_key not configured"));
        }
        Ok(&self.0)
    }

    /// Load a secret from a file.
    ///
    /// On Unix the file must not be readable by group or others (0600 or
    /// 0400). Trailing newlines are stripped so `echo secret > file` works.
    pub fn load(path: &Path) -> Result<Self, SigningError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            SigningError::config(format!(
                "Failed to read private key metadata from {}: {}",
                path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(SigningError::config(format!(
                    "Private key file {} has insecure permissions {:04o}, expected 0600 or 0400",
                    path.display(),
                    mode & 0o777
                )));
            }
        }
        #[cfg(not(unix))]
        let _ = metadata;

        let mut bytes = std::fs::read(path).map_err(|e| {
            SigningError::config(format!(
                "Failed to read private key from {}: {}",
                path.display(),
                e
            ))
        })?;
        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }

        Ok(Self(bytes))
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for SecretKey {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl From<&[u8]> for SecretKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SecretKey(<unset>)")
        } else {
            f.write_str("SecretKey(<redacted>)")
        }
    }
}
