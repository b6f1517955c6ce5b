//! secrets::traits
//!
//! Secret storage trait definition.
//!
//! # Security
//!
//! Implementations MUST:
//! - Never log, print, or include secrets in error messages
//! - Use secure storage mechanisms appropriate to the platform
//! - Be thread-safe (Send + Sync)

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Note: error messages intentionally do not include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Failed to delete from secret storage.
    #[error("failed to delete secret: {0}")]
    DeleteError(String),

    /// Provider not available or not configured.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for secret storage providers.
///
/// Keys are namespaced strings like `"remote.auth"`; implementations
/// store them as-is without interpretation.
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Get a secret by key.
    ///
    /// Returns `Ok(None)` if the secret does not exist. The returned
    /// value is the raw secret; do not log or print it.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value for the key.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Idempotent: deleting a missing key is `Ok`.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        assert!(SecretError::ReadError("disk full".into())
            .to_string()
            .contains("read"));
        assert!(SecretError::WriteError("denied".into())
            .to_string()
            .contains("write"));
        assert!(SecretError::DeleteError("io".into())
            .to_string()
            .contains("delete"));
        assert!(SecretError::ProviderNotAvailable("keychain".into())
            .to_string()
            .contains("provider"));
    }
}
