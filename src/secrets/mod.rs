//! secrets
//!
//! Secret storage abstraction for remote credentials.
//!
//! # Architecture
//!
//! Raw secrets go through the [`SecretStore`] trait:
//!
//! - [`FileSecretStore`]: stores in `~/.vaultsync/secrets.toml` (default)
//! - [`KeychainSecretStore`]: uses the OS keychain (feature-gated)
//!
//! The engine does not handle raw strings; it uses [`CredentialStore`],
//! which serializes the whole [`GitAuth`](crate::core::types::GitAuth)
//! bundle under a single key.
//!
//! # Security
//!
//! All implementations follow these rules:
//!
//! - Secrets are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)

mod credential;
mod file_store;
mod keychain_store;
mod traits;

pub use credential::CredentialStore;
pub use file_store::FileSecretStore;
#[cfg(feature = "keychain")]
pub use keychain_store::KeychainSecretStore;
pub use traits::{SecretError, SecretStore};

/// Default secret provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store for the given provider name.
///
/// # Providers
///
/// - `"file"` (default): [`FileSecretStore`]
/// - `"keychain"`: [`KeychainSecretStore`] (requires the `keychain`
///   feature)
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        #[cfg(feature = "keychain")]
        "keychain" => Ok(Box::new(KeychainSecretStore::new()?)),
        #[cfg(not(feature = "keychain"))]
        "keychain" => Err(SecretError::ProviderNotAvailable(
            "keychain support requires the 'keychain' feature".into(),
        )),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_rejected() {
        let err = create_store("carrier-pigeon").unwrap_err();
        assert!(matches!(err, SecretError::ProviderNotAvailable(_)));
    }

    #[cfg(not(feature = "keychain"))]
    #[test]
    fn keychain_requires_feature() {
        let err = create_store("keychain").unwrap_err();
        assert!(matches!(err, SecretError::ProviderNotAvailable(_)));
    }
}
