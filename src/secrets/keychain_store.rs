//! secrets::keychain_store
//!
//! Keychain-based secret storage using the OS keychain.
//!
//! # Platform Support
//!
//! Uses the `keyring` crate: macOS Keychain, Windows Credential Manager,
//! Linux Secret Service (via D-Bus).
//!
//! # Feature Flag
//!
//! Only available with the `keychain` feature flag.

#![cfg(feature = "keychain")]

use keyring::Entry;

use super::traits::{SecretError, SecretStore};

/// Keychain-based secret storage.
#[derive(Debug)]
pub struct KeychainSecretStore {
    /// Service name for keychain entries
    service: String,
}

impl KeychainSecretStore {
    /// Create a keychain store using `"vaultsync"` as the service name.
    pub fn new() -> Result<Self, SecretError> {
        Ok(Self {
            service: "vaultsync".to_string(),
        })
    }

    /// Create a keychain store with a custom service name.
    ///
    /// Primarily useful for testing to avoid conflicts.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// The service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, SecretError> {
        Entry::new(&self.service, key)
            .map_err(|e| SecretError::ReadError(format!("cannot create keyring entry: {}", e)))
    }
}

impl SecretStore for KeychainSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match self.entry(key)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecretError::ReadError(format!(
                "cannot read keychain entry: {}",
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entry(key)?.set_password(value).map_err(|e| {
            SecretError::WriteError(format!("cannot write keychain entry: {}", e))
        })
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretError::DeleteError(format!(
                "cannot delete keychain entry: {}",
                e
            ))),
        }
    }
}
