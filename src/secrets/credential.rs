//! secrets::credential
//!
//! The engine-facing credential cell.
//!
//! # Design
//!
//! The engine treats credentials as a single async-key-value-cell shaped
//! contract: `store_token` / `get_token` / `clear_token`, scoped to one
//! fixed key. [`CredentialStore`] implements that contract over any
//! [`SecretStore`], serializing the whole
//! [`GitAuth`](crate::core::types::GitAuth) bundle as JSON under one key.

use crate::core::types::GitAuth;

use super::traits::{SecretError, SecretStore};

/// Key under which the serialized credential bundle is stored.
const AUTH_KEY: &str = "remote.auth";

/// Single-slot credential storage over a [`SecretStore`].
pub struct CredentialStore {
    store: Box<dyn SecretStore>,
}

impl CredentialStore {
    /// Wrap a secret store.
    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Store the credential bundle, replacing any existing one.
    pub fn store_token(&self, auth: &GitAuth) -> Result<(), SecretError> {
        let json = serde_json::to_string(auth)
            .map_err(|e| SecretError::WriteError(format!("cannot serialize credential: {}", e)))?;
        self.store.set(AUTH_KEY, &json)
    }

    /// Load the credential bundle, if one is stored.
    ///
    /// A stored value that no longer parses is treated as absent rather
    /// than an error; the caller will be prompted to re-authenticate.
    pub fn get_token(&self) -> Result<Option<GitAuth>, SecretError> {
        match self.store.get(AUTH_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json).ok()),
            None => Ok(None),
        }
    }

    /// Remove the stored credential bundle. Idempotent.
    pub fn clear_token(&self) -> Result<(), SecretError> {
        self.store.delete(AUTH_KEY)
    }

    /// Whether a credential bundle is stored.
    pub fn has_token(&self) -> Result<bool, SecretError> {
        self.store.exists(AUTH_KEY)
    }
}
