//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT perform repository mutations directly. The `watch`
//! command is the one async entry point; it builds a tokio runtime and
//! runs the auto-sync driver inside it.

mod auth;
mod status;
mod sync_ops;
mod watch;

pub use auth::auth;
pub use status::status;
pub use sync_ops::{clone, pull, push, sync, track};
pub use watch::watch;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::paths::VaultPaths;
use crate::engine::SyncEngine;
use crate::secrets::{self, CredentialStore};
use crate::ui::Verbosity;

/// Shared handler context built from global CLI flags.
pub struct Context {
    /// Vault path layout.
    pub paths: VaultPaths,
    /// Output verbosity.
    pub verbosity: Verbosity,
}

impl Context {
    /// Load the vault configuration.
    pub fn config(&self) -> Result<Config> {
        Config::load(&self.paths.config_path()).context("failed to load vault config")
    }

    /// Build the credential store.
    pub fn credentials(&self) -> Result<CredentialStore> {
        let store = secrets::create_store(secrets::DEFAULT_PROVIDER)
            .context("failed to initialize secret store")?;
        Ok(CredentialStore::new(store))
    }

    /// Build the sync engine for this vault, applying configured tunables.
    pub fn engine(&self) -> Result<SyncEngine> {
        let config = self.config()?;
        let mut engine = SyncEngine::new(self.paths.clone(), self.credentials()?, self.verbosity)
            .context("failed to initialize sync engine")?;
        engine.set_list_cache_ttl(std::time::Duration::from_secs(config.list_cache_ttl_secs));
        Ok(engine)
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Clone { url } => clone(ctx, url.as_deref()),
        Command::Pull => pull(ctx),
        Command::Push { message } => push(ctx, &message),
        Command::Sync { message } => sync(ctx, &message),
        Command::Status { json } => status(ctx, json),
        Command::Track {
            path,
            deleted,
            added,
        } => track(ctx, &path, deleted, added),
        Command::Auth {
            token,
            username,
            status,
            logout,
        } => auth(ctx, token.as_deref(), username.as_deref(), status, logout),
        Command::Watch { interval } => watch(ctx, interval),
    }
}
