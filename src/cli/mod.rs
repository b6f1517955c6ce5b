//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT perform repository mutations directly
//!
//! The CLI layer is thin: it parses arguments via clap and dispatches to
//! the [`crate::engine`]. All clone/pull/push state changes flow through
//! the engine's four operations.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;

use crate::core::paths::VaultPaths;
use crate::ui::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let paths = match cli.vault.clone() {
        Some(root) => VaultPaths::new(root),
        None => VaultPaths::default_location()
            .ok_or_else(|| anyhow::anyhow!("cannot determine home directory; pass --vault"))?,
    };

    let ctx = commands::Context {
        paths,
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, &ctx)
}
