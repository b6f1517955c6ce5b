//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Available on all commands:
//! - `--vault <path>`: vault root directory (default `~/.vaultsync`)
//! - `--debug`: enable debug output
//! - `--quiet` / `-q`: minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vaultsync - offline-first git synchronization for a notes vault
#[derive(Parser, Debug)]
#[command(name = "vaultsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Vault root directory (default: ~/.vaultsync)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone the remote vault onto this device (from scratch)
    #[command(
        long_about = "Clone the remote vault onto this device.\n\n\
            Any existing clone is deleted first; clone is never incremental. \
            The URL is remembered in the vault config for later commands."
    )]
    Clone {
        /// Repository URL (falls back to the configured remote_url)
        url: Option<String>,
    },

    /// Fetch remote changes and reconcile them into the working tree
    #[command(
        long_about = "Fetch remote changes and reconcile them into the working tree.\n\n\
            Files that changed both remotely and locally are resolved \
            local-wins: the on-device version is kept, the event is recorded \
            in the conflict log, and the remote version stays in history."
    )]
    Pull,

    /// Commit queued local changes and push them to the remote
    Push {
        /// Commit message
        #[arg(short, long, default_value = "vaultsync: sync")]
        message: String,
    },

    /// Pull, then push queued local changes if any
    Sync {
        /// Commit message for the push half
        #[arg(short, long, default_value = "vaultsync: sync")]
        message: String,
    },

    /// Show sync status
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a local edit in the change queue
    #[command(
        long_about = "Record a local edit in the change queue.\n\n\
            Editors embedding the library record changes automatically; this \
            command is the manual equivalent for edits made with external tools."
    )]
    Track {
        /// Vault-relative path that changed
        path: String,
        /// The path was deleted
        #[arg(long, conflicts_with = "added")]
        deleted: bool,
        /// The path is new
        #[arg(long)]
        added: bool,
    },

    /// Store, inspect, or remove remote credentials
    Auth {
        /// Token value (omit to be prompted)
        #[arg(long)]
        token: Option<String>,

        /// Username for the remote (optional; token-auth providers accept
        /// a placeholder)
        #[arg(long)]
        username: Option<String>,

        /// Show authentication status instead of storing
        #[arg(long)]
        status: bool,

        /// Remove stored credentials
        #[arg(long)]
        logout: bool,
    },

    /// Run the auto-sync driver in the foreground
    Watch {
        /// Tick interval in minutes (overrides the configured value)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clone_with_url() {
        let cli = Cli::try_parse_from(["vaultsync", "clone", "https://h/r.git"]).unwrap();
        match cli.command {
            Command::Clone { url } => assert_eq!(url.as_deref(), Some("https://h/r.git")),
            _ => panic!("expected clone"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["vaultsync", "status", "--debug"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn push_has_default_message() {
        let cli = Cli::try_parse_from(["vaultsync", "push"]).unwrap();
        match cli.command {
            Command::Push { message } => assert_eq!(message, "vaultsync: sync"),
            _ => panic!("expected push"),
        }
    }

    #[test]
    fn track_deleted_conflicts_with_added() {
        assert!(
            Cli::try_parse_from(["vaultsync", "track", "a.md", "--deleted", "--added"]).is_err()
        );
    }
}
