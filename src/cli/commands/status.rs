//! cli::commands::status
//!
//! Sync status display.

use anyhow::Result;

use crate::core::types::SyncState;
use crate::ui::output;

use super::Context;

/// Run the status command.
///
/// `status()` on the engine never fails; the only errors here are
/// initialization ones.
pub fn status(ctx: &Context, json: bool) -> Result<()> {
    let engine = ctx.engine()?;
    let status = engine.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let state = match status.state {
        SyncState::Synced => "synced",
        SyncState::Pending => "pending changes",
        SyncState::Offline => "offline",
        SyncState::Error => "error",
    };
    output::print(format!("State: {}", state), ctx.verbosity);
    output::print(
        format!("Pending changes: {}", status.pending_changes),
        ctx.verbosity,
    );

    if let Some(at) = status.last_sync_at {
        output::print(format!("Last sync: {}", at.to_rfc3339()), ctx.verbosity);
    }
    if let Some(error) = &status.error {
        output::print(format!("Detail: {}", error), ctx.verbosity);
    }

    Ok(())
}
