//! cli::commands::sync_ops
//!
//! Handlers for the clone / pull / push / sync / track commands.

use anyhow::{bail, Context as _, Result};

use crate::core::types::ChangeAction;
use crate::ui::output;

use super::Context;

/// Run the clone command.
///
/// Remembers the URL in the vault config so later commands (and a future
/// re-clone) do not need it repeated.
pub fn clone(ctx: &Context, url: Option<&str>) -> Result<()> {
    let mut config = ctx.config()?;
    let url = match url.or(config.remote_url.as_deref()) {
        Some(url) => url.to_string(),
        None => bail!("no repository URL given and none configured; run 'vaultsync clone <url>'"),
    };

    let credentials = ctx.credentials()?;
    let auth = match credentials.get_token().context("failed to read credentials")? {
        Some(auth) => auth,
        None => bail!("no credentials configured; run 'vaultsync auth' first"),
    };

    let mut engine = ctx.engine()?;
    engine.clone(&url, auth)?;

    config.remote_url = Some(url.clone());
    config.save(&ctx.paths.config_path())?;

    output::print(format!("Cloned {}.", url), ctx.verbosity);
    Ok(())
}

/// Run the pull command.
pub fn pull(ctx: &Context) -> Result<()> {
    let mut engine = ctx.engine()?;
    let result = engine.pull()?;
    report_pull(&result.updated, &result.conflicts, ctx);
    Ok(())
}

/// Run the push command.
pub fn push(ctx: &Context, message: &str) -> Result<()> {
    let mut engine = ctx.engine()?;
    let pending = engine.queue().len();
    engine.commit_and_push(message)?;

    if pending == 0 {
        output::print("Nothing to push.", ctx.verbosity);
    } else {
        output::print(format!("Pushed {} change(s).", pending), ctx.verbosity);
    }
    Ok(())
}

/// Run the sync command: pull, then push if anything is queued.
pub fn sync(ctx: &Context, message: &str) -> Result<()> {
    let mut engine = ctx.engine()?;

    let result = engine.pull()?;
    report_pull(&result.updated, &result.conflicts, ctx);

    let pending = engine.queue().len();
    if pending > 0 {
        engine.commit_and_push(message)?;
        output::print(format!("Pushed {} change(s).", pending), ctx.verbosity);
    }

    Ok(())
}

/// Run the track command: record a local edit in the change queue.
pub fn track(ctx: &Context, path: &str, deleted: bool, added: bool) -> Result<()> {
    let engine = ctx.engine()?;

    let action = if deleted {
        ChangeAction::Delete
    } else if added {
        ChangeAction::Add
    } else {
        ChangeAction::Modify
    };

    engine.queue().add(path, action);
    output::print(
        format!("Queued {} for {}.", action, path),
        ctx.verbosity,
    );
    Ok(())
}

fn report_pull(updated: &[String], conflicts: &[String], ctx: &Context) {
    if updated.is_empty() {
        output::print("Already up to date.", ctx.verbosity);
        return;
    }

    output::print(
        format!("Updated {} file(s) from remote.", updated.len()),
        ctx.verbosity,
    );
    for path in conflicts {
        output::warn(
            format!("conflict on {}: kept local version (see conflicts.log)", path),
            ctx.verbosity,
        );
    }
}
