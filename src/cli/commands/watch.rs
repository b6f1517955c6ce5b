//! cli::commands::watch
//!
//! Foreground auto-sync driver.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Context as _, Result};

use crate::engine::AutoSync;
use crate::ui::output;

use super::Context;

/// Run the watch command: arm the auto-sync timer and block until
/// interrupted.
///
/// The interval comes from `--interval` or the configured
/// `auto_sync_minutes`; zero (or nothing configured) is an error here,
/// since a disabled watch would just hang silently.
pub fn watch(ctx: &Context, interval: Option<u64>) -> Result<()> {
    let config = ctx.config()?;
    let minutes = interval.unwrap_or(config.auto_sync_minutes);
    if minutes == 0 {
        bail!(
            "auto-sync is disabled; pass --interval or set auto_sync_minutes in {}",
            ctx.paths.config_path().display()
        );
    }

    let engine = Arc::new(Mutex::new(ctx.engine()?));
    let verbosity = ctx.verbosity;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let _driver = AutoSync::start(engine, minutes, verbosity);
        output::print(
            format!("Auto-sync running every {} minute(s); Ctrl-C to stop.", minutes),
            verbosity,
        );
        tokio::signal::ctrl_c()
            .await
            .context("failed to wait for interrupt")?;
        output::print("Stopping auto-sync.", verbosity);
        Ok(())
    })
}
