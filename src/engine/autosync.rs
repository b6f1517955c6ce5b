//! engine::autosync
//!
//! Periodic auto-sync driver.
//!
//! # Design
//!
//! A tokio interval task. Each tick runs, in order: `pull()`, then
//! `commit_and_push()` with a fixed message only if the Change Queue is
//! non-empty, then `status()` to refresh displayed state. Ticks are
//! independent: a failed tick is logged and the timer keeps running.
//!
//! The driver holds the engine behind `Arc<Mutex<_>>`, so a tick and a
//! user-initiated manual sync serialize rather than race. Engine calls
//! are blocking (git2), so ticks run on a blocking thread.
//!
//! Re-arming on interval change is dropping the old driver and starting a
//! new one; an interval of zero means disabled.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ui::output::{self, Verbosity};

use super::sync::SyncEngine;

/// Commit message used for auto-generated sync commits.
pub const AUTO_SYNC_MESSAGE: &str = "vaultsync: auto-sync";

/// Handle to a running auto-sync timer.
///
/// Dropping the handle tears the timer down.
pub struct AutoSync {
    handle: Option<JoinHandle<()>>,
}

impl AutoSync {
    /// Start a driver ticking every `minutes` minutes.
    ///
    /// An interval of zero returns a disabled driver. Must be called from
    /// within a tokio runtime.
    pub fn start(engine: Arc<Mutex<SyncEngine>>, minutes: u64, verbosity: Verbosity) -> Self {
        if minutes == 0 {
            return Self { handle: None };
        }
        Self::start_with_period(engine, Duration::from_secs(minutes * 60), verbosity)
    }

    /// Start a driver with an explicit tick period.
    pub fn start_with_period(
        engine: Arc<Mutex<SyncEngine>>,
        period: Duration,
        verbosity: Verbosity,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately;
            // consume it so ticks start one period from now.
            interval.tick().await;

            loop {
                interval.tick().await;
                let engine = Arc::clone(&engine);
                let joined =
                    tokio::task::spawn_blocking(move || run_tick(&engine, verbosity)).await;
                if joined.is_err() {
                    output::warn("auto-sync tick panicked", verbosity);
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Whether the timer is armed.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Tear the timer down. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Tear down and re-arm with a new interval.
    pub fn rearm(
        &mut self,
        engine: Arc<Mutex<SyncEngine>>,
        minutes: u64,
        verbosity: Verbosity,
    ) {
        self.stop();
        *self = Self::start(engine, minutes, verbosity);
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One auto-sync tick. Failures are logged, never propagated.
fn run_tick(engine: &Arc<Mutex<SyncEngine>>, verbosity: Verbosity) {
    let mut engine = match engine.lock() {
        Ok(engine) => engine,
        Err(_) => {
            output::warn("auto-sync skipped: engine lock poisoned", verbosity);
            return;
        }
    };

    match engine.pull() {
        Ok(result) if !result.conflicts.is_empty() => {
            output::warn(
                format!(
                    "auto-sync resolved {} conflict(s), local versions kept",
                    result.conflicts.len()
                ),
                verbosity,
            );
        }
        Ok(_) => {}
        Err(e) => {
            output::warn(format!("auto-sync pull failed: {}", e), verbosity);
            return;
        }
    }

    if !engine.queue().is_empty() {
        if let Err(e) = engine.commit_and_push(AUTO_SYNC_MESSAGE) {
            output::warn(format!("auto-sync push failed: {}", e), verbosity);
            return;
        }
    }

    let status = engine.status();
    output::debug(
        format!("auto-sync tick complete: {:?}", status.state),
        verbosity,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::VaultPaths;
    use crate::secrets::{CredentialStore, FileSecretStore};
    use tempfile::TempDir;

    fn shared_engine(temp: &TempDir) -> Arc<Mutex<SyncEngine>> {
        let paths = VaultPaths::new(temp.path().join("vault"));
        let secrets = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        let engine = SyncEngine::new(
            paths,
            CredentialStore::new(Box::new(secrets)),
            Verbosity::Quiet,
        )
        .expect("engine");
        Arc::new(Mutex::new(engine))
    }

    #[tokio::test]
    async fn zero_interval_is_disabled() {
        let temp = TempDir::new().expect("temp dir");
        let driver = AutoSync::start(shared_engine(&temp), 0, Verbosity::Quiet);
        assert!(!driver.is_running());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let temp = TempDir::new().expect("temp dir");
        let mut driver = AutoSync::start(shared_engine(&temp), 5, Verbosity::Quiet);
        assert!(driver.is_running());
        driver.stop();
        driver.stop();
        assert!(!driver.is_running());
    }

    #[tokio::test]
    async fn rearm_with_zero_disables() {
        let temp = TempDir::new().expect("temp dir");
        let engine = shared_engine(&temp);
        let mut driver = AutoSync::start(Arc::clone(&engine), 5, Verbosity::Quiet);
        driver.rearm(engine, 0, Verbosity::Quiet);
        assert!(!driver.is_running());
    }

    #[tokio::test]
    async fn tick_failure_does_not_cancel_timer() {
        let temp = TempDir::new().expect("temp dir");
        let engine = shared_engine(&temp);
        // No clone exists, so every tick's pull fails; the driver must
        // stay armed regardless.
        let driver = AutoSync::start_with_period(
            Arc::clone(&engine),
            Duration::from_millis(10),
            Verbosity::Quiet,
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(driver.is_running());
        // The engine is still usable after failed ticks.
        assert!(engine.lock().unwrap().queue().is_empty());
    }
}
