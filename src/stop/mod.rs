//! Foreground stop of a running gateway.
//!
//! Reads the lock, signals the recorded owner, escalates from SIGTERM to
//! SIGKILL after a grace window, and cleans up the lock file.
//!
//! Outcomes:
//! - `no-lock`: there is no lock file; nothing is signalled
//! - `not-running`: the lock named a dead owner (or none at all) and was cleaned up
//! - `stopped`: the owner was running and has been terminated

mod signal;


pub use signal::{Delivery, kill, terminate};

use crate::config::Config;
use crate::context::GatewayContext;
use crate::error::{GatewardenError, Result};
use crate::liveness::{LivenessChecker, OwnerStatus};
use crate::locks::{ExistingLock, file_age, read_lock};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

/// What `stop` found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopResult {
    Stopped,
    NotRunning,
    NoLock,
}

impl std::fmt::Display for StopResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopResult::Stopped => write!(f, "stopped"),
            StopResult::NotRunning => write!(f, "not-running"),
            StopResult::NoLock => write!(f, "no-lock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopOutcome {
    pub result: StopResult,
    /// The recorded owner pid, when the lock named one.
    pub pid: Option<u32>,
}

impl StopOutcome {
    fn new(result: StopResult, pid: Option<u32>) -> Self {
        Self { result, pid }
    }
}

/// Timing policy for one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOptions {
    /// How long the owner gets to exit after SIGTERM.
    pub grace: Duration,
    /// Liveness polling interval during the grace window.
    pub poll_interval: Duration,
    /// Settle time after SIGKILL.
    pub kill_wait: Duration,
    /// Age after which an unparsable lock file is removed.
    pub stale_after: Duration,
}

impl StopOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grace: config.stop.grace(),
            poll_interval: config.stop.poll_interval(),
            kill_wait: config.stop.kill_wait(),
            stale_after: config.lock.stale_after(),
        }
    }
}

impl Default for StopOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Stop the gateway holding the lock for `ctx`.
///
/// # Errors
///
/// * `UserError` - the lock names the calling process itself
/// * `Signal` - SIGTERM was refused (typically `EPERM`)
/// * `Io` - the lock file could not be read or removed
pub fn stop_gateway(
    ctx: &GatewayContext,
    options: &StopOptions,
    checker: &LivenessChecker,
) -> Result<StopOutcome> {
    let Some(existing) = read_lock(&ctx.lock_path).map_err(|e| read_error(&ctx.lock_path, e))?
    else {
        tracing::debug!(lock = %ctx.lock_path.display(), "no gateway lock found");
        return Ok(StopOutcome::new(StopResult::NoLock, None));
    };

    let Some(payload) = existing.payload.clone() else {
        return stop_unparsable(&ctx.lock_path, &existing, options.stale_after);
    };
    let pid = payload.pid;

    if pid == std::process::id() {
        return Err(GatewardenError::UserError(format!(
            "the gateway lock at '{}' is held by this process (pid {}); refusing to signal itself",
            ctx.lock_path.display(),
            pid
        )));
    }

    if checker.assess(pid, payload.start_time) == OwnerStatus::Dead {
        tracing::info!(pid, "gateway lock owner is not running, removing lock");
        remove_lock(&ctx.lock_path, &existing)?;
        return Ok(StopOutcome::new(StopResult::NotRunning, Some(pid)));
    }

    if terminate(pid)? == Delivery::NoSuchProcess {
        tracing::info!(pid, "gateway exited before it could be signalled");
        remove_lock(&ctx.lock_path, &existing)?;
        return Ok(StopOutcome::new(StopResult::NotRunning, Some(pid)));
    }

    if wait_for_exit(pid, options, checker) {
        tracing::info!(pid, "gateway stopped gracefully");
        remove_lock(&ctx.lock_path, &existing)?;
        return Ok(StopOutcome::new(StopResult::Stopped, Some(pid)));
    }

    tracing::warn!(
        pid,
        grace_ms = options.grace.as_millis() as u64,
        "gateway ignored SIGTERM, escalating to SIGKILL"
    );
    if let Err(e) = kill(pid) {
        tracing::debug!(pid, error = %e, "SIGKILL failed");
    }
    std::thread::sleep(options.kill_wait);

    remove_lock(&ctx.lock_path, &existing)?;
    Ok(StopOutcome::new(StopResult::Stopped, Some(pid)))
}

/// Poll until `pid` disappears or the grace window closes.
fn wait_for_exit(pid: u32, options: &StopOptions, checker: &LivenessChecker) -> bool {
    let deadline = Instant::now() + options.grace;
    loop {
        if !checker.exists(pid) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(options.poll_interval.min(deadline - now));
    }
}

/// A lock without a readable pid: nothing to signal.
fn stop_unparsable(
    lock_path: &Path,
    existing: &ExistingLock,
    stale_after: Duration,
) -> Result<StopOutcome> {
    let age = file_age(lock_path).map_err(|e| read_error(lock_path, e))?;
    match age {
        Some(age) if age > stale_after => {
            tracing::info!(lock = %lock_path.display(), "removing stale unparsable gateway lock");
            remove_lock(lock_path, existing)?;
        }
        Some(_) => {
            // Possibly being written right now.
            tracing::warn!(
                lock = %lock_path.display(),
                "gateway lock is unparsable and recent, leaving it in place"
            );
        }
        None => {}
    }
    Ok(StopOutcome::new(StopResult::NotRunning, None))
}

/// Remove the lock file if it still holds the snapshot that was acted on.
///
/// A file that changed in the meantime belongs to a new owner and is kept.
/// Comparing and removing are two steps, so this narrows the window in which
/// a successor's lock could be deleted without closing it.
fn remove_lock(lock_path: &Path, snapshot: &ExistingLock) -> Result<()> {
    match read_lock(lock_path).map_err(|e| read_error(lock_path, e))? {
        None => return Ok(()),
        Some(current) if current.raw != snapshot.raw => {
            tracing::info!(
                lock = %lock_path.display(),
                "gateway lock was taken over by a new owner, leaving it in place"
            );
            return Ok(());
        }
        Some(_) => {}
    }

    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GatewardenError::io(
            format!("failed to remove lock '{}'", lock_path.display()),
            e,
        )),
    }
}

fn read_error(lock_path: &Path, e: std::io::Error) -> GatewardenError {
    GatewardenError::io(format!("failed to read lock '{}'", lock_path.display()), e)
}
