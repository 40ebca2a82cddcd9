//! Lock acquisition, inspection, and reclaim operations.

use super::handle::GatewayLockHandle;
use super::payload::{ExistingLock, LockPayload, file_age, read_lock};
use super::types::LockInfo;
use crate::config::{EnvOverrides, LockSettings};
use crate::context::GatewayContext;
use crate::error::LockError;
use crate::liveness::{LivenessChecker, OwnerStatus};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Timing policy for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireOptions {
    /// Total time to wait for a contended lock.
    pub timeout: Duration,
    /// Sleep between contention checks.
    pub poll_interval: Duration,
    /// Age after which an owner without stronger evidence is reclaimable.
    pub stale_after: Duration,
    /// Take the lock even when a test runner is detected.
    pub allow_in_tests: bool,
}

impl AcquireOptions {
    pub fn from_settings(settings: &LockSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            poll_interval: settings.poll_interval(),
            stale_after: settings.stale_after(),
            allow_in_tests: false,
        }
    }
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self::from_settings(&LockSettings::default())
    }
}

/// What to do about a lock file held by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Contention {
    /// The file is gone already; try to create immediately.
    Vanished,
    /// The owner is dead or stale; delete this exact snapshot and retry.
    Reclaim(ExistingLock),
    /// A live (or unverifiable) owner holds it; wait.
    Wait,
}

/// Acquire the gateway lock for `ctx`.
///
/// Returns `Ok(None)` when locking is disabled by the environment, and
/// `Ok(Some(handle))` once the lock file has been created with our payload.
///
/// # Errors
///
/// * `LockError::Timeout` - a live owner kept the lock until `options.timeout`
/// * `LockError::Io` - any filesystem failure other than contention
pub fn acquire_gateway_lock(
    ctx: &GatewayContext,
    options: &AcquireOptions,
    env: &EnvOverrides,
    checker: &LivenessChecker,
) -> Result<Option<GatewayLockHandle>, LockError> {
    if env.allow_multi_gateway {
        tracing::info!("gateway lock disabled by environment, skipping single-instance guard");
        return Ok(None);
    }
    if env.test_runner && !options.allow_in_tests {
        tracing::debug!("test runner detected, skipping gateway lock");
        return Ok(None);
    }

    ctx.ensure_lock_dir().map_err(|e| LockError::io(&ctx.lock_dir, e))?;

    let started = Instant::now();
    let deadline = started + options.timeout;
    let mut last_owner: Option<u32> = None;

    loop {
        match try_create(ctx, checker) {
            Ok(handle) => {
                tracing::info!(
                    lock = %ctx.lock_path.display(),
                    pid = handle.payload().pid,
                    "acquired gateway lock"
                );
                return Ok(Some(handle));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(LockError::io(&ctx.lock_path, e)),
        }

        let existing = read_lock(&ctx.lock_path).map_err(|e| LockError::io(&ctx.lock_path, e))?;
        if let Some(payload) = existing.as_ref().and_then(|e| e.payload.as_ref()) {
            last_owner = Some(payload.pid);
        }

        match evaluate_contention(&ctx.lock_path, existing, options.stale_after, checker)
            .map_err(|e| LockError::io(&ctx.lock_path, e))?
        {
            Contention::Vanished => continue,
            Contention::Reclaim(snapshot) => {
                reclaim(&ctx.lock_path, &snapshot)
                    .map_err(|e| LockError::io(&ctx.lock_path, e))?;
                continue;
            }
            Contention::Wait => {}
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(
                lock = %ctx.lock_path.display(),
                owner_pid = ?last_owner,
                "timed out waiting for gateway lock"
            );
            return Err(LockError::Timeout {
                lock_path: ctx.lock_path.clone(),
                owner_pid: last_owner,
                waited: now - started,
            });
        }
        std::thread::sleep(options.poll_interval.min(deadline - now));
    }
}

/// Exclusively create the lock file and write our payload.
fn try_create(
    ctx: &GatewayContext,
    checker: &LivenessChecker,
) -> std::io::Result<GatewayLockHandle> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&ctx.lock_path)?;

    let pid = std::process::id();
    let payload = LockPayload::new(pid, &ctx.config_path, checker.start_time_of(pid));

    if let Err(e) = write_payload(&mut file, &payload) {
        // Clean up the half-written lock file
        let _ = fs::remove_file(&ctx.lock_path);
        return Err(e);
    }

    Ok(GatewayLockHandle::new(
        ctx.lock_path.clone(),
        ctx.config_path.clone(),
        payload,
        file,
    ))
}

fn write_payload(file: &mut File, payload: &LockPayload) -> std::io::Result<()> {
    let json = payload.to_json().map_err(std::io::Error::other)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()
}

/// Decide whether an existing lock may be reclaimed.
pub(crate) fn evaluate_contention(
    lock_path: &Path,
    existing: Option<ExistingLock>,
    stale_after: Duration,
    checker: &LivenessChecker,
) -> std::io::Result<Contention> {
    let Some(existing) = existing else {
        return Ok(Contention::Vanished);
    };

    let Some(payload) = existing.payload.as_ref() else {
        // Unparsable, possibly mid-write: only age can condemn it.
        return Ok(match file_age(lock_path)? {
            None => Contention::Vanished,
            Some(age) if age > stale_after => {
                tracing::info!(
                    lock = %lock_path.display(),
                    "reclaiming stale unparsable gateway lock"
                );
                Contention::Reclaim(existing)
            }
            Some(_) => Contention::Wait,
        });
    };

    let pid = payload.pid;
    let status = checker.assess(pid, payload.start_time);
    if status == OwnerStatus::Dead {
        tracing::info!(
            pid,
            lock = %lock_path.display(),
            "reclaiming gateway lock from dead owner"
        );
        return Ok(Contention::Reclaim(existing));
    }

    let age = match payload.age() {
        Some(age) => age,
        None => match file_age(lock_path)? {
            Some(age) => age,
            None => return Ok(Contention::Vanished),
        },
    };
    if age <= stale_after {
        tracing::debug!(pid, %status, "gateway lock held by live owner");
        return Ok(Contention::Wait);
    }

    // Stale by age, but never take the lock from a confirmed running gateway.
    if checker.looks_like_gateway(pid) == Some(true) {
        tracing::debug!(
            pid,
            "stale gateway lock still owned by a running gateway, waiting"
        );
        return Ok(Contention::Wait);
    }

    tracing::info!(
        pid,
        %status,
        age_ms = age.as_millis() as u64,
        "reclaiming stale gateway lock"
    );
    Ok(Contention::Reclaim(existing))
}

/// Delete the lock file if it still holds exactly the judged snapshot.
///
/// The re-read only narrows the window: a successor that replaces the file
/// between the comparison and the removal still loses its lock, and then
/// finds out on release.
pub(crate) fn reclaim(lock_path: &Path, snapshot: &ExistingLock) -> std::io::Result<()> {
    match read_lock(lock_path)? {
        None => return Ok(()),
        Some(current) if current.raw != snapshot.raw => {
            tracing::debug!(
                lock = %lock_path.display(),
                "lock changed before reclaim, re-evaluating"
            );
            return Ok(());
        }
        Some(_) => {}
    }

    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Inspect the lock for `ctx` without modifying it.
pub fn inspect_lock(
    ctx: &GatewayContext,
    stale_after: Duration,
    checker: &LivenessChecker,
) -> Result<Option<LockInfo>, LockError> {
    let Some(existing) =
        read_lock(&ctx.lock_path).map_err(|e| LockError::io(&ctx.lock_path, e))?
    else {
        return Ok(None);
    };

    let mtime_age = file_age(&ctx.lock_path).map_err(|e| LockError::io(&ctx.lock_path, e))?;
    let owner_status = existing
        .payload
        .as_ref()
        .map(|p| checker.assess(p.pid, p.start_time));
    let age = existing
        .payload
        .as_ref()
        .and_then(LockPayload::age)
        .or(mtime_age);

    // Same verdict the acquire loop would reach.
    let past_threshold = age.is_some_and(|age| age > stale_after);
    let is_stale = match (&existing.payload, owner_status) {
        (_, Some(OwnerStatus::Dead)) => true,
        (Some(payload), _) => {
            past_threshold && checker.looks_like_gateway(payload.pid) != Some(true)
        }
        (None, _) => past_threshold,
    };

    Ok(Some(LockInfo {
        path: ctx.lock_path.clone(),
        config_path: ctx.config_path.clone(),
        payload: existing.payload,
        owner_status,
        age,
        is_stale,
    }))
}
