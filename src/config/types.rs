//! Configuration sections and defaults for gatewarden.
//!
//! Durations are stored as integer milliseconds in YAML and exposed as
//! `Duration` through accessor methods.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lock acquisition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Total time to wait for a contended lock before giving up.
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,

    /// Sleep between contention checks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Age after which an owner without stronger liveness evidence is reclaimable.
    #[serde(default = "default_stale_ms")]
    pub stale_ms: u64,
}

impl LockSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_ms)
    }
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_lock_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            stale_ms: default_stale_ms(),
        }
    }
}

/// Foreground stop escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopSettings {
    /// How long the owner gets to exit after SIGTERM before SIGKILL.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Liveness polling interval during the grace window.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Settle time after SIGKILL before the lock is removed.
    #[serde(default = "default_kill_wait_ms")]
    pub kill_wait_ms: u64,
}

impl StopSettings {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn kill_wait(&self) -> Duration {
        Duration::from_millis(self.kill_wait_ms)
    }
}

impl Default for StopSettings {
    fn default() -> Self {
        Self {
            grace_ms: default_grace_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            kill_wait_ms: default_kill_wait_ms(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_lock_timeout_ms() -> u64 {
    5_000
}
pub(crate) fn default_poll_interval_ms() -> u64 {
    100
}
pub(crate) fn default_stale_ms() -> u64 {
    60_000
}
pub(crate) fn default_grace_ms() -> u64 {
    5_000
}
pub(crate) fn default_kill_wait_ms() -> u64 {
    500
}
