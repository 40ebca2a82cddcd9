//! Config struct definition.

use super::types::{LockSettings, StopSettings};
use serde::{Deserialize, Serialize};

/// Lock and stop policy read from the gateway configuration file.
///
/// The gateway configuration usually carries many other keys; only the
/// `lock` and `stop` sections are read here and everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Acquisition timeout, poll interval and staleness threshold.
    pub lock: LockSettings,

    /// Grace window and escalation timing for `stop`.
    pub stop: StopSettings,
}
