//! Read-only view of an existing gateway lock.

use super::payload::{LockPayload, age_string};
use crate::liveness::OwnerStatus;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Information about an existing lock, as reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The configuration this lock belongs to.
    pub config_path: PathBuf,

    /// The parsed payload, `None` when the file is unparsable.
    pub payload: Option<LockPayload>,

    /// Verdict on the recorded owner, `None` when there is no pid to check.
    pub owner_status: Option<OwnerStatus>,

    /// Age by `createdAt`, or by file mtime when that is missing.
    #[serde(serialize_with = "serialize_millis")]
    pub age: Option<Duration>,

    /// Whether the next acquirer would reclaim this lock.
    pub is_stale: bool,
}

impl LockInfo {
    pub fn owner_pid(&self) -> Option<u32> {
        self.payload.as_ref().map(|p| p.pid)
    }
}

fn serialize_millis<S>(age: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match age {
        Some(age) => serializer.serialize_some(&(age.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pid = match self.owner_pid() {
            Some(pid) => pid.to_string(),
            None => "?".to_string(),
        };
        let status = match self.owner_status {
            Some(status) => status.to_string(),
            None => "unparsable".to_string(),
        };
        let age = match self.age {
            Some(age) => age_string(age),
            None => "?".to_string(),
        };
        let owner = self
            .payload
            .as_ref()
            .and_then(|p| p.owner.as_deref())
            .unwrap_or("unknown");

        write!(
            f,
            "pid {} (owner: {}, status: {}, age: {}{})",
            pid,
            owner,
            status,
            age,
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}
