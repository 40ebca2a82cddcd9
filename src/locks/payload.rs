//! Lock payload structure and on-disk reads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::{Duration, SystemTime};

/// The entire content of a gateway lock file.
///
/// Serialized as a single JSON object with camelCase keys:
/// `{"pid": 100, "createdAt": "...", "configPath": "/cfg.json", "startTime": 123}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPayload {
    /// Process ID of the lock holder.
    pub pid: u32,

    /// ISO-8601 acquisition timestamp. Kept as text so a payload with an
    /// odd timestamp still yields its pid.
    pub created_at: String,

    /// Absolute path of the configuration this lock protects.
    pub config_path: String,

    /// Platform start-time counter of the holder, where readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,

    /// Informational `user@host` of the holder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl LockPayload {
    /// Payload for `pid` created now.
    pub fn new(pid: u32, config_path: &Path, start_time: Option<u64>) -> Self {
        Self {
            pid,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            config_path: config_path.to_string_lossy().into_owned(),
            start_time,
            owner: Some(get_owner_string()),
        }
    }

    /// Parse a payload; `None` when required fields are missing or the JSON is invalid.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Serialize to a single-line JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The acquisition timestamp, if it parses.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Age of the lock by its recorded timestamp. Future timestamps count as zero.
    pub fn age(&self) -> Option<Duration> {
        let created = self.created_at()?;
        Some(
            Utc::now()
                .signed_duration_since(created)
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }
}

/// Format a lock age as a human-readable string.
pub fn age_string(age: Duration) -> String {
    let secs = age.as_secs();
    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// Snapshot of an existing lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingLock {
    /// Exact bytes read; used to make sure a reclaim deletes what was judged.
    pub raw: Vec<u8>,
    /// Parsed payload, `None` when unparsable (for example read mid-write).
    pub payload: Option<LockPayload>,
}

/// Read the lock file. `Ok(None)` when it does not exist.
pub fn read_lock(path: &Path) -> io::Result<Option<ExistingLock>> {
    match fs::read(path) {
        Ok(raw) => {
            let payload = LockPayload::parse(&raw);
            Ok(Some(ExistingLock { raw, payload }))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Age of the lock file by modification time. `Ok(None)` when it vanished.
pub fn file_age(path: &Path) -> io::Result<Option<Duration>> {
    match fs::metadata(path) {
        Ok(meta) => {
            let modified = meta.modified()?;
            Ok(Some(
                SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO),
            ))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Get the owner string for lock payloads.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
