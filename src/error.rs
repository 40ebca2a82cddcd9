//! Error types for gatewarden.
//!
//! Uses thiserror for derive macros. Lock acquisition has its own error type
//! so callers can tell "another instance is running" apart from a genuine
//! filesystem failure without string matching.

use crate::exit_codes;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure modes of acquiring or releasing the gateway lock.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock stayed held by a live (or unverifiable) owner until the deadline.
    #[error(
        "gateway already running{} (lock: {}, waited {}ms)",
        owner_suffix(.owner_pid),
        .lock_path.display(),
        .waited.as_millis()
    )]
    Timeout {
        lock_path: PathBuf,
        owner_pid: Option<u32>,
        waited: Duration,
    },

    /// A filesystem operation failed for a reason other than contention.
    #[error("lock file operation failed on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The pid of the conflicting owner, when known.
    pub fn owner_pid(&self) -> Option<u32> {
        match self {
            LockError::Timeout { owner_pid, .. } => *owner_pid,
            LockError::Io { .. } => None,
        }
    }
}

fn owner_suffix(pid: &Option<u32>) -> String {
    match pid {
        Some(pid) => format!(" (pid {})", pid),
        None => String::new(),
    }
}

/// Main error type for gatewarden operations.
#[derive(Error, Debug)]
pub enum GatewardenError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// Lock acquisition or release failed.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Filesystem failure outside the acquire loop (lock dir, lock reads during stop).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A termination signal could not be delivered.
    #[error("failed to signal pid {pid}: {reason}")]
    Signal { pid: u32, reason: String },
}

impl GatewardenError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GatewardenError::UserError(_) => exit_codes::USER_ERROR,
            GatewardenError::Lock(LockError::Timeout { .. }) => exit_codes::LOCK_TIMEOUT,
            GatewardenError::Lock(LockError::Io { .. }) => exit_codes::IO_FAILURE,
            GatewardenError::Io { .. } => exit_codes::IO_FAILURE,
            GatewardenError::Signal { .. } => exit_codes::SIGNAL_FAILURE,
        }
    }
}

/// Result type alias for gatewarden operations.
pub type Result<T> = std::result::Result<T, GatewardenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn timeout(owner_pid: Option<u32>) -> LockError {
        LockError::Timeout {
            lock_path: PathBuf::from("/tmp/gatewarden-0/gateway.deadbeef.lock"),
            owner_pid,
            waited: Duration::from_millis(200),
        }
    }

    #[test]
    fn timeout_maps_to_lock_timeout_exit_code() {
        let err = GatewardenError::from(timeout(Some(100)));
        assert_eq!(err.exit_code(), exit_codes::LOCK_TIMEOUT);
    }

    #[test]
    fn lock_io_maps_to_io_failure() {
        let err = GatewardenError::from(LockError::io(
            "/nope",
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
    }

    #[test]
    fn user_and_signal_errors_have_correct_exit_codes() {
        assert_eq!(
            GatewardenError::UserError("bad".to_string()).exit_code(),
            exit_codes::USER_ERROR
        );
        let err = GatewardenError::Signal {
            pid: 42,
            reason: "EPERM".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::SIGNAL_FAILURE);
    }

    #[test]
    fn timeout_message_names_owner_pid() {
        let msg = timeout(Some(100)).to_string();
        assert!(msg.contains("pid 100"), "{msg}");
        assert!(msg.contains("gateway.deadbeef.lock"));
        assert!(msg.contains("200ms"));
    }

    #[test]
    fn timeout_message_without_owner() {
        let msg = timeout(None).to_string();
        assert!(!msg.contains("pid"), "{msg}");
        assert_eq!(timeout(None).owner_pid(), None);
        assert_eq!(timeout(Some(7)).owner_pid(), Some(7));
    }
}
