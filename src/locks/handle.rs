//! RAII handle for a held gateway lock.

use super::payload::{LockPayload, read_lock};
use crate::error::LockError;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Proof of holding the gateway lock.
///
/// Owned by the acquiring process only. Dropping the handle releases the
/// lock; if deletion fails during drop, a warning is logged.
#[derive(Debug)]
pub struct GatewayLockHandle {
    lock_path: PathBuf,
    config_path: PathBuf,
    payload: LockPayload,
    file: Option<File>,
    released: bool,
}

impl GatewayLockHandle {
    pub(super) fn new(
        lock_path: PathBuf,
        config_path: PathBuf,
        payload: LockPayload,
        file: File,
    ) -> Self {
        Self {
            lock_path,
            config_path,
            payload,
            file: Some(file),
            released: false,
        }
    }

    /// Path to the lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// The configuration this lock protects.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The payload written at acquisition.
    pub fn payload(&self) -> &LockPayload {
        &self.payload
    }

    /// Release the lock. Idempotent.
    ///
    /// Closes the handle and removes the lock file. An already absent file is
    /// fine. A file that now carries another owner's payload (ours was judged
    /// stale and reclaimed) is left alone.
    pub fn release(&mut self) -> Result<(), LockError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        drop(self.file.take());

        match read_lock(&self.lock_path) {
            Ok(None) => return Ok(()),
            Ok(Some(existing)) => {
                if let Some(current) = existing.payload
                    && current != self.payload
                {
                    tracing::warn!(
                        lock = %self.lock_path.display(),
                        current_pid = current.pid,
                        "lock was reclaimed by another process, leaving it in place"
                    );
                    return Ok(());
                }
            }
            // Unreadable: fall through and try to remove our file anyway.
            Err(e) => {
                tracing::debug!(
                    lock = %self.lock_path.display(),
                    error = %e,
                    "could not re-read lock before release"
                );
            }
        }

        match fs::remove_file(&self.lock_path) {
            Ok(()) => {
                tracing::debug!(lock = %self.lock_path.display(), "released gateway lock");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LockError::io(&self.lock_path, e)),
        }
    }

    /// Whether `release` has already run.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for GatewayLockHandle {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("failed to release gateway lock: {}", e);
        }
    }
}
