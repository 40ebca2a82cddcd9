//! Single-instance gateway lock.
//!
//! At most one gateway process may run per configuration. Ownership is a lock
//! file created with **create_new** semantics (exclusive create), which the
//! filesystem serializes across processes; no `flock` is involved.
//!
//! # Lock Payload
//!
//! Each lock file contains one JSON object:
//! - `pid`: the holder's process ID
//! - `createdAt`: ISO-8601 acquisition timestamp
//! - `configPath`: absolute path of the protected configuration
//! - `startTime`: the holder's start-time counter, where the platform exposes it
//! - `owner`: informational `user@HOST`
//!
//! A payload is a belief, not proof: contenders re-verify the owner against
//! the process table and reclaim the file when the owner is dead or stale.
//! Payloads are never rewritten in place, only deleted and recreated.
//!
//! # RAII Handle
//!
//! [`GatewayLockHandle`] releases the lock when dropped. If deletion fails
//! during drop, a warning is logged but the program does not crash.

mod handle;
mod operations;
mod payload;
mod types;


// Re-export public API
pub use handle::GatewayLockHandle;
pub use operations::{AcquireOptions, acquire_gateway_lock, inspect_lock};
pub use payload::{ExistingLock, LockPayload, age_string, file_age, read_lock};
pub use types::LockInfo;
