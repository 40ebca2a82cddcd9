//! Exit code constants for the gatewarden CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Lock timeout (another gateway instance is running)
//! - 3: I/O failure unrelated to contention
//! - 4: Signal delivery failure during stop

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The gateway lock is held by another live instance and the wait timed out.
pub const LOCK_TIMEOUT: i32 = 2;

/// Filesystem failure: permissions, disk errors, lock directory creation.
pub const IO_FAILURE: i32 = 3;

/// A termination signal could not be delivered to the recorded owner.
pub const SIGNAL_FAILURE: i32 = 4;
