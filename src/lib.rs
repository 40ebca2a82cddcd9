//! Gatewarden: single-instance lock and foreground stop for a gateway process.
//!
//! At most one gateway runs per configuration file. The running gateway holds
//! an exclusively created lock file recording its pid and start time; any
//! other invocation can verify that owner against the process table, reclaim
//! a lock left behind by a crash, or terminate the owner on request.
//!
//! The pieces, leaves first:
//! - [`liveness`]: is the recorded owner still the process that wrote the lock?
//! - [`context`]: which lock file belongs to a configuration
//! - [`locks`]: acquire, release and inspect the lock
//! - [`stop`]: signal the owner with SIGTERM, escalating to SIGKILL

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod liveness;
pub mod locks;
pub mod logging;
pub mod stop;

#[cfg(test)]
pub(crate) mod test_support;
