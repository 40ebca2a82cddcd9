//! Configuration model for gatewarden.
//!
//! Lock and stop policy live in optional `lock:` and `stop:` sections of the
//! gateway configuration file. Parsing is forward-compatible (unknown fields
//! are ignored), a missing file means defaults, and values are validated.
//! Environment overrides are captured separately in [`EnvOverrides`].

mod env;
mod model;
mod operations;
pub mod types;


// Re-export public API
pub use env::{
    ENV_ALLOW_MULTI_GATEWAY, ENV_CONFIG_PATH, ENV_LOCK_DIR, ENV_NEXTEST_RUN_ID, ENV_TEST_MODE,
    EnvOverrides,
};
pub use model::Config;
pub use types::{LockSettings, StopSettings};
