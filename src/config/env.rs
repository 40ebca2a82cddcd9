//! Environment overrides consumed by the lock call sites.

use std::path::PathBuf;

/// Explicit config path override.
pub const ENV_CONFIG_PATH: &str = "GATEWARDEN_CONFIG_PATH";

/// Lock directory override.
pub const ENV_LOCK_DIR: &str = "GATEWARDEN_LOCK_DIR";

/// Disables single-instance locking entirely.
pub const ENV_ALLOW_MULTI_GATEWAY: &str = "GATEWARDEN_ALLOW_MULTI_GATEWAY";

/// Marks the process as running under a test harness.
pub const ENV_TEST_MODE: &str = "GATEWARDEN_TEST_MODE";

/// Set by cargo-nextest for every test process it runs.
pub const ENV_NEXTEST_RUN_ID: &str = "NEXTEST_RUN_ID";

/// Snapshot of the environment variables gatewarden reads.
///
/// Read once at startup so the lock code never consults the process
/// environment directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub config_path: Option<PathBuf>,
    pub lock_dir: Option<PathBuf>,
    pub allow_multi_gateway: bool,
    pub test_runner: bool,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            config_path: non_empty(ENV_CONFIG_PATH).map(PathBuf::from),
            lock_dir: non_empty(ENV_LOCK_DIR).map(PathBuf::from),
            allow_multi_gateway: non_empty(ENV_ALLOW_MULTI_GATEWAY).is_some_and(|v| is_truthy(&v)),
            test_runner: non_empty(ENV_TEST_MODE).is_some_and(|v| is_truthy(&v))
                || non_empty(ENV_NEXTEST_RUN_ID).is_some(),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
