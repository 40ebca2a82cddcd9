//! Config loading and validation.

use super::model::Config;
use crate::error::{GatewardenError, Result};
use std::io::ErrorKind;
use std::path::Path;

impl Config {
    /// Load config from a YAML (or JSON) file.
    ///
    /// A missing file yields the defaults: the gateway configuration does not
    /// have to exist for its lock to be resolved.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GatewardenError::UserError(format!(
                    "failed to read config file '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        Self::from_yaml(&content).map_err(|e| match e {
            GatewardenError::UserError(msg) => {
                GatewardenError::UserError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields are silently ignored; an empty document is the default config.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| GatewardenError::UserError(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - every duration must be positive
    /// - `lock.poll_interval_ms` must not exceed `lock.timeout_ms`
    /// - `stop.poll_interval_ms` must not exceed `stop.grace_ms`
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("lock.timeout_ms", self.lock.timeout_ms),
            ("lock.poll_interval_ms", self.lock.poll_interval_ms),
            ("lock.stale_ms", self.lock.stale_ms),
            ("stop.grace_ms", self.stop.grace_ms),
            ("stop.poll_interval_ms", self.stop.poll_interval_ms),
            ("stop.kill_wait_ms", self.stop.kill_wait_ms),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(GatewardenError::UserError(format!(
                    "config validation failed: {} must be greater than 0",
                    name
                )));
            }
        }

        if self.lock.poll_interval_ms > self.lock.timeout_ms {
            return Err(GatewardenError::UserError(format!(
                "config validation failed: lock.poll_interval_ms ({}) exceeds lock.timeout_ms ({})",
                self.lock.poll_interval_ms, self.lock.timeout_ms
            )));
        }

        if self.stop.poll_interval_ms > self.stop.grace_ms {
            return Err(GatewardenError::UserError(format!(
                "config validation failed: stop.poll_interval_ms ({}) exceeds stop.grace_ms ({})",
                self.stop.poll_interval_ms, self.stop.grace_ms
            )));
        }

        Ok(())
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(
        mut self,
        lock_timeout_ms: Option<u64>,
        grace_ms: Option<u64>,
    ) -> Result<Self> {
        if let Some(timeout_ms) = lock_timeout_ms {
            self.lock.timeout_ms = timeout_ms;
            // Keep a short CLI timeout usable without also passing a poll interval.
            self.lock.poll_interval_ms = self.lock.poll_interval_ms.min(timeout_ms.max(1));
        }
        if let Some(grace_ms) = grace_ms {
            self.stop.grace_ms = grace_ms;
            self.stop.poll_interval_ms = self.stop.poll_interval_ms.min(grace_ms.max(1));
        }
        self.validate()?;
        Ok(self)
    }
}
