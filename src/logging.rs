//! Tracing subscriber initialization for the gatewarden binary.
//!
//! Wires the global `--verbose`, `--quiet` and `--no-color` flags and the
//! `GATEWARDEN_LOG` / `RUST_LOG` environment variables into one
//! `tracing-subscriber` stack writing to stderr. Stdout stays reserved for
//! command results.
//!
//! # Priority (highest to lowest)
//!
//! 1. `GATEWARDEN_LOG` (per-target directives, e.g. `gatewarden=debug`)
//! 2. `RUST_LOG`
//! 3. CLI flags (`-v` debug, `-q` error)
//! 4. Default level: `warn`

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Project-specific log filter variable.
pub const ENV_LOG: &str = "GATEWARDEN_LOG";

/// Verbosity level derived from CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Verbose wins when both flags are set.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Install the global subscriber. Call once, first thing in `main`.
///
/// A second call is a no-op rather than a panic.
pub fn init_subscriber(verbosity: Verbosity, no_color: bool) {
    let filter = build_env_filter(verbosity, |key| std::env::var(key).ok());

    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let use_ansi = !no_color && stderr_is_tty;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(verbosity == Verbosity::Verbose);

    let result = if verbosity == Verbosity::Verbose {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.with_timer(fmt::time::uptime()))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.without_time().compact())
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("warning: logging already initialized: {}", e);
    }
}

/// `GATEWARDEN_LOG` > `RUST_LOG` > verbosity. Unparsable directives fall through.
fn build_env_filter<F>(verbosity: Verbosity, lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    for key in [ENV_LOG, EnvFilter::DEFAULT_ENV] {
        if let Some(directives) = lookup(key).filter(|v| !v.trim().is_empty())
            && let Ok(filter) = EnvFilter::try_new(&directives)
        {
            return filter;
        }
    }

    EnvFilter::new(verbosity.default_level().as_str())
}
