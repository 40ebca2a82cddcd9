//! Implementation of the `gatewarden gateway` command.
//!
//! Holds the single-instance lock for as long as the gateway role runs:
//!
//! 1. Optionally stops an existing owner (`--force`)
//! 2. Acquires the lock (or reports the conflicting pid on timeout)
//! 3. Waits for SIGTERM, SIGINT or SIGHUP
//! 4. Releases the lock and exits cleanly

use super::Invocation;
use super::stop::describe_outcome;
use crate::cli::GatewayArgs;
use crate::error::Result;
use crate::liveness::LivenessChecker;
use crate::locks::{AcquireOptions, acquire_gateway_lock};
use crate::stop::{StopOptions, StopResult, stop_gateway};

/// Execute the `gatewarden gateway` command.
pub fn cmd_gateway(args: GatewayArgs) -> Result<()> {
    let mut inv = Invocation::prepare(&args.config)?;
    inv.config = inv.config.with_overrides(args.lock_timeout_ms, None)?;
    let checker = LivenessChecker::system();

    if args.force {
        let outcome = stop_gateway(&inv.ctx, &StopOptions::from_config(&inv.config), &checker)?;
        if outcome.result != StopResult::NoLock {
            println!("{}", describe_outcome(&outcome, &inv.ctx.lock_path));
        }
    }

    // Block shutdown signals before the lock exists so none can slip past
    // between acquiring and waiting.
    let shutdown = shutdown::Shutdown::install()?;

    let options = AcquireOptions::from_settings(&inv.config.lock);
    let handle = acquire_gateway_lock(&inv.ctx, &options, &inv.env, &checker)?;

    match &handle {
        Some(handle) => println!(
            "Gateway running (pid {}, lock {})",
            handle.payload().pid,
            handle.lock_path().display()
        ),
        None => println!(
            "Gateway running without single-instance lock (pid {})",
            std::process::id()
        ),
    }

    let reason = shutdown.wait()?;
    tracing::info!(%reason, "shutting down gateway");

    if let Some(mut handle) = handle {
        handle.release()?;
    }
    println!("Gateway stopped ({})", reason);
    Ok(())
}

#[cfg(unix)]
mod shutdown {
    use crate::error::{GatewardenError, Result};
    use nix::sys::signal::{SigSet, Signal};

    /// Shutdown signals, blocked on this thread and consumed with `sigwait`.
    pub struct Shutdown {
        signals: SigSet,
    }

    impl Shutdown {
        pub fn install() -> Result<Self> {
            let mut signals = SigSet::empty();
            signals.add(Signal::SIGTERM);
            signals.add(Signal::SIGINT);
            signals.add(Signal::SIGHUP);
            signals.thread_block().map_err(|e| {
                GatewardenError::io("failed to block shutdown signals", e.into())
            })?;
            Ok(Self { signals })
        }

        /// Block until one of the shutdown signals arrives; returns its name.
        pub fn wait(&self) -> Result<String> {
            let signal = self.signals.wait().map_err(|e| {
                GatewardenError::io("failed to wait for shutdown signal", e.into())
            })?;
            Ok(signal.as_str().to_string())
        }
    }
}

#[cfg(not(unix))]
mod shutdown {
    use crate::error::Result;

    /// Without POSIX signals, the gateway runs until it is terminated.
    ///
    /// `stop` ends it with a hard termination and removes the lock itself, so
    /// nothing here waits on stdin, which a service manager may close at once.
    pub struct Shutdown;

    impl Shutdown {
        pub fn install() -> Result<Self> {
            Ok(Self)
        }

        pub fn wait(&self) -> Result<String> {
            loop {
                std::thread::park();
            }
        }
    }

}
