//! Implementation of the `gatewarden stop` command.

use super::Invocation;
use crate::cli::StopArgs;
use crate::error::Result;
use crate::liveness::LivenessChecker;
use crate::stop::{StopOptions, StopOutcome, StopResult, stop_gateway};
use std::path::Path;

/// Execute the `gatewarden stop` command.
pub fn cmd_stop(args: StopArgs) -> Result<()> {
    let mut inv = Invocation::prepare(&args.config)?;
    inv.config = inv.config.with_overrides(None, args.grace_ms)?;

    let outcome = stop_gateway(
        &inv.ctx,
        &StopOptions::from_config(&inv.config),
        &LivenessChecker::system(),
    )?;
    println!("{}", describe_outcome(&outcome, &inv.ctx.lock_path));
    Ok(())
}

/// One-line report of a stop outcome.
pub(super) fn describe_outcome(outcome: &StopOutcome, lock_path: &Path) -> String {
    match (outcome.result, outcome.pid) {
        (StopResult::Stopped, Some(pid)) => format!("Gateway stopped (pid {})", pid),
        (StopResult::Stopped, None) => "Gateway stopped".to_string(),
        (StopResult::NotRunning, Some(pid)) => {
            format!("Gateway not running (removed stale lock of pid {})", pid)
        }
        (StopResult::NotRunning, None) => {
            format!("Gateway not running (unreadable lock at {})", lock_path.display())
        }
        (StopResult::NoLock, _) => format!("No gateway running (no lock at {})", lock_path.display()),
    }
}
