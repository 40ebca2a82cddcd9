//! Implementation of the `gatewarden status` command.
//!
//! Reads the lock without modifying it and reports whether a gateway is
//! running for the configuration, who holds the lock, and whether the next
//! acquirer would reclaim it.

use super::Invocation;
use crate::cli::StatusArgs;
use crate::error::{GatewardenError, Result};
use crate::liveness::{LivenessChecker, OwnerStatus};
use crate::locks::{LockInfo, inspect_lock};
use serde::Serialize;
use std::path::PathBuf;

/// Machine-readable status, printed by `status --json`.
#[derive(Debug, Serialize)]
struct StatusReport {
    config_path: PathBuf,
    lock_path: PathBuf,
    running: bool,
    lock: Option<LockInfo>,
}

impl StatusReport {
    fn new(config_path: PathBuf, lock_path: PathBuf, lock: Option<LockInfo>) -> Self {
        let running = lock.as_ref().is_some_and(|info| {
            !info.is_stale
                && matches!(
                    info.owner_status,
                    Some(OwnerStatus::Alive | OwnerStatus::Unknown)
                )
        });
        Self {
            config_path,
            lock_path,
            running,
            lock,
        }
    }
}

/// Execute the `gatewarden status` command.
pub fn cmd_status(args: StatusArgs) -> Result<()> {
    let inv = Invocation::prepare(&args.config)?;
    let checker = LivenessChecker::system();
    let info = inspect_lock(&inv.ctx, inv.config.lock.stale_after(), &checker)?;

    let report = StatusReport::new(inv.ctx.config_path.clone(), inv.ctx.lock_path.clone(), info);

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            GatewardenError::io("failed to serialize status", std::io::Error::other(e))
        })?;
        println!("{}", json);
        return Ok(());
    }

    println!("Gateway Status");
    println!("==============");
    println!();
    println!("  Config:   {}", report.config_path.display());
    println!("  Lock:     {}", report.lock_path.display());
    match &report.lock {
        None => println!("  State:    not running (no lock)"),
        Some(info) => {
            let state = if report.running { "running" } else { "not running" };
            println!("  State:    {}", state);
            println!("  Holder:   {}", info);
            if let Some(created) = info.payload.as_ref().and_then(|p| p.created_at()) {
                println!("  Created:  {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if info.is_stale {
                println!();
                println!("Note: the lock is stale and will be reclaimed by the next gateway.");
            }
        }
    }

    Ok(())
}
