//! Command implementations for gatewarden.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command resolves the same [`GatewayContext`] so
//! that all of them agree on which lock file belongs to a configuration.

mod gateway;
mod status;
mod stop;

use crate::cli::{Command, ConfigArg, PathArgs};
use crate::config::{Config, EnvOverrides};
use crate::context::GatewayContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Gateway(args) => gateway::cmd_gateway(args),
        Command::Stop(args) => stop::cmd_stop(args),
        Command::Status(args) => status::cmd_status(args),
        Command::Path(args) => cmd_path(args),
    }
}

/// Everything a command needs before touching the lock.
struct Invocation {
    env: EnvOverrides,
    ctx: GatewayContext,
    config: Config,
}

impl Invocation {
    /// Snapshot the environment, resolve the lock path and load lock/stop policy.
    fn prepare(arg: &ConfigArg) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let ctx = GatewayContext::resolve(arg.config.as_deref(), &env)?;
        let config = Config::load_or_default(&ctx.config_path)?;

        tracing::debug!(
            config = %ctx.config_path.display(),
            lock = %ctx.lock_path.display(),
            "resolved gateway context"
        );

        Ok(Self { env, ctx, config })
    }
}

fn cmd_path(args: PathArgs) -> Result<()> {
    let env = EnvOverrides::from_env();
    let ctx = GatewayContext::resolve(args.config.config.as_deref(), &env)?;
    println!("{}", ctx.lock_path.display());
    Ok(())
}
