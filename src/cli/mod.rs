//! CLI argument parsing for gatewarden.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Gatewarden: single-instance lock and foreground stop for a gateway process.
///
/// One gateway may run per configuration file. The running gateway holds a
/// lock file naming its pid; `stop` reads that file and terminates the owner.
#[derive(Parser, Debug)]
#[command(name = "gatewarden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct GlobalArgs {
    /// Debug-level logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Available commands for gatewarden.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run in the gateway role.
    ///
    /// Acquires the single-instance lock for the configuration and holds it
    /// until SIGTERM, SIGINT or SIGHUP, then releases it and exits.
    Gateway(GatewayArgs),

    /// Stop the running gateway.
    ///
    /// Sends SIGTERM to the lock owner, escalates to SIGKILL after the grace
    /// window, and removes the lock.
    Stop(StopArgs),

    /// Show the lock state without changing it.
    Status(StatusArgs),

    /// Print the lock file path for a configuration.
    Path(PathArgs),
}

/// Configuration selection shared by all commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Gateway configuration file (defaults to $GATEWARDEN_CONFIG_PATH, then ~/.gatewarden/gateway.yaml).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `gateway` command.
#[derive(Args, Debug)]
pub struct GatewayArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Stop an existing gateway for this configuration before acquiring.
    #[arg(long)]
    pub force: bool,

    /// Override the lock acquisition timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub lock_timeout_ms: Option<u64>,
}

/// Arguments for the `stop` command.
#[derive(Args, Debug)]
pub struct StopArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Override the SIGTERM grace window in milliseconds.
    #[arg(long, value_name = "MS")]
    pub grace_ms: Option<u64>,
}

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Print machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `path` command.
#[derive(Args, Debug)]
pub struct PathArgs {
    #[command(flatten)]
    pub config: ConfigArg,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_gateway_minimal() {
        let cli = Cli::try_parse_from(["gatewarden", "gateway"]).unwrap();
        match cli.command {
            Command::Gateway(args) => {
                assert!(args.config.config.is_none());
                assert!(!args.force);
                assert!(args.lock_timeout_ms.is_none());
            }
            other => panic!("Expected Gateway command, got {:?}", other),
        }
    }

    #[test]
    fn parse_gateway_full() {
        let cli = Cli::try_parse_from([
            "gatewarden",
            "gateway",
            "--config",
            "/srv/gateway.yaml",
            "--force",
            "--lock-timeout-ms",
            "250",
        ])
        .unwrap();
        match cli.command {
            Command::Gateway(args) => {
                assert_eq!(
                    args.config.config,
                    Some(PathBuf::from("/srv/gateway.yaml"))
                );
                assert!(args.force);
                assert_eq!(args.lock_timeout_ms, Some(250));
            }
            other => panic!("Expected Gateway command, got {:?}", other),
        }
    }

    #[test]
    fn parse_stop_with_grace() {
        let cli = Cli::try_parse_from(["gatewarden", "stop", "-c", "cfg.yaml", "--grace-ms", "100"])
            .unwrap();
        match cli.command {
            Command::Stop(args) => {
                assert_eq!(args.config.config, Some(PathBuf::from("cfg.yaml")));
                assert_eq!(args.grace_ms, Some(100));
            }
            other => panic!("Expected Stop command, got {:?}", other),
        }
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::try_parse_from(["gatewarden", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status(StatusArgs { json: true, .. })));
    }

    #[test]
    fn parse_path() {
        let cli = Cli::try_parse_from(["gatewarden", "path"]).unwrap();
        assert!(matches!(cli.command, Command::Path(_)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gatewarden", "status", "-v", "--no-color"]).unwrap();
        assert!(cli.global.verbose);
        assert!(cli.global.no_color);
        assert!(!cli.global.quiet);
    }

    #[test]
    fn lock_timeout_must_be_numeric() {
        let result = Cli::try_parse_from(["gatewarden", "gateway", "--lock-timeout-ms", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["gatewarden", "restart"]).is_err());
    }
}
