//! Entry point for the `gatewarden` CLI.
//!
//! Parses arguments, initializes logging, dispatches to the command handler,
//! and maps errors to exit codes.

use gatewarden::cli::Cli;
use gatewarden::logging::{Verbosity, init_subscriber};
use gatewarden::{commands, exit_codes};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_subscriber(
        Verbosity::from_flags(cli.global.verbose, cli.global.quiet),
        cli.global.no_color,
    );

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
