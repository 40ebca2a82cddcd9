//! Command-line heuristic: does an argv look like `gatewarden gateway ...`?
//!
//! Used when a lock payload carries no start time, so the only way to tell
//! the recorded owner from an unrelated process that reused its pid is to
//! look at what that pid is running.

/// Subcommand token every gateway-role invocation carries.
pub const GATEWAY_TOKEN: &str = "gateway";

/// Executable basenames of this program.
pub const EXECUTABLE_NAMES: &[&str] = &["gatewarden", "gatewarden.exe"];

/// Entry-point path suffixes of this program when launched by path.
pub const ENTRY_SUFFIXES: &[&str] = &[
    "/bin/gatewarden",
    "/target/debug/gatewarden",
    "/target/release/gatewarden",
];

/// Whether `argv` is an invocation of this program in its gateway role.
///
/// Requires the `gateway` token as a standalone argument after the program,
/// plus either a recognizable entry-point suffix among the arguments (covers
/// wrapper launches such as `env`, `nohup` or `systemd-run`) or a recognizable
/// executable basename for `argv[0]`.
pub fn is_gateway_argv(argv: &[String]) -> bool {
    let Some((program, rest)) = argv.split_first() else {
        return false;
    };

    if !rest.iter().any(|arg| arg == GATEWAY_TOKEN) {
        return false;
    }

    if EXECUTABLE_NAMES.contains(&basename(program).as_str()) {
        return true;
    }

    argv.iter().any(|arg| {
        let normalized = normalize(arg);
        ENTRY_SUFFIXES.iter().any(|suffix| {
            normalized.ends_with(suffix) || normalized.ends_with(&format!("{suffix}.exe"))
        })
    })
}

fn normalize(arg: &str) -> String {
    arg.replace('\\', "/").to_ascii_lowercase()
}

fn basename(arg: &str) -> String {
    let normalized = normalize(arg);
    match normalized.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_executable_with_gateway_token() {
        assert!(is_gateway_argv(&argv(&["gatewarden", "gateway"])));
        assert!(is_gateway_argv(&argv(&[
            "/usr/local/bin/gatewarden",
            "gateway",
            "--config",
            "/cfg.yaml"
        ])));
    }

    #[test]
    fn windows_executable_path() {
        assert!(is_gateway_argv(&argv(&[
            r"C:\Program Files\gatewarden\GATEWARDEN.EXE",
            "gateway"
        ])));
    }

    #[test]
    fn wrapper_launch_matches_entry_suffix() {
        assert!(is_gateway_argv(&argv(&[
            "/usr/bin/nohup",
            "/home/me/src/gw/target/release/gatewarden",
            "gateway"
        ])));
    }

    #[test]
    fn other_subcommands_do_not_match() {
        assert!(!is_gateway_argv(&argv(&["gatewarden", "stop"])));
        assert!(!is_gateway_argv(&argv(&["gatewarden", "status", "--json"])));
    }

    #[test]
    fn token_in_program_position_does_not_count() {
        assert!(!is_gateway_argv(&argv(&["gateway"])));
    }

    #[test]
    fn unrelated_program_with_gateway_token() {
        assert!(!is_gateway_argv(&argv(&["/usr/bin/python3", "serve.py", "gateway"])));
        assert!(!is_gateway_argv(&argv(&["node", "dist/index.js", "gateway"])));
    }

    #[test]
    fn empty_argv() {
        assert!(!is_gateway_argv(&[]));
    }
}
