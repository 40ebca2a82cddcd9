//! `/proc` readers for Linux process introspection.

use std::fs;

/// Fields parsed from `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcStat {
    /// Single-letter scheduler state (`R`, `S`, `Z`, ...).
    pub state: char,
    /// Start time in clock ticks since boot (field 22).
    pub start_time: u64,
}

impl ProcStat {
    pub fn is_zombie(&self) -> bool {
        matches!(self.state, 'Z' | 'X')
    }
}

/// Read and parse `/proc/<pid>/stat`.
pub fn read_stat(pid: u32) -> Option<ProcStat> {
    let content = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    parse_stat(&content)
}

/// Read `/proc/<pid>/cmdline` as an argv vector. Empty for kernel threads and zombies.
pub fn read_cmdline(pid: u32) -> Option<Vec<String>> {
    let raw = fs::read(format!("/proc/{pid}/cmdline")).ok()?;
    let argv: Vec<String> = raw
        .split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    if argv.is_empty() { None } else { Some(argv) }
}

/// Parse the contents of a stat file.
///
/// Layout: `pid (comm) state ppid ...`. `comm` may contain spaces and
/// parentheses, so fields are counted from the last `)`.
pub fn parse_stat(content: &str) -> Option<ProcStat> {
    let after_comm = &content[content.rfind(')')? + 1..];
    let mut fields = after_comm.split_whitespace();

    let state = fields.next()?.chars().next()?;
    // state is field 3; starttime is field 22
    let start_time = fields.nth(22 - 4)?.parse().ok()?;

    Some(ProcStat { state, start_time })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "4242 (gatewarden) S 1 4242 4242 0 -1 4194560 1024 0 0 0 \
        12 3 0 0 20 0 1 0 987654 12345678 900 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0";

    #[test]
    fn parses_state_and_start_time() {
        let stat = parse_stat(SAMPLE).unwrap();
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.start_time, 987654);
        assert!(!stat.is_zombie());
    }

    #[test]
    fn comm_with_spaces_and_parens() {
        let content = SAMPLE.replace("(gatewarden)", "(my (odd) name)");
        let stat = parse_stat(&content).unwrap();
        assert_eq!(stat.start_time, 987654);
    }

    #[test]
    fn zombie_state() {
        let content = SAMPLE.replace(") S ", ") Z ");
        assert!(parse_stat(&content).unwrap().is_zombie());
    }

    #[test]
    fn truncated_stat_is_none() {
        assert_eq!(parse_stat("4242 (gatewarden) S 1 2"), None);
        assert_eq!(parse_stat("garbage"), None);
    }

    #[test]
    fn reads_own_process() {
        let stat = read_stat(std::process::id()).unwrap();
        assert!(!stat.is_zombie());
        assert!(stat.start_time > 0);

        let argv = read_cmdline(std::process::id()).unwrap();
        assert!(!argv.is_empty());
    }

    #[test]
    fn start_time_is_stable_across_reads() {
        let pid = std::process::id();
        assert_eq!(
            read_stat(pid).unwrap().start_time,
            read_stat(pid).unwrap().start_time
        );
    }
}
