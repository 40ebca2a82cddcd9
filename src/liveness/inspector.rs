//! Access to the live OS process table.
//!
//! # Platform behavior
//! - **Unix existence**: `kill(pid, 0)` via `nix` (`ESRCH` means gone, `EPERM` means present)
//! - **Linux**: start time and argv from `/proc/<pid>/stat` and `/proc/<pid>/cmdline`;
//!   zombies count as gone
//! - **Other platforms**: `sysinfo` (start time in seconds since the epoch, argv)

/// Read-only view of the OS process table.
pub trait ProcessInspector {
    /// Whether a (non-zombie) process with this pid exists.
    fn exists(&self, pid: u32) -> bool;

    /// Platform start-time counter for `pid`, if readable.
    fn start_time(&self, pid: u32) -> Option<u64>;

    /// Command-line arguments of `pid`, if readable.
    fn command_line(&self, pid: u32) -> Option<Vec<String>>;
}

/// The real process table of this host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInspector;

impl ProcessInspector for SystemInspector {
    fn exists(&self, pid: u32) -> bool {
        if pid == 0 {
            return false;
        }

        #[cfg(target_os = "linux")]
        {
            if super::procfs::read_stat(pid).is_some_and(|stat| stat.is_zombie()) {
                return false;
            }
        }

        #[cfg(unix)]
        {
            signal_reaches(pid)
        }

        #[cfg(not(unix))]
        {
            sysinfo_process(pid, false).is_some()
        }
    }

    fn start_time(&self, pid: u32) -> Option<u64> {
        #[cfg(target_os = "linux")]
        {
            super::procfs::read_stat(pid).map(|stat| stat.start_time)
        }

        #[cfg(not(target_os = "linux"))]
        {
            sysinfo_process(pid, false).map(|process| process.start_time)
        }
    }

    fn command_line(&self, pid: u32) -> Option<Vec<String>> {
        #[cfg(target_os = "linux")]
        {
            super::procfs::read_cmdline(pid)
        }

        #[cfg(not(target_os = "linux"))]
        {
            sysinfo_process(pid, true)
                .map(|process| process.argv)
                .filter(|argv| !argv.is_empty())
        }
    }
}

/// Convert a recorded pid into a signal target.
///
/// Pid 0 and anything outside the positive `i32` range would address a
/// process group rather than a single process, so they are rejected.
#[cfg(unix)]
pub(crate) fn nix_pid(pid: u32) -> Option<nix::unistd::Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(nix::unistd::Pid::from_raw(raw)),
        _ => None,
    }
}

#[cfg(unix)]
fn signal_reaches(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal;

    let Some(target) = nix_pid(pid) else {
        return false;
    };

    // Signal None is the null signal: permission and existence check only
    match signal::kill(target, None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(not(target_os = "linux"))]
struct SysinfoProcess {
    start_time: u64,
    argv: Vec<String>,
}

#[cfg(not(target_os = "linux"))]
fn sysinfo_process(pid: u32, with_cmd: bool) -> Option<SysinfoProcess> {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind};

    let target = Pid::from_u32(pid);
    let mut refresh = ProcessRefreshKind::nothing();
    if with_cmd {
        refresh = refresh.with_cmd(UpdateKind::Always);
    }

    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[target]), true, refresh);

    let process = sys.process(target)?;
    if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
        return None;
    }

    Some(SysinfoProcess {
        start_time: process.start_time(),
        argv: process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn own_process_exists() {
        assert!(SystemInspector.exists(std::process::id()));
    }

    #[test]
    fn pid_zero_never_exists() {
        assert!(!SystemInspector.exists(0));
    }

    #[test]
    #[cfg(unix)]
    fn out_of_range_pid_never_exists() {
        assert!(!SystemInspector.exists(u32::MAX));
        assert!(nix_pid(u32::MAX).is_none());
        assert!(nix_pid(0).is_none());
        assert_eq!(nix_pid(1).map(|p| p.as_raw()), Some(1));
    }

    #[test]
    #[cfg(unix)]
    fn reaped_child_does_not_exist() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        assert!(!SystemInspector.exists(pid));
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn unreaped_zombie_does_not_exist() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();

        // Wait for the child to exit without reaping it.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while super::super::procfs::read_stat(pid).is_some_and(|s| !s.is_zombie())
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        assert!(!SystemInspector.exists(pid));
        child.wait().unwrap();
    }

    #[test]
    fn own_start_time_and_command_line_readable() {
        let pid = std::process::id();
        assert!(SystemInspector.start_time(pid).is_some());
        assert!(SystemInspector.command_line(pid).is_some());
    }

    #[test]
    #[cfg(unix)]
    fn child_start_time_is_stable() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let pid = child.id();

        let first = SystemInspector.start_time(pid);
        let second = SystemInspector.start_time(pid);
        assert!(first.is_some());
        assert_eq!(first, second);

        child.kill().unwrap();
        child.wait().unwrap();
    }
}
