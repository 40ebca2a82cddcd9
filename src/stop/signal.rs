//! Termination signal delivery to a recorded owner pid.
//!
//! Unix uses `kill(2)` through `nix`; elsewhere `sysinfo` terminates the process.

use crate::error::{GatewardenError, Result};

/// Outcome of delivering a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The signal was accepted by the OS.
    Sent,
    /// There was no such process to signal.
    NoSuchProcess,
}

/// Ask `pid` to shut down (SIGTERM).
pub fn terminate(pid: u32) -> Result<Delivery> {
    tracing::debug!(pid, "sending graceful termination signal");

    #[cfg(unix)]
    {
        send(pid, nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    {
        sysinfo_terminate(pid, false)
    }
}

/// Force `pid` to exit (SIGKILL).
pub fn kill(pid: u32) -> Result<Delivery> {
    tracing::debug!(pid, "sending forceful kill signal");

    #[cfg(unix)]
    {
        send(pid, nix::sys::signal::Signal::SIGKILL)
    }

    #[cfg(not(unix))]
    {
        sysinfo_terminate(pid, true)
    }
}

#[cfg(unix)]
fn send(pid: u32, sig: nix::sys::signal::Signal) -> Result<Delivery> {
    use crate::liveness::nix_pid;
    use nix::errno::Errno;
    use nix::sys::signal;

    let Some(target) = nix_pid(pid) else {
        return Err(GatewardenError::Signal {
            pid,
            reason: "not a signalable process id".to_string(),
        });
    };

    match signal::kill(target, sig) {
        Ok(()) => Ok(Delivery::Sent),
        Err(Errno::ESRCH) => Ok(Delivery::NoSuchProcess),
        Err(e) => Err(GatewardenError::Signal {
            pid,
            reason: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn sysinfo_terminate(pid: u32, force: bool) -> Result<Delivery> {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

    let target = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[target]),
        true,
        ProcessRefreshKind::nothing(),
    );

    let Some(process) = sys.process(target) else {
        return Ok(Delivery::NoSuchProcess);
    };

    let delivered = if force {
        process.kill()
    } else {
        // Platforms without a graceful signal only offer a hard kill.
        process.kill_with(Signal::Term).unwrap_or_else(|| process.kill())
    };

    if delivered {
        Ok(Delivery::Sent)
    } else {
        Err(GatewardenError::Signal {
            pid,
            reason: "the operating system refused to terminate the process".to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{dead_pid, spawn_ready};

    #[test]
    fn signalling_missing_process_reports_no_such_process() {
        let pid = dead_pid();
        assert_eq!(terminate(pid).unwrap(), Delivery::NoSuchProcess);
        assert_eq!(kill(pid).unwrap(), Delivery::NoSuchProcess);
    }

    #[test]
    fn group_addressing_pids_are_refused() {
        assert!(matches!(
            terminate(0),
            Err(GatewardenError::Signal { pid: 0, .. })
        ));
        assert!(matches!(kill(u32::MAX), Err(GatewardenError::Signal { .. })));
    }

    #[test]
    fn terminate_reaches_running_process() {
        let pid = spawn_ready("echo ready; exec sleep 30");
        assert_eq!(terminate(pid).unwrap(), Delivery::Sent);
    }
}
