//! Liveness probing for recorded lock owners.
//!
//! A pid in a lock file is only a claim. Before trusting it, the checker checks
//! the live process table and, where the platform allows, whether the process
//! behind that pid is still the one that wrote the lock:
//!
//! - **start time**: the strongest signal; a recycled pid never carries the
//!   original owner's start time
//! - **command line**: weaker fallback for payloads without a start time
//! - **existence only**: when nothing else can be read
//!
//! The available evidence is detected once, by probing the current process.

mod command_line;
mod inspector;
#[cfg(target_os = "linux")]
mod procfs;


pub use command_line::is_gateway_argv;
#[cfg(unix)]
pub(crate) use inspector::nix_pid;
pub use inspector::{ProcessInspector, SystemInspector};

use serde::Serialize;

/// Whether the recorded owner of a lock is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerStatus {
    /// The recorded owner is running.
    Alive,
    /// No process with that pid, or the pid now belongs to someone else.
    Dead,
    /// The pid exists but could not be re-verified.
    Unknown,
}

impl std::fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerStatus::Alive => write!(f, "alive"),
            OwnerStatus::Dead => write!(f, "dead"),
            OwnerStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// What the platform can tell us about a running process beyond its existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessEvidence {
    /// Start time (and command line) are readable.
    ByStartTime,
    /// Only the command line is readable.
    ByCommandLine,
    /// Existence is all we get.
    ExistenceOnly,
}

impl LivenessEvidence {
    /// Detect capabilities by introspecting the current process.
    pub fn detect(inspector: &dyn ProcessInspector) -> Self {
        let pid = std::process::id();
        if inspector.start_time(pid).is_some() {
            LivenessEvidence::ByStartTime
        } else if inspector.command_line(pid).is_some() {
            LivenessEvidence::ByCommandLine
        } else {
            LivenessEvidence::ExistenceOnly
        }
    }

    pub fn can_read_command_line(self) -> bool {
        !matches!(self, LivenessEvidence::ExistenceOnly)
    }
}

/// Judges lock owners against a process table with a fixed evidence strategy.
pub struct LivenessChecker {
    inspector: Box<dyn ProcessInspector>,
    evidence: LivenessEvidence,
}

impl std::fmt::Debug for LivenessChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessChecker")
            .field("evidence", &self.evidence)
            .finish_non_exhaustive()
    }
}

impl LivenessChecker {
    /// Checker over the host process table, evidence detected once.
    pub fn system() -> Self {
        let inspector = SystemInspector;
        let evidence = LivenessEvidence::detect(&inspector);
        tracing::debug!(?evidence, "detected liveness evidence");
        Self::new(Box::new(inspector), evidence)
    }

    pub fn new(inspector: Box<dyn ProcessInspector>, evidence: LivenessEvidence) -> Self {
        Self {
            inspector,
            evidence,
        }
    }

    pub fn evidence(&self) -> LivenessEvidence {
        self.evidence
    }

    /// Start time of `pid` for a new payload, when the platform exposes it.
    pub fn start_time_of(&self, pid: u32) -> Option<u64> {
        match self.evidence {
            LivenessEvidence::ByStartTime => self.inspector.start_time(pid),
            _ => None,
        }
    }

    /// Whether a process with this pid exists, ignoring ownership.
    pub fn exists(&self, pid: u32) -> bool {
        self.inspector.exists(pid)
    }

    /// Classify the recorded owner `pid`, expected to have started at `expected_start`.
    pub fn assess(&self, pid: u32, expected_start: Option<u64>) -> OwnerStatus {
        if !self.inspector.exists(pid) {
            return OwnerStatus::Dead;
        }

        if self.evidence == LivenessEvidence::ExistenceOnly {
            return OwnerStatus::Alive;
        }

        if let Some(expected) = expected_start
            && self.evidence == LivenessEvidence::ByStartTime
        {
            return match self.inspector.start_time(pid) {
                None => OwnerStatus::Unknown,
                Some(actual) if actual != expected => {
                    tracing::debug!(pid, expected, actual, "start time mismatch, pid was reused");
                    OwnerStatus::Dead
                }
                Some(_) => OwnerStatus::Alive,
            };
        }

        match self.looks_like_gateway(pid) {
            Some(true) => OwnerStatus::Alive,
            Some(false) => OwnerStatus::Dead,
            None => OwnerStatus::Unknown,
        }
    }

    /// Whether `pid` is running this program in its gateway role.
    ///
    /// `None` when the command line cannot be read.
    pub fn looks_like_gateway(&self, pid: u32) -> Option<bool> {
        if !self.evidence.can_read_command_line() {
            return None;
        }
        self.inspector
            .command_line(pid)
            .map(|argv| is_gateway_argv(&argv))
    }
}
