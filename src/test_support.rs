use crate::context::GatewayContext;
use crate::liveness::{LivenessChecker, LivenessEvidence, ProcessInspector};
use crate::locks::LockPayload;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// A scripted process table.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeInspector {
    processes: HashMap<u32, FakeProcess>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeProcess {
    pub start_time: Option<u64>,
    pub argv: Option<Vec<String>>,
}

impl FakeInspector {
    pub(crate) fn with(mut self, pid: u32, process: FakeProcess) -> Self {
        self.processes.insert(pid, process);
        self
    }

    pub(crate) fn checker(self, evidence: LivenessEvidence) -> LivenessChecker {
        LivenessChecker::new(Box::new(self), evidence)
    }
}

impl ProcessInspector for FakeInspector {
    fn exists(&self, pid: u32) -> bool {
        self.processes.contains_key(&pid)
    }

    fn start_time(&self, pid: u32) -> Option<u64> {
        self.processes.get(&pid).and_then(|p| p.start_time)
    }

    fn command_line(&self, pid: u32) -> Option<Vec<String>> {
        self.processes.get(&pid).and_then(|p| p.argv.clone())
    }
}

pub(crate) fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// A lock directory in a temp dir plus the context for `/cfg.json` inside it.
pub(crate) fn temp_context() -> (TempDir, GatewayContext) {
    let temp_dir = TempDir::new().unwrap();
    let ctx =
        GatewayContext::for_config(Path::new("/cfg.json"), &temp_dir.path().join("locks")).unwrap();
    ctx.ensure_lock_dir().unwrap();
    (temp_dir, ctx)
}

/// Write an arbitrary payload as the lock file, bypassing acquisition.
pub(crate) fn plant_lock(ctx: &GatewayContext, payload: &LockPayload) {
    std::fs::write(&ctx.lock_path, payload.to_json().unwrap()).unwrap();
}

/// A pid that belonged to a process which has exited and been reaped.
pub(crate) fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}

/// Spawn `sh -c <script>`, wait for it to print a line, and reap it in the
/// background so its pid disappears as soon as it exits.
pub(crate) fn spawn_ready(script: &str) -> u32 {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(script)
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let pid = child.id();

    let stdout = child.stdout.take().unwrap();
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line).unwrap();

    std::thread::spawn(move || {
        let _ = child.wait();
    });
    pid
}
