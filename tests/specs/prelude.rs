//! Test helpers for end-to-end `syncd`/`syncdctl` behavioral specs.
//!
//! Black-box: each test spawns a real `syncd` against an isolated state
//! directory and drives it with the `syncdctl` binary, exactly as a user
//! would from a shell.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};
use std::time::{Duration, Instant};

// Aggressive timeouts so failure-path tests (daemon never starts, etc.)
// don't make the suite slow.
const TIMEOUT_CONNECT_MS: &str = "2000";
const TIMEOUT_EXIT_MS: &str = "1000";
const TIMEOUT_IPC_MS: &str = "1000";
const CONNECT_POLL_MS: &str = "10";

pub const WAIT_POLL_MS: u64 = 10;
pub const WAIT_MAX_MS: u64 = 2000;

fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn syncd_binary() -> PathBuf {
    binary_path("syncd")
}

fn syncdctl_binary() -> PathBuf {
    binary_path("syncdctl")
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll = Duration::from_millis(WAIT_POLL_MS);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll);
    }
    false
}

/// An isolated `syncd` instance plus the `syncdctl` commands to drive it.
///
/// Each test gets its own state directory, so daemons from concurrent
/// tests never contend for the same lock file or socket.
pub struct Harness {
    state_dir: tempfile::TempDir,
    child: Option<Child>,
}

impl Harness {
    /// Create the harness without starting a daemon.
    pub fn new() -> Self {
        Self { state_dir: tempfile::tempdir().unwrap(), child: None }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    fn envs(&self) -> Vec<(String, String)> {
        vec![
            ("SYNCD_STATE_DIR".into(), self.state_path().to_string_lossy().into_owned()),
            ("SYNCD_DAEMON_BINARY".into(), syncd_binary().to_string_lossy().into_owned()),
            ("SYNCD_TIMEOUT_CONNECT_MS".into(), TIMEOUT_CONNECT_MS.into()),
            ("SYNCD_TIMEOUT_EXIT_MS".into(), TIMEOUT_EXIT_MS.into()),
            ("SYNCD_TIMEOUT_IPC_MS".into(), TIMEOUT_IPC_MS.into()),
            ("SYNCD_CONNECT_POLL_MS".into(), CONNECT_POLL_MS.into()),
        ]
    }

    /// Build a `syncdctl` command with this harness's environment wired in.
    pub fn ctl(&self) -> CliBuilder {
        CliBuilder { args: Vec::new(), envs: self.envs() }
    }

    /// Spawn `syncd` directly in the background and wait for its socket to
    /// come up. Bypasses `syncdctl daemon start` so tests that only care
    /// about an already-running daemon don't pay the auto-start path twice.
    pub fn spawn_daemon(&mut self) {
        let mut cmd = Command::new(syncd_binary());
        for (k, v) in self.envs() {
            cmd.env(k, v);
        }
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::null());
        let child = cmd.spawn().expect("syncd should spawn");
        self.child = Some(child);

        let socket = self.state_path().join("syncd.sock");
        let up = wait_for(WAIT_MAX_MS, || socket.exists());
        assert!(up, "daemon did not create its socket in time");
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(self.state_path().join("syncd.log")).unwrap_or_else(|_| "(no log)".to_string())
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        // Graceful shutdown via IPC if a daemon is up; fall back to killing
        // the child we hold directly so a failed test never leaks a process.
        let _ = self.ctl().args(&["daemon", "stop"]).command().output();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Fluent `syncdctl` command builder.
pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(syncdctl_binary());
        cmd.args(&self.args);
        for (k, v) in self.envs {
            cmd.env(k, v);
        }
        cmd
    }

    pub fn run(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("syncdctl should run");
        RunAssert { output }
    }

    pub fn passes(self) -> RunAssert {
        let result = self.run();
        assert!(
            result.output.status.success(),
            "expected success, got exit code {:?}\nstdout: {}\nstderr: {}",
            result.output.status.code(),
            result.stdout(),
            result.stderr()
        );
        result
    }

    pub fn fails(self) -> RunAssert {
        let result = self.run();
        assert!(
            !result.output.status.success(),
            "expected failure, but it passed\nstdout: {}",
            result.stdout()
        );
        result
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{}'\nstdout: {}", expected, stdout);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{}'\nstderr: {}", expected, stderr);
        self
    }
}
