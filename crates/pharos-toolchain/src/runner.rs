use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use console::style;
use pharos_core::{Error, Result};
use tokio::process::{Child, Command};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::invocation::Invocation;
use crate::tool::Tool;

/// Default upper bound for a contract deployment
pub const DEPLOY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Interval of the liveness tick printed while waiting on a child
pub const PROGRESS_TICK: Duration = Duration::from_secs(1);

// =============================================================================
// Outcome
// =============================================================================

/// How a single invocation ended
#[derive(Debug)]
pub enum RunOutcome {
    Success,
    /// Non-zero exit; `None` when the child was killed by a signal
    Failure { exit_code: Option<i32> },
    Timeout { after: Duration },
    /// The child could not be started at all
    SpawnError { program: String, source: io::Error },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    /// Translate the outcome into the error taxonomy.
    pub fn into_result(self, invocation: &Invocation) -> Result<()> {
        match self {
            RunOutcome::Success => Ok(()),
            RunOutcome::Failure { exit_code } => Err(Error::SubprocessFailure {
                command: invocation.command_line(),
                exit_code,
            }),
            RunOutcome::Timeout { after } => Err(Error::Timeout {
                command: invocation.command_line(),
                after,
            }),
            RunOutcome::SpawnError { program, source } => {
                if source.kind() == io::ErrorKind::NotFound {
                    Err(match Tool::from_program(&program) {
                        Some(tool) => tool.missing(),
                        None => Error::ToolchainMissing {
                            hint: format!("Make sure `{}` is installed and on your PATH.", program),
                            tool: program,
                        },
                    })
                } else {
                    Err(Error::FileSystem(source))
                }
            }
        }
    }
}

// =============================================================================
// Trait Definition
// =============================================================================

/// Runs external commands on behalf of the command dispatcher
#[async_trait]
pub trait ToolchainRunner: Send + Sync {
    /// Run one invocation to completion, timeout or spawn failure
    async fn run(&self, invocation: &Invocation) -> RunOutcome;

    /// Find a binary on PATH
    fn locate(&self, tool: Tool) -> Option<PathBuf>;

    /// Pre-flight check that a binary is discoverable
    fn require(&self, tool: Tool) -> Result<PathBuf> {
        self.locate(tool).ok_or_else(|| tool.missing())
    }

    /// Run and fail on anything but a clean exit
    async fn execute(&self, invocation: &Invocation) -> Result<()> {
        self.run(invocation).await.into_result(invocation)
    }
}

// =============================================================================
// Process Implementation
// =============================================================================

/// Spawns real child processes with inherited stdio
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    tick: Duration,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            tick: PROGRESS_TICK,
        }
    }

    /// Use a custom progress interval
    pub fn with_tick(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolchainRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> RunOutcome {
        debug!(command = %invocation, cwd = %invocation.cwd().display(), "spawning");

        let mut command = Command::new(invocation.program());
        command
            .args(invocation.argv())
            .envs(invocation.env_vars())
            .current_dir(invocation.cwd())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // A timed child leads its own process group so the deadline reaches
        // whatever it spawned.
        #[cfg(unix)]
        {
            if invocation.timeout_limit().is_some() {
                command.process_group(0);
            }
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                debug!(program = invocation.program(), error = %source, "spawn failed");
                return RunOutcome::SpawnError {
                    program: invocation.program().to_string(),
                    source,
                };
            }
        };

        let limit = invocation.timeout_limit();
        let deadline = async move {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        // First of exit or deadline decides the outcome.
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                _ = &mut deadline => {
                    terminate(&mut child, invocation).await;
                    end_progress_line(ticks);
                    let after = limit.unwrap_or_default();
                    debug!(command = %invocation, ?after, "timed out");
                    return RunOutcome::Timeout { after };
                }
                _ = ticker.tick(), if invocation.shows_progress() => {
                    ticks += 1;
                    eprint!("{}", style(".").dim());
                }
            }
        };
        end_progress_line(ticks);

        match status {
            Ok(status) if status.success() => {
                debug!(command = %invocation, "finished");
                RunOutcome::Success
            }
            Ok(status) => {
                debug!(command = %invocation, code = ?status.code(), "exited with failure");
                RunOutcome::Failure {
                    exit_code: status.code(),
                }
            }
            Err(e) => {
                warn!(command = %invocation, error = %e, "failed to wait on child");
                RunOutcome::Failure { exit_code: None }
            }
        }
    }

    fn locate(&self, tool: Tool) -> Option<PathBuf> {
        which::which(tool.program()).ok()
    }
}

/// Kill a timed out child together with its process group.
async fn terminate(child: &mut Child, invocation: &Invocation) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: killpg only sends a signal; the group id is the child's pid.
            if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } != 0 {
                warn!(
                    command = %invocation,
                    error = %io::Error::last_os_error(),
                    "failed to kill process group"
                );
            }
        }
    }
    if let Err(e) = child.kill().await {
        warn!(command = %invocation, error = %e, "failed to kill timed out child");
    }
}

fn end_progress_line(ticks: u64) {
    if ticks > 0 {
        eprintln!();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    fn sh(script: &str, cwd: &std::path::Path) -> Invocation {
        Invocation::new("sh", cwd).args(["-c", script])
    }

    #[tokio::test]
    async fn test_exit_zero_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ProcessRunner::new().run(&sh("exit 0", dir.path())).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_exit_one_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ProcessRunner::new().run(&sh("exit 1", dir.path())).await;
        assert!(matches!(
            outcome,
            RunOutcome::Failure { exit_code: Some(1) }
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation::new("pharos-definitely-not-installed", dir.path());
        let outcome = ProcessRunner::new().run(&invocation).await;

        match outcome {
            RunOutcome::SpawnError { program, source } => {
                assert_eq!(program, "pharos-definitely-not-installed");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected spawn error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_error_maps_to_toolchain_missing() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation::new("pharos-definitely-not-installed", dir.path());
        let err = ProcessRunner::new().execute(&invocation).await.unwrap_err();
        assert!(matches!(err, Error::ToolchainMissing { .. }));
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ProcessRunner::new()
            .run(&sh("touch here.txt", dir.path()))
            .await;

        assert!(outcome.is_success());
        assert!(dir.path().join("here.txt").exists());
    }

    #[tokio::test]
    async fn test_timeout_terminates_child() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let invocation = sh("sleep 1; touch survived", dir.path())
            .timeout(Duration::from_millis(100))
            .with_progress();

        let started = StdInstant::now();
        let outcome = ProcessRunner::with_tick(Duration::from_millis(20))
            .run(&invocation)
            .await;
        let elapsed = started.elapsed();

        assert!(matches!(outcome, RunOutcome::Timeout { after } if after == Duration::from_millis(100)));
        assert!(elapsed <= Duration::from_millis(150), "took {:?}", elapsed);

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(!marker.exists(), "child kept running after the timeout");
    }

    #[tokio::test]
    async fn test_timeout_terminates_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let invocation = sh("(sleep 0.5; touch survived) & wait", dir.path())
            .timeout(Duration::from_millis(100));

        let outcome = ProcessRunner::new().run(&invocation).await;
        assert!(matches!(outcome, RunOutcome::Timeout { .. }));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(!marker.exists(), "grandchild kept running after the timeout");
    }

    #[tokio::test]
    async fn test_env_vars_reach_child() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = sh("test \"$RPC_URL\" = http://node.test", dir.path())
            .env("RPC_URL", "http://node.test");

        let outcome = ProcessRunner::new().run(&invocation).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_fast_child_beats_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = sh("exit 3", dir.path()).timeout(Duration::from_secs(10));
        let outcome = ProcessRunner::new().run(&invocation).await;
        assert!(matches!(outcome, RunOutcome::Failure { exit_code: Some(3) }));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_error() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = sh("sleep 5", dir.path()).timeout(Duration::from_millis(50));
        let err = ProcessRunner::new().execute(&invocation).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
