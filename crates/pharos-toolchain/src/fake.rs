//! In-memory runner and probe used to exercise command orchestration

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use pharos_core::{Error, Result};

use crate::invocation::Invocation;
use crate::probe::RpcProbe;
use crate::runner::{RunOutcome, ToolchainRunner};
use crate::tool::Tool;

type Hook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// Scripted result for commands matching a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedOutcome {
    Success,
    Exit(i32),
    Timeout,
    NotFound,
}

/// One recorded invocation with its secrets already redacted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub progress: bool,
}

/// Runner that records command lines instead of spawning processes.
///
/// Every tool is discoverable and every command succeeds unless scripted
/// otherwise.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    outcomes: Vec<(String, ScriptedOutcome)>,
    missing: Mutex<HashSet<Tool>>,
    installs: HashMap<String, Tool>,
    hook: Option<Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` end with `outcome`.
    pub fn on(mut self, prefix: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.outcomes.push((prefix.into(), outcome));
        self
    }

    /// `tool` is not found on PATH.
    pub fn missing(self, tool: Tool) -> Self {
        self.missing
            .lock()
            .expect("recording runner lock poisoned")
            .insert(tool);
        self
    }

    /// A successful command starting with `prefix` makes `tool` discoverable.
    pub fn installs(mut self, prefix: impl Into<String>, tool: Tool) -> Self {
        self.installs.insert(prefix.into(), tool);
        self
    }

    /// Run `hook` for every invocation before its outcome is decided.
    pub fn on_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .expect("recording runner lock poisoned")
            .clone()
    }

    /// Redacted command lines in invocation order
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.command).collect()
    }

    fn scripted(&self, command: &str) -> ScriptedOutcome {
        self.outcomes
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(ScriptedOutcome::Success)
    }
}

#[async_trait]
impl ToolchainRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> RunOutcome {
        let command = invocation.command_line();
        self.calls
            .lock()
            .expect("recording runner lock poisoned")
            .push(RecordedCall {
                command: command.clone(),
                cwd: invocation.cwd().to_path_buf(),
                env: invocation
                    .env_vars()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
                timeout: invocation.timeout_limit(),
                progress: invocation.shows_progress(),
            });

        if let Some(hook) = &self.hook {
            hook(invocation);
        }

        let program_missing = Tool::from_program(invocation.program())
            .map(|tool| self.locate(tool).is_none())
            .unwrap_or(false);
        let outcome = if program_missing {
            ScriptedOutcome::NotFound
        } else {
            self.scripted(&command)
        };

        match outcome {
            ScriptedOutcome::Success => {
                if let Some((_, tool)) = self
                    .installs
                    .iter()
                    .find(|(prefix, _)| command.starts_with(prefix.as_str()))
                {
                    self.missing
                        .lock()
                        .expect("recording runner lock poisoned")
                        .remove(tool);
                }
                RunOutcome::Success
            }
            ScriptedOutcome::Exit(code) => RunOutcome::Failure {
                exit_code: Some(code),
            },
            ScriptedOutcome::Timeout => RunOutcome::Timeout {
                after: invocation.timeout_limit().unwrap_or_default(),
            },
            ScriptedOutcome::NotFound => RunOutcome::SpawnError {
                program: invocation.program().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "program not found"),
            },
        }
    }

    fn locate(&self, tool: Tool) -> Option<PathBuf> {
        let missing = self
            .missing
            .lock()
            .expect("recording runner lock poisoned")
            .contains(&tool);
        (!missing).then(|| PathBuf::from("/usr/local/bin").join(tool.program()))
    }
}

/// Probe with a fixed answer that remembers which URLs were checked
pub struct StaticProbe {
    answer: std::result::Result<u64, (i64, String)>,
    reachable: bool,
    probed: Mutex<Vec<String>>,
}

impl StaticProbe {
    pub fn reachable(chain_id: u64) -> Self {
        Self {
            answer: Ok(chain_id),
            reachable: true,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            answer: Ok(0),
            reachable: false,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(code: i64, message: impl Into<String>) -> Self {
        Self {
            answer: Err((code, message.into())),
            reachable: true,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed
            .lock()
            .expect("static probe lock poisoned")
            .clone()
    }
}

#[async_trait]
impl RpcProbe for StaticProbe {
    async fn chain_id(&self, rpc_url: &str) -> Result<u64> {
        self.probed
            .lock()
            .expect("static probe lock poisoned")
            .push(rpc_url.to_string());

        if !self.reachable {
            return Err(Error::NetworkUnreachable {
                url: rpc_url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        match &self.answer {
            Ok(chain_id) => Ok(*chain_id),
            Err((code, message)) => Err(Error::RpcRejected {
                url: rpc_url.to_string(),
                code: *code,
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_scripts_outcomes() {
        let runner = RecordingRunner::new().on("npm install", ScriptedOutcome::Exit(1));

        let ok = Invocation::new("npx", "/p").args(["hardhat", "compile"]);
        let bad = Invocation::new("npm", "/p").arg("install");

        assert!(runner.run(&ok).await.is_success());
        assert!(matches!(
            runner.run(&bad).await,
            RunOutcome::Failure { exit_code: Some(1) }
        ));
        assert_eq!(runner.commands(), vec!["npx hardhat compile", "npm install"]);
    }

    #[tokio::test]
    async fn test_missing_tool_until_installed() {
        let runner = RecordingRunner::new()
            .missing(Tool::CargoContract)
            .installs("cargo install cargo-contract", Tool::CargoContract);

        assert!(runner.locate(Tool::CargoContract).is_none());
        let install = Invocation::new("cargo", "/p").args(["install", "cargo-contract", "--force"]);
        runner.execute(&install).await.unwrap();
        assert!(runner.locate(Tool::CargoContract).is_some());
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let runner = RecordingRunner::new().missing(Tool::Forge);
        let err = runner
            .execute(&Invocation::new("forge", "/p").arg("build"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolchainMissing { .. }));
    }

    #[tokio::test]
    async fn test_static_probe() {
        let probe = StaticProbe::reachable(688688);
        assert_eq!(probe.chain_id("http://rpc").await.unwrap(), 688688);
        assert_eq!(probe.probed(), vec!["http://rpc"]);

        let err = StaticProbe::unreachable().chain_id("http://rpc").await.unwrap_err();
        assert!(matches!(err, Error::NetworkUnreachable { .. }));

        let err = StaticProbe::rejecting(-32601, "method not found")
            .chain_id("http://rpc")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RpcRejected { code: -32601, .. }));
    }
}
