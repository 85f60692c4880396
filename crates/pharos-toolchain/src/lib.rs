//! External toolchain invocation
//!
//! Every subprocess configure-pharos starts goes through a
//! [`ToolchainRunner`], which owns output streaming, timeouts, the progress
//! ticker and exit-status classification.
//!
//! # Implementations
//!
//! - [`ProcessRunner`] - Spawns real processes with inherited stdio
//! - [`RecordingRunner`] - Records command lines and returns scripted outcomes
//! - [`HttpProbe`] / [`StaticProbe`] - chain ID reachability checks

mod fake;
mod invocation;
mod probe;
mod runner;
mod tool;

pub use fake::{RecordedCall, RecordingRunner, ScriptedOutcome, StaticProbe};
pub use invocation::Invocation;
pub use probe::{HttpProbe, RpcProbe};
pub use runner::{ProcessRunner, RunOutcome, ToolchainRunner, DEPLOY_TIMEOUT, PROGRESS_TICK};
pub use tool::Tool;
