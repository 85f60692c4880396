//! CLI commands for configure-pharos

use std::path::{Path, PathBuf};

use clap::Subcommand;
use color_eyre::eyre::{eyre, Result};
use pharos_core::{ConfigStore, ProjectConfig, ProjectLayout};
use pharos_toolchain::{RpcProbe, ToolchainRunner};

use crate::prompt::Prompter;

pub mod compile;
pub mod deploy;
pub mod init;

/// Collaborators shared by every command
pub struct Session<'a> {
    pub layout: ProjectLayout,
    pub runner: &'a dyn ToolchainRunner,
    pub probe: &'a dyn RpcProbe,
    pub prompter: &'a dyn Prompter,
}

impl Session<'_> {
    /// Load the project configuration, failing fast when init has not run
    pub fn load_config(&self) -> Result<ProjectConfig> {
        Ok(ConfigStore::new(&self.layout).load()?)
    }

    pub fn contract_dir(&self) -> Result<PathBuf> {
        self.layout.find_contract_dir().ok_or_else(|| {
            eyre!(
                "Could not find contract directory in {}. Expected either '{}' or '{}'.",
                self.layout.root().display(),
                ProjectLayout::CONTRACT_DIR,
                ProjectLayout::LEGACY_CONTRACT_DIR
            )
        })
    }
}

/// Output directories `cargo contract build` may have produced
const WASM_ARTIFACT_DIRS: [&str; 2] = ["target/ink", "target/wasm32-unknown-unknown/release"];

/// Fail unless a Rust contract has been compiled
pub(crate) fn require_wasm_build(contract_dir: &Path) -> Result<PathBuf> {
    WASM_ARTIFACT_DIRS
        .iter()
        .map(|dir| contract_dir.join(dir))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| eyre!("Rust contract not compiled. Run `configure-pharos compile` first."))
}

/// All available CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new smart contract project
    Init(init::InitCommand),

    /// Compile the smart contract
    Compile(compile::CompileCommand),

    /// Deploy the smart contract
    Deploy(deploy::DeployCommand),

    /// Run the smart contract tests
    Test(test::TestCommand),
}

impl Command {
    /// Execute the command
    pub async fn run(self, session: &Session<'_>) -> Result<()> {
        match self {
            Command::Init(cmd) => cmd.run(session).await,
            Command::Compile(cmd) => cmd.run(session).await,
            Command::Deploy(cmd) => cmd.run(session).await,
            Command::Test(cmd) => cmd.run(session).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    use pharos_core::{ConfigStore, Frontend, ProjectConfig, ProjectLayout, Stack};
    use pharos_toolchain::{RecordingRunner, StaticProbe};

    use super::Session;
    use crate::prompt::testing::ScriptedPrompter;

    pub fn session<'a>(
        root: &Path,
        runner: &'a RecordingRunner,
        probe: &'a StaticProbe,
        prompter: &'a ScriptedPrompter,
    ) -> Session<'a> {
        Session {
            layout: ProjectLayout::at(root),
            runner,
            probe,
            prompter,
        }
    }

    /// Write a config document and an empty contract directory
    pub fn project(root: &Path, stack: Stack) {
        let layout = ProjectLayout::at(root);
        ConfigStore::new(&layout)
            .save(&ProjectConfig {
                project_name: "demo".to_string(),
                stack,
                frontend: Frontend::None,
            })
            .unwrap();
        std::fs::create_dir_all(layout.contract_dir()).unwrap();
    }

    pub fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }
}
