//! Compile the project's smart contract with its stack's toolchain

use std::path::Path;

use clap::Args;
use color_eyre::eyre::{eyre, Result, WrapErr};
use console::style;
use pharos_core::{Framework, Stack};
use pharos_toolchain::{Invocation, Tool, ToolchainRunner};
use tracing::debug;

use super::Session;

/// Compile the smart contract
#[derive(Args)]
pub struct CompileCommand {}

impl CompileCommand {
    pub async fn run(self, session: &Session<'_>) -> Result<()> {
        let config = session.load_config()?;
        let contract_dir = session.contract_dir()?;

        println!(
            "{} Compiling {} contract...",
            style("→").blue(),
            style(config.stack).cyan()
        );

        match config.stack {
            Stack::Solidity(Framework::Hardhat) => {
                session.runner.require(Tool::Npx)?;
                let compile = Invocation::new(Tool::Npx.program(), &contract_dir)
                    .args(["hardhat", "compile"]);
                session.runner.execute(&compile).await?;
            }
            Stack::Solidity(Framework::Foundry) => {
                session.runner.require(Tool::Forge)?;
                let build = Invocation::new(Tool::Forge.program(), &contract_dir).arg("build");
                session.runner.execute(&build).await?;
            }
            Stack::Rust => compile_rust(session.runner, &contract_dir).await?,
        }

        println!();
        println!("{} Compilation complete!", style("✓").green().bold());
        if config.stack == Stack::Rust {
            println!(
                "{} Your .wasm file is in the target/ink/ directory",
                style("ℹ").blue()
            );
        }
        Ok(())
    }
}

// =============================================================================
// Rust / ink!
// =============================================================================

/// A crate an ink! contract needs, added with `cargo add` when absent
struct RequiredDependency {
    /// Key in `[dependencies]`
    name: &'static str,
    /// Crate on crates.io when it differs from `name`
    package: Option<&'static str>,
    version: &'static str,
    features: Option<&'static str>,
}

impl RequiredDependency {
    fn cargo_add(&self, contract_dir: &Path) -> Invocation {
        let spec = format!("{}@{}", self.package.unwrap_or(self.name), self.version);
        let mut add = Invocation::new(Tool::Cargo.program(), contract_dir)
            .args(["add", spec.as_str(), "--no-default-features"]);
        if let Some(features) = self.features {
            add = add.args(["--features", features]);
        }
        if self.package.is_some() {
            add = add.args(["--rename", self.name]);
        }
        add
    }
}

const INK_DEPENDENCIES: [RequiredDependency; 3] = [
    RequiredDependency {
        name: "ink",
        package: None,
        version: "4.2.0",
        features: None,
    },
    RequiredDependency {
        name: "scale",
        package: Some("parity-scale-codec"),
        version: "3",
        features: Some("derive"),
    },
    RequiredDependency {
        name: "scale-info",
        package: None,
        version: "2.6",
        features: Some("derive"),
    },
];

async fn compile_rust(runner: &dyn ToolchainRunner, contract_dir: &Path) -> Result<()> {
    let manifest = contract_dir.join("Cargo.toml");
    if !manifest.is_file() {
        return Err(eyre!(
            "Cargo.toml not found in {}. Please ensure you have a valid Rust contract setup.",
            contract_dir.display()
        ));
    }

    runner.require(Tool::Cargo)?;
    ensure_cargo_contract(runner, contract_dir).await?;

    println!("{} Checking dependencies...", style("→").blue());
    let declared = declared_dependencies(&manifest)?;
    for dependency in INK_DEPENDENCIES.iter() {
        if declared.iter().any(|name| name == dependency.name) {
            debug!(dependency = dependency.name, "dependency already declared");
            continue;
        }
        println!(
            "{} Adding missing dependency: {}@{}",
            style("⚠").yellow(),
            dependency.name,
            dependency.version
        );
        runner
            .execute(&dependency.cargo_add(contract_dir))
            .await
            .wrap_err_with(|| format!("Failed to add dependency: {}", dependency.name))?;
    }

    println!("{} Building contract...", style("→").blue());
    let build = Invocation::new(Tool::Cargo.program(), contract_dir).args(["contract", "build"]);
    if let Err(err) = runner.execute(&build).await {
        println!();
        println!("{} Try running these commands manually:", style("ℹ").blue());
        println!("  cd {}", contract_dir.display());
        println!("  cargo contract build");
        return Err(err.into());
    }
    Ok(())
}

/// Install cargo-contract once when it is not on PATH.
async fn ensure_cargo_contract(runner: &dyn ToolchainRunner, contract_dir: &Path) -> Result<()> {
    if runner.locate(Tool::CargoContract).is_some() {
        return Ok(());
    }

    println!("{} Installing cargo-contract...", style("→").blue());
    let install = Invocation::new(Tool::Cargo.program(), contract_dir)
        .args(["install", "cargo-contract", "--force"]);
    runner
        .execute(&install)
        .await
        .wrap_err("Failed to install cargo-contract")?;

    runner.require(Tool::CargoContract)?;
    Ok(())
}

/// Keys of the manifest's `[dependencies]` table
fn declared_dependencies(manifest: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(manifest)?;
    let document: toml::Table = toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse {}", manifest.display()))?;

    Ok(document
        .get("dependencies")
        .and_then(|deps| deps.as_table())
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{project, session, touch};
    use crate::prompt::testing::ScriptedPrompter;
    use pharos_core::{Error, ProjectLayout};
    use pharos_toolchain::{RecordingRunner, ScriptedOutcome, StaticProbe};

    const INK_MANIFEST: &str = r#"[package]
name = "flipper"
version = "0.1.0"

[dependencies]
ink = { version = "4.2.0", default-features = false }
scale = { package = "parity-scale-codec", version = "3", default-features = false }
scale-info = { version = "2.6", default-features = false }
"#;

    fn rust_project(root: &Path, manifest: &str) {
        project(root, Stack::Rust);
        std::fs::write(root.join("smart-contract/Cargo.toml"), manifest).unwrap();
    }

    #[tokio::test]
    async fn test_missing_config_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::new();
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ConfigMissing { .. })
        ));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_missing_contract_dir() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path(), Stack::Solidity(Framework::Foundry));
        std::fs::remove_dir(dir.path().join(ProjectLayout::CONTRACT_DIR)).unwrap();
        let runner = RecordingRunner::new();
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Could not find contract directory"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_legacy_contract_dir() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path(), Stack::Solidity(Framework::Foundry));
        std::fs::rename(
            dir.path().join(ProjectLayout::CONTRACT_DIR),
            dir.path().join(ProjectLayout::LEGACY_CONTRACT_DIR),
        )
        .unwrap();
        let runner = RecordingRunner::new();
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].command, "forge build");
        assert_eq!(calls[0].cwd, dir.path().join(ProjectLayout::LEGACY_CONTRACT_DIR));
    }

    #[tokio::test]
    async fn test_build_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path(), Stack::Solidity(Framework::Hardhat));
        let runner = RecordingRunner::new().on("npx hardhat compile", ScriptedOutcome::Exit(2));
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SubprocessFailure {
                exit_code: Some(2),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_rust_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        project(dir.path(), Stack::Rust);
        let runner = RecordingRunner::new();
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Cargo.toml not found"));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_rust_adds_missing_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        rust_project(
            dir.path(),
            "[package]\nname = \"flipper\"\nversion = \"0.1.0\"\n\n[dependencies]\nink = \"4.2.0\"\n",
        );
        let runner = RecordingRunner::new();
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec![
                "cargo add parity-scale-codec@3 --no-default-features --features derive --rename scale",
                "cargo add scale-info@2.6 --no-default-features --features derive",
                "cargo contract build",
            ]
        );
    }

    #[tokio::test]
    async fn test_rust_installs_cargo_contract_once() {
        let dir = tempfile::tempdir().unwrap();
        rust_project(dir.path(), INK_MANIFEST);
        let runner = RecordingRunner::new()
            .missing(Tool::CargoContract)
            .installs("cargo install cargo-contract", Tool::CargoContract);
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec!["cargo install cargo-contract --force", "cargo contract build"]
        );
        let calls = runner.calls();
        assert_eq!(calls[0].cwd, dir.path().join("smart-contract"));
        assert_eq!(calls[0].cwd, calls[1].cwd);
    }

    #[tokio::test]
    async fn test_rust_failed_install_stops_before_build() {
        let dir = tempfile::tempdir().unwrap();
        rust_project(dir.path(), INK_MANIFEST);
        let runner = RecordingRunner::new()
            .missing(Tool::CargoContract)
            .on("cargo install", ScriptedOutcome::Exit(101));
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to install cargo-contract"));
        assert_eq!(runner.commands(), vec!["cargo install cargo-contract --force"]);
    }

    #[tokio::test]
    async fn test_rust_install_that_does_not_provide_binary() {
        let dir = tempfile::tempdir().unwrap();
        rust_project(dir.path(), INK_MANIFEST);
        let runner = RecordingRunner::new().missing(Tool::CargoContract);
        let probe = StaticProbe::reachable(1);
        let prompter = ScriptedPrompter::default();

        let err = CompileCommand {}
            .run(&session(dir.path(), &runner, &probe, &prompter))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ToolchainMissing { .. })
        ));
        assert_eq!(runner.commands().len(), 1);
    }

    #[test]
    fn test_declared_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Cargo.toml");
        touch(&manifest);
        assert!(declared_dependencies(&manifest).unwrap().is_empty());

        std::fs::write(&manifest, INK_MANIFEST).unwrap();
        assert_eq!(
            declared_dependencies(&manifest).unwrap(),
            vec!["ink", "scale", "scale-info"]
        );

        std::fs::write(&manifest, "[dependencies\n").unwrap();
        assert!(declared_dependencies(&manifest).is_err());
    }
}
