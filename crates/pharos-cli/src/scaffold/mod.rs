//! Project skeleton materialization
//!
//! The [`Scaffolder`] copies the template tree for a stack into the project,
//! runs the stack's package manager once and writes the `.env` placeholder.
//! Directories created before a failing step are left in place.

mod templates;

use std::path::Path;

use color_eyre::eyre::Result;
use console::style;
use pharos_core::{Error, Framework, Frontend, ProjectLayout, Stack};
use pharos_toolchain::{Invocation, Tool, ToolchainRunner};

use crate::env_file::{ensure_gitignored, write_env_template, ENV_FILE};

pub use templates::{copy_checkout, DirectoryTemplates, EmbeddedTemplates, TemplateSource};

const RUST_TEMPLATE: &str = "rust/lib.rs";
const FORGE_STD: &str = "foundry-rs/forge-std";

/// Check that the binaries a stack needs during scaffolding are installed
pub fn check_prerequisites(runner: &dyn ToolchainRunner, stack: Stack) -> Result<()> {
    let tools: &[Tool] = match stack {
        Stack::Solidity(Framework::Hardhat) => &[Tool::Node, Tool::Npm],
        Stack::Solidity(Framework::Foundry) => &[Tool::Forge, Tool::Git],
        Stack::Rust => &[Tool::Cargo],
    };
    for tool in tools {
        runner.require(*tool)?;
    }
    Ok(())
}

/// Materializes contract and frontend skeletons
pub struct Scaffolder<'a> {
    runner: &'a dyn ToolchainRunner,
    templates: &'a dyn TemplateSource,
}

impl<'a> Scaffolder<'a> {
    pub fn new(runner: &'a dyn ToolchainRunner, templates: &'a dyn TemplateSource) -> Self {
        Self { runner, templates }
    }

    /// Scaffold the smart-contract directory for `stack`
    pub async fn contract(&self, project: &ProjectLayout, stack: Stack) -> Result<()> {
        match stack {
            Stack::Solidity(framework) => self.solidity(project, framework).await,
            Stack::Rust => self.rust(project).await,
        }
    }

    async fn solidity(&self, project: &ProjectLayout, framework: Framework) -> Result<()> {
        let contract_dir = project.contract_dir();
        std::fs::create_dir_all(&contract_dir)?;

        let copied = self.templates.copy_tree(framework.template(), &contract_dir)?;
        println!(
            "{} {} template copied ({} files)",
            style("✓").green(),
            framework,
            copied
        );

        println!(
            "{} Installing {} dependencies...",
            style("→").blue(),
            framework
        );
        match framework {
            Framework::Hardhat => {
                let install = Invocation::new(Tool::Npm.program(), &contract_dir).arg("install");
                self.runner.execute(&install).await?;
            }
            Framework::Foundry => {
                if !has_git_repository(project.root(), &contract_dir) {
                    let git_init = Invocation::new(Tool::Git.program(), &contract_dir).arg("init");
                    self.runner.execute(&git_init).await?;
                }
                let install = Invocation::new(Tool::Forge.program(), &contract_dir)
                    .args(["install", FORGE_STD]);
                self.runner.execute(&install).await?;
            }
        }

        write_env_template(&contract_dir)?;
        ensure_gitignored(&contract_dir, ENV_FILE)?;

        println!(
            "{} {} setup completed",
            style("✓").green(),
            framework
        );
        Ok(())
    }

    async fn rust(&self, project: &ProjectLayout) -> Result<()> {
        let contract_dir = project.contract_dir();
        let src_dir = contract_dir.join("src");
        std::fs::create_dir_all(&src_dir)?;

        self.templates
            .copy_file(RUST_TEMPLATE, &src_dir.join("lib.rs"))?;
        println!("{} Rust contract template copied", style("✓").green());

        let cargo_init = Invocation::new(Tool::Cargo.program(), &contract_dir).args(["init", "--lib"]);
        self.runner.execute(&cargo_init).await?;

        println!("{} Rust project configured", style("✓").green());
        Ok(())
    }

    /// Scaffold `frontend/` from a bundled template or a git repository.
    ///
    /// A missing bundled template only produces a warning.
    pub async fn frontend(
        &self,
        project: &ProjectLayout,
        frontend: Frontend,
        repository: Option<&str>,
    ) -> Result<()> {
        let Some(template) = frontend.template() else {
            return Ok(());
        };

        println!(
            "{} Setting up {} frontend...",
            style("→").blue(),
            frontend
        );

        if let Some(url) = repository {
            return self.frontend_from_git(project, url).await;
        }

        if !self.templates.has(template) {
            println!(
                "{} {} template not found, skipping frontend",
                style("⚠").yellow(),
                frontend
            );
            return Ok(());
        }

        let copied = self.templates.copy_tree(template, &project.frontend_dir())?;
        println!(
            "{} {} template copied ({} files)",
            style("✓").green(),
            frontend,
            copied
        );
        Ok(())
    }

    /// Clone `url` into a temporary checkout inside the project and copy it to
    /// `frontend/`. The checkout is removed whether or not the copy succeeds.
    async fn frontend_from_git(&self, project: &ProjectLayout, url: &str) -> Result<()> {
        let checkout = tempfile::Builder::new()
            .prefix(TEMP_CHECKOUT_PREFIX)
            .tempdir_in(project.root())
            .map_err(Error::from)?;

        let clone = Invocation::new(Tool::Git.program(), project.root())
            .args(["clone", "--depth", "1", url])
            .arg(checkout.path().to_string_lossy());
        self.runner.execute(&clone).await?;

        copy_checkout(checkout.path(), &project.frontend_dir())?;
        checkout.close().map_err(Error::from)?;

        println!(
            "{} Frontend cloned from {}",
            style("✓").green(),
            style(url).cyan()
        );
        Ok(())
    }
}

/// Prefix of the temporary directory a frontend repository is cloned into
pub const TEMP_CHECKOUT_PREFIX: &str = ".pharos-template-";

fn has_git_repository(project_root: &Path, contract_dir: &Path) -> bool {
    contract_dir.join(".git").exists() || project_root.join(".git").exists()
}
