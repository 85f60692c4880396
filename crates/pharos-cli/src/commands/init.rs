//! Initialize a new smart contract project

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use color_eyre::eyre::Result;
use console::style;
use pharos_core::{ConfigStore, ContractType, Error, Framework, Frontend, ProjectConfig, ProjectLayout};

use super::Session;
use crate::prompt::{collect_init_answers, InitPreset};
use crate::scaffold::{check_prerequisites, DirectoryTemplates, EmbeddedTemplates, Scaffolder, TemplateSource};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContractTypeArg {
    Solidity,
    Rust,
}

impl From<ContractTypeArg> for ContractType {
    fn from(arg: ContractTypeArg) -> Self {
        match arg {
            ContractTypeArg::Solidity => ContractType::SolidityEvm,
            ContractTypeArg::Rust => ContractType::RustWasm,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrameworkArg {
    Hardhat,
    Foundry,
}

impl From<FrameworkArg> for Framework {
    fn from(arg: FrameworkArg) -> Self {
        match arg {
            FrameworkArg::Hardhat => Framework::Hardhat,
            FrameworkArg::Foundry => Framework::Foundry,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrontendArg {
    React,
    Vue,
    None,
}

impl From<FrontendArg> for Frontend {
    fn from(arg: FrontendArg) -> Self {
        match arg {
            FrontendArg::React => Frontend::ReactVite,
            FrontendArg::Vue => Frontend::Vue,
            FrontendArg::None => Frontend::None,
        }
    }
}

/// Initialize a new smart contract project
#[derive(Args)]
pub struct InitCommand {
    /// Project directory name (prompted when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Contract type (prompted when omitted)
    #[arg(long, value_enum)]
    pub contract_type: Option<ContractTypeArg>,

    /// Solidity framework (prompted for Solidity projects when omitted)
    #[arg(long, value_enum)]
    pub framework: Option<FrameworkArg>,

    /// Frontend template (prompted when omitted)
    #[arg(long, value_enum)]
    pub frontend: Option<FrontendArg>,

    /// Read templates from this directory instead of the bundled set
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Clone the frontend from a git repository instead of a template
    #[arg(long, value_name = "GIT_URL")]
    pub frontend_template: Option<String>,
}

impl InitCommand {
    pub async fn run(self, session: &Session<'_>) -> Result<()> {
        println!(
            "{} Initializing a new smart contract project...",
            style("→").blue()
        );
        println!();

        let answers = collect_init_answers(session.prompter, &self.preset())?;
        let config = answers.into_config()?;
        if self.frontend_template.is_some() && config.frontend.is_none() {
            return Err(Error::validation(
                "--frontend-template needs a frontend; choose react or vue with --frontend",
            )
            .into());
        }

        let templates: Box<dyn TemplateSource> = match &self.templates {
            Some(dir) => Box::new(DirectoryTemplates::new(dir)),
            None => Box::new(EmbeddedTemplates),
        };

        initialize(
            session,
            &config,
            templates.as_ref(),
            self.frontend_template.as_deref(),
        )
        .await
    }

    fn preset(&self) -> InitPreset {
        InitPreset {
            project_name: self.name.clone(),
            contract_type: self.contract_type.map(Into::into),
            framework: self.framework.map(Into::into),
            frontend: self.frontend.map(Into::into),
        }
    }
}

/// Scaffold the project described by `config` and persist the config last.
pub async fn initialize(
    session: &Session<'_>,
    config: &ProjectConfig,
    templates: &dyn TemplateSource,
    frontend_repository: Option<&str>,
) -> Result<()> {
    let project = ProjectLayout::at(session.layout.join(&config.project_name));
    let store = ConfigStore::new(&project);

    // Check if already initialized
    if store.exists() {
        return Err(Error::ConfigExists {
            path: store.path().to_path_buf(),
        }
        .into());
    }

    if project.is_populated() {
        let proceed = session.prompter.confirm(
            &format!(
                "Directory {} already exists and is not empty. Continue?",
                project.root().display()
            ),
            false,
        )?;
        if !proceed {
            println!("{} Aborted, nothing was changed", style("ℹ").blue());
            return Ok(());
        }
    }

    check_prerequisites(session.runner, config.stack)?;

    println!(
        "{} Setting up {} project in {}",
        style("→").blue(),
        style(config.stack).cyan(),
        style(project.root().display()).cyan()
    );
    std::fs::create_dir_all(project.root())?;

    let scaffolder = Scaffolder::new(session.runner, templates);
    scaffolder
        .frontend(&project, config.frontend, frontend_repository)
        .await?;
    scaffolder.contract(&project, config.stack).await?;

    store.save(config)?;
    println!(
        "{} Configuration saved to {}",
        style("✓").green(),
        ProjectLayout::CONFIG_FILE
    );

    println!();
    println!(
        "{} Project initialized successfully!",
        style("✓").green().bold()
    );
    println!();
    println!("Next steps:");
    println!(
        "  1. {}",
        style(format!("cd {}", config.project_name)).cyan()
    );
    if config.framework().is_some() {
        println!(
            "  2. Fill in {} in {}/",
            style(".env").cyan(),
            ProjectLayout::CONTRACT_DIR
        );
    }
    println!(
        "  {}. Run {} to compile your contract",
        if config.framework().is_some() { 3 } else { 2 },
        style("configure-pharos compile").cyan()
    );

    Ok(())
}
