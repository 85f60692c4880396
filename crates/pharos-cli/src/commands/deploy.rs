//! Deploy the project's smart contract

use std::path::Path;
use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use clap::Args;
use color_eyre::eyre::Result;
use console::style;
use pharos_core::{normalize_private_key, DeploymentRequest, Error, Framework, Stack};
use pharos_toolchain::{Invocation, Tool, DEPLOY_TIMEOUT};
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{require_wasm_build, Session};
use crate::env_file::{read_env_var, DEFAULT_RPC_URL};

const IGNITION_MODULE: &str = "ignition/modules/Contract.ts";
const DEFAULT_FOUNDRY_CONTRACT: &str = "src/Counter.sol:Counter";
const DEFAULT_NODE_URL: &str = "ws://127.0.0.1:9944";
const RUST_CONSTRUCTOR: &str = "new";
/// Network in the bundled hardhat.config that reads `RPC_URL`
const PHAROS_NETWORK: &str = "pharos";

/// Deploy the smart contract
#[derive(Args)]
pub struct DeployCommand {
    /// Hardhat network name
    #[arg(long, default_value = PHAROS_NETWORK)]
    pub network: String,

    /// RPC or node endpoint (prompted for Foundry and Rust when omitted; for
    /// Hardhat only with the `pharos` network)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Contract to deploy: a Foundry `path:Name` or a Hardhat ignition module
    #[arg(long)]
    pub contract: Option<String>,

    /// Hardhat ignition deployment id
    #[arg(long)]
    pub deployment_id: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Seconds to wait for the deployment before giving up
    #[arg(long, value_name = "SECS", default_value_t = DEPLOY_TIMEOUT.as_secs())]
    pub timeout: u64,
}

impl DeployCommand {
    pub async fn run(self, session: &Session<'_>) -> Result<()> {
        let config = session.load_config()?;
        let contract_dir = session.contract_dir()?;

        match config.stack {
            Stack::Solidity(Framework::Hardhat) => self.hardhat(session, &contract_dir).await,
            Stack::Solidity(Framework::Foundry) => self.foundry(session, &contract_dir).await,
            Stack::Rust => self.rust(session, &contract_dir).await,
        }
    }

    fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    // =========================================================================
    // Hardhat
    // =========================================================================

    /// Keys come from the project's `.env` through hardhat.config, so nothing
    /// secret is prompted here. Only the bundled `pharos` network reads
    /// `RPC_URL`; any other network name resolves inside hardhat.config and
    /// is deployed to unchecked.
    async fn hardhat(&self, session: &Session<'_>, contract_dir: &Path) -> Result<()> {
        let rpc_url = if self.network == PHAROS_NETWORK {
            Some(
                self.rpc_url
                    .clone()
                    .or_else(|| read_env_var(contract_dir, "RPC_URL"))
                    .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            )
        } else if self.rpc_url.is_some() {
            return Err(Error::validation(format!(
                "--rpc-url only applies to the '{}' network; set the URL for '{}' in hardhat.config.ts",
                PHAROS_NETWORK, self.network
            ))
            .into());
        } else {
            None
        };

        session.runner.require(Tool::Npx)?;
        if let Some(url) = &rpc_url {
            check_network(session, url).await?;
        }

        let module = self.contract.as_deref().unwrap_or(IGNITION_MODULE);
        let endpoint = rpc_url.clone().unwrap_or_else(|| self.network.clone());
        let request = DeploymentRequest::new(endpoint, module)
            .with_deployment_id(self.deployment_id.clone());
        debug!(?request, "hardhat deployment request");

        println!(
            "{} Deploying {} with Hardhat Ignition to {}...",
            style("→").blue(),
            style(&request.target).cyan(),
            style(&self.network).cyan()
        );

        let mut deploy = Invocation::new(Tool::Npx.program(), contract_dir).args([
            "hardhat",
            "ignition",
            "deploy",
            request.target.as_str(),
            "--network",
            self.network.as_str(),
        ]);
        if let Some(id) = &request.deployment_id {
            deploy = deploy.args(["--deployment-id", id.as_str()]);
        }
        if let Some(url) = rpc_url {
            deploy = deploy.env("RPC_URL", url);
        }
        session
            .runner
            .execute(&deploy.timeout(self.deadline()).with_progress())
            .await?;

        deployed();
        Ok(())
    }

    // =========================================================================
    // Foundry
    // =========================================================================

    async fn foundry(&self, session: &Session<'_>, contract_dir: &Path) -> Result<()> {
        session.runner.require(Tool::Forge)?;

        let rpc_url = match &self.rpc_url {
            Some(url) => url.clone(),
            None => {
                let default = read_env_var(contract_dir, "RPC_URL")
                    .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
                session.prompter.input("Enter RPC URL", Some(&default))?
            }
        };
        if rpc_url.trim().is_empty() {
            return Err(Error::validation("RPC URL cannot be empty").into());
        }

        let private_key = session
            .prompter
            .secret("Enter private key (with or without 0x prefix)")?;
        let private_key = normalize_private_key(&private_key);
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| Error::validation(format!("Invalid private key: {}", e)))?;

        let contract = match &self.contract {
            Some(contract) => contract.clone(),
            None => session
                .prompter
                .input("Enter contract path", Some(DEFAULT_FOUNDRY_CONTRACT))?,
        };
        let constructor_args = prompt_constructor_args(session)?;

        let mut request = DeploymentRequest::new(rpc_url.trim(), contract)
            .with_secret(private_key)
            .with_constructor_args(constructor_args);
        debug!(?request, "foundry deployment request");

        println!();
        println!("  Contract: {}", style(&request.target).cyan());
        println!("  RPC URL:  {}", style(&request.endpoint).cyan());
        println!("  Deployer: {}", style(format!("{:?}", signer.address())).cyan());
        request.confirmed = self.confirm(session)?;
        if !request.confirmed {
            cancelled();
            return Ok(());
        }

        check_network(session, &request.endpoint).await?;

        println!("{} Deploying with forge create...", style("→").blue());
        let mut deploy = Invocation::new(Tool::Forge.program(), contract_dir)
            .args(["create", request.target.as_str(), "--rpc-url", request.endpoint.as_str()]);
        if let Some(key) = &request.secret {
            deploy = deploy.arg("--private-key").secret_arg(key.clone());
        }
        deploy = deploy.arg("--broadcast");
        if !request.constructor_args.is_empty() {
            deploy = deploy
                .arg("--constructor-args")
                .args(request.constructor_args.iter().map(String::as_str));
        }
        session
            .runner
            .execute(&deploy.timeout(self.deadline()).with_progress())
            .await?;

        deployed();
        Ok(())
    }

    // =========================================================================
    // Rust / ink!
    // =========================================================================

    async fn rust(&self, session: &Session<'_>, contract_dir: &Path) -> Result<()> {
        let artifacts = require_wasm_build(contract_dir)?;
        info!(artifacts = %artifacts.display(), "found contract build");
        session.runner.require(Tool::Cargo)?;
        session.runner.require(Tool::CargoContract)?;

        let node_url = match &self.rpc_url {
            Some(url) => url.clone(),
            None => session
                .prompter
                .input("Enter node URL", Some(DEFAULT_NODE_URL))?,
        };
        let suri: Zeroizing<String> = session
            .prompter
            .secret("Enter secret URI of the deploying account (e.g. //Alice)")?;
        if suri.trim().is_empty() {
            return Err(Error::validation("Secret URI cannot be empty").into());
        }
        let constructor_args = prompt_constructor_args(session)?;

        let mut request = DeploymentRequest::new(node_url.trim(), RUST_CONSTRUCTOR)
            .with_secret(suri)
            .with_constructor_args(constructor_args);
        debug!(?request, "ink! deployment request");

        println!();
        println!("  Constructor: {}", style(&request.target).cyan());
        println!("  Node URL:    {}", style(&request.endpoint).cyan());
        request.confirmed = self.confirm(session)?;
        if !request.confirmed {
            cancelled();
            return Ok(());
        }

        println!("{} Instantiating contract with cargo contract...", style("→").blue());
        let mut deploy = Invocation::new(Tool::Cargo.program(), contract_dir)
            .args(["contract", "instantiate", "--constructor", request.target.as_str()]);
        if !request.constructor_args.is_empty() {
            deploy = deploy
                .arg("--args")
                .args(request.constructor_args.iter().map(String::as_str));
        }
        if let Some(suri) = &request.secret {
            deploy = deploy.arg("--suri").secret_arg(suri.clone());
        }
        let deploy = deploy.args(["--url", request.endpoint.as_str(), "--execute", "--skip-confirm"]);
        session
            .runner
            .execute(&deploy.timeout(self.deadline()).with_progress())
            .await?;

        deployed();
        Ok(())
    }

    fn confirm(&self, session: &Session<'_>) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }
        session.prompter.confirm("Proceed with deployment?", true)
    }
}

async fn check_network(session: &Session<'_>, rpc_url: &str) -> Result<()> {
    println!(
        "{} Connecting to {}...",
        style("→").blue(),
        style(rpc_url).cyan()
    );
    let chain_id = session.probe.chain_id(rpc_url).await?;
    println!(
        "{} Network reachable (chain ID: {})",
        style("✓").green(),
        chain_id
    );
    Ok(())
}

/// Ask for constructor arguments and split them like a shell would
fn prompt_constructor_args(session: &Session<'_>) -> Result<Vec<String>> {
    let raw = session
        .prompter
        .input("Enter constructor arguments (space separated, blank for none)", None)?;
    split_args(&raw)
}

fn split_args(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    shlex::split(raw)
        .ok_or_else(|| Error::validation(format!("Could not parse constructor arguments: {}", raw)).into())
}

fn deployed() {
    println!();
    println!("{} Deployment complete!", style("✓").green().bold());
}

fn cancelled() {
    println!("{} Deployment cancelled", style("ℹ").blue());
}
