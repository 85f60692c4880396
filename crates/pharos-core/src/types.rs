use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

// =============================================================================
// Selection Enums
// =============================================================================

/// Smart-contract platform family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "Solidity (EVM)")]
    SolidityEvm,
    #[serde(rename = "Rust (WASM)")]
    RustWasm,
}

impl ContractType {
    pub const ALL: [ContractType; 2] = [ContractType::SolidityEvm, ContractType::RustWasm];

    pub fn label(&self) -> &'static str {
        match self {
            ContractType::SolidityEvm => "Solidity (EVM)",
            ContractType::RustWasm => "Rust (WASM)",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Solidity build/deploy toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    Hardhat,
    Foundry,
}

impl Framework {
    pub const ALL: [Framework; 2] = [Framework::Hardhat, Framework::Foundry];

    pub fn label(&self) -> &'static str {
        match self {
            Framework::Hardhat => "Hardhat",
            Framework::Foundry => "Foundry",
        }
    }

    /// Name of the template tree holding the project skeleton
    pub fn template(&self) -> &'static str {
        match self {
            Framework::Hardhat => "solidity/hardhat",
            Framework::Foundry => "solidity/foundry",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional frontend scaffolded next to the contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frontend {
    #[serde(rename = "React (Vite)")]
    ReactVite,
    #[serde(rename = "Vue.js")]
    Vue,
    #[default]
    None,
}

impl Frontend {
    pub const ALL: [Frontend; 3] = [Frontend::ReactVite, Frontend::Vue, Frontend::None];

    pub fn label(&self) -> &'static str {
        match self {
            Frontend::ReactVite => "React (Vite)",
            Frontend::Vue => "Vue.js",
            Frontend::None => "None",
        }
    }

    pub fn template(&self) -> Option<&'static str> {
        match self {
            Frontend::ReactVite => Some("frontend/react-vite"),
            Frontend::Vue => Some("frontend/vue"),
            Frontend::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Frontend::None)
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Project Configuration
// =============================================================================

/// Contract stack: the framework exists only for Solidity projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stack {
    Solidity(Framework),
    Rust,
}

impl Stack {
    pub fn contract_type(&self) -> ContractType {
        match self {
            Stack::Solidity(_) => ContractType::SolidityEvm,
            Stack::Rust => ContractType::RustWasm,
        }
    }

    pub fn framework(&self) -> Option<Framework> {
        match self {
            Stack::Solidity(framework) => Some(*framework),
            Stack::Rust => None,
        }
    }

    /// Every valid contract type / framework combination
    pub fn all() -> [Stack; 3] {
        [
            Stack::Solidity(Framework::Hardhat),
            Stack::Solidity(Framework::Foundry),
            Stack::Rust,
        ]
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stack::Solidity(framework) => write!(f, "{} using {}", self.contract_type(), framework),
            Stack::Rust => write!(f, "{}", self.contract_type()),
        }
    }
}

/// The `pharos-config.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProjectConfig", into = "RawProjectConfig")]
pub struct ProjectConfig {
    pub project_name: String,
    pub stack: Stack,
    pub frontend: Frontend,
}

impl ProjectConfig {
    pub fn contract_type(&self) -> ContractType {
        self.stack.contract_type()
    }

    pub fn framework(&self) -> Option<Framework> {
        self.stack.framework()
    }
}

/// On-disk shape of the config document
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProjectConfig {
    #[serde(default)]
    project_name: String,
    contract_type: ContractType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    framework: Option<Framework>,
    #[serde(default)]
    frontend: Frontend,
}

impl TryFrom<RawProjectConfig> for ProjectConfig {
    type Error = Error;

    fn try_from(raw: RawProjectConfig) -> Result<Self> {
        let stack = stack_from_parts(raw.contract_type, raw.framework)?;
        Ok(ProjectConfig {
            project_name: raw.project_name,
            stack,
            frontend: raw.frontend,
        })
    }
}

impl From<ProjectConfig> for RawProjectConfig {
    fn from(config: ProjectConfig) -> Self {
        RawProjectConfig {
            project_name: config.project_name,
            contract_type: config.stack.contract_type(),
            framework: config.stack.framework(),
            frontend: config.frontend,
        }
    }
}

fn stack_from_parts(contract_type: ContractType, framework: Option<Framework>) -> Result<Stack> {
    match (contract_type, framework) {
        (ContractType::SolidityEvm, Some(framework)) => Ok(Stack::Solidity(framework)),
        (ContractType::SolidityEvm, None) => Err(Error::UnsupportedSelection(format!(
            "{} requires a framework (Hardhat or Foundry)",
            contract_type
        ))),
        (ContractType::RustWasm, None) => Ok(Stack::Rust),
        (ContractType::RustWasm, Some(framework)) => Err(Error::UnsupportedSelection(format!(
            "framework {} cannot be combined with {}",
            framework, contract_type
        ))),
    }
}

// =============================================================================
// Init Answers
// =============================================================================

/// Answers collected by the init prompt flow, validated as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAnswers {
    pub project_name: String,
    pub contract_type: ContractType,
    pub framework: Option<Framework>,
    pub frontend: Frontend,
}

impl InitAnswers {
    pub fn into_config(self) -> Result<ProjectConfig> {
        let project_name = validate_project_name(&self.project_name)?;
        let stack = stack_from_parts(self.contract_type, self.framework)?;
        Ok(ProjectConfig {
            project_name,
            stack,
            frontend: self.frontend,
        })
    }
}

/// Trim and check a directory name for the new project
pub fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("directory name cannot be empty"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::validation(format!(
            "'{}' is not a valid directory name",
            name
        )));
    }
    Ok(name.to_string())
}
