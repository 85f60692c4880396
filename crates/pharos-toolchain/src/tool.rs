use std::fmt;

use pharos_core::Error;

/// External binaries configure-pharos depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Node,
    Npm,
    Npx,
    Forge,
    Git,
    Cargo,
    CargoContract,
}

impl Tool {
    /// Executable name looked up on PATH
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Node => "node",
            Tool::Npm => "npm",
            Tool::Npx => "npx",
            Tool::Forge => "forge",
            Tool::Git => "git",
            Tool::Cargo => "cargo",
            Tool::CargoContract => "cargo-contract",
        }
    }

    pub fn from_program(program: &str) -> Option<Tool> {
        [
            Tool::Node,
            Tool::Npm,
            Tool::Npx,
            Tool::Forge,
            Tool::Git,
            Tool::Cargo,
            Tool::CargoContract,
        ]
        .into_iter()
        .find(|tool| tool.program() == program)
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::Node | Tool::Npm | Tool::Npx => {
                "Node.js and npm are required for Hardhat. Install them from https://nodejs.org/"
            }
            Tool::Forge => {
                "Foundry is required. Install it with:\n  \
                 Linux/macOS: curl -L https://foundry.paradigm.xyz | bash && foundryup\n  \
                 Windows (PowerShell): iex (irm https://foundry.paradigm.xyz); foundryup\n\
                 Then restart your terminal and verify with `forge --version`."
            }
            Tool::Git => "Git is required. Install it from https://git-scm.com/downloads",
            Tool::Cargo => "The Rust toolchain is required. Install it from https://rustup.rs/",
            Tool::CargoContract => {
                "cargo-contract is required. Install it with `cargo install cargo-contract --force`"
            }
        }
    }

    /// The `ToolchainMissing` error for this tool
    pub fn missing(&self) -> Error {
        Error::ToolchainMissing {
            tool: self.program().to_string(),
            hint: self.install_hint().to_string(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}
