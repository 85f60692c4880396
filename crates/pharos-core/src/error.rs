use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No Pharos project found at {}. Run `configure-pharos init` first.", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Project is already initialized ({} exists)", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("Invalid project configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Unsupported selection: {0}")]
    UnsupportedSelection(String),

    #[error("{tool} is not installed or not on PATH.\n{hint}")]
    ToolchainMissing { tool: String, hint: String },

    #[error("`{command}` failed{}", exit_suffix(.exit_code))]
    SubprocessFailure {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("`{command}` timed out after {}s and was terminated", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("Network unreachable at {url}: {reason}")]
    NetworkUnreachable { url: String, reason: String },

    #[error("RPC endpoint {url} rejected the request ({code}): {message}")]
    RpcRejected {
        url: String,
        code: i64,
        message: String,
    },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_points_at_init() {
        let err = Error::ConfigMissing {
            path: PathBuf::from("demo/pharos-config.json"),
        };
        let message = err.to_string();
        assert!(message.contains("demo/pharos-config.json"));
        assert!(message.contains("configure-pharos init"));
    }

    #[test]
    fn test_subprocess_failure_message() {
        let err = Error::SubprocessFailure {
            command: "forge build".to_string(),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "`forge build` failed with exit code 1");

        let err = Error::SubprocessFailure {
            command: "forge build".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout {
            command: "forge create".to_string(),
            after: Duration::from_secs(1800),
        };
        assert!(err.to_string().contains("1800s"));
    }
}
