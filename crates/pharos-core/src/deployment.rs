//! Per-invocation deployment parameters
//!
//! A [`DeploymentRequest`] is assembled from prompts for one `deploy` run and
//! dropped when it ends. The signing secret is zeroed on drop and never shows
//! up in `Debug` output.

use std::fmt;

use zeroize::Zeroizing;

/// Everything a single deployment needs
#[derive(Clone)]
pub struct DeploymentRequest {
    /// JSON-RPC (EVM) or node (WASM) endpoint
    pub endpoint: String,
    /// Private key or secret URI used to sign; `None` when the toolchain
    /// signs from its own configuration
    pub secret: Option<Zeroizing<String>>,
    /// Contract path (`src/Counter.sol:Counter`), ignition module or
    /// constructor name
    pub target: String,
    pub constructor_args: Vec<String>,
    pub deployment_id: Option<String>,
    pub confirmed: bool,
}

impl DeploymentRequest {
    pub fn new(endpoint: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret: None,
            target: target.into(),
            constructor_args: Vec::new(),
            deployment_id: None,
            confirmed: false,
        }
    }

    pub fn with_secret(mut self, secret: Zeroizing<String>) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn with_constructor_args(mut self, args: Vec<String>) -> Self {
        self.constructor_args = args;
        self
    }

    pub fn with_deployment_id(mut self, id: Option<String>) -> Self {
        self.deployment_id = id;
        self
    }
}

impl fmt::Debug for DeploymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentRequest")
            .field("endpoint", &self.endpoint)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("target", &self.target)
            .field("constructor_args", &self.constructor_args)
            .field("deployment_id", &self.deployment_id)
            .field("confirmed", &self.confirmed)
            .finish()
    }
}

/// Normalize a hex private key to carry the `0x` prefix
pub fn normalize_private_key(key: &str) -> Zeroizing<String> {
    let key = key.trim();
    if key.starts_with("0x") || key.starts_with("0X") {
        Zeroizing::new(key.to_string())
    } else {
        Zeroizing::new(format!("0x{}", key))
    }
}
