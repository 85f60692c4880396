//! Network reachability checks before a remote deployment

use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use alloy::transports::RpcError;
use async_trait::async_trait;
use pharos_core::{Error, Result};
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks that an RPC endpoint answers before anything is deployed to it
#[async_trait]
pub trait RpcProbe: Send + Sync {
    /// Fetch the chain ID, rejecting transport failures and RPC-level errors
    async fn chain_id(&self, rpc_url: &str) -> Result<u64>;
}

/// Probe that asks an HTTP endpoint for its chain ID
#[derive(Debug, Clone)]
pub struct HttpProbe {
    timeout: Duration,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
        }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcProbe for HttpProbe {
    async fn chain_id(&self, rpc_url: &str) -> Result<u64> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| Error::validation(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let unreachable_err = |reason: String| Error::NetworkUnreachable {
            url: rpc_url.to_string(),
            reason,
        };

        debug!(url = rpc_url, "checking RPC endpoint");
        let provider = ProviderBuilder::new().connect_http(url);
        let response = tokio::time::timeout(self.timeout, provider.get_chain_id())
            .await
            .map_err(|_| unreachable_err(format!("no answer within {:?}", self.timeout)))?;

        match response {
            Ok(chain_id) => Ok(chain_id),
            Err(RpcError::ErrorResp(payload)) => Err(Error::RpcRejected {
                url: rpc_url.to_string(),
                code: payload.code,
                message: payload.message.to_string(),
            }),
            Err(e) => Err(unreachable_err(e.to_string())),
        }
    }
}
