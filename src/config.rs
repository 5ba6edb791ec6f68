//! Cluster configuration and endpoint selection.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::rpc::RpcLedgerClient;

/// A known Solana cluster with label, moniker, and default RPC.
#[derive(Clone, Debug)]
pub struct SolanaCluster {
    pub label: &'static str,
    pub moniker: &'static str,
    pub default_rpc: &'static str,
}

impl SolanaCluster {
    pub const fn new(
        label: &'static str,
        moniker: &'static str,
        default_rpc: &'static str,
    ) -> Self {
        Self {
            label,
            moniker,
            default_rpc,
        }
    }
}

/// Public clusters, mainnet first.
pub const CLUSTERS: &[SolanaCluster] = &[
    SolanaCluster::new("Mainnet Beta", "mainnet-beta", "https://api.mainnet-beta.solana.com"),
    SolanaCluster::new("Devnet", "devnet", "https://api.devnet.solana.com"),
    SolanaCluster::new("Testnet", "testnet", "https://api.testnet.solana.com"),
];

/// Find a cluster by its moniker.
pub fn find_cluster(moniker: &str) -> Option<&'static SolanaCluster> {
    CLUSTERS.iter().find(|c| c.moniker == moniker)
}

const EXPLORER_BASE: &str = "https://explorer.solana.com";

/// Explorer query suffix for a cluster; mainnet needs none.
fn explorer_cluster_suffix(moniker: &str) -> String {
    if moniker == "mainnet-beta" {
        String::new()
    } else {
        format!("?cluster={moniker}")
    }
}

/// Full URL to view a transaction on the explorer.
pub fn get_tx_explorer_url(moniker: &str, signature: &str) -> String {
    format!(
        "{EXPLORER_BASE}/tx/{signature}{}",
        explorer_cluster_suffix(moniker)
    )
}

/// Full URL to view an account on the explorer.
pub fn get_address_explorer_url(moniker: &str, address: &str) -> String {
    format!(
        "{EXPLORER_BASE}/address/{address}{}",
        explorer_cluster_suffix(moniker)
    )
}

/// Env var that overrides the RPC endpoint regardless of cluster.
pub const RPC_URL_ENV: &str = "SOLDISPERSE_RPC_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rpc url `{url}`: {source}")]
    InvalidRpcUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub cluster: String,
    pub confirm_poll_ms: u64,
}

impl Config {
    pub fn new(rpc_url: String, cluster: String) -> Self {
        // An explicit endpoint override wins over the cluster default.
        let rpc_url = env::var(RPC_URL_ENV).unwrap_or(rpc_url);
        Self {
            rpc_url,
            cluster,
            confirm_poll_ms: 500,
        }
    }

    pub fn from_cluster(cluster: &SolanaCluster) -> Self {
        Self::new(cluster.default_rpc.to_string(), cluster.moniker.to_string())
    }

    pub fn cluster_label(&self) -> &str {
        find_cluster(&self.cluster)
            .map(|c| c.label)
            .unwrap_or("Custom")
    }

    /// Build the ledger client for this endpoint.
    pub fn ledger_client(&self) -> Result<RpcLedgerClient, ConfigError> {
        let url = Url::parse(&self.rpc_url).map_err(|source| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            source,
        })?;
        Ok(RpcLedgerClient::new(url.as_str().to_string())
            .with_poll_interval(Duration::from_millis(self.confirm_poll_ms)))
    }
}

impl Default for Config {
    fn default() -> Self {
        // Default to devnet; the embedding surface selects clusters.
        if let Some(devnet) = find_cluster("devnet") {
            Self::from_cluster(devnet)
        } else {
            Self::new(
                "https://api.devnet.solana.com".to_string(),
                "devnet".to_string(),
            )
        }
    }
}
