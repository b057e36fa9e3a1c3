//! Node configuration.
//!
//! Provides [`NodeConfig`] with defaults for the data directory, master key
//! file, logging and derivation layout, plus the list of currencies to serve.
//! [`NodeConfig::load`] layers an optional TOML file and `SPRIG__*`
//! environment variables over those defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bitcoin::Network;
use serde::{Deserialize, Serialize};

use sprig_core::allocator::DerivationLayout;
use sprig_core::constants::DEFAULT_BRANCH_DEPTH;
use sprig_core::types::DerivationPath;

use crate::error::NodeError;

/// Environment variable prefix for overrides, e.g. `SPRIG__LOG_LEVEL=debug`.
pub const ENV_PREFIX: &str = "SPRIG";

/// Chain and lightning endpoints for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Currency symbol, e.g. "BTC".
    pub symbol: String,
    /// Network name understood by the `bitcoin` crate ("bitcoin", "testnet", "signet", "regtest").
    pub network: String,
    /// JSON-RPC endpoint of the chain backend.
    pub chain_rpc_url: String,
    #[serde(default)]
    pub chain_rpc_user: Option<String>,
    #[serde(default)]
    pub chain_rpc_password: Option<String>,
    /// REST endpoint of the LND node.
    pub lnd_rest_url: String,
    #[serde(default)]
    pub lnd_macaroon_path: Option<PathBuf>,
}

impl CurrencySettings {
    pub fn network(&self) -> Result<Network, NodeError> {
        parse_network(&self.network)
    }

    /// Basic auth pair if both halves are configured.
    pub fn chain_auth(&self) -> Option<(String, String)> {
        match (&self.chain_rpc_user, &self.chain_rpc_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

/// Configuration for a node instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Root directory for all persistent data.
    pub data_dir: PathBuf,
    /// Master key file name inside `data_dir`.
    pub key_file: String,
    /// Network the master key is created for.
    pub network: String,
    /// Root under which currency branches are allocated.
    pub derivation_root: String,
    /// Depth of the branch segment, counted from `m`.
    pub branch_depth: usize,
    /// Log level filter string (e.g. "info", "debug", "sprig_wallet=trace").
    pub log_level: String,
    /// Log output format ("text" or "json").
    pub log_format: String,
    /// Currencies in the order they are initialized.
    pub currencies: Vec<CurrencySettings>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sprig");

        Self {
            data_dir,
            key_file: "seed.dat".to_string(),
            network: "bitcoin".to_string(),
            derivation_root: DerivationLayout::default().root().to_string(),
            branch_depth: DEFAULT_BRANCH_DEPTH,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            currencies: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Defaults, then `file` (if given, it must exist), then environment.
    pub fn load(file: Option<&Path>) -> Result<Self, NodeError> {
        let defaults = config::Config::try_from(&NodeConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Path to the master key file.
    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join(&self.key_file)
    }

    /// Path to the RocksDB wallet database directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("walletdata")
    }

    pub fn network(&self) -> Result<Network, NodeError> {
        parse_network(&self.network)
    }

    /// Derivation layout built from `derivation_root` and `branch_depth`.
    pub fn layout(&self) -> Result<DerivationLayout, NodeError> {
        let root = DerivationPath::from_str(&self.derivation_root)?;
        Ok(DerivationLayout::new(root, self.branch_depth)?)
    }
}

fn parse_network(name: &str) -> Result<Network, NodeError> {
    Network::from_str(name).map_err(|_| NodeError::Config(format!("unknown network: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
data_dir = "/tmp/sprig-test"
network = "regtest"
log_level = "debug"

[[currencies]]
symbol = "BTC"
network = "regtest"
chain_rpc_url = "http://127.0.0.1:18443"
chain_rpc_user = "user"
chain_rpc_password = "pass"
lnd_rest_url = "https://127.0.0.1:8080"

[[currencies]]
symbol = "LTC"
network = "regtest"
chain_rpc_url = "http://127.0.0.1:19443"
lnd_rest_url = "https://127.0.0.1:8081"
"#;

    #[test]
    fn default_key_file() {
        let cfg = NodeConfig::default();
        assert_eq!(cfg.key_file, "seed.dat");
    }

    #[test]
    fn default_data_dir_ends_with_sprig() {
        let cfg = NodeConfig::default();
        assert!(
            cfg.data_dir.ends_with("sprig"),
            "data_dir should end with 'sprig': {:?}",
            cfg.data_dir
        );
    }

    #[test]
    fn default_layout_is_m_0() {
        let layout = NodeConfig::default().layout().unwrap();
        assert_eq!(layout, DerivationLayout::default());
    }

    #[test]
    fn paths_under_data_dir() {
        let cfg = NodeConfig {
            data_dir: PathBuf::from("/tmp/sprig-test"),
            ..NodeConfig::default()
        };
        assert_eq!(cfg.key_path(), PathBuf::from("/tmp/sprig-test/seed.dat"));
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/sprig-test/walletdata"));
    }

    #[test]
    fn bad_layout_rejected() {
        let cfg = NodeConfig {
            branch_depth: 5,
            ..NodeConfig::default()
        };
        assert!(cfg.layout().is_err());

        let cfg = NodeConfig {
            derivation_root: "0/1".into(),
            ..NodeConfig::default()
        };
        assert!(cfg.layout().is_err());
    }

    #[test]
    fn unknown_network_rejected() {
        let cfg = NodeConfig {
            network: "moonnet".into(),
            ..NodeConfig::default()
        };
        assert!(matches!(cfg.network(), Err(NodeError::Config(_))));
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprig.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let cfg = NodeConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/sprig-test"));
        assert_eq!(cfg.network().unwrap(), Network::Regtest);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.key_file, "seed.dat");
        assert_eq!(cfg.currencies.len(), 2);
        assert_eq!(cfg.currencies[0].symbol, "BTC");
        assert_eq!(
            cfg.currencies[0].chain_auth(),
            Some(("user".to_string(), "pass".to_string()))
        );
        assert_eq!(cfg.currencies[1].chain_auth(), None);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NodeConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
