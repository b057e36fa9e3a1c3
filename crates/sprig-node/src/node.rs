//! Node composition and startup.
//!
//! The [`Node`] loads the master key, opens the record store, builds the
//! chain and lightning clients for every configured currency and runs the
//! wallet manager's startup sequence. It owns the resulting [`Wallets`]
//! for the lifetime of the process.

use std::sync::Arc;

use bitcoin::NetworkKind;
use tracing::{info, warn};

use sprig_core::traits::WalletRecordStore;
use sprig_core::types::WalletRecord;
use sprig_wallet::{master_key, Currency, WalletManager, Wallets};

use crate::config::{CurrencySettings, NodeConfig};
use crate::error::NodeError;
use crate::rpc::{JsonRpcChainClient, LndRestClient};
use crate::storage::RocksRecordStore;

/// A started node holding every live sub-wallet.
pub struct Node {
    config: NodeConfig,
    store: Arc<RocksRecordStore>,
    wallets: Wallets,
}

impl Node {
    /// Start with HTTP clients built from the configured endpoints.
    pub async fn start(config: NodeConfig) -> Result<Self, NodeError> {
        let currencies = build_currencies(&config.currencies)?;
        Self::start_with_currencies(config, currencies).await
    }

    /// Start with caller-supplied currencies.
    ///
    /// The master key is loaded before anything else, so an uninitialized
    /// node fails without touching storage or any backend.
    pub async fn start_with_currencies(
        config: NodeConfig,
        currencies: Vec<Currency>,
    ) -> Result<Self, NodeError> {
        let master = master_key::load(&config.key_path())?;
        let layout = config.layout()?;

        std::fs::create_dir_all(&config.data_dir)?;
        let store = Arc::new(RocksRecordStore::open(config.db_path())?);

        let manager = WalletManager::new(master, Arc::clone(&store) as Arc<dyn WalletRecordStore>, layout);
        let wallets = manager.init(&currencies).await?;

        let node = Self {
            config,
            store,
            wallets,
        };
        node.log_lightning_status().await;
        Ok(node)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn wallets(&self) -> &Wallets {
        &self.wallets
    }

    pub fn wallets_mut(&mut self) -> &mut Wallets {
        &mut self.wallets
    }

    /// All persisted records, including currencies no longer configured.
    pub fn records(&self) -> Result<Vec<WalletRecord>, NodeError> {
        Ok(self.store.get_all()?)
    }

    /// Flush storage before exit.
    pub fn shutdown(&self) -> Result<(), NodeError> {
        self.store.flush()?;
        info!("record store flushed");
        Ok(())
    }

    /// Report each currency's lightning node. Failures are logged only.
    async fn log_lightning_status(&self) {
        for wallet in self.wallets.iter() {
            match wallet.lightning().get_info().await {
                Ok(status) => info!(
                    symbol = wallet.symbol(),
                    alias = %status.alias,
                    block_height = status.block_height,
                    synced = status.synced_to_chain,
                    "lightning node reachable"
                ),
                Err(e) => warn!(symbol = wallet.symbol(), "lightning node unavailable: {e}"),
            }
        }
    }
}

/// Derive the master key from `mnemonic` and write it under `config.data_dir`.
pub fn provision_master_key(config: &NodeConfig, mnemonic: &str) -> Result<(), NodeError> {
    let network = NetworkKind::from(config.network()?);
    std::fs::create_dir_all(&config.data_dir)?;
    master_key::provision(mnemonic, network, &config.key_path())?;
    Ok(())
}

/// Read all records without starting any wallet.
pub fn read_records(config: &NodeConfig) -> Result<Vec<WalletRecord>, NodeError> {
    let store = RocksRecordStore::open(config.db_path())?;
    Ok(store.get_all()?)
}

fn build_currencies(settings: &[CurrencySettings]) -> Result<Vec<Currency>, NodeError> {
    settings
        .iter()
        .map(|s| -> Result<Currency, NodeError> {
            let chain = JsonRpcChainClient::new(&s.chain_rpc_url, s.chain_auth())?;
            let lightning = LndRestClient::new(&s.lnd_rest_url, s.lnd_macaroon_path.as_deref())?;
            Ok(Currency::new(
                s.symbol.clone(),
                s.network()?,
                Arc::new(chain),
                Arc::new(lightning),
            ))
        })
        .collect()
}
