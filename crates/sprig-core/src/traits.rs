//! Trait interfaces for Sprig's collaborators.
//!
//! - [`WalletRecordStore`]: durable per-currency records (sprig-node implements with RocksDB)
//! - [`ChainClient`]: current chain height of one currency (sprig-node implements over JSON-RPC)
//! - [`LightningClient`]: lightning node attached to one currency (sprig-node implements over REST)

use async_trait::async_trait;

use crate::error::{ClientError, StoreError};
use crate::types::{LightningInfo, WalletRecord};

/// Persistence for wallet records.
///
/// Startup only needs [`get_all`](Self::get_all) and [`add`](Self::add).
/// The two setters are used by live sub-wallets as they issue addresses and
/// follow the chain. A successful write must be visible to the next read.
pub trait WalletRecordStore: Send + Sync {
    /// Every persisted record.
    fn get_all(&self) -> Result<Vec<WalletRecord>, StoreError>;

    /// Persist a new record. Fails if the symbol already has one.
    fn add(&self, record: &WalletRecord) -> Result<(), StoreError>;

    /// Update the highest issued address index of an existing record.
    fn set_highest_used_index(&self, symbol: &str, index: u32) -> Result<(), StoreError>;

    /// Update the sync checkpoint of an existing record.
    fn set_blockheight(&self, symbol: &str, height: u64) -> Result<(), StoreError>;
}

/// Read access to a currency's chain backend.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Height of the current chain tip.
    async fn current_height(&self) -> Result<u64, ClientError>;
}

/// Read access to a currency's lightning node.
#[async_trait]
pub trait LightningClient: Send + Sync {
    async fn get_info(&self) -> Result<LightningInfo, ClientError>;
}
