//! In-crate test doubles for the collaborator traits.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use bitcoin::{Network, NetworkKind};
use parking_lot::Mutex;

use sprig_core::error::{ClientError, StoreError};
use sprig_core::traits::{ChainClient, LightningClient, WalletRecordStore};
use sprig_core::types::{LightningInfo, WalletRecord};

use crate::currency::Currency;
use crate::master_key::MasterKey;

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn master_key() -> MasterKey {
    MasterKey::from_mnemonic(TEST_MNEMONIC, NetworkKind::Test).unwrap()
}

#[derive(Default)]
pub struct MemStore {
    records: Mutex<BTreeMap<String, WalletRecord>>,
    pub writes: AtomicUsize,
    pub fail_adds: Mutex<Vec<String>>,
}

impl MemStore {
    pub fn record(&self, symbol: &str) -> Option<WalletRecord> {
        self.records.lock().get(symbol).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl WalletRecordStore for MemStore {
    fn get_all(&self) -> Result<Vec<WalletRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn add(&self, record: &WalletRecord) -> Result<(), StoreError> {
        if self.fail_adds.lock().contains(&record.symbol) {
            return Err(StoreError::Storage("disk full".into()));
        }
        let mut records = self.records.lock();
        if records.contains_key(&record.symbol) {
            return Err(StoreError::DuplicateRecord(record.symbol.clone()));
        }
        records.insert(record.symbol.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_highest_used_index(&self, symbol: &str, index: u32) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownRecord(symbol.to_string()))?;
        record.highest_used_index = index;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_blockheight(&self, symbol: &str, height: u64) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownRecord(symbol.to_string()))?;
        record.blockheight = height;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Chain whose tip can be moved by the test, or which is unreachable.
pub struct FixedChain {
    height: AtomicU64,
    down: bool,
}

impl FixedChain {
    pub fn at(height: u64) -> Arc<Self> {
        Arc::new(Self {
            height: AtomicU64::new(height),
            down: false,
        })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            height: AtomicU64::new(0),
            down: true,
        })
    }

    pub fn set(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainClient for FixedChain {
    async fn current_height(&self) -> Result<u64, ClientError> {
        if self.down {
            return Err(ClientError::Transport("connection refused".into()));
        }
        Ok(self.height.load(Ordering::SeqCst))
    }
}

pub struct IdleLightning;

#[async_trait]
impl LightningClient for IdleLightning {
    async fn get_info(&self) -> Result<LightningInfo, ClientError> {
        Ok(LightningInfo {
            alias: "idle".into(),
            block_height: 0,
            synced_to_chain: false,
        })
    }
}

pub fn currency(symbol: &str, chain: Arc<FixedChain>) -> Currency {
    Currency::new(symbol, Network::Regtest, chain, Arc::new(IdleLightning))
}
