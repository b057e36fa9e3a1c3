//! Shared test helpers for E2E and integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use bitcoin::Network;
use parking_lot::Mutex;

use sprig_core::error::{ClientError, StoreError};
use sprig_core::traits::{ChainClient, LightningClient, WalletRecordStore};
use sprig_core::types::{LightningInfo, WalletRecord};
use sprig_wallet::Currency;

/// BIP-39 test vector phrase.
pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// In-memory record store with the same add/update rules as the RocksDB one.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, WalletRecord>>,
}

impl MemoryStore {
    pub fn with_records(records: impl IntoIterator<Item = WalletRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.symbol.clone(), r)).collect();
        Self {
            records: Mutex::new(map),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<WalletRecord> {
        self.records.lock().get(symbol).cloned()
    }
}

impl WalletRecordStore for MemoryStore {
    fn get_all(&self) -> Result<Vec<WalletRecord>, StoreError> {
        Ok(self.records.lock().values().cloned().collect())
    }

    fn add(&self, record: &WalletRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        if records.contains_key(&record.symbol) {
            return Err(StoreError::DuplicateRecord(record.symbol.clone()));
        }
        records.insert(record.symbol.clone(), record.clone());
        Ok(())
    }

    fn set_highest_used_index(&self, symbol: &str, index: u32) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownRecord(symbol.to_string()))?;
        record.highest_used_index = index;
        Ok(())
    }

    fn set_blockheight(&self, symbol: &str, height: u64) -> Result<(), StoreError> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownRecord(symbol.to_string()))?;
        record.blockheight = height;
        Ok(())
    }
}

/// Wraps another store and counts every mutating call that reaches it.
pub struct CountingStore<S> {
    inner: S,
    writes: AtomicUsize,
}

impl<S: WalletRecordStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn count(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: WalletRecordStore> WalletRecordStore for CountingStore<S> {
    fn get_all(&self) -> Result<Vec<WalletRecord>, StoreError> {
        self.inner.get_all()
    }

    fn add(&self, record: &WalletRecord) -> Result<(), StoreError> {
        self.count();
        self.inner.add(record)
    }

    fn set_highest_used_index(&self, symbol: &str, index: u32) -> Result<(), StoreError> {
        self.count();
        self.inner.set_highest_used_index(symbol, index)
    }

    fn set_blockheight(&self, symbol: &str, height: u64) -> Result<(), StoreError> {
        self.count();
        self.inner.set_blockheight(symbol, height)
    }
}

/// Chain backend that answers from a settable height and records how often
/// it was asked.
pub struct ScriptedChain {
    height: AtomicU64,
    calls: AtomicUsize,
    failure: Mutex<Option<ClientError>>,
}

impl ScriptedChain {
    pub fn at(height: u64) -> Arc<Self> {
        Arc::new(Self {
            height: AtomicU64::new(height),
            calls: AtomicUsize::new(0),
            failure: Mutex::new(None),
        })
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Make every following query fail with `err`.
    pub fn fail_with(&self, err: ClientError) {
        *self.failure.lock() = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn current_height(&self) -> Result<u64, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        Ok(self.height.load(Ordering::SeqCst))
    }
}

/// Lightning node that is always reachable and never synced.
pub struct StubLightning;

#[async_trait]
impl LightningClient for StubLightning {
    async fn get_info(&self) -> Result<LightningInfo, ClientError> {
        Ok(LightningInfo {
            alias: "stub".into(),
            block_height: 0,
            synced_to_chain: false,
        })
    }
}

/// Regtest currency backed by `chain`.
pub fn currency(symbol: &str, chain: Arc<ScriptedChain>) -> Currency {
    Currency::new(symbol, Network::Regtest, chain, Arc::new(StubLightning))
}

/// One regtest currency per symbol, each on its own chain at `height`.
pub fn currencies(symbols: &[&str], height: u64) -> Vec<Currency> {
    symbols
        .iter()
        .map(|symbol| currency(symbol, ScriptedChain::at(height)))
        .collect()
}
