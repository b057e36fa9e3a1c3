//! Startup orchestration: one sub-wallet per configured currency.
//!
//! [`WalletManager::init`] reads every persisted record once, gives each
//! currency without a record the next free branch, persists it, and builds a
//! [`Wallet`] for every currency. Currencies are handled strictly in
//! configuration order; each allocation is made against a snapshot that
//! already contains the allocations made earlier in the same run.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use sprig_core::allocator::{DerivationLayout, RecordSnapshot};
use sprig_core::traits::WalletRecordStore;
use sprig_core::types::WalletRecord;

use crate::currency::Currency;
use crate::error::ManagerError;
use crate::master_key::MasterKey;
use crate::wallet::Wallet;

/// Live sub-wallets keyed by currency symbol.
///
/// Returned by [`WalletManager::init`] and owned by whoever ran startup.
#[derive(Debug, Default)]
pub struct Wallets {
    inner: BTreeMap<String, Wallet>,
}

impl Wallets {
    pub fn get(&self, symbol: &str) -> Option<&Wallet> {
        self.inner.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Wallet> {
        self.inner.get_mut(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.inner.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wallet> {
        self.inner.values()
    }

    fn insert(&mut self, wallet: Wallet) -> Option<Wallet> {
        self.inner.insert(wallet.symbol().to_string(), wallet)
    }
}

/// Allocates and restores per-currency sub-wallets from one master key.
pub struct WalletManager {
    master: Arc<MasterKey>,
    store: Arc<dyn WalletRecordStore>,
    layout: DerivationLayout,
}

impl WalletManager {
    pub fn new(master: MasterKey, store: Arc<dyn WalletRecordStore>, layout: DerivationLayout) -> Self {
        Self {
            master: Arc::new(master),
            store,
            layout,
        }
    }

    pub fn layout(&self) -> &DerivationLayout {
        &self.layout
    }

    pub fn master_key(&self) -> &MasterKey {
        &self.master
    }

    /// Run the startup sequence for `currencies`, in order.
    ///
    /// Any error aborts the whole run. Records persisted before the failure
    /// stay persisted and are picked up again on the next start.
    pub async fn init(&self, currencies: &[Currency]) -> Result<Wallets, ManagerError> {
        let records = self.store.get_all().map_err(ManagerError::RecordLoad)?;
        let mut snapshot = RecordSnapshot::from_records(records);
        info!(
            records = snapshot.len(),
            currencies = currencies.len(),
            root = %self.layout.root(),
            "initializing wallets"
        );

        let mut wallets = Wallets::default();
        for currency in currencies {
            let symbol = currency.symbol();
            let record = match snapshot.get(symbol) {
                Some(record) => {
                    debug!(symbol, path = %record.derivation_path, "restoring sub-wallet");
                    record.clone()
                }
                None => {
                    let (record, next) = self.allocate(currency, &snapshot).await?;
                    snapshot = next;
                    record
                }
            };

            let mut wallet = Wallet::new(Arc::clone(&self.master), &record, currency, Arc::clone(&self.store))?;
            wallet.sync().await.map_err(|source| ManagerError::Sync {
                symbol: symbol.to_string(),
                source,
            })?;

            if wallets.insert(wallet).is_some() {
                warn!(symbol, "currency configured more than once; keeping the last handle");
            }
        }

        info!(wallets = wallets.len(), "wallets initialized");
        Ok(wallets)
    }

    /// Allocate, persist and record a branch for a currency seen for the
    /// first time. Returns the new record and the snapshot that includes it.
    async fn allocate(
        &self,
        currency: &Currency,
        snapshot: &RecordSnapshot,
    ) -> Result<(WalletRecord, RecordSnapshot), ManagerError> {
        let symbol = currency.symbol();
        let height = currency
            .chain()
            .current_height()
            .await
            .map_err(|source| ManagerError::ChainQuery {
                symbol: symbol.to_string(),
                source,
            })?;

        let path = self.layout.next_path(snapshot)?;
        let record = WalletRecord::fresh(symbol, path, height);
        self.store
            .add(&record)
            .map_err(|source| ManagerError::RecordPersist {
                symbol: symbol.to_string(),
                source,
            })?;

        info!(
            symbol,
            path = %record.derivation_path,
            blockheight = height,
            "allocated new sub-wallet"
        );
        let next = snapshot.with_record(record.clone());
        Ok((record, next))
    }
}
