//! Live sub-wallet bound to one branch of the shared tree.
//!
//! A [`Wallet`] is built by the manager from a persisted record. It issues
//! receive addresses on its branch and keeps the record's address index and
//! sync checkpoint in step with the store: the in-memory values only move
//! after the corresponding write has succeeded.

use std::fmt;
use std::sync::Arc;

use bitcoin::bip32::{ChildNumber, Xpriv, Xpub};
use bitcoin::{Address, Network};
use tracing::{debug, warn};

use sprig_core::traits::{ChainClient, LightningClient, WalletRecordStore};
use sprig_core::types::{DerivationPath, WalletRecord};

use crate::currency::Currency;
use crate::error::{KeyError, WalletError};
use crate::master_key::MasterKey;

pub struct Wallet {
    symbol: String,
    network: Network,
    derivation_path: DerivationPath,
    branch_key: Xpriv,
    master: Arc<MasterKey>,
    /// Index of the next address to hand out.
    highest_used_index: u32,
    blockheight: u64,
    chain: Arc<dyn ChainClient>,
    lightning: Arc<dyn LightningClient>,
    store: Arc<dyn WalletRecordStore>,
}

impl Wallet {
    /// Bind a persisted record to the master key and its currency's clients.
    pub fn new(
        master: Arc<MasterKey>,
        record: &WalletRecord,
        currency: &Currency,
        store: Arc<dyn WalletRecordStore>,
    ) -> Result<Self, KeyError> {
        let branch_key = master.derive(&record.derivation_path)?;
        Ok(Self {
            symbol: record.symbol.clone(),
            network: currency.network(),
            derivation_path: record.derivation_path.clone(),
            branch_key,
            master,
            highest_used_index: record.highest_used_index,
            blockheight: record.blockheight,
            chain: Arc::clone(currency.chain()),
            lightning: Arc::clone(currency.lightning()),
            store,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }

    pub fn highest_used_index(&self) -> u32 {
        self.highest_used_index
    }

    /// Last chain height this wallet has synchronised to.
    pub fn blockheight(&self) -> u64 {
        self.blockheight
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn lightning(&self) -> &Arc<dyn LightningClient> {
        &self.lightning
    }

    /// Current state in persisted form.
    pub fn record(&self) -> WalletRecord {
        WalletRecord {
            symbol: self.symbol.clone(),
            derivation_path: self.derivation_path.clone(),
            highest_used_index: self.highest_used_index,
            blockheight: self.blockheight,
        }
    }

    /// P2WPKH address at `index` on this wallet's branch.
    pub fn address_at(&self, index: u32) -> Result<Address, WalletError> {
        let child = ChildNumber::from_normal_idx(index)
            .map_err(|e| KeyError::Derivation(format!("{}/{index}: {e}", self.derivation_path)))?;
        let key = self
            .branch_key
            .derive_priv(self.master.secp(), &[child])
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        let xpub = Xpub::from_priv(self.master.secp(), &key);
        Ok(Address::p2wpkh(&xpub.to_pub(), self.network))
    }

    /// Hand out the address at the current index and advance it.
    ///
    /// The advanced index is persisted before it is applied, so a failed
    /// write never lets the in-memory index run ahead of the store.
    pub fn next_address(&mut self) -> Result<Address, WalletError> {
        let index = self.highest_used_index;
        let next = index.checked_add(1).ok_or(WalletError::IndexOverflow)?;
        let address = self.address_at(index)?;
        self.store.set_highest_used_index(&self.symbol, next)?;
        self.highest_used_index = next;
        debug!(symbol = %self.symbol, index, "issued address");
        Ok(address)
    }

    /// Catch up from the recorded checkpoint to the current chain tip.
    ///
    /// Block scanning belongs to the currency's own pipeline; this moves the
    /// persisted checkpoint forward once the tip is known. A tip below the
    /// checkpoint leaves it in place. Returns the checkpoint after syncing.
    pub async fn sync(&mut self) -> Result<u64, WalletError> {
        let tip = self.chain.current_height().await?;
        if tip > self.blockheight {
            self.store.set_blockheight(&self.symbol, tip)?;
            debug!(symbol = %self.symbol, from = self.blockheight, to = tip, "checkpoint advanced");
            self.blockheight = tip;
        } else if tip < self.blockheight {
            warn!(
                symbol = %self.symbol,
                checkpoint = self.blockheight,
                tip,
                "chain tip is behind the recorded checkpoint"
            );
        }
        Ok(self.blockheight)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("symbol", &self.symbol)
            .field("network", &self.network)
            .field("derivation_path", &self.derivation_path.to_string())
            .field("highest_used_index", &self.highest_used_index)
            .field("blockheight", &self.blockheight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{currency, master_key, FixedChain, MemStore};

    fn wallet_on(store: Arc<MemStore>, chain: Arc<FixedChain>, path: &str, height: u64) -> Wallet {
        let record = WalletRecord::fresh("BTC", path.parse().unwrap(), height);
        store.add(&record).unwrap();
        Wallet::new(Arc::new(master_key()), &record, &currency("BTC", chain), store).unwrap()
    }

    #[test]
    fn address_deterministic() {
        let store = Arc::new(MemStore::default());
        let wallet = wallet_on(store, FixedChain::at(100), "m/0/0", 100);
        assert_eq!(wallet.address_at(3).unwrap(), wallet.address_at(3).unwrap());
        assert_ne!(wallet.address_at(3).unwrap(), wallet.address_at(4).unwrap());
    }

    #[test]
    fn branches_yield_distinct_addresses() {
        let key = Arc::new(master_key());
        let store: Arc<MemStore> = Arc::new(MemStore::default());
        let chain = FixedChain::at(1);
        let btc = WalletRecord::fresh("BTC", "m/0/0".parse().unwrap(), 1);
        let ltc = WalletRecord::fresh("LTC", "m/0/1".parse().unwrap(), 1);
        let a = Wallet::new(Arc::clone(&key), &btc, &currency("BTC", Arc::clone(&chain)), store.clone()).unwrap();
        let b = Wallet::new(key, &ltc, &currency("LTC", chain), store).unwrap();
        assert_ne!(a.address_at(0).unwrap(), b.address_at(0).unwrap());
    }

    #[test]
    fn regtest_addresses_use_bcrt_prefix() {
        let store = Arc::new(MemStore::default());
        let wallet = wallet_on(store, FixedChain::at(1), "m/0/0", 1);
        assert!(wallet.address_at(0).unwrap().to_string().starts_with("bcrt1"));
    }

    #[test]
    fn next_address_persists_index() {
        let store = Arc::new(MemStore::default());
        let mut wallet = wallet_on(Arc::clone(&store), FixedChain::at(1), "m/0/0", 1);
        let first = wallet.next_address().unwrap();
        assert_eq!(first, wallet.address_at(0).unwrap());
        assert_eq!(wallet.highest_used_index(), 1);
        assert_eq!(store.record("BTC").unwrap().highest_used_index, 1);

        let second = wallet.next_address().unwrap();
        assert_ne!(first, second);
        assert_eq!(store.record("BTC").unwrap().highest_used_index, 2);
    }

    #[test]
    fn next_address_does_not_advance_on_failed_write() {
        let store = Arc::new(MemStore::default());
        let record = WalletRecord::fresh("BTC", "m/0/0".parse().unwrap(), 1);
        // record never added, so the store rejects the update
        let mut wallet = Wallet::new(
            Arc::new(master_key()),
            &record,
            &currency("BTC", FixedChain::at(1)),
            store,
        )
        .unwrap();
        assert!(wallet.next_address().is_err());
        assert_eq!(wallet.highest_used_index(), 0);
    }

    #[tokio::test]
    async fn sync_advances_checkpoint() {
        let store = Arc::new(MemStore::default());
        let chain = FixedChain::at(150);
        let mut wallet = wallet_on(Arc::clone(&store), Arc::clone(&chain), "m/0/0", 100);
        assert_eq!(wallet.sync().await.unwrap(), 150);
        assert_eq!(store.record("BTC").unwrap().blockheight, 150);

        chain.set(160);
        assert_eq!(wallet.sync().await.unwrap(), 160);
        assert_eq!(wallet.blockheight(), 160);
    }

    #[tokio::test]
    async fn sync_at_tip_writes_nothing() {
        let store = Arc::new(MemStore::default());
        let mut wallet = wallet_on(Arc::clone(&store), FixedChain::at(100), "m/0/0", 100);
        let before = store.writes();
        wallet.sync().await.unwrap();
        assert_eq!(store.writes(), before);
    }

    #[tokio::test]
    async fn sync_never_rewinds() {
        let store = Arc::new(MemStore::default());
        let mut wallet = wallet_on(Arc::clone(&store), FixedChain::at(90), "m/0/0", 100);
        assert_eq!(wallet.sync().await.unwrap(), 100);
        assert_eq!(store.record("BTC").unwrap().blockheight, 100);
    }

    #[tokio::test]
    async fn sync_surfaces_chain_errors() {
        let store = Arc::new(MemStore::default());
        let mut wallet = wallet_on(store, FixedChain::down(), "m/0/0", 100);
        assert!(matches!(wallet.sync().await, Err(WalletError::Chain(_))));
    }

    #[test]
    fn record_reflects_state() {
        let store = Arc::new(MemStore::default());
        let mut wallet = wallet_on(store, FixedChain::at(1), "m/0/4", 7);
        wallet.next_address().unwrap();
        let record = wallet.record();
        assert_eq!(record.derivation_path.to_string(), "m/0/4");
        assert_eq!(record.highest_used_index, 1);
        assert_eq!(record.blockheight, 7);
    }
}
