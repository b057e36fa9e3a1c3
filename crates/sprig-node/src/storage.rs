//! RocksDB-backed wallet record storage.
//!
//! Implements [`WalletRecordStore`] with a single `wallets` column family
//! keyed by currency symbol. Values are bincode-encoded [`WalletRecord`]s.
//! Every write is synced to disk before it returns.

use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteOptions, DB};

use sprig_core::error::StoreError;
use sprig_core::traits::WalletRecordStore;
use sprig_core::types::WalletRecord;

const CF_WALLETS: &str = "wallets";

/// RocksDB-backed persistent wallet records.
pub struct RocksRecordStore {
    db: DB,
}

impl RocksRecordStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(CF_WALLETS, Options::default())];
        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Self { db })
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Look up a single record.
    pub fn get(&self, symbol: &str) -> Result<Option<WalletRecord>, StoreError> {
        let cf = self.cf_handle()?;
        self.db
            .get_cf(cf, symbol.as_bytes())
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }

    // --- Internal helpers ---

    fn cf_handle(&self) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_WALLETS)
            .ok_or_else(|| StoreError::Storage(format!("missing column family: {CF_WALLETS}")))
    }

    fn put(&self, record: &WalletRecord) -> Result<(), StoreError> {
        let cf = self.cf_handle()?;
        let bytes = bincode::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(true);
        self.db
            .put_cf_opt(cf, record.symbol.as_bytes(), bytes, &write_opts)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Read-modify-write of an existing record.
    fn update(&self, symbol: &str, apply: impl FnOnce(&mut WalletRecord)) -> Result<(), StoreError> {
        let mut record = self
            .get(symbol)?
            .ok_or_else(|| StoreError::UnknownRecord(symbol.to_string()))?;
        apply(&mut record);
        self.put(&record)
    }

    fn decode(bytes: &[u8]) -> Result<WalletRecord, StoreError> {
        let (record, _): (WalletRecord, _) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(record)
    }
}

impl WalletRecordStore for RocksRecordStore {
    fn get_all(&self) -> Result<Vec<WalletRecord>, StoreError> {
        let cf = self.cf_handle()?;
        let mut records = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value_bytes) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
            records.push(Self::decode(&value_bytes)?);
        }

        Ok(records)
    }

    fn add(&self, record: &WalletRecord) -> Result<(), StoreError> {
        if self.get(&record.symbol)?.is_some() {
            return Err(StoreError::DuplicateRecord(record.symbol.clone()));
        }
        self.put(record)
    }

    fn set_highest_used_index(&self, symbol: &str, index: u32) -> Result<(), StoreError> {
        self.update(symbol, |record| record.highest_used_index = index)
    }

    fn set_blockheight(&self, symbol: &str, height: u64) -> Result<(), StoreError> {
        self.update(symbol, |record| record.blockheight = height)
    }
}
