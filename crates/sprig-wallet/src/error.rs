//! Wallet error types.

use sprig_core::error::{AllocationError, ClientError, StoreError};
use thiserror::Error;

/// Errors raised while loading, provisioning or deriving from the master key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// No master key file exists yet.
    #[error("not initialized: no master key at {0}")]
    NotInitialized(String),

    /// The mnemonic failed word-list or checksum validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Only 12 and 24 word phrases are generated.
    #[error("invalid word count: {0} (expected 12 or 24)")]
    InvalidWordCount(usize),

    /// The key file exists but does not hold an extended private key.
    #[error("corrupted key file: {0}")]
    CorruptedKeyFile(String),

    /// Child key derivation failed.
    #[error("key derivation: {0}")]
    Derivation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised by a live sub-wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chain(#[from] ClientError),

    /// Every non-hardened index on the branch has been issued.
    #[error("address index overflow")]
    IndexOverflow,
}

/// Fatal startup errors from [`WalletManager`](crate::manager::WalletManager).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The initial read of all records failed.
    #[error("loading wallet records: {0}")]
    RecordLoad(StoreError),

    /// A newly allocated record could not be written.
    #[error("persisting wallet record for {symbol}: {source}")]
    RecordPersist { symbol: String, source: StoreError },

    /// The chain backend could not report its height.
    #[error("querying chain height for {symbol}: {source}")]
    ChainQuery { symbol: String, source: ClientError },

    /// The sub-wallet failed to catch up with its chain.
    #[error("syncing {symbol}: {source}")]
    Sync { symbol: String, source: WalletError },
}

impl ManagerError {
    /// Symbol of the currency whose initialization failed, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::RecordPersist { symbol, .. }
            | Self::ChainQuery { symbol, .. }
            | Self::Sync { symbol, .. } => Some(symbol.as_str()),
            _ => None,
        }
    }
}
