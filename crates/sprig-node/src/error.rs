//! Node-level error type.

use sprig_core::error::{AllocationError, ClientError, StoreError};
use sprig_wallet::error::{KeyError, ManagerError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("config: {0}")] Config(String),
    #[error(transparent)] Settings(#[from] config::ConfigError),
    #[error(transparent)] Allocation(#[from] AllocationError),
    #[error(transparent)] Key(#[from] KeyError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Client(#[from] ClientError),
    #[error(transparent)] Manager(#[from] ManagerError),
    #[error("I/O error: {0}")] Io(#[from] std::io::Error),
}

impl NodeError {
    /// True when the master key has not been provisioned yet.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::Key(KeyError::NotInitialized(_)))
    }
}
