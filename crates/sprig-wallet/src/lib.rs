//! # sprig-wallet: one HD tree, one sub-wallet per currency.
//!
//! Loads or provisions the master key, assigns every configured currency its
//! own branch of the tree, and restores those assignments on later starts.
//!
//! # Modules
//!
//! - [`error`]: `KeyError`, `WalletError`, `ManagerError`
//! - [`master_key`]: mnemonic provisioning and master key file handling
//! - [`currency`]: per-currency startup input
//! - [`wallet`]: live sub-wallet bound to one branch
//! - [`manager`]: startup orchestration and the `Wallets` container

pub mod currency;
pub mod error;
pub mod manager;
pub mod master_key;
pub mod wallet;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use currency::Currency;
pub use error::{KeyError, ManagerError, WalletError};
pub use manager::{WalletManager, Wallets};
pub use master_key::{generate_mnemonic, load, provision, MasterKey};
pub use wallet::Wallet;
