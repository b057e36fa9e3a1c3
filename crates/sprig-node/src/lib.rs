//! # sprig-node-lib
//! Storage, backend clients and startup composition for a Sprig node.

pub mod config;
pub mod error;
pub mod node;
pub mod rpc;
pub mod storage;

pub use crate::config::{CurrencySettings, NodeConfig};
pub use error::NodeError;
pub use node::Node;
pub use rpc::{JsonRpcChainClient, LndRestClient};
pub use storage::RocksRecordStore;
