//! Per-currency startup input.

use std::fmt;
use std::sync::Arc;

use bitcoin::Network;
use sprig_core::traits::{ChainClient, LightningClient};

/// A configured currency together with the clients that serve it.
#[derive(Clone)]
pub struct Currency {
    symbol: String,
    network: Network,
    chain: Arc<dyn ChainClient>,
    lightning: Arc<dyn LightningClient>,
}

impl Currency {
    pub fn new(
        symbol: impl Into<String>,
        network: Network,
        chain: Arc<dyn ChainClient>,
        lightning: Arc<dyn LightningClient>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            network,
            chain,
            lightning,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn lightning(&self) -> &Arc<dyn LightningClient> {
        &self.lightning
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Currency")
            .field("symbol", &self.symbol)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
