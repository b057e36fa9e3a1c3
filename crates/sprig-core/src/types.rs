//! Core data types: derivation paths, persisted wallet records and
//! lightning node summaries.
//!
//! Paths are unhardened and rooted at the master key. Records are keyed by
//! currency symbol; the symbol and path of a record never change once it
//! has been written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{INITIAL_USED_INDEX, MASTER_PREFIX};
use crate::error::AllocationError;

/// An unhardened BIP-32 path such as `m/0/3`.
///
/// Serialized through serde as its string form so it reads naturally in
/// config files and JSON output. Encoded through bincode as raw segments.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    bincode::Encode, bincode::Decode,
)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// The bare master path `m`.
    pub fn master() -> Self {
        Self(Vec::new())
    }

    /// Build a path from its segments, outermost first.
    pub fn from_segments(segments: Vec<u32>) -> Self {
        Self(segments)
    }

    /// Segments after `m`.
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Number of segments after `m`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the bare master path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segment at a 1-based depth counted from `m`. Depth 0 is `m` itself
    /// and never has a segment.
    pub fn segment(&self, depth: usize) -> Option<u32> {
        depth.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    /// This path extended by one segment.
    pub fn child(&self, index: u32) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASTER_PREFIX)?;
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some(MASTER_PREFIX) {
            return Err(AllocationError::InvalidPath(format!(
                "{s}: must start with '{MASTER_PREFIX}'"
            )));
        }
        let segments = parts
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    AllocationError::InvalidPath(format!("{s}: bad segment '{part}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = AllocationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

/// Persisted allocation state of one currency's sub-wallet.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct WalletRecord {
    /// Currency symbol, the natural key.
    pub symbol: String,
    /// Branch path assigned to this currency.
    pub derivation_path: DerivationPath,
    /// Highest address index handed out on this branch.
    pub highest_used_index: u32,
    /// Last chain height the sub-wallet has synchronised to.
    pub blockheight: u64,
}

impl WalletRecord {
    /// A record for a currency seen for the first time.
    pub fn fresh(symbol: impl Into<String>, derivation_path: DerivationPath, blockheight: u64) -> Self {
        Self {
            symbol: symbol.into(),
            derivation_path,
            highest_used_index: INITIAL_USED_INDEX,
            blockheight,
        }
    }
}

/// Summary reported by a lightning node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightningInfo {
    pub alias: String,
    pub block_height: u64,
    pub synced_to_chain: bool,
}
