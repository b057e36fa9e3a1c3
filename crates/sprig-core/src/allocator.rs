//! Branch allocation for newly seen currencies.
//!
//! Every currency owns one branch of the shared tree. [`next_branch`] picks
//! the number for a new one by looking at the branches already recorded:
//! the result is one past the highest, so branches are never reused even if
//! a currency disappears from configuration. [`RecordSnapshot`] carries the
//! record set through a startup run; adding a record yields a new snapshot
//! rather than mutating the old one, so each allocation sees all earlier ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::{DEFAULT_BRANCH_DEPTH, DEFAULT_ROOT_SEGMENTS};
use crate::error::AllocationError;
use crate::types::{DerivationPath, WalletRecord};

/// Next free branch number at `depth` (1-based, counted from `m`).
///
/// Paths without a segment at `depth` are ignored. Returns `0` when no path
/// reaches that depth. The result depends only on the set of paths, not on
/// their order.
///
/// # Examples
///
/// ```
/// use sprig_core::allocator::next_branch;
/// use sprig_core::types::DerivationPath;
///
/// let paths: Vec<DerivationPath> = vec!["m/0/0".parse().unwrap(), "m/0/4".parse().unwrap()];
/// assert_eq!(next_branch(&paths, 2).unwrap(), 5);
/// assert_eq!(next_branch(&Vec::<DerivationPath>::new(), 2).unwrap(), 0);
/// ```
pub fn next_branch<'a, I>(existing: I, depth: usize) -> Result<u32, AllocationError>
where
    I: IntoIterator<Item = &'a DerivationPath>,
{
    if depth == 0 {
        return Err(AllocationError::InvalidDepth(depth));
    }

    match existing.into_iter().filter_map(|path| path.segment(depth)).max() {
        None => Ok(0),
        Some(highest) => highest
            .checked_add(1)
            .ok_or(AllocationError::BranchSpaceExhausted { depth }),
    }
}

/// Where currency branches live in the tree: a fixed root plus the depth
/// of the branch segment directly beneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationLayout {
    root: DerivationPath,
    branch_depth: usize,
}

impl DerivationLayout {
    /// Create a layout. The branch segment must sit directly below `root`.
    pub fn new(root: DerivationPath, branch_depth: usize) -> Result<Self, AllocationError> {
        if branch_depth == 0 || branch_depth != root.len() + 1 {
            return Err(AllocationError::InvalidDepth(branch_depth));
        }
        Ok(Self { root, branch_depth })
    }

    pub fn root(&self) -> &DerivationPath {
        &self.root
    }

    pub fn branch_depth(&self) -> usize {
        self.branch_depth
    }

    /// Full path of a given branch.
    pub fn branch_path(&self, branch: u32) -> DerivationPath {
        self.root.child(branch)
    }

    /// Branch number of a path, if it reaches the branch depth.
    pub fn branch_of(&self, path: &DerivationPath) -> Option<u32> {
        path.segment(self.branch_depth)
    }

    /// Path for the next currency given everything recorded so far.
    pub fn next_path(&self, snapshot: &RecordSnapshot) -> Result<DerivationPath, AllocationError> {
        let branch = next_branch(snapshot.paths(), self.branch_depth)?;
        Ok(self.branch_path(branch))
    }
}

impl Default for DerivationLayout {
    fn default() -> Self {
        Self {
            root: DerivationPath::from_segments(DEFAULT_ROOT_SEGMENTS.to_vec()),
            branch_depth: DEFAULT_BRANCH_DEPTH,
        }
    }
}

/// Immutable view of the wallet records known during one startup run.
///
/// Cloning is cheap. [`with_record`](Self::with_record) returns a new
/// snapshot and leaves the receiver untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSnapshot {
    records: Arc<BTreeMap<String, WalletRecord>>,
}

impl RecordSnapshot {
    /// Build a snapshot from loaded records. A later record for the same
    /// symbol replaces an earlier one.
    pub fn from_records(records: impl IntoIterator<Item = WalletRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.symbol.clone(), record))
            .collect();
        Self {
            records: Arc::new(records),
        }
    }

    /// A new snapshot that also contains `record`.
    pub fn with_record(&self, record: WalletRecord) -> Self {
        let mut records = BTreeMap::clone(&self.records);
        records.insert(record.symbol.clone(), record);
        Self {
            records: Arc::new(records),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&WalletRecord> {
        self.records.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.records.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in symbol order.
    pub fn records(&self) -> impl Iterator<Item = &WalletRecord> {
        self.records.values()
    }

    /// Derivation paths of every record.
    pub fn paths(&self) -> impl Iterator<Item = &DerivationPath> {
        self.records.values().map(|record| &record.derivation_path)
    }
}
