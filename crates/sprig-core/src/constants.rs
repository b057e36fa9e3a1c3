//! Tree layout constants shared by every crate in the workspace.

/// Segments of the default root under which currency branches are allocated (`m/0`).
pub const DEFAULT_ROOT_SEGMENTS: &[u32] = &[0];

/// Position of the branch segment in the default layout, counted from `m`.
///
/// # Examples
///
/// ```
/// use sprig_core::constants::{DEFAULT_BRANCH_DEPTH, DEFAULT_ROOT_SEGMENTS};
/// assert_eq!(DEFAULT_BRANCH_DEPTH, DEFAULT_ROOT_SEGMENTS.len() + 1);
/// ```
pub const DEFAULT_BRANCH_DEPTH: usize = 2;

/// Path prefix marking the master key.
pub const MASTER_PREFIX: &str = "m";

/// Index stored in a freshly created record, before any address is issued.
pub const INITIAL_USED_INDEX: u32 = 0;
