//! # sprig-core
//! Foundation types, branch allocation and collaborator traits for Sprig.

pub mod allocator;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
