//! Integration test suite for Sprig.
//!
//! Exercises the full startup path against a real RocksDB store and checks
//! branch allocation properties under randomized currency sets.

pub mod helpers;
