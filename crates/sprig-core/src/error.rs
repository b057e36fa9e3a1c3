//! Error types for the Sprig core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("invalid derivation depth: {0}")] InvalidDepth(usize),
    #[error("branch space exhausted at depth {depth}")] BranchSpaceExhausted { depth: usize },
    #[error("invalid derivation path: {0}")] InvalidPath(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage: {0}")] Storage(String),
    #[error("serialization: {0}")] Serialization(String),
    #[error("record already exists for {0}")] DuplicateRecord(String),
    #[error("no record for {0}")] UnknownRecord(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport: {0}")] Transport(String),
    #[error("rpc: {0}")] Rpc(String),
    #[error("invalid response: {0}")] InvalidResponse(String),
}
