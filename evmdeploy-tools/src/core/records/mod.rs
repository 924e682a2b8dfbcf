// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Persisted deployment records.
//!
//! One record per `(network, contract)` pair. A record is only reused when
//! its constructor-argument fingerprint matches the requested deployment;
//! otherwise it is superseded by the next successful deploy.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::core::fingerprint::Fingerprint;

pub use file::FileStore;
pub use memory::MemoryStore;

mod file;
mod memory;

/// What a past deployment left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract: String,
    pub address: Address,
    pub fingerprint: Fingerprint,
    pub network: String,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("a record already exists for {network}/{contract}")]
    AlreadyExists { network: String, contract: String },
}

/// Key-value persistence for deployment records.
///
/// `put` has last-writer-wins semantics; `put_if_absent` has at-most-one-winner
/// semantics and is the per-key guard for concurrent fresh-deploy attempts.
pub trait RecordStore {
    fn get(&self, network: &str, contract: &str) -> Result<Option<DeploymentRecord>, StoreError>;

    fn put(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError>;

    /// Writes the record only if none exists yet for the key, failing with
    /// [`StoreError::AlreadyExists`] otherwise.
    fn put_if_absent(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError>;
}
