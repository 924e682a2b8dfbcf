// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{collections::HashMap, sync::Mutex};

use super::{DeploymentRecord, RecordStore, StoreError};

/// In-memory record store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String), DeploymentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), DeploymentRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_owned()))
    }
}

fn key(network: &str, contract: &str) -> (String, String) {
    (network.to_owned(), contract.to_owned())
}

impl RecordStore for MemoryStore {
    fn get(&self, network: &str, contract: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        Ok(self.lock()?.get(&key(network, contract)).cloned())
    }

    fn put(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError> {
        self.lock()?.insert(key(network, contract), record.clone());
        Ok(())
    }

    fn put_if_absent(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        if records.contains_key(&key(network, contract)) {
            return Err(StoreError::AlreadyExists {
                network: network.to_owned(),
                contract: contract.to_owned(),
            });
        }
        records.insert(key(network, contract), record.clone());
        Ok(())
    }
}
