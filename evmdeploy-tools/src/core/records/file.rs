// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use tempfile::NamedTempFile;

use super::{DeploymentRecord, RecordStore, StoreError};

/// Record store backed by `<root>/<network>/<Contract>.json` files, the
/// layout used by hardhat-deploy style deployment directories.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, network: &str, contract: &str) -> PathBuf {
        self.root.join(network).join(format!("{contract}.json"))
    }

    fn prepare_dir(&self, network: &str) -> Result<(), StoreError> {
        fs::create_dir_all(self.root.join(network)).map_err(unavailable)
    }
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

impl RecordStore for FileStore {
    fn get(&self, network: &str, contract: &str) -> Result<Option<DeploymentRecord>, StoreError> {
        let path = self.path(network, contract);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(unavailable(err)),
        };
        serde_json::from_str(&text).map(Some).map_err(unavailable)
    }

    fn put(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError> {
        self.prepare_dir(network)?;
        let path = self.path(network, contract);
        let json = serde_json::to_vec_pretty(record).map_err(unavailable)?;

        // Write-then-rename so readers never observe a half-written record.
        // Each writer gets its own temp file, so concurrent puts for the same
        // key each land a complete record and the last rename wins.
        let mut tmp = NamedTempFile::new_in(self.root.join(network)).map_err(unavailable)?;
        tmp.write_all(&json).map_err(unavailable)?;
        tmp.persist(&path).map_err(unavailable)?;
        Ok(())
    }

    fn put_if_absent(
        &self,
        network: &str,
        contract: &str,
        record: &DeploymentRecord,
    ) -> Result<(), StoreError> {
        self.prepare_dir(network)?;
        let path = self.path(network, contract);
        let json = serde_json::to_vec_pretty(record).map_err(unavailable)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists {
                    network: network.to_owned(),
                    contract: contract.to_owned(),
                });
            }
            Err(err) => return Err(unavailable(err)),
        };
        file.write_all(&json).map_err(unavailable)
    }
}
