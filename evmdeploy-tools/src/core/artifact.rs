// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Compiled contract artifacts.
//!
//! An artifact is the output of an external compiler: creation bytecode plus
//! the JSON ABI describing the contract interface. Artifacts are read from
//! `<dir>/<ContractName>.json` files with the usual `contractName`/`abi`/
//! `bytecode` fields.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::json_abi::{Constructor, Function, JsonAbi};
use serde::Deserialize;

use crate::utils::decode0x;

/// Bytecode and interface for a named contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    abi: JsonAbi,
    bytecode: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("malformed bytecode in artifact {path}: {source}")]
    Bytecode {
        path: PathBuf,
        source: hex::FromHexError,
    },
    #[error("artifact is for contract {found}, expected {expected}")]
    NameMismatch { expected: String, found: String },
    #[error("artifact for {0} has empty bytecode (interface-only contract?)")]
    EmptyBytecode(String),
}

impl Artifact {
    /// Loads the artifact for `contract` from `artifacts_dir`.
    pub fn load(artifacts_dir: impl AsRef<Path>, contract: &str) -> Result<Self, ArtifactError> {
        let path = artifacts_dir.as_ref().join(format!("{contract}.json"));
        let text = fs::read_to_string(&path).map_err(|source| ArtifactError::Read {
            path: path.clone(),
            source,
        })?;
        let file: ArtifactFile =
            serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
                path: path.clone(),
                source,
            })?;
        if file.contract_name != contract {
            return Err(ArtifactError::NameMismatch {
                expected: contract.to_owned(),
                found: file.contract_name,
            });
        }
        let bytecode =
            decode0x(&file.bytecode).map_err(|source| ArtifactError::Bytecode { path, source })?;
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(file.contract_name));
        }
        Ok(Self {
            name: file.contract_name,
            abi: file.abi,
            bytecode,
        })
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.abi.constructor()
    }

    /// Looks up a function by name, taking the first overload.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.function(name).and_then(|fns| fns.first())
    }
}
