// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::fmt;
use std::process::ExitCode;

pub type EvmDeployResult = Result<(), EvmDeployError>;

#[derive(Debug)]
pub struct EvmDeployError {
    error: eyre::Error,
    exit_code: ExitCode,
}

impl EvmDeployError {
    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }
}

impl fmt::Display for EvmDeployError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl From<std::io::Error> for EvmDeployError {
    fn from(err: std::io::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<eyre::Error> for EvmDeployError {
    fn from(error: eyre::Error) -> Self {
        Self {
            error,
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<evmdeploy_tools::Error> for EvmDeployError {
    fn from(err: evmdeploy_tools::Error) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<evmdeploy_tools::core::artifact::ArtifactError> for EvmDeployError {
    fn from(err: evmdeploy_tools::core::artifact::ArtifactError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<evmdeploy_tools::core::deployment::DeploymentError> for EvmDeployError {
    fn from(err: evmdeploy_tools::core::deployment::DeploymentError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<evmdeploy_tools::core::network::NetworkError> for EvmDeployError {
    fn from(err: evmdeploy_tools::core::network::NetworkError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl From<evmdeploy_tools::core::records::StoreError> for EvmDeployError {
    fn from(err: evmdeploy_tools::core::records::StoreError) -> Self {
        Self {
            error: err.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}
