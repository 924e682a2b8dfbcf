// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use alloy::{
    dyn_abi::JsonAbiExt,
    network::TransactionBuilder,
    rpc::types::TransactionRequest,
};

use super::{DeploymentConfig, DeploymentError, DeploymentSpec};
use crate::core::chain::{ChainClient, ChainError, Confirmation};

/// A contract-creation transaction ready for submission.
#[derive(Debug)]
pub struct DeploymentRequest {
    tx: TransactionRequest,
    max_fee_per_gas_wei: Option<u128>,
}

impl DeploymentRequest {
    /// Builds the creation transaction: bytecode followed by the ABI-encoded
    /// constructor arguments, sent from the deployer identity.
    pub fn new(spec: &DeploymentSpec, config: &DeploymentConfig) -> Result<Self, DeploymentError> {
        let init_code = init_code(spec)?;
        let tx = TransactionRequest::default()
            .with_from(spec.deployer)
            .with_deploy_code(init_code);
        Ok(Self {
            tx,
            max_fee_per_gas_wei: config.max_fee_per_gas_wei,
        })
    }

    pub async fn estimate_gas(&self, chain: &impl ChainClient) -> Result<u64, ChainError> {
        chain.estimate_gas(&self.tx).await
    }

    pub async fn fee_per_gas(&self, chain: &impl ChainClient) -> Result<u128, ChainError> {
        match self.max_fee_per_gas_wei {
            Some(wei) => Ok(wei),
            None => chain.gas_price().await,
        }
    }

    /// Submits the transaction and blocks until it confirms or is rejected.
    pub async fn exec(self, chain: &impl ChainClient) -> Result<Confirmation, ChainError> {
        let gas = self.estimate_gas(chain).await?;
        let max_fee_per_gas = self.fee_per_gas(chain).await?;

        let mut tx = self.tx;
        tx.gas = Some(gas);
        tx.max_fee_per_gas = Some(max_fee_per_gas);
        tx.max_priority_fee_per_gas = Some(0);

        chain.submit_deployment(tx).await
    }
}

fn init_code(spec: &DeploymentSpec) -> Result<Vec<u8>, DeploymentError> {
    let mut code = spec.artifact.bytecode.clone();
    match spec.artifact.constructor() {
        Some(constructor) => {
            if constructor.inputs.len() != spec.constructor_args.len() {
                return Err(DeploymentError::InvalidConstructor(format!(
                    "mismatch number of constructor arguments (want {}; got {})",
                    constructor.inputs.len(),
                    spec.constructor_args.len(),
                )));
            }
            let encoded = constructor
                .abi_encode_input_raw(&spec.constructor_args)
                .map_err(|err| DeploymentError::InvalidConstructor(err.to_string()))?;
            code.extend(encoded);
        }
        None if !spec.constructor_args.is_empty() => {
            return Err(DeploymentError::InvalidConstructor(format!(
                "{} has no constructor but {} arguments were given",
                spec.contract_name(),
                spec.constructor_args.len(),
            )));
        }
        None => {}
    }
    Ok(code)
}
