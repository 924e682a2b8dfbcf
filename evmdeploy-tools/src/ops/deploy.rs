// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Contract deployment.

use crate::core::{
    chain::ChainClient,
    deployment::{
        self, format_value, resolve, DeploymentConfig, DeploymentError, DeploymentRequest,
        DeploymentSpec, Outcome, ResolutionDecision, Verification,
    },
    records::RecordStore,
};
use crate::utils::color::DebugColor;

/// Deploys a contract if no matching deployment is recorded, then verifies it.
///
/// This is the whole run: resolve, submit-or-skip, confirm, acquire a handle,
/// read back. Returns the structured outcome for the reporting sink; fatal
/// failures surface as [`DeploymentError`].
pub async fn deploy(
    spec: &DeploymentSpec,
    config: &DeploymentConfig,
    chain: &impl ChainClient,
    store: &impl RecordStore,
) -> Result<Outcome, DeploymentError> {
    let decision = resolve(spec, store)?;

    if config.estimate_gas {
        return estimate(spec, config, decision, chain).await;
    }

    let deployment = deployment::execute(spec, decision, config, chain, store).await?;
    match &deployment.verification {
        Verification::Confirmed(value) => {
            mintln!("{} deployed successfully!", spec.contract_name());
            greyln!("{}: {}", spec.verify_call, format_value(value));
        }
        Verification::Failed(reason) => {
            warn!(@yellow, "deployment stands, but verification failed: {reason}");
        }
    }
    Ok(deployment.outcome())
}

async fn estimate(
    spec: &DeploymentSpec,
    config: &DeploymentConfig,
    decision: ResolutionDecision,
    chain: &impl ChainClient,
) -> Result<Outcome, DeploymentError> {
    if let ResolutionDecision::Reuse(address) = decision {
        greyln!(
            "{} is already deployed at {}, nothing to estimate",
            spec.contract_name(),
            address.debug_lavender()
        );
        return Ok(Outcome {
            address: Some(address),
            ..Default::default()
        });
    }

    let request = DeploymentRequest::new(spec, config)?;
    let gas = request
        .estimate_gas(chain)
        .await
        .map_err(DeploymentError::TransactionRejected)?;
    let fee_per_gas = request
        .fee_per_gas(chain)
        .await
        .map_err(DeploymentError::TransactionRejected)?;
    greyln!("estimated deployment gas: {gas} at {fee_per_gas} wei per gas");
    Ok(Outcome::default())
}
