// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Deployment resolution.
//!
//! Decides whether a run needs a fresh deployment or can reuse a recorded
//! one. Pure lookup plus fingerprint comparison; the only side effect is the
//! store read, and a failing store aborts the run before anything is sent.

use alloy::primitives::Address;

use super::{DeploymentError, DeploymentSpec};
use crate::core::records::RecordStore;
use crate::utils::color::DebugColor;

/// Outcome of consulting the deployment records for a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionDecision {
    /// A live deployment with a matching argument fingerprint exists.
    Reuse(Address),
    /// No usable record; a fresh deployment is required.
    DeployFresh,
}

pub fn resolve(
    spec: &DeploymentSpec,
    store: &impl RecordStore,
) -> Result<ResolutionDecision, DeploymentError> {
    if spec.contract_name().is_empty() {
        return Err(DeploymentError::EmptyContractName);
    }

    let record = store
        .get(&spec.network, spec.contract_name())
        .map_err(DeploymentError::StoreUnavailable)?;
    Ok(match record {
        None => ResolutionDecision::DeployFresh,
        Some(record) if record.fingerprint == spec.fingerprint() => {
            ResolutionDecision::Reuse(record.address)
        }
        Some(record) => {
            debug!(
                @grey,
                "record at {} has fingerprint {}, want {}; redeploying",
                record.address.debug_lavender(),
                record.fingerprint,
                spec.fingerprint()
            );
            ResolutionDecision::DeployFresh
        }
    })
}
