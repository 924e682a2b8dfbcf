// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("no rpc endpoint configured")]
    MissingEndpoint,
    #[error("endpoint must be an http(s) or ws(s) url, got {0}")]
    InvalidEndpoint(String),
}

pub fn check_endpoint(endpoint: &str) -> Result<(), NetworkError> {
    if endpoint.is_empty() {
        return Err(NetworkError::MissingEndpoint);
    }
    let supported = ["http://", "https://", "ws://", "wss://"];
    if supported.iter().any(|scheme| endpoint.starts_with(scheme)) {
        Ok(())
    } else {
        Err(NetworkError::InvalidEndpoint(endpoint.to_owned()))
    }
}
