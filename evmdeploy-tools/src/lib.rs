// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Tools for deploying contracts to EVM chains.
//!
//! The workflow implemented here is idempotent deploy-and-verify: consult the
//! persisted deployment records for the target network, deploy only when no
//! matching deployment exists, then read back contract state to confirm the
//! deployment is live. See [`ops::deploy`] for the one-call entry point.

#[macro_use]
mod macros;

pub mod core;
pub(crate) mod error;
pub mod ops;
pub mod utils;

pub use error::{Error, Result};
