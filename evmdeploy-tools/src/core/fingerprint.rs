// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Constructor argument fingerprints.
//!
//! A fingerprint is the Keccak-256 digest of the ABI encoding of the
//! constructor arguments, in order. Deployment records carry the fingerprint
//! of the arguments they were created with, so a later run can tell whether an
//! existing deployment still matches the requested parameters.

use std::fmt;

use alloy::dyn_abi::DynSolValue;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tiny_keccak::{Hasher, Keccak};

use crate::utils::decode0x;

/// Keccak-256 digest identifying a constructor argument sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

/// Hashes the ABI encoding of `args`. An empty argument list hashes the
/// empty input, so argument-free contracts still get a stable fingerprint.
pub fn fingerprint(args: &[DynSolValue]) -> Fingerprint {
    let mut keccak = Keccak::v256();
    for arg in args {
        keccak.update(&arg.abi_encode());
    }
    let mut digest = [0u8; 32];
    keccak.finalize(&mut digest);
    Fingerprint(digest)
}

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode0x(&text).map_err(de::Error::custom)?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| de::Error::custom("fingerprint must be 32 bytes"))?;
        Ok(Fingerprint(digest))
    }
}
