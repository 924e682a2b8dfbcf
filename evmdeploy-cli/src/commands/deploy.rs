// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{path::PathBuf, time::Duration};

use alloy::{
    dyn_abi::{DynSolValue, Specifier},
    providers::WalletProvider,
};
use eyre::{bail, Context};
use evmdeploy_tools::{
    core::{
        artifact::Artifact,
        chain::AlloyChain,
        deployment::{format_value, DeploymentConfig, DeploymentSpec, Outcome},
        records::FileStore,
    },
    ops,
};

use crate::{
    common_args::{AuthArgs, ProviderArgs},
    error::EvmDeployResult,
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Contract name, matching the artifact file name.
    #[arg(long, default_value = "FarmContract")]
    contract: String,
    /// Directory holding compiled artifact JSON files.
    #[arg(long, default_value = "artifacts")]
    artifacts_dir: PathBuf,
    /// Directory holding per-network deployment records.
    #[arg(long, default_value = "deployments")]
    records_dir: PathBuf,
    /// Network name used to namespace deployment records.
    #[arg(long, default_value = "localhost")]
    network: String,
    /// The constructor arguments.
    #[arg(
        long,
        num_args(0..),
        value_name = "ARGS",
        allow_hyphen_values = true,
    )]
    constructor_args: Vec<String>,
    /// Zero-argument view function read back to confirm the deployment.
    #[arg(long, default_value = "contractCount")]
    verify_call: String,
    /// Only perform gas estimation.
    #[arg(long)]
    estimate_gas: bool,
    /// Seconds to wait for the deploy transaction to confirm.
    #[arg(long, default_value = "300")]
    confirmation_timeout_secs: u64,

    /// Wallet source to use.
    #[command(flatten)]
    auth: AuthArgs,
    #[command(flatten)]
    provider: ProviderArgs,
}

pub async fn exec(args: Args) -> EvmDeployResult {
    let provider = args.provider.build_provider_with_wallet(&args.auth).await?;

    let artifact = Artifact::load(&args.artifacts_dir, &args.contract)?;
    let constructor_args = coerce_constructor_args(&artifact, &args.constructor_args)?;
    let spec = DeploymentSpec::builder()
        .artifact(artifact)
        .constructor_args(constructor_args)
        .network(args.network)
        .deployer(provider.default_signer_address())
        .verify_call(args.verify_call)
        .build();
    let config = DeploymentConfig {
        estimate_gas: args.estimate_gas,
        max_fee_per_gas_wei: args.auth.get_max_fee_per_gas_wei()?,
    };

    let chain = AlloyChain::new(provider)
        .with_confirmation_timeout(Duration::from_secs(args.confirmation_timeout_secs));
    let store = FileStore::new(&args.records_dir);

    match ops::deploy(&spec, &config, &chain, &store).await {
        Ok(outcome) => {
            render(&outcome);
            Ok(())
        }
        Err(err) => {
            render(&Outcome::from_error(&err));
            Err(err.into())
        }
    }
}

/// Parses string arguments against the ABI constructor parameter types.
fn coerce_constructor_args(artifact: &Artifact, args: &[String]) -> eyre::Result<Vec<DynSolValue>> {
    let Some(constructor) = artifact.constructor() else {
        if args.is_empty() {
            return Ok(vec![]);
        }
        bail!("{} has no constructor but arguments were given", artifact.name);
    };
    if constructor.inputs.len() != args.len() {
        bail!(
            "mismatch number of constructor arguments (want {:?} ({}); got {})",
            constructor.inputs,
            constructor.inputs.len(),
            args.len(),
        );
    }

    let mut values = Vec::with_capacity(args.len());
    for (arg, param) in args.iter().zip(constructor.inputs.iter()) {
        let ty = param
            .resolve()
            .wrap_err_with(|| format!("could not resolve constructor arg: {param}"))?;
        let value = ty
            .coerce_str(arg)
            .wrap_err_with(|| format!("could not parse constructor arg: {param}"))?;
        values.push(value);
    }
    Ok(values)
}

/// Prints the structured terminal state of the run.
fn render(outcome: &Outcome) {
    if let Some(address) = outcome.address {
        println!("address: {address}");
    }
    if let Some(value) = &outcome.verification_value {
        println!("verification: {}", format_value(value));
    }
    if let Some(kind) = outcome.error {
        println!("error: {kind}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{json_abi::JsonAbi, primitives::U256};

    fn artifact(abi: &str) -> Artifact {
        Artifact {
            name: "Counter".to_owned(),
            abi: serde_json::from_str::<JsonAbi>(abi).unwrap(),
            bytecode: vec![0x60, 0x80],
        }
    }

    const COUNTER_ABI: &str = r#"[
        {
            "inputs": [
                {"internalType": "uint256", "name": "start", "type": "uint256"},
                {"internalType": "address", "name": "owner", "type": "address"}
            ],
            "stateMutability": "nonpayable",
            "type": "constructor"
        }
    ]"#;

    #[test]
    fn coerces_typed_arguments() {
        let artifact = artifact(COUNTER_ABI);
        let values = coerce_constructor_args(
            &artifact,
            &[
                "7".to_owned(),
                "0x000000000000000000000000000000000000dEaD".to_owned(),
            ],
        )
        .unwrap();
        assert_eq!(values.len(), 2);
        assert!(matches!(&values[0], DynSolValue::Uint(v, 256) if *v == U256::from(7)));
        assert!(matches!(&values[1], DynSolValue::Address(_)));
    }

    #[test]
    fn rejects_wrong_arity_and_bad_values() {
        let artifact = artifact(COUNTER_ABI);
        assert!(coerce_constructor_args(&artifact, &["7".to_owned()]).is_err());
        assert!(coerce_constructor_args(
            &artifact,
            &["not a number".to_owned(), "0xdead".to_owned()]
        )
        .is_err());
    }

    #[test]
    fn no_constructor_allows_only_empty_args() {
        let artifact = Artifact {
            name: "Farm".to_owned(),
            abi: JsonAbi::new(),
            bytecode: vec![0x60],
        };
        assert!(coerce_constructor_args(&artifact, &[]).unwrap().is_empty());
        assert!(coerce_constructor_args(&artifact, &["1".to_owned()]).is_err());
    }
}
