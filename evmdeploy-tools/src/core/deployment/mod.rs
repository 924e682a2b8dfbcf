// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Idempotent contract deployment.
//!
//! A run is strictly sequential: resolve against the record store, submit the
//! creation transaction only when needed, wait for confirmation, persist the
//! record, then verify the deployment through a read-only call. Verification
//! failure does not unwind the deployment; every other failure is fatal to
//! the run and leaves no new record behind.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use typed_builder::TypedBuilder;

use crate::core::{
    artifact::Artifact,
    chain::{ChainClient, ChainError, ContractHandle, HandleError},
    fingerprint::{fingerprint, Fingerprint},
    records::{DeploymentRecord, RecordStore, StoreError},
};
use crate::utils::color::DebugColor;

pub use request::DeploymentRequest;
pub use resolver::{resolve, ResolutionDecision};

pub mod request;
pub mod resolver;

/// Everything needed to deploy one contract once. Immutable per invocation;
/// built by the caller from external artifact and identity providers.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct DeploymentSpec {
    pub artifact: Artifact,
    #[builder(default)]
    pub constructor_args: Vec<DynSolValue>,
    /// Network name used to namespace deployment records.
    pub network: String,
    /// Identity the creation transaction is sent from.
    pub deployer: Address,
    /// Zero-argument view function read back to confirm the deployment.
    pub verify_call: String,
}

impl DeploymentSpec {
    pub fn contract_name(&self) -> &str {
        &self.artifact.name
    }

    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.constructor_args)
    }
}

#[derive(Debug, Default)]
pub struct DeploymentConfig {
    /// Only estimate gas, do not submit.
    pub estimate_gas: bool,
    pub max_fee_per_gas_wei: Option<u128>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("contract name must not be empty")]
    EmptyContractName,
    #[error("invalid constructor: {0}")]
    InvalidConstructor(String),
    #[error("{0}")]
    StoreUnavailable(StoreError),
    #[error("failed to get balance")]
    FailedToGetBalance,
    #[error(
        "not enough funds in account {} to pay for deployment\nbalance {} < {} wei",
        .from.debug_red(),
        .balance.debug_red(),
        .required.debug_red(),
    )]
    NotEnoughFunds {
        from: Address,
        balance: U256,
        required: U256,
    },
    #[error("deploy transaction rejected: {0}")]
    TransactionRejected(ChainError),
    /// The transaction may still confirm later; callers should re-resolve
    /// before retrying instead of assuming failure.
    #[error("deploy transaction unresolved: {0}")]
    TransactionTimeout(ChainError),
    #[error("failed to acquire contract handle: {0}")]
    HandleAcquisitionFailed(HandleError),
}

impl DeploymentError {
    /// Stable kind name for reporting sinks.
    pub fn kind(&self) -> &'static str {
        use DeploymentError::*;
        match self {
            EmptyContractName | InvalidConstructor(_) => "invalid-spec",
            StoreUnavailable(_) => "store-unavailable",
            FailedToGetBalance | NotEnoughFunds { .. } | TransactionRejected(_) => {
                "transaction-rejected"
            }
            TransactionTimeout(_) => "transaction-timeout",
            HandleAcquisitionFailed(_) => "handle-acquisition-failed",
        }
    }
}

/// Result of the read-back through the contract handle.
#[derive(Debug, Clone)]
pub enum Verification {
    Confirmed(DynSolValue),
    /// The read call errored. The deployment itself still stands.
    Failed(String),
}

/// A deployment that reached an address, fresh or reused.
#[derive(Debug)]
pub struct VerifiedDeployment {
    pub address: Address,
    pub verification: Verification,
}

impl VerifiedDeployment {
    pub fn outcome(&self) -> Outcome {
        let (verification_value, error) = match &self.verification {
            Verification::Confirmed(value) => (Some(value.clone()), None),
            Verification::Failed(_) => (None, Some("verification-call-failed")),
        };
        Outcome {
            address: Some(self.address),
            verification_value,
            error,
        }
    }
}

/// Structured terminal state of a run, for reporting sinks.
#[derive(Debug, Default)]
pub struct Outcome {
    pub address: Option<Address>,
    pub verification_value: Option<DynSolValue>,
    pub error: Option<&'static str>,
}

impl Outcome {
    pub fn from_error(err: &DeploymentError) -> Self {
        Self {
            address: None,
            verification_value: None,
            error: Some(err.kind()),
        }
    }
}

/// Renders a decoded call result for status lines.
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            let inner: Vec<_> = values.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        DynSolValue::Tuple(values) => {
            let inner: Vec<_> = values.iter().map(format_value).collect();
            format!("({})", inner.join(", "))
        }
        other => format!("{other:?}"),
    }
}

/// Carries out a resolved deployment and verifies it.
///
/// `Reuse` skips submission entirely; `DeployFresh` submits one creation
/// transaction and persists one record. Both paths end with the read-back
/// through the contract handle.
pub async fn execute(
    spec: &DeploymentSpec,
    decision: ResolutionDecision,
    config: &DeploymentConfig,
    chain: &impl ChainClient,
    store: &impl RecordStore,
) -> Result<VerifiedDeployment, DeploymentError> {
    let address = match decision {
        ResolutionDecision::Reuse(address) => {
            info!(@grey, "reusing deployment at {}", address.debug_lavender());
            address
        }
        ResolutionDecision::DeployFresh => deploy_fresh(spec, config, chain, store).await?,
    };

    let handle = ContractHandle::acquire(chain, &spec.artifact.abi, address, &spec.verify_call)
        .await
        .map_err(DeploymentError::HandleAcquisitionFailed)?;

    let verification = match handle.read().await {
        Ok(value) => Verification::Confirmed(value),
        Err(err) => {
            warn!(@yellow, "verification call failed: {err}");
            Verification::Failed(err.to_string())
        }
    };

    Ok(VerifiedDeployment {
        address: handle.address(),
        verification,
    })
}

async fn deploy_fresh(
    spec: &DeploymentSpec,
    config: &DeploymentConfig,
    chain: &impl ChainClient,
    store: &impl RecordStore,
) -> Result<Address, DeploymentError> {
    let request = DeploymentRequest::new(spec, config)?;

    // Check funds before broadcasting anything.
    let balance = chain
        .balance(spec.deployer)
        .await
        .or(Err(DeploymentError::FailedToGetBalance))?;
    let gas = request
        .estimate_gas(chain)
        .await
        .map_err(DeploymentError::TransactionRejected)?;
    let fee_per_gas = request
        .fee_per_gas(chain)
        .await
        .map_err(DeploymentError::TransactionRejected)?;
    let required = U256::from(gas) * U256::from(fee_per_gas);
    if balance < required {
        return Err(DeploymentError::NotEnoughFunds {
            from: spec.deployer,
            balance,
            required,
        });
    }

    let confirmation = request.exec(chain).await.map_err(|err| match err {
        ChainError::ConfirmationTimeout { .. } => DeploymentError::TransactionTimeout(err),
        err => DeploymentError::TransactionRejected(err),
    })?;

    info!(@grey, "deployed code at address: {}", confirmation.address.debug_lavender());
    info!(@grey, "deployment tx hash: {}", confirmation.tx_hash.debug_lavender());
    debug!(@grey, "gas used: {}", confirmation.gas_used);

    let record = DeploymentRecord {
        contract: spec.contract_name().to_owned(),
        address: confirmation.address,
        fingerprint: spec.fingerprint(),
        network: spec.network.clone(),
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
    };
    match store.put_if_absent(&spec.network, spec.contract_name(), &record) {
        Ok(()) => {}
        Err(StoreError::AlreadyExists { .. }) => {
            // Superseding a stale record, or we lost the creation race; either
            // way the last successful confirmation wins.
            store
                .put(&spec.network, spec.contract_name(), &record)
                .map_err(DeploymentError::StoreUnavailable)?;
        }
        Err(err) => return Err(DeploymentError::StoreUnavailable(err)),
    }

    Ok(confirmation.address)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{
        chain::Confirmation,
        records::MemoryStore,
    };
    use alloy::{
        json_abi::JsonAbi,
        primitives::{B256, TxHash},
        rpc::types::TransactionRequest,
    };
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicU32, Ordering},
            Mutex,
        },
    };

    pub(crate) const DEPLOYER: Address = Address::repeat_byte(0x42);

    const FARM_ABI: &str = r#"[
        {
            "inputs": [],
            "name": "contractCount",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    const COUNTER_ABI: &str = r#"[
        {
            "inputs": [{"internalType": "uint256", "name": "start", "type": "uint256"}],
            "stateMutability": "nonpayable",
            "type": "constructor"
        },
        {
            "inputs": [],
            "name": "number",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    pub(crate) fn uint(value: u64) -> DynSolValue {
        DynSolValue::Uint(U256::from(value), 256)
    }

    fn artifact(name: &str, abi: &str) -> Artifact {
        Artifact {
            name: name.to_owned(),
            abi: serde_json::from_str::<JsonAbi>(abi).unwrap(),
            bytecode: vec![0x60, 0x80, 0x60, 0x40, 0x52],
        }
    }

    /// The concrete scenario: FarmContract, no constructor args, local-dev.
    pub(crate) fn farm_spec() -> DeploymentSpec {
        DeploymentSpec::builder()
            .artifact(artifact("FarmContract", FARM_ABI))
            .network("local-dev")
            .deployer(DEPLOYER)
            .verify_call("contractCount")
            .build()
    }

    pub(crate) fn spec_with_constructor(args: Vec<DynSolValue>) -> DeploymentSpec {
        DeploymentSpec::builder()
            .artifact(artifact("Counter", COUNTER_ABI))
            .constructor_args(args)
            .network("local-dev")
            .deployer(DEPLOYER)
            .verify_call("number")
            .build()
    }

    enum SubmitBehavior {
        Confirm,
        Revert,
        Timeout,
    }

    pub(crate) struct MockChain {
        deploy_address: Address,
        balance: U256,
        behavior: SubmitBehavior,
        fail_view: bool,
        count: U256,
        pub(crate) submissions: AtomicU32,
        code: Mutex<HashSet<Address>>,
    }

    impl MockChain {
        pub(crate) fn confirming() -> Self {
            Self {
                deploy_address: Address::repeat_byte(0xab),
                balance: U256::from(1_000_000u64),
                behavior: SubmitBehavior::Confirm,
                fail_view: false,
                count: U256::ZERO,
                submissions: AtomicU32::new(0),
                code: Mutex::new(HashSet::new()),
            }
        }

        fn reverting() -> Self {
            Self {
                behavior: SubmitBehavior::Revert,
                ..Self::confirming()
            }
        }

        fn timing_out() -> Self {
            Self {
                behavior: SubmitBehavior::Timeout,
                ..Self::confirming()
            }
        }

        fn broke() -> Self {
            Self {
                balance: U256::ZERO,
                ..Self::confirming()
            }
        }

        fn failing_view() -> Self {
            Self {
                fail_view: true,
                ..Self::confirming()
            }
        }

        fn deploying_at(mut self, address: Address) -> Self {
            self.deploy_address = address;
            self
        }

        fn with_code(self, address: Address) -> Self {
            self.code.lock().unwrap().insert(address);
            self
        }

        fn tx_hash(&self) -> TxHash {
            B256::repeat_byte(0x11)
        }
    }

    impl ChainClient for MockChain {
        async fn balance(&self, _address: Address) -> Result<U256, ChainError> {
            Ok(self.balance)
        }

        async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, ChainError> {
            Ok(100_000)
        }

        async fn gas_price(&self) -> Result<u128, ChainError> {
            Ok(1)
        }

        async fn submit_deployment(
            &self,
            _tx: TransactionRequest,
        ) -> Result<Confirmation, ChainError> {
            match self.behavior {
                SubmitBehavior::Confirm => {
                    self.submissions.fetch_add(1, Ordering::SeqCst);
                    self.code.lock().unwrap().insert(self.deploy_address);
                    Ok(Confirmation {
                        address: self.deploy_address,
                        tx_hash: self.tx_hash(),
                        block_number: Some(1),
                        gas_used: 90_000,
                    })
                }
                SubmitBehavior::Revert => Err(ChainError::Reverted {
                    tx_hash: self.tx_hash(),
                }),
                SubmitBehavior::Timeout => Err(ChainError::ConfirmationTimeout {
                    tx_hash: self.tx_hash(),
                }),
            }
        }

        async fn has_code(&self, address: Address) -> Result<bool, ChainError> {
            Ok(self.code.lock().unwrap().contains(&address))
        }

        async fn view_call(
            &self,
            _address: Address,
            _function: &alloy::json_abi::Function,
        ) -> Result<DynSolValue, ChainError> {
            if self.fail_view {
                return Err(ChainError::CallReverted("node said no".to_owned()));
            }
            Ok(DynSolValue::Uint(self.count, 256))
        }
    }

    async fn run(
        spec: &DeploymentSpec,
        chain: &MockChain,
        store: &MemoryStore,
    ) -> Result<VerifiedDeployment, DeploymentError> {
        let decision = resolve(spec, store)?;
        execute(spec, decision, &DeploymentConfig::default(), chain, store).await
    }

    #[tokio::test]
    async fn deploys_then_verifies() {
        let spec = farm_spec();
        let chain = MockChain::confirming();
        let store = MemoryStore::new();

        let deployment = run(&spec, &chain, &store).await.unwrap();
        assert_eq!(deployment.address, Address::repeat_byte(0xab));
        assert!(matches!(
            &deployment.verification,
            Verification::Confirmed(DynSolValue::Uint(count, 256)) if *count == U256::ZERO
        ));
        assert_eq!(chain.submissions.load(Ordering::SeqCst), 1);

        let record = store
            .get("local-dev", "FarmContract")
            .unwrap()
            .expect("record persisted");
        assert_eq!(record.address, deployment.address);
        assert_eq!(record.fingerprint, spec.fingerprint());
        assert_eq!(record.tx_hash, chain.tx_hash());

        let outcome = deployment.outcome();
        assert_eq!(outcome.address, Some(deployment.address));
        assert!(outcome.verification_value.is_some());
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn second_run_reuses_the_address() {
        let spec = farm_spec();
        let chain = MockChain::confirming();
        let store = MemoryStore::new();

        let first = run(&spec, &chain, &store).await.unwrap();
        let second = run(&spec, &chain, &store).await.unwrap();

        assert_eq!(first.address, second.address);
        // no second transaction was submitted
        assert_eq!(chain.submissions.load(Ordering::SeqCst), 1);
        assert!(matches!(&second.verification, Verification::Confirmed(_)));
    }

    #[tokio::test]
    async fn changed_arguments_supersede_the_record() {
        let store = MemoryStore::new();

        let spec = spec_with_constructor(vec![uint(1)]);
        let chain = MockChain::confirming();
        run(&spec, &chain, &store).await.unwrap();

        let changed = spec_with_constructor(vec![uint(2)]);
        let second_chain = MockChain::confirming().deploying_at(Address::repeat_byte(0xcd));
        let deployment = run(&changed, &second_chain, &store).await.unwrap();

        assert_eq!(deployment.address, Address::repeat_byte(0xcd));
        assert_eq!(second_chain.submissions.load(Ordering::SeqCst), 1);

        let record = store.get("local-dev", "Counter").unwrap().unwrap();
        assert_eq!(record.address, Address::repeat_byte(0xcd));
        assert_eq!(record.fingerprint, changed.fingerprint());
    }

    #[tokio::test]
    async fn rejected_transaction_writes_no_record() {
        let spec = farm_spec();
        let chain = MockChain::reverting();
        let store = MemoryStore::new();

        let err = run(&spec, &chain, &store).await.unwrap_err();
        assert!(matches!(err, DeploymentError::TransactionRejected(_)));
        assert_eq!(err.kind(), "transaction-rejected");
        assert_eq!(store.get("local-dev", "FarmContract").unwrap(), None);
    }

    #[tokio::test]
    async fn insufficient_funds_abort_before_submission() {
        let spec = farm_spec();
        let chain = MockChain::broke();
        let store = MemoryStore::new();

        let err = run(&spec, &chain, &store).await.unwrap_err();
        assert!(matches!(err, DeploymentError::NotEnoughFunds { .. }));
        assert_eq!(chain.submissions.load(Ordering::SeqCst), 0);
        assert_eq!(store.get("local-dev", "FarmContract").unwrap(), None);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_unresolved() {
        let spec = farm_spec();
        let chain = MockChain::timing_out();
        let store = MemoryStore::new();

        let err = run(&spec, &chain, &store).await.unwrap_err();
        assert!(matches!(err, DeploymentError::TransactionTimeout(_)));
        assert_eq!(err.kind(), "transaction-timeout");
        assert_eq!(store.get("local-dev", "FarmContract").unwrap(), None);
    }

    #[tokio::test]
    async fn verification_failure_leaves_the_deployment_standing() {
        let spec = farm_spec();
        let chain = MockChain::failing_view();
        let store = MemoryStore::new();

        let deployment = run(&spec, &chain, &store).await.unwrap();
        assert!(matches!(&deployment.verification, Verification::Failed(_)));
        assert_ne!(deployment.address, Address::ZERO);
        assert!(store.get("local-dev", "FarmContract").unwrap().is_some());

        let outcome = deployment.outcome();
        assert_eq!(outcome.address, Some(deployment.address));
        assert_eq!(outcome.error, Some("verification-call-failed"));
    }

    #[tokio::test]
    async fn reuse_without_code_fails_handle_acquisition() {
        let spec = farm_spec();
        let chain = MockChain::confirming();
        let store = MemoryStore::new();

        let stale = Address::repeat_byte(0xee);
        let err = execute(
            &spec,
            ResolutionDecision::Reuse(stale),
            &DeploymentConfig::default(),
            &chain,
            &store,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DeploymentError::HandleAcquisitionFailed(_)));
        assert_eq!(err.kind(), "handle-acquisition-failed");
    }

    #[tokio::test]
    async fn missing_accessor_fails_handle_acquisition() {
        let mut spec = farm_spec();
        spec.verify_call = "totalSupply".to_owned();
        let chain = MockChain::confirming().with_code(Address::repeat_byte(0xab));
        let store = MemoryStore::new();

        let err = execute(
            &spec,
            ResolutionDecision::Reuse(Address::repeat_byte(0xab)),
            &DeploymentConfig::default(),
            &chain,
            &store,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DeploymentError::HandleAcquisitionFailed(_)));
    }

    #[tokio::test]
    async fn wrong_argument_count_is_rejected() {
        let spec = spec_with_constructor(vec![]);
        let chain = MockChain::confirming();
        let store = MemoryStore::new();

        let err = run(&spec, &chain, &store).await.unwrap_err();
        assert!(matches!(err, DeploymentError::InvalidConstructor(_)));
        assert_eq!(chain.submissions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn outcome_from_fatal_error() {
        let outcome = Outcome::from_error(&DeploymentError::EmptyContractName);
        assert_eq!(outcome.address, None);
        assert_eq!(outcome.verification_value, None);
        assert_eq!(outcome.error, Some("invalid-spec"));
    }

    #[test]
    fn formats_values() {
        assert_eq!(format_value(&uint(7)), "7");
        assert_eq!(format_value(&DynSolValue::Bool(true)), "true");
        assert_eq!(
            format_value(&DynSolValue::Tuple(vec![uint(1), uint(2)])),
            "(1, 2)"
        );
        assert_eq!(
            format_value(&DynSolValue::Bytes(vec![0xde, 0xad])),
            "0xdead"
        );
    }
}
