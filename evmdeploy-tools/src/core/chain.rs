// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Network access for deployments.
//!
//! [`ChainClient`] is the seam between the deployment executor and the chain,
//! so tests can script confirmations and rejections without a node.
//! [`AlloyChain`] is the production implementation over an alloy provider
//! carrying a wallet.

use std::time::Duration;

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    network::TransactionBuilder,
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

use crate::utils::color::DebugColor;

/// How long [`AlloyChain`] waits for a deploy transaction to confirm.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of a confirmed contract-creation transaction.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("abi error: {0}")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error("deploy tx reverted {}", .tx_hash.debug_red())]
    Reverted { tx_hash: TxHash },
    #[error("tx failed to complete")]
    FailedToComplete,
    #[error("timed out waiting for confirmation of {}", .tx_hash.debug_red())]
    ConfirmationTimeout { tx_hash: TxHash },
    #[error("no contract address in receipt")]
    NoContractAddress,
    #[error("call reverted: {0}")]
    CallReverted(String),
    #[error("bad return data for {0}")]
    BadReturnData(String),
}

/// Transaction submission and read-only calls, as the executor needs them.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn balance(&self, address: Address) -> Result<U256, ChainError>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ChainError>;

    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Broadcasts a creation transaction and blocks until it confirms or is
    /// rejected. Gas fields are expected to be filled in by the caller.
    async fn submit_deployment(&self, tx: TransactionRequest) -> Result<Confirmation, ChainError>;

    async fn has_code(&self, address: Address) -> Result<bool, ChainError>;

    /// Performs a read-only call of `function` (no arguments) at `address`
    /// and decodes the result.
    async fn view_call(
        &self,
        address: Address,
        function: &Function,
    ) -> Result<DynSolValue, ChainError>;
}

/// [`ChainClient`] over an alloy provider with a signer attached.
pub struct AlloyChain<P> {
    provider: P,
    confirmation_timeout: Duration,
}

impl<P: Provider> AlloyChain<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

impl<P: Provider> ChainClient for AlloyChain<P> {
    async fn balance(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ChainError> {
        Ok(self.provider.estimate_gas(tx.clone()).await?)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn submit_deployment(&self, tx: TransactionRequest) -> Result<Confirmation, ChainError> {
        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(@grey, "sent deploy tx: {}", tx_hash.debug_lavender());

        let receipt = tokio::time::timeout(self.confirmation_timeout, pending.get_receipt())
            .await
            .map_err(|_| ChainError::ConfirmationTimeout { tx_hash })?
            .or(Err(ChainError::FailedToComplete))?;
        if !receipt.status() {
            return Err(ChainError::Reverted { tx_hash });
        }

        let address = receipt
            .contract_address
            .ok_or(ChainError::NoContractAddress)?;
        Ok(Confirmation {
            address,
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    async fn has_code(&self, address: Address) -> Result<bool, ChainError> {
        let code = self.provider.get_code_at(address).await?;
        Ok(!code.is_empty())
    }

    async fn view_call(
        &self,
        address: Address,
        function: &Function,
    ) -> Result<DynSolValue, ChainError> {
        let calldata = function.abi_encode_input(&[])?;
        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(calldata);
        let data = self.provider.call(tx).await?;
        let mut values = function.abi_decode_output(&data)?;
        match values.len() {
            1 => Ok(values.remove(0)),
            0 => Err(ChainError::BadReturnData(function.name.clone())),
            _ => Ok(DynSolValue::Tuple(values)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error("rpc error: {0}")]
    Chain(#[from] ChainError),
    #[error("no code at address {}", .0.debug_red())]
    NoCode(Address),
    #[error("interface has no function {0}")]
    UnknownFunction(String),
    #[error("{0} takes arguments, expected a zero-argument view")]
    TakesArguments(String),
}

/// Callable handle to a deployed contract, bound to one read accessor.
pub struct ContractHandle<'a, C> {
    address: Address,
    accessor: Function,
    chain: &'a C,
}

impl<'a, C: ChainClient> ContractHandle<'a, C> {
    /// Binds a handle to `address`, checking that code is deployed there and
    /// that the interface exposes the zero-argument `accessor`.
    pub async fn acquire(
        chain: &'a C,
        abi: &JsonAbi,
        address: Address,
        accessor: &str,
    ) -> Result<Self, HandleError> {
        if !chain.has_code(address).await? {
            return Err(HandleError::NoCode(address));
        }
        let function = abi
            .function(accessor)
            .and_then(|fns| fns.first())
            .ok_or_else(|| HandleError::UnknownFunction(accessor.to_owned()))?;
        if !function.inputs.is_empty() {
            return Err(HandleError::TakesArguments(accessor.to_owned()));
        }
        Ok(Self {
            address,
            accessor: function.clone(),
            chain,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Invokes the bound accessor. Pure read, no side effects.
    pub async fn read(&self) -> Result<DynSolValue, ChainError> {
        self.chain.view_call(self.address, &self.accessor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    const FARM_ABI: &str = r#"[
        {
            "inputs": [],
            "name": "contractCount",
            "outputs": [{"internalType": "uint256", "name": "", "type": "uint256"}],
            "stateMutability": "view",
            "type": "function"
        }
    ]"#;

    #[test]
    fn decodes_view_call_return_data() {
        let abi: JsonAbi = serde_json::from_str(FARM_ABI).unwrap();
        let function = abi.function("contractCount").unwrap().first().unwrap();

        let calldata = function.abi_encode_input(&[]).unwrap();
        assert_eq!(calldata, function.selector().to_vec());

        let data = U256::from(7).to_be_bytes::<32>();
        let values = function.abi_decode_output(&data).unwrap();
        assert_eq!(values, vec![DynSolValue::Uint(U256::from(7), 256)]);
    }
}
