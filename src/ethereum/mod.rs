//! Host dependencies backed by alloy and a JSON-RPC node.

pub mod codec;
pub mod provider;
pub mod utils;

use alloy::{
    primitives::{keccak256, Address, Bytes, U256},
    providers::Provider,
    rpc::types::{TransactionReceipt as RpcReceipt, TransactionRequest},
    transports::http::{Client, Http},
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::abi::{AbiFunction, AbiParameter};
use crate::runtime::{Dependencies, RawEvent, Transaction, TransactionReceipt, Value};

/// keccak256 of the UTF-8 bytes of `text`, as lowercase `0x` hex.
pub fn keccak256_hex(text: &str) -> String {
    format!("0x{}", hex::encode(keccak256(text.as_bytes())))
}

/// Converts an engine transaction into an RPC request.
pub fn transaction_request(transaction: &Transaction<U256>) -> Result<TransactionRequest> {
    let to = utils::parse_address(&transaction.to)
        .map_err(|e| anyhow!("Invalid contract address: {}", e))?;
    let input = hex::decode(transaction.data.trim_start_matches("0x"))
        .map_err(|e| anyhow!("Invalid calldata: {}", e))?;

    let mut request = TransactionRequest::default()
        .to(to)
        .input(Bytes::from(input).into());

    if let Some(from) = &transaction.from {
        let from = utils::parse_address(from).map_err(|e| anyhow!("Invalid 'from' address: {}", e))?;
        request = request.from(from);
    }
    if let Some(value) = transaction.value {
        request = request.value(value);
    }

    Ok(request)
}

/// Status and logs of a mined receipt, in the engine's shape.
pub fn convert_receipt(receipt: &RpcReceipt) -> TransactionReceipt {
    let logs = receipt
        .inner
        .logs()
        .iter()
        .map(|log| RawEvent {
            data: format!("0x{}", hex::encode(&log.data().data)),
            topics: log.topics().iter().map(|t| format!("0x{:x}", t)).collect(),
        })
        .collect();

    TransactionReceipt {
        status: u64::from(receipt.status()),
        logs,
    }
}

/// [`Dependencies`] over an alloy provider.
///
/// Numbers are `U256`; signed integers are carried as their two's complement.
pub struct AlloyDependencies<P> {
    provider: P,
    default_sender: Option<Address>,
}

impl<P> AlloyDependencies<P>
where
    P: Provider<Http<Client>>,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_sender: None,
        }
    }

    /// Uses `sender` instead of asking the node for its accounts.
    pub fn with_default_sender(mut self, sender: Address) -> Self {
        self.default_sender = Some(sender);
        self
    }

    /// Fetches the receipt of an already mined transaction.
    pub async fn receipt(&self, tx_hash: &str) -> Result<TransactionReceipt> {
        let hash = utils::parse_tx_hash(tx_hash)?;
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| anyhow!("Failed to fetch receipt: {}", utils::describe_rpc_error(&e.to_string())))?
            .ok_or_else(|| anyhow!("No receipt for transaction {}. It may still be pending", tx_hash))?;
        Ok(convert_receipt(&receipt))
    }
}

#[async_trait]
impl<P> Dependencies for AlloyDependencies<P>
where
    P: Provider<Http<Client>>,
{
    type Number = U256;

    fn keccak256(&self, text: &str) -> String {
        keccak256_hex(text)
    }

    fn encode_params(&self, function: &AbiFunction, arguments: &[Value<U256>]) -> Result<String> {
        codec::encode_params(function, arguments)
    }

    fn decode_params(&self, parameters: &[AbiParameter], encoded: &str) -> Result<Vec<Value<U256>>> {
        codec::decode_params(parameters, encoded)
    }

    async fn get_default_address(&self) -> Result<Option<String>> {
        if let Some(sender) = self.default_sender {
            return Ok(Some(format!("0x{:x}", sender)));
        }

        // public endpoints commonly reject eth_accounts; that just means no default
        match self.provider.get_accounts().await {
            Ok(accounts) => Ok(accounts.first().map(|account| format!("0x{:x}", account))),
            Err(e) => {
                debug!("eth_accounts unavailable, sending without a sender: {}", e);
                Ok(None)
            }
        }
    }

    async fn call(&self, transaction: &Transaction<U256>) -> Result<String> {
        let request = transaction_request(transaction)?;
        let result = self
            .provider
            .call(&request)
            .await
            .map_err(|e| anyhow!("Call failed: {}", utils::describe_rpc_error(&e.to_string())))?;
        Ok(format!("0x{}", hex::encode(&result)))
    }

    async fn estimate_gas(&self, transaction: &Transaction<U256>) -> Result<U256> {
        let request = transaction_request(transaction)?;
        let gas = self
            .provider
            .estimate_gas(&request)
            .await
            .map_err(|e| anyhow!("Gas estimation failed: {}", utils::describe_rpc_error(&e.to_string())))?;
        Ok(U256::from(gas))
    }

    async fn submit_transaction(&self, transaction: &Transaction<U256>) -> Result<TransactionReceipt> {
        let request = transaction_request(transaction)?;
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| anyhow!("Failed to send transaction: {}", utils::describe_rpc_error(&e.to_string())))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!("Transaction sent with hash: 0x{:x}", tx_hash);

        let receipt = pending.get_receipt().await.map_err(|e| {
            anyhow!(
                "Transaction was sent but confirmation failed: {}. Transaction hash: 0x{:x}",
                e,
                tx_hash
            )
        })?;
        Ok(convert_receipt(&receipt))
    }
}
