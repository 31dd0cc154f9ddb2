use std::fmt::Debug;
use thiserror::Error;

use crate::abi::{AbiError, AbiFunction};

/// Errors surfaced by contract invocations and event decoding.
///
/// ABI and argument snapshots are kept as text so the error does not depend
/// on the host's numeric type.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Call to {function} returned '0x' indicating failure")]
    CallFailed {
        function: String,
        abi: String,
        arguments: String,
    },

    #[error("Tx {tx_name} failed with status {status}")]
    TransactionFailed {
        tx_name: String,
        status: u64,
        abi: String,
        arguments: String,
    },

    #[error("Failed to decode {section} for event {signature}.\n{payload}")]
    DecodeFailure {
        signature: String,
        section: &'static str,
        payload: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Function {function} returned {actual} value(s), expected {expected}")]
    OutputMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{operation} failed: {source}")]
    Dependency {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Abi(#[from] AbiError),
}

impl ContractError {
    pub(crate) fn dependency(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ContractError::Dependency { operation, source }
    }

    pub(crate) fn call_failed<N: Debug>(abi: &AbiFunction, arguments: &[N]) -> Self {
        ContractError::CallFailed {
            function: abi.name.clone(),
            abi: abi_snapshot(abi),
            arguments: format!("{:?}", arguments),
        }
    }

    pub(crate) fn transaction_failed<N: Debug>(
        abi: &AbiFunction,
        arguments: &[N],
        tx_name: &str,
        status: u64,
    ) -> Self {
        ContractError::TransactionFailed {
            tx_name: tx_name.to_string(),
            status,
            abi: abi_snapshot(abi),
            arguments: format!("{:?}", arguments),
        }
    }
}

fn abi_snapshot(abi: &AbiFunction) -> String {
    serde_json::to_string(abi).unwrap_or_else(|_| abi.name.clone())
}
