//! Runtime engine embedded in generated bindings.
//!
//! Everything that touches the outside world (hashing, parameter codec,
//! transport) is reached through [`Dependencies`]. The engine itself only
//! computes selectors, assembles transactions and decodes logs.

pub mod contract;
pub mod error;
pub mod events;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use contract::{record_output, single_output, Contract, Invoker};
pub use error::ContractError;
pub use events::EventDecoder;
pub use registry::{EventDescription, EventRegistry};

use async_trait::async_trait;
use indexmap::IndexMap;
use std::fmt::Debug;

use crate::abi::{AbiFunction, AbiParameter};

/// Result returned by `call` when no code ran.
pub const EMPTY_RESULT: &str = "0x";

/// Receipt status of a successful transaction.
pub const SUCCESS_STATUS: u64 = 1;

pub type Record<N> = IndexMap<String, Value<N>>;

/// A decoded or to-be-encoded ABI value. `N` is the host's numeric type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    Number(N),
    Text(String),
    Bool(bool),
    Address(String),
    Bytes(Vec<u8>),
    Sequence(Vec<Value<N>>),
    Record(Record<N>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction<N> {
    pub to: String,
    pub from: Option<String>,
    /// Hex payload: selector followed by the encoded arguments.
    pub data: String,
    pub value: Option<N>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub data: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub status: u64,
    pub logs: Vec<RawEvent>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event<N> {
    pub name: String,
    pub parameters: Record<N>,
}

/// Options accepted by non-payable methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub sender: Option<String>,
}

impl CallOptions {
    pub fn from_sender(sender: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
        }
    }
}

/// Options accepted by payable methods.
#[derive(Debug, Clone, PartialEq)]
pub struct PayableCallOptions<N> {
    pub sender: Option<String>,
    pub attached_eth: Option<N>,
}

impl<N> Default for PayableCallOptions<N> {
    fn default() -> Self {
        Self {
            sender: None,
            attached_eth: None,
        }
    }
}

impl<N> PayableCallOptions<N> {
    pub fn with_attached_eth(mut self, value: N) -> Self {
        self.attached_eth = Some(value);
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

impl<N> From<CallOptions> for PayableCallOptions<N> {
    fn from(options: CallOptions) -> Self {
        Self {
            sender: options.sender,
            attached_eth: None,
        }
    }
}

/// Capabilities the host environment must supply.
///
/// Hex strings are `0x`-prefixed except for the output of
/// [`Dependencies::encode_params`], which is appended directly to a selector.
#[async_trait]
pub trait Dependencies: Send + Sync {
    type Number: Clone + Debug + Send + Sync;

    fn keccak256(&self, text: &str) -> String;

    fn encode_params(
        &self,
        function: &AbiFunction,
        arguments: &[Value<Self::Number>],
    ) -> anyhow::Result<String>;

    fn decode_params(
        &self,
        parameters: &[AbiParameter],
        encoded: &str,
    ) -> anyhow::Result<Vec<Value<Self::Number>>>;

    async fn get_default_address(&self) -> anyhow::Result<Option<String>>;

    async fn call(&self, transaction: &Transaction<Self::Number>) -> anyhow::Result<String>;

    async fn estimate_gas(
        &self,
        transaction: &Transaction<Self::Number>,
    ) -> anyhow::Result<Self::Number>;

    async fn submit_transaction(
        &self,
        transaction: &Transaction<Self::Number>,
    ) -> anyhow::Result<TransactionReceipt>;
}
