// This file is generated by contract-bindgen. Do not edit by hand.

#![allow(non_snake_case, non_camel_case_types, unused_imports, clippy::all)]

use std::sync::{Arc, OnceLock};

use crate::abi::{AbiEventParameter, AbiFunction, AbiParameter, FunctionKind, StateMutability};
use crate::runtime::{
    record_output, single_output, CallOptions, Contract, ContractError, Dependencies, Event,
    EventDescription, EventRegistry, Invoker, PayableCallOptions, Record, Value,
};

/// Every event declared by the contracts below, keyed by topic hash.
pub fn event_registry() -> Arc<EventRegistry> {
    static REGISTRY: OnceLock<Arc<EventRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| {
            Arc::new(EventRegistry::from_descriptions(vec![
                EventDescription {
                    name: "Transfer".to_string(),
                    signature: "Transfer(address,address,uint256)".to_string(),
                    signature_hash: "0x5472616e7366657228616464726573732c616464726573732c75696e74323536".to_string(),
                    parameters: vec![AbiEventParameter::new(AbiParameter::new("from", "address"), true), AbiEventParameter::new(AbiParameter::new("to", "address"), true), AbiEventParameter::new(AbiParameter::new("value", "uint256"), false)],
                },
            ]))
        })
        .clone()
}


#[derive(Clone, Debug)]
pub struct banana<C: Invoker> {
    invoker: C,
}

impl<D: Dependencies> banana<Contract<D>> {
    pub fn new(dependencies: Arc<D>, address: impl Into<String>) -> Self {
        Self::from_invoker(Contract::new(dependencies, address, event_registry()))
    }

    pub fn address(&self) -> &str {
        self.invoker.address()
    }
}

impl<C: Invoker> banana<C> {
    pub fn from_invoker(invoker: C) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &C {
        &self.invoker
    }

    pub async fn cherry(&self, options: PayableCallOptions<C::Number>) -> Result<Vec<Event<C::Number>>, ContractError> {
        let arguments = vec![];
        self.invoker
            .remote_call(&banana_abi::cherry(), arguments, "cherry", options)
            .await
    }

    pub async fn cherry_estimateGas(&self, options: PayableCallOptions<C::Number>) -> Result<C::Number, ContractError> {
        let arguments = vec![];
        self.invoker
            .estimate_gas(&banana_abi::cherry(), arguments, "cherry", options)
            .await
    }

    pub async fn cherry_(&self, options: PayableCallOptions<C::Number>) -> Result<(), ContractError> {
        let arguments = vec![];
        let abi = banana_abi::cherry();
        let _values = self.invoker.local_call(&abi, arguments, options).await?;
        Ok(())
    }
}

mod banana_abi {
    use super::*;

    /// `{"name":"cherry","type":"function","constant":false,"payable":true,"stateMutability":"payable","inputs":[],"outputs":[]}`
    pub(super) fn cherry() -> AbiFunction {
        AbiFunction {
            name: "cherry".to_string(),
            kind: FunctionKind::Function,
            constant: false,
            payable: true,
            state_mutability: StateMutability::Payable,
            inputs: vec![],
            outputs: vec![],
        }
    }
}


#[derive(Clone, Debug)]
pub struct Token<C: Invoker> {
    invoker: C,
}

impl<D: Dependencies> Token<Contract<D>> {
    pub fn new(dependencies: Arc<D>, address: impl Into<String>) -> Self {
        Self::from_invoker(Contract::new(dependencies, address, event_registry()))
    }

    pub fn address(&self) -> &str {
        self.invoker.address()
    }
}

impl<C: Invoker> Token<C> {
    pub fn from_invoker(invoker: C) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &C {
        &self.invoker
    }

    pub async fn balanceOf_(&self, owner: String, options: CallOptions) -> Result<Value<C::Number>, ContractError> {
        let arguments = vec![Value::Address(owner)];
        let abi = Token_abi::balanceOf();
        let values = self.invoker.local_call(&abi, arguments, options.into()).await?;
        single_output(&abi, values)
    }

    pub async fn transfer(&self, to: String, amount: C::Number, options: CallOptions) -> Result<Vec<Event<C::Number>>, ContractError> {
        let arguments = vec![Value::Address(to), Value::Number(amount)];
        self.invoker
            .remote_call(&Token_abi::transfer(), arguments, "transfer", options.into())
            .await
    }

    pub async fn transfer_estimateGas(&self, to: String, amount: C::Number, options: CallOptions) -> Result<C::Number, ContractError> {
        let arguments = vec![Value::Address(to), Value::Number(amount)];
        self.invoker
            .estimate_gas(&Token_abi::transfer(), arguments, "transfer", options.into())
            .await
    }

    pub async fn transfer_(&self, to: String, amount: C::Number, options: CallOptions) -> Result<Value<C::Number>, ContractError> {
        let arguments = vec![Value::Address(to), Value::Number(amount)];
        let abi = Token_abi::transfer();
        let values = self.invoker.local_call(&abi, arguments, options.into()).await?;
        single_output(&abi, values)
    }

    pub async fn getReserves_(&self, options: CallOptions) -> Result<Record<C::Number>, ContractError> {
        let arguments = vec![];
        let abi = Token_abi::getReserves();
        let values = self.invoker.local_call(&abi, arguments, options.into()).await?;
        record_output(&abi, values)
    }

    pub async fn submit(&self, orders: Vec<(C::Number, String)>, abi: Vec<u8>, r#type: bool, options: CallOptions) -> Result<Vec<Event<C::Number>>, ContractError> {
        let arguments = vec![Value::Sequence(orders.into_iter().map(|item| Value::Sequence(vec![Value::Number(item.0), Value::Address(item.1)])).collect()), Value::Bytes(abi), Value::Bool(r#type)];
        self.invoker
            .remote_call(&Token_abi::submit(), arguments, "submit", options.into())
            .await
    }

    pub async fn submit_estimateGas(&self, orders: Vec<(C::Number, String)>, abi: Vec<u8>, r#type: bool, options: CallOptions) -> Result<C::Number, ContractError> {
        let arguments = vec![Value::Sequence(orders.into_iter().map(|item| Value::Sequence(vec![Value::Number(item.0), Value::Address(item.1)])).collect()), Value::Bytes(abi), Value::Bool(r#type)];
        self.invoker
            .estimate_gas(&Token_abi::submit(), arguments, "submit", options.into())
            .await
    }

    pub async fn submit_(&self, orders: Vec<(C::Number, String)>, abi: Vec<u8>, r#type: bool, options: CallOptions) -> Result<(), ContractError> {
        let arguments = vec![Value::Sequence(orders.into_iter().map(|item| Value::Sequence(vec![Value::Number(item.0), Value::Address(item.1)])).collect()), Value::Bytes(abi), Value::Bool(r#type)];
        let abi = Token_abi::submit();
        let _values = self.invoker.local_call(&abi, arguments, options.into()).await?;
        Ok(())
    }
}

mod Token_abi {
    use super::*;

    /// `{"name":"balanceOf","type":"function","constant":true,"payable":false,"stateMutability":"view","inputs":[{"name":"_owner","type":"address"}],"outputs":[{"name":"","type":"uint256"}]}`
    pub(super) fn balanceOf() -> AbiFunction {
        AbiFunction {
            name: "balanceOf".to_string(),
            kind: FunctionKind::Function,
            constant: true,
            payable: false,
            state_mutability: StateMutability::View,
            inputs: vec![AbiParameter::new("_owner", "address")],
            outputs: vec![AbiParameter::new("", "uint256")],
        }
    }

    /// `{"name":"transfer","type":"function","constant":false,"payable":false,"stateMutability":"nonpayable","inputs":[{"name":"_to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}]}`
    pub(super) fn transfer() -> AbiFunction {
        AbiFunction {
            name: "transfer".to_string(),
            kind: FunctionKind::Function,
            constant: false,
            payable: false,
            state_mutability: StateMutability::NonPayable,
            inputs: vec![AbiParameter::new("_to", "address"), AbiParameter::new("amount", "uint256")],
            outputs: vec![AbiParameter::new("", "bool")],
        }
    }

    /// `{"name":"getReserves","type":"function","constant":true,"payable":false,"stateMutability":"view","inputs":[],"outputs":[{"name":"reserve0","type":"uint112"},{"name":"reserve1","type":"uint112"}]}`
    pub(super) fn getReserves() -> AbiFunction {
        AbiFunction {
            name: "getReserves".to_string(),
            kind: FunctionKind::Function,
            constant: true,
            payable: false,
            state_mutability: StateMutability::View,
            inputs: vec![],
            outputs: vec![AbiParameter::new("reserve0", "uint112"), AbiParameter::new("reserve1", "uint112")],
        }
    }

    /// `{"name":"submit","type":"function","constant":false,"payable":false,"stateMutability":"nonpayable","inputs":[{"name":"orders","type":"tuple[]","components":[{"name":"amount","type":"uint256"},{"name":"maker","type":"address"}]},{"name":"abi","type":"bytes32"},{"name":"type","type":"bool"}],"outputs":[]}`
    pub(super) fn submit() -> AbiFunction {
        AbiFunction {
            name: "submit".to_string(),
            kind: FunctionKind::Function,
            constant: false,
            payable: false,
            state_mutability: StateMutability::NonPayable,
            inputs: vec![AbiParameter::new("orders", "tuple[]").with_components(vec![AbiParameter::new("amount", "uint256"), AbiParameter::new("maker", "address")]), AbiParameter::new("abi", "bytes32"), AbiParameter::new("type", "bool")],
            outputs: vec![],
        }
    }
}
