//! Stub host used by the runtime tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use super::{Dependencies, Transaction, TransactionReceipt, Value};
use crate::abi::{AbiFunction, AbiParameter};

/// Not keccak: the hex of the input, padded or cut to 32 bytes. Deterministic
/// and readable, and signatures sharing a 32-byte prefix collide on purpose.
pub(crate) fn stub_keccak256(text: &str) -> String {
    let mut hex = hex::encode(text.as_bytes());
    hex.truncate(64);
    format!("0x{:0<64}", hex)
}

pub(crate) fn word(n: u64) -> String {
    format!("{:064x}", n)
}

pub(crate) struct StubDependencies {
    pub default_address: Option<String>,
    pub call_result: String,
    pub receipt: TransactionReceipt,
    pub gas: u64,
    /// `(capability, transaction)` for every transport call made.
    pub transactions: Mutex<Vec<(&'static str, Transaction<u64>)>>,
    /// `(types, payload)` for every decode request.
    pub decodes: Mutex<Vec<(Vec<AbiParameter>, String)>>,
}

impl Default for StubDependencies {
    fn default() -> Self {
        Self {
            default_address: None,
            call_result: format!("0x{}", word(0)),
            receipt: TransactionReceipt {
                status: 1,
                logs: vec![],
            },
            gas: 21_000,
            transactions: Mutex::new(vec![]),
            decodes: Mutex::new(vec![]),
        }
    }
}

impl StubDependencies {
    pub fn recorded_transactions(&self) -> Vec<(&'static str, Transaction<u64>)> {
        self.transactions.lock().unwrap().clone()
    }

    pub fn recorded_decodes(&self) -> Vec<(Vec<AbiParameter>, String)> {
        self.decodes.lock().unwrap().clone()
    }

    fn record(&self, capability: &'static str, transaction: &Transaction<u64>) {
        self.transactions
            .lock()
            .unwrap()
            .push((capability, transaction.clone()));
    }
}

fn encode_word(value: &Value<u64>) -> Result<String> {
    match value {
        Value::Number(n) => Ok(word(*n)),
        Value::Bool(b) => Ok(word(*b as u64)),
        Value::Address(text) => Ok(format!("{:0>64}", text.trim_start_matches("0x"))),
        Value::Text(text) => Ok(format!("{:0<64}", hex::encode(text.as_bytes()))),
        Value::Bytes(bytes) => Ok(format!("{:0<64}", hex::encode(bytes))),
        other => Err(anyhow!("stub encoder cannot encode {:?}", other)),
    }
}

#[async_trait]
impl Dependencies for StubDependencies {
    type Number = u64;

    fn keccak256(&self, text: &str) -> String {
        stub_keccak256(text)
    }

    fn encode_params(&self, function: &AbiFunction, arguments: &[Value<u64>]) -> Result<String> {
        if arguments.len() != function.inputs.len() {
            return Err(anyhow!(
                "expected {} arguments, got {}",
                function.inputs.len(),
                arguments.len()
            ));
        }
        arguments.iter().map(encode_word).collect()
    }

    fn decode_params(&self, parameters: &[AbiParameter], encoded: &str) -> Result<Vec<Value<u64>>> {
        self.decodes
            .lock()
            .unwrap()
            .push((parameters.to_vec(), encoded.to_string()));

        let payload = encoded.trim_start_matches("0x");
        parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| -> Result<Value<u64>> {
                let word = payload
                    .get(i * 64..(i + 1) * 64)
                    .ok_or_else(|| anyhow!("payload too short for {}", parameter.ty))?;
                let ty = parameter.ty.as_str();
                if ty.starts_with("uint") || ty.starts_with("int") {
                    Ok(Value::Number(u64::from_str_radix(&word[48..], 16)?))
                } else if ty == "bool" {
                    Ok(Value::Bool(word.ends_with('1')))
                } else if ty == "address" {
                    Ok(Value::Address(format!("0x{}", &word[24..])))
                } else {
                    Ok(Value::Bytes(hex::decode(word)?))
                }
            })
            .collect()
    }

    async fn get_default_address(&self) -> Result<Option<String>> {
        Ok(self.default_address.clone())
    }

    async fn call(&self, transaction: &Transaction<u64>) -> Result<String> {
        self.record("call", transaction);
        Ok(self.call_result.clone())
    }

    async fn estimate_gas(&self, transaction: &Transaction<u64>) -> Result<u64> {
        self.record("estimate_gas", transaction);
        Ok(self.gas)
    }

    async fn submit_transaction(&self, transaction: &Transaction<u64>) -> Result<TransactionReceipt> {
        self.record("submit_transaction", transaction);
        Ok(self.receipt.clone())
    }
}
