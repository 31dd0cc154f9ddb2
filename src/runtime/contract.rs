use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{
    ContractError, Dependencies, Event, EventDecoder, EventRegistry, PayableCallOptions, Record,
    Transaction, Value, EMPTY_RESULT,
};
use crate::abi::{signature, AbiFunction};

/// The three ways a bound function can be invoked.
///
/// Generated bindings hold an `Invoker` and forward every method to it, so
/// anything implementing this trait can back them.
#[async_trait]
pub trait Invoker: Send + Sync {
    type Number: Clone + std::fmt::Debug + Send + Sync;

    /// Executes `abi` locally and decodes its outputs.
    async fn local_call(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<Self::Number>>,
        options: PayableCallOptions<Self::Number>,
    ) -> Result<Vec<Value<Self::Number>>, ContractError>;

    /// Submits `abi` as a transaction and decodes the events it emitted.
    async fn remote_call(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<Self::Number>>,
        tx_name: &str,
        options: PayableCallOptions<Self::Number>,
    ) -> Result<Vec<Event<Self::Number>>, ContractError>;

    async fn estimate_gas(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<Self::Number>>,
        tx_name: &str,
        options: PayableCallOptions<Self::Number>,
    ) -> Result<Self::Number, ContractError>;
}

/// A deployed contract reached through host [`Dependencies`].
pub struct Contract<D: Dependencies> {
    dependencies: Arc<D>,
    address: String,
    registry: Arc<EventRegistry>,
}

impl<D: Dependencies> Clone for Contract<D> {
    fn clone(&self) -> Self {
        Self {
            dependencies: Arc::clone(&self.dependencies),
            address: self.address.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<D: Dependencies> std::fmt::Debug for Contract<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("events", &self.registry.len())
            .finish()
    }
}

impl<D: Dependencies> Contract<D> {
    pub fn new(dependencies: Arc<D>, address: impl Into<String>, registry: Arc<EventRegistry>) -> Self {
        Self {
            dependencies,
            address: address.into(),
            registry,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    pub fn dependencies(&self) -> &D {
        &self.dependencies
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_method(
        &self,
        abi: &AbiFunction,
        arguments: &[Value<D::Number>],
    ) -> Result<String, ContractError> {
        let selector = signature::selector(|text| self.dependencies.keccak256(text), abi)?;
        let encoded = self
            .dependencies
            .encode_params(abi, arguments)
            .map_err(ContractError::dependency("encode_params"))?;
        Ok(format!("{}{}", selector, encoded))
    }

    /// Resolves the sender and assembles a fresh transaction.
    pub async fn build_transaction(
        &self,
        abi: &AbiFunction,
        arguments: &[Value<D::Number>],
        options: PayableCallOptions<D::Number>,
    ) -> Result<Transaction<D::Number>, ContractError> {
        let data = self.encode_method(abi, arguments)?;

        let from = match options.sender.filter(|sender| !sender.is_empty()) {
            Some(sender) => Some(sender),
            None => self
                .dependencies
                .get_default_address()
                .await
                .map_err(ContractError::dependency("get_default_address"))?,
        };

        debug!(
            "Built transaction for {} to {} from {:?}",
            abi.name, self.address, from
        );
        Ok(Transaction {
            to: self.address.clone(),
            from,
            data,
            value: options.attached_eth,
        })
    }
}

#[async_trait]
impl<D: Dependencies> Invoker for Contract<D> {
    type Number = D::Number;

    async fn local_call(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<D::Number>>,
        options: PayableCallOptions<D::Number>,
    ) -> Result<Vec<Value<D::Number>>, ContractError> {
        let transaction = self.build_transaction(abi, &arguments, options).await?;
        let result = self
            .dependencies
            .call(&transaction)
            .await
            .map_err(ContractError::dependency("call"))?;

        if result == EMPTY_RESULT {
            return Err(ContractError::call_failed(abi, &arguments));
        }

        self.dependencies
            .decode_params(&abi.outputs, &result)
            .map_err(ContractError::dependency("decode_params"))
    }

    async fn remote_call(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<D::Number>>,
        tx_name: &str,
        options: PayableCallOptions<D::Number>,
    ) -> Result<Vec<Event<D::Number>>, ContractError> {
        let transaction = self.build_transaction(abi, &arguments, options).await?;
        let receipt = self
            .dependencies
            .submit_transaction(&transaction)
            .await
            .map_err(ContractError::dependency("submit_transaction"))?;

        if !receipt.is_success() {
            return Err(ContractError::transaction_failed(
                abi,
                &arguments,
                tx_name,
                receipt.status,
            ));
        }

        debug!("Tx {} mined with {} log(s)", tx_name, receipt.logs.len());
        EventDecoder::new(&self.registry, self.dependencies.as_ref()).decode_all(&receipt.logs)
    }

    async fn estimate_gas(
        &self,
        abi: &AbiFunction,
        arguments: Vec<Value<D::Number>>,
        tx_name: &str,
        options: PayableCallOptions<D::Number>,
    ) -> Result<D::Number, ContractError> {
        let transaction = self.build_transaction(abi, &arguments, options).await?;
        debug!("Estimating gas for {}", tx_name);
        self.dependencies
            .estimate_gas(&transaction)
            .await
            .map_err(ContractError::dependency("estimate_gas"))
    }
}

/// Unwraps the only output of a function that declares exactly one.
pub fn single_output<N>(abi: &AbiFunction, mut values: Vec<Value<N>>) -> Result<Value<N>, ContractError> {
    match values.len() {
        1 => Ok(values.remove(0)),
        actual => Err(ContractError::OutputMismatch {
            function: abi.name.clone(),
            expected: 1,
            actual,
        }),
    }
}

/// Keys the outputs of a multi-output function by their declared names.
pub fn record_output<N>(abi: &AbiFunction, values: Vec<Value<N>>) -> Result<Record<N>, ContractError> {
    if values.len() != abi.outputs.len() {
        return Err(ContractError::OutputMismatch {
            function: abi.name.clone(),
            expected: abi.outputs.len(),
            actual: values.len(),
        });
    }
    Ok(abi
        .outputs
        .iter()
        .map(|output| output.name.clone())
        .zip(values)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{AbiEvent, AbiEventParameter, AbiParameter, FunctionKind, StateMutability};
    use crate::runtime::testing::{stub_keccak256, word, StubDependencies};
    use crate::runtime::{CallOptions, RawEvent, TransactionReceipt};

    const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
    const ALICE: &str = "0x00000000000000000000000000000000000000a1";
    const BOB: &str = "0x00000000000000000000000000000000000000b0";

    fn function(name: &str, mutability: StateMutability) -> AbiFunction {
        AbiFunction {
            name: name.to_string(),
            kind: FunctionKind::Function,
            constant: matches!(mutability, StateMutability::View | StateMutability::Pure),
            payable: mutability == StateMutability::Payable,
            state_mutability: mutability,
            inputs: vec![
                AbiParameter::new("to", "address"),
                AbiParameter::new("amount", "uint256"),
            ],
            outputs: vec![AbiParameter::new("", "bool")],
        }
    }

    fn transfer_event() -> AbiEvent {
        AbiEvent {
            name: "Transfer".to_string(),
            inputs: vec![
                AbiEventParameter::new(AbiParameter::new("from", "address"), true),
                AbiEventParameter::new(AbiParameter::new("to", "address"), true),
                AbiEventParameter::new(AbiParameter::new("value", "uint256"), false),
            ],
            anonymous: false,
        }
    }

    fn contract(dependencies: StubDependencies) -> (Arc<StubDependencies>, Contract<StubDependencies>) {
        let registry = EventRegistry::from_events(stub_keccak256, [&transfer_event()]).unwrap();
        let dependencies = Arc::new(dependencies);
        let contract = Contract::new(Arc::clone(&dependencies), TOKEN, Arc::new(registry));
        (dependencies, contract)
    }

    fn arguments() -> Vec<Value<u64>> {
        vec![Value::Address(BOB.to_string()), Value::Number(10)]
    }

    #[tokio::test]
    async fn test_local_call_builds_selector_and_decodes_outputs() {
        let (dependencies, contract) = contract(StubDependencies {
            call_result: format!("0x{}", word(1)),
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::View);

        let values = contract
            .local_call(&abi, arguments(), CallOptions::default().into())
            .await
            .unwrap();
        assert_eq!(values, vec![Value::Bool(true)]);

        let transactions = dependencies.recorded_transactions();
        assert_eq!(transactions.len(), 1);
        let (capability, transaction) = &transactions[0];
        assert_eq!(*capability, "call");
        assert_eq!(transaction.to, TOKEN);
        assert_eq!(transaction.from, None);
        assert_eq!(transaction.value, None);
        assert_eq!(
            transaction.data,
            format!(
                "0x{}{:0>64}{}",
                hex::encode("tran"),
                BOB.trim_start_matches("0x"),
                word(10)
            )
        );
    }

    #[tokio::test]
    async fn test_empty_result_is_call_failed_without_decoding() {
        let (dependencies, contract) = contract(StubDependencies {
            call_result: "0x".to_string(),
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::View);

        let err = contract
            .local_call(&abi, arguments(), PayableCallOptions::default())
            .await
            .unwrap_err();
        match err {
            ContractError::CallFailed {
                function,
                abi,
                arguments,
            } => {
                assert_eq!(function, "transfer");
                assert!(abi.contains("\"name\":\"transfer\""));
                assert!(arguments.contains("Number(10)"));
            }
            other => panic!("expected CallFailed, got {:?}", other),
        }
        assert!(dependencies.recorded_decodes().is_empty());
    }

    #[tokio::test]
    async fn test_sender_override_wins_over_default() {
        let (dependencies, contract) = contract(StubDependencies {
            default_address: Some(ALICE.to_string()),
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::Payable);

        contract
            .estimate_gas(&abi, arguments(), "transfer", PayableCallOptions::default())
            .await
            .unwrap();
        contract
            .estimate_gas(
                &abi,
                arguments(),
                "transfer",
                PayableCallOptions::default().with_sender(BOB).with_attached_eth(5),
            )
            .await
            .unwrap();
        // an empty override falls back to the default
        contract
            .estimate_gas(
                &abi,
                arguments(),
                "transfer",
                PayableCallOptions::default().with_sender(""),
            )
            .await
            .unwrap();

        let senders: Vec<Option<String>> = dependencies
            .recorded_transactions()
            .into_iter()
            .map(|(_, transaction)| transaction.from)
            .collect();
        assert_eq!(
            senders,
            vec![
                Some(ALICE.to_string()),
                Some(BOB.to_string()),
                Some(ALICE.to_string())
            ]
        );
        assert_eq!(dependencies.recorded_transactions()[1].1.value, Some(5));
    }

    #[tokio::test]
    async fn test_estimate_gas_routes_to_estimator() {
        let (dependencies, contract) = contract(StubDependencies {
            gas: 54_321,
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::NonPayable);

        let gas = contract
            .estimate_gas(&abi, arguments(), "transfer", PayableCallOptions::default())
            .await
            .unwrap();
        assert_eq!(gas, 54_321);
        assert_eq!(dependencies.recorded_transactions()[0].0, "estimate_gas");
    }

    #[tokio::test]
    async fn test_failed_status_skips_event_decoding() {
        let (dependencies, contract) = contract(StubDependencies {
            receipt: TransactionReceipt {
                status: 0,
                logs: vec![RawEvent {
                    data: format!("0x{}", word(10)),
                    topics: vec![stub_keccak256("Transfer(address,address,uint256)")],
                }],
            },
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::NonPayable);

        let err = contract
            .remote_call(&abi, arguments(), "transfer", PayableCallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::TransactionFailed { ref tx_name, status: 0, .. } if tx_name == "transfer"
        ));
        assert_eq!(err.to_string(), "Tx transfer failed with status 0");
        assert!(dependencies.recorded_decodes().is_empty());
    }

    #[tokio::test]
    async fn test_remote_call_returns_known_events_in_order() {
        let transfer = |value: u64| RawEvent {
            data: format!("0x{}", word(value)),
            topics: vec![
                stub_keccak256("Transfer(address,address,uint256)"),
                format!("0x{:0>64}", "a1"),
                format!("0x{:0>64}", "b0"),
            ],
        };
        let (dependencies, contract) = contract(StubDependencies {
            receipt: TransactionReceipt {
                status: 1,
                logs: vec![
                    transfer(1),
                    RawEvent {
                        data: "0x".to_string(),
                        topics: vec![format!("0x{}", word(99))],
                    },
                    transfer(2),
                ],
            },
            ..Default::default()
        });
        let abi = function("transfer", StateMutability::NonPayable);

        let events = contract
            .remote_call(&abi, arguments(), "transfer", PayableCallOptions::default())
            .await
            .unwrap();
        let values: Vec<&Value<u64>> = events.iter().map(|e| &e.parameters["value"]).collect();
        assert_eq!(values, vec![&Value::Number(1), &Value::Number(2)]);
        assert_eq!(events[0].parameters["from"], Value::Address(ALICE.to_string()));
        assert_eq!(dependencies.recorded_transactions()[0].0, "submit_transaction");
    }

    #[tokio::test]
    async fn test_encoder_errors_surface_as_dependency_failures() {
        let (dependencies, contract) = contract(StubDependencies::default());
        let abi = function("transfer", StateMutability::NonPayable);

        let err = contract
            .remote_call(&abi, vec![Value::Number(1)], "transfer", PayableCallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::Dependency {
                operation: "encode_params",
                ..
            }
        ));
        assert!(dependencies.recorded_transactions().is_empty());
    }

    #[test]
    fn test_output_shaping() {
        let mut abi = function("pair", StateMutability::View);
        assert_eq!(
            single_output(&abi, vec![Value::<u64>::Bool(true)]).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            single_output::<u64>(&abi, vec![]),
            Err(ContractError::OutputMismatch {
                expected: 1,
                actual: 0,
                ..
            })
        ));

        abi.outputs = vec![
            AbiParameter::new("reserve0", "uint112"),
            AbiParameter::new("reserve1", "uint112"),
        ];
        let record = record_output(&abi, vec![Value::<u64>::Number(3), Value::Number(4)]).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["reserve0", "reserve1"]);
        assert!(record_output(&abi, vec![Value::<u64>::Number(3)]).is_err());
    }
}
