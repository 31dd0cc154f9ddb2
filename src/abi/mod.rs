pub mod loader;
pub mod signature;
pub mod types;

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while interpreting an ABI at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("Expected components when type is {ty} (parameter '{parameter}')")]
    MalformedAbi { parameter: String, ty: String },

    #[error("Unrecognized type '{ty}' in {contract}.{function}")]
    UnsupportedType {
        contract: String,
        function: String,
        ty: String,
    },

    #[error("Function {contract}.{function} has multiple return values but not all are named")]
    UnnamedMultiOutput { contract: String, function: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParameter>>,
}

impl AbiParameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            components: None,
        }
    }

    pub fn with_components(mut self, components: Vec<AbiParameter>) -> Self {
        self.components = Some(components);
        self
    }

    /// `tuple`, `tuple[]`, `tuple[2][]` and so on.
    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with("tuple")
    }

    pub fn is_array(&self) -> bool {
        self.ty.ends_with(']')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEventParameter {
    #[serde(flatten)]
    pub parameter: AbiParameter,
    #[serde(default)]
    pub indexed: bool,
}

impl AbiEventParameter {
    pub fn new(parameter: AbiParameter, indexed: bool) -> Self {
        Self { parameter, indexed }
    }

    pub fn name(&self) -> &str {
        &self.parameter.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    NonPayable,
}

/// A function entry of a contract ABI.
///
/// `constant` and `payable` are always normalized from `state_mutability` on
/// deserialization, so older compiler output that only carries the two flags
/// is accepted as well. Field order matches the compiler's own so a
/// serialized function reproduces the input literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFunction")]
pub struct AbiFunction {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    pub constant: bool,
    pub payable: bool,
    pub state_mutability: StateMutability,
    pub inputs: Vec<AbiParameter>,
    pub outputs: Vec<AbiParameter>,
}

impl AbiFunction {
    /// Pure and view functions only ever execute locally.
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    pub fn is_payable(&self) -> bool {
        self.payable
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFunction {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: FunctionKind,
    #[serde(default)]
    constant: bool,
    #[serde(default)]
    payable: bool,
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    inputs: Vec<AbiParameter>,
    #[serde(default)]
    outputs: Vec<AbiParameter>,
}

impl From<RawFunction> for AbiFunction {
    fn from(raw: RawFunction) -> Self {
        let state_mutability = raw.state_mutability.unwrap_or(if raw.constant {
            StateMutability::View
        } else if raw.payable {
            StateMutability::Payable
        } else {
            StateMutability::NonPayable
        });

        Self {
            name: raw.name,
            kind: raw.kind,
            constant: matches!(
                state_mutability,
                StateMutability::Pure | StateMutability::View
            ),
            payable: state_mutability == StateMutability::Payable,
            state_mutability,
            inputs: raw.inputs,
            outputs: raw.outputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEvent {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiEventParameter>,
    #[serde(default)]
    pub anonymous: bool,
}

/// One entry of a JSON ABI array.
///
/// Entries other than functions and events (custom errors, unknown kinds) are
/// kept verbatim and otherwise ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiEntry {
    Function(AbiFunction),
    Event(AbiEvent),
    Other(serde_json::Value),
}

impl AbiEntry {
    pub fn as_function(&self) -> Option<&AbiFunction> {
        match self {
            AbiEntry::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&AbiEvent> {
        match self {
            AbiEntry::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for AbiEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        // `type` may be omitted, in which case it defaults to "function"
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("function");

        match kind {
            "function" | "constructor" | "fallback" | "receive" => serde_json::from_value(value)
                .map(AbiEntry::Function)
                .map_err(de::Error::custom),
            "event" => serde_json::from_value(value)
                .map(AbiEntry::Event)
                .map_err(de::Error::custom),
            _ => Ok(AbiEntry::Other(value)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
}

impl ContractOutput {
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.abi.iter().filter_map(AbiEntry::as_function)
    }

    pub fn events(&self) -> impl Iterator<Item = &AbiEvent> {
        self.abi.iter().filter_map(AbiEntry::as_event)
    }
}

/// Compiler output: source file -> contract name -> `{ abi }`.
///
/// Both levels keep the order of the input document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub contracts: IndexMap<String, IndexMap<String, ContractOutput>>,
}

impl CompilerOutput {
    /// Every `(source, contract name, output)` triple in document order.
    pub fn contracts(&self) -> impl Iterator<Item = (&str, &str, &ContractOutput)> {
        self.contracts.iter().flat_map(|(source, contracts)| {
            contracts
                .iter()
                .map(move |(name, output)| (source.as_str(), name.as_str(), output))
        })
    }

    /// Like [`CompilerOutput::contracts`] but without contracts whose ABI is empty.
    pub fn non_empty_contracts(&self) -> impl Iterator<Item = (&str, &str, &ContractOutput)> {
        self.contracts().filter(|(_, _, output)| !output.abi.is_empty())
    }

    /// Looks a contract up by name across all sources.
    pub fn find_contract(&self, name: &str) -> Option<&ContractOutput> {
        self.contracts()
            .find(|(_, contract, _)| *contract == name)
            .map(|(_, _, output)| output)
    }
}
