//! Rust source generation for contract bindings.
//!
//! The output is a single module: a lazily built [`EventRegistry`] holding
//! every event of the input, plus one wrapper struct per contract. Wrappers
//! forward to an [`Invoker`](crate::runtime::Invoker), normally a
//! [`Contract`](crate::runtime::Contract) over host dependencies.
//!
//! Method naming follows one convention: `name` submits a transaction and
//! returns its decoded events, `name_estimateGas` estimates it, and `name_`
//! executes locally and returns the function's outputs. Pure and view
//! functions only get the local method.

mod render;

#[cfg(test)]
#[rustfmt::skip]
#[allow(dead_code)]
mod fixture;

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::abi::types::{map_type, TypeContext};
use crate::abi::{AbiError, AbiFunction, CompilerOutput, ContractOutput, FunctionKind};
use crate::runtime::EventRegistry;

pub use render::{argument_name, rust_ident};

/// Numeric type of the generated methods, taken from the invoker.
const NUMBER: &str = "C::Number";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Crate path the generated code imports the runtime from.
    pub runtime_crate: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "contract_bindgen".to_string(),
        }
    }
}

impl GeneratorOptions {
    pub fn with_runtime_crate(runtime_crate: impl Into<String>) -> Self {
        Self {
            runtime_crate: runtime_crate.into(),
        }
    }
}

/// Renders bindings for every contract in `output` with a non-empty ABI.
pub fn generate_bindings<H>(
    output: &CompilerOutput,
    options: &GeneratorOptions,
    keccak256: H,
) -> Result<String, AbiError>
where
    H: Fn(&str) -> String,
{
    let registry = EventRegistry::from_compiler_output(keccak256, output)?;

    let mut contracts = Vec::new();
    for (source, name, contract) in output.non_empty_contracts() {
        debug!("Generating bindings for {} from {}", name, source);
        contracts.push(contract_template(name, contract)?);
    }

    Ok(format!(
        "{header}\n{registry}\n{contracts}",
        header = header(&options.runtime_crate),
        registry = registry_template(&registry),
        contracts = contracts.join("\n"),
    ))
}

fn header(runtime_crate: &str) -> String {
    format!(
        r#"// This file is generated by contract-bindgen. Do not edit by hand.

#![allow(non_snake_case, non_camel_case_types, unused_imports, clippy::all)]

use std::sync::{{Arc, OnceLock}};

use {runtime}::abi::{{AbiEventParameter, AbiFunction, AbiParameter, FunctionKind, StateMutability}};
use {runtime}::runtime::{{
    record_output, single_output, CallOptions, Contract, ContractError, Dependencies, Event,
    EventDescription, EventRegistry, Invoker, PayableCallOptions, Record, Value,
}};
"#,
        runtime = runtime_crate
    )
}

fn registry_template(registry: &EventRegistry) -> String {
    let descriptions: Vec<String> = registry
        .iter()
        .map(|description| {
            format!(
                "                {},",
                render::description_literal(description, "                ")
            )
        })
        .collect();

    format!(
        r#"/// Every event declared by the contracts below, keyed by topic hash.
pub fn event_registry() -> Arc<EventRegistry> {{
    static REGISTRY: OnceLock<Arc<EventRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| {{
            Arc::new(EventRegistry::from_descriptions(vec![
{descriptions}
            ]))
        }})
        .clone()
}}
"#,
        descriptions = descriptions.join("\n")
    )
}

/// A method argument: its Rust name, Rust type and `Value` conversion.
struct Argument {
    name: String,
    ty: String,
    value: String,
}

struct FunctionContext<'a> {
    contract: &'a str,
    function: &'a AbiFunction,
    abi_path: String,
    arguments: Vec<Argument>,
}

impl<'a> FunctionContext<'a> {
    fn new(contract: &'a str, abi_module: &str, function: &'a AbiFunction) -> Result<Self, AbiError> {
        let context = TypeContext::new(contract, &function.name);
        let arguments = function
            .inputs
            .iter()
            .enumerate()
            .map(|(i, input)| -> Result<Argument, AbiError> {
                let repr = map_type(input, &context)?;
                let name = argument_name(input, i);
                Ok(Argument {
                    ty: repr.rust_type(NUMBER),
                    value: repr.value_expr(&name),
                    name,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            contract,
            function,
            abi_path: format!("{}::{}()", abi_module, rust_ident(&function.name)),
            arguments,
        })
    }

    /// `to: String, amount: C::Number, ` including the trailing separator.
    fn parameters(&self) -> String {
        self.arguments
            .iter()
            .map(|argument| format!("{}: {}, ", argument.name, argument.ty))
            .collect()
    }

    fn argument_values(&self) -> String {
        let values: Vec<&str> = self
            .arguments
            .iter()
            .map(|argument| argument.value.as_str())
            .collect();
        format!("vec![{}]", values.join(", "))
    }

    fn options_type(&self) -> &'static str {
        if self.function.is_payable() {
            "PayableCallOptions<C::Number>"
        } else {
            "CallOptions"
        }
    }

    /// Converts the declared options into the invoker's payable form.
    fn options_expr(&self) -> &'static str {
        if self.function.is_payable() {
            "options"
        } else {
            "options.into()"
        }
    }
}

fn contract_template(name: &str, contract: &ContractOutput) -> Result<String, AbiError> {
    let struct_name = rust_ident(name);
    let abi_module = format!("{}_abi", name);

    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    let mut abi_functions = Vec::new();

    for function in contract
        .functions()
        .filter(|function| function.kind == FunctionKind::Function)
    {
        if !seen.insert(function.name.as_str()) {
            warn!(
                "Skipping overload of {}.{}: only the first declaration is bound",
                name, function.name
            );
            continue;
        }

        let context = FunctionContext::new(name, &abi_module, function)?;
        if !function.is_constant() {
            methods.push(remote_method_template(&context));
        }
        methods.push(local_method_template(&context)?);
        abi_functions.push(abi_function_template(function));
    }

    Ok(format!(
        r#"
#[derive(Clone, Debug)]
pub struct {name}<C: Invoker> {{
    invoker: C,
}}

impl<D: Dependencies> {name}<Contract<D>> {{
    pub fn new(dependencies: Arc<D>, address: impl Into<String>) -> Self {{
        Self::from_invoker(Contract::new(dependencies, address, event_registry()))
    }}

    pub fn address(&self) -> &str {{
        self.invoker.address()
    }}
}}

impl<C: Invoker> {name}<C> {{
    pub fn from_invoker(invoker: C) -> Self {{
        Self {{ invoker }}
    }}

    pub fn invoker(&self) -> &C {{
        &self.invoker
    }}
{methods}}}

mod {abi_module} {{
    use super::*;
{abi_functions}}}
"#,
        name = struct_name,
        methods = methods.concat(),
        abi_module = abi_module,
        abi_functions = abi_functions.concat(),
    ))
}

fn remote_method_template(context: &FunctionContext) -> String {
    let method = rust_ident(&context.function.name);
    format!(
        r#"
    pub async fn {method}(&self, {params}options: {options}) -> Result<Vec<Event<C::Number>>, ContractError> {{
        let arguments = {values};
        self.invoker
            .remote_call(&{abi}, arguments, {tx_name:?}, {forward})
            .await
    }}

    pub async fn {name}_estimateGas(&self, {params}options: {options}) -> Result<C::Number, ContractError> {{
        let arguments = {values};
        self.invoker
            .estimate_gas(&{abi}, arguments, {tx_name:?}, {forward})
            .await
    }}
"#,
        method = method,
        name = context.function.name,
        params = context.parameters(),
        options = context.options_type(),
        values = context.argument_values(),
        abi = context.abi_path,
        tx_name = context.function.name,
        forward = context.options_expr(),
    )
}

fn local_method_template(context: &FunctionContext) -> Result<String, AbiError> {
    let function = context.function;
    let (return_type, shape) = match function.outputs.len() {
        0 => ("()".to_string(), "Ok(())"),
        1 => ("Value<C::Number>".to_string(), "single_output(&abi, values)"),
        _ => {
            if function.outputs.iter().any(|output| output.name.is_empty()) {
                return Err(AbiError::UnnamedMultiOutput {
                    contract: context.contract.to_string(),
                    function: function.name.clone(),
                });
            }
            ("Record<C::Number>".to_string(), "record_output(&abi, values)")
        }
    };

    // outputs are decoded dynamically, but their types must still be known
    let type_context = TypeContext::new(context.contract, &function.name);
    for output in &function.outputs {
        map_type(output, &type_context)?;
    }

    let binding = if function.outputs.is_empty() {
        "let _values"
    } else {
        "let values"
    };

    Ok(format!(
        r#"
    pub async fn {name}_(&self, {params}options: {options}) -> Result<{return_type}, ContractError> {{
        let arguments = {values};
        let abi = {abi};
        {binding} = self.invoker.local_call(&abi, arguments, {forward}).await?;
        {shape}
    }}
"#,
        name = function.name,
        params = context.parameters(),
        options = context.options_type(),
        return_type = return_type,
        values = context.argument_values(),
        abi = context.abi_path,
        binding = binding,
        forward = context.options_expr(),
        shape = shape,
    ))
}

fn abi_function_template(function: &AbiFunction) -> String {
    let json = serde_json::to_string(function).unwrap_or_default();
    format!(
        r#"
    /// `{json}`
    pub(super) fn {name}() -> AbiFunction {{
        {literal}
    }}
"#,
        json = json,
        name = rust_ident(&function.name),
        literal = render::function_literal(function, "        "),
    )
}
