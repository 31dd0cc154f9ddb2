//! Rust literals and identifiers for generated source.

use crate::abi::{AbiEventParameter, AbiFunction, AbiParameter, FunctionKind, StateMutability};
use crate::runtime::EventDescription;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW: &[&str] = &["self", "Self", "super", "crate"];

/// Names that would shadow the `options` argument of every generated method.
const RESERVED_ARGUMENTS: &[&str] = &["options"];

/// A valid Rust identifier for `name`.
pub fn rust_ident(name: &str) -> String {
    if NON_RAW.contains(&name) {
        format!("{}_", name)
    } else if KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Argument name for the `index`th input of a generated method.
///
/// Unnamed inputs become `arg<index>` and a single leading underscore is
/// dropped, so `_to` becomes `to`.
pub fn argument_name(parameter: &AbiParameter, index: usize) -> String {
    let name = parameter
        .name
        .strip_prefix('_')
        .unwrap_or(&parameter.name);
    if name.is_empty() {
        return format!("arg{}", index);
    }
    if RESERVED_ARGUMENTS.contains(&name) {
        return format!("{}_", name);
    }
    rust_ident(name)
}

pub fn parameter_literal(parameter: &AbiParameter) -> String {
    let base = format!("AbiParameter::new({:?}, {:?})", parameter.name, parameter.ty);
    match &parameter.components {
        Some(components) => format!("{}.with_components({})", base, parameter_list(components)),
        None => base,
    }
}

pub fn parameter_list(parameters: &[AbiParameter]) -> String {
    let items: Vec<String> = parameters.iter().map(parameter_literal).collect();
    format!("vec![{}]", items.join(", "))
}

fn event_parameter_literal(parameter: &AbiEventParameter) -> String {
    format!(
        "AbiEventParameter::new({}, {})",
        parameter_literal(&parameter.parameter),
        parameter.indexed
    )
}

fn kind_variant(kind: FunctionKind) -> &'static str {
    match kind {
        FunctionKind::Function => "Function",
        FunctionKind::Constructor => "Constructor",
        FunctionKind::Fallback => "Fallback",
        FunctionKind::Receive => "Receive",
    }
}

fn mutability_variant(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "Pure",
        StateMutability::View => "View",
        StateMutability::Payable => "Payable",
        StateMutability::NonPayable => "NonPayable",
    }
}

/// `AbiFunction { .. }` struct literal, one field per line at `indent`.
pub fn function_literal(function: &AbiFunction, indent: &str) -> String {
    [
        "AbiFunction {".to_string(),
        format!("{}    name: {:?}.to_string(),", indent, function.name),
        format!("{}    kind: FunctionKind::{},", indent, kind_variant(function.kind)),
        format!("{}    constant: {},", indent, function.constant),
        format!("{}    payable: {},", indent, function.payable),
        format!(
            "{}    state_mutability: StateMutability::{},",
            indent,
            mutability_variant(function.state_mutability)
        ),
        format!("{}    inputs: {},", indent, parameter_list(&function.inputs)),
        format!("{}    outputs: {},", indent, parameter_list(&function.outputs)),
        format!("{}}}", indent),
    ]
    .join("\n")
}

pub fn description_literal(description: &EventDescription, indent: &str) -> String {
    let parameters: Vec<String> = description
        .parameters
        .iter()
        .map(event_parameter_literal)
        .collect();
    [
        "EventDescription {".to_string(),
        format!("{}    name: {:?}.to_string(),", indent, description.name),
        format!("{}    signature: {:?}.to_string(),", indent, description.signature),
        format!(
            "{}    signature_hash: {:?}.to_string(),",
            indent, description.signature_hash
        ),
        format!("{}    parameters: vec![{}],", indent, parameters.join(", ")),
        format!("{}}}", indent),
    ]
    .join("\n")
}
