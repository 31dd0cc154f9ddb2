//! Maps ABI types onto the value shapes used by generated bindings.

use super::{AbiError, AbiParameter};

/// Where a type is being mapped, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub contract: &'a str,
    pub function: &'a str,
}

impl<'a> TypeContext<'a> {
    pub fn new(contract: &'a str, function: &'a str) -> Self {
        Self { contract, function }
    }

    fn unsupported(&self, ty: &str) -> AbiError {
        AbiError::UnsupportedType {
            contract: self.contract.to_string(),
            function: self.function.to_string(),
            ty: ty.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRepr {
    /// Any `uint<N>` or `int<N>`, carried by the host's numeric type.
    Number,
    Text,
    Address,
    /// `bytes` and `bytes1` through `bytes32`.
    Bytes,
    Bool,
    Array(Box<TypeRepr>),
    Tuple(Vec<(String, TypeRepr)>),
}

impl TypeRepr {
    /// Rust spelling of this type, with `number` standing in for numerics.
    pub fn rust_type(&self, number: &str) -> String {
        match self {
            TypeRepr::Number => number.to_string(),
            TypeRepr::Text | TypeRepr::Address => "String".to_string(),
            TypeRepr::Bytes => "Vec<u8>".to_string(),
            TypeRepr::Bool => "bool".to_string(),
            TypeRepr::Array(element) => format!("Vec<{}>", element.rust_type(number)),
            TypeRepr::Tuple(members) => {
                let types: Vec<String> = members
                    .iter()
                    .map(|(_, member)| member.rust_type(number))
                    .collect();
                if types.len() == 1 {
                    format!("({},)", types[0])
                } else {
                    format!("({})", types.join(", "))
                }
            }
        }
    }

    /// Rust expression converting `expr` (of [`TypeRepr::rust_type`]) into a `Value`.
    pub fn value_expr(&self, expr: &str) -> String {
        match self {
            TypeRepr::Number => format!("Value::Number({})", expr),
            TypeRepr::Text => format!("Value::Text({})", expr),
            TypeRepr::Address => format!("Value::Address({})", expr),
            TypeRepr::Bytes => format!("Value::Bytes({})", expr),
            TypeRepr::Bool => format!("Value::Bool({})", expr),
            TypeRepr::Array(element) => format!(
                "Value::Sequence({}.into_iter().map(|item| {}).collect())",
                expr,
                element.value_expr("item")
            ),
            TypeRepr::Tuple(members) => {
                let fields: Vec<String> = members
                    .iter()
                    .enumerate()
                    .map(|(i, (_, member))| member.value_expr(&format!("{}.{}", expr, i)))
                    .collect();
                format!("Value::Sequence(vec![{}])", fields.join(", "))
            }
        }
    }
}

/// Maps a parameter's declared type, recursing through arrays and tuples.
pub fn map_type(parameter: &AbiParameter, context: &TypeContext) -> Result<TypeRepr, AbiError> {
    map_token(&parameter.ty, parameter, context)
}

fn map_token(
    ty: &str,
    parameter: &AbiParameter,
    context: &TypeContext,
) -> Result<TypeRepr, AbiError> {
    if let Some(element) = ty.strip_suffix(']') {
        let open = element.rfind('[').ok_or_else(|| context.unsupported(ty))?;
        let length = &element[open + 1..];
        if !length.is_empty() && length.parse::<usize>().map_or(true, |n| n == 0) {
            return Err(context.unsupported(ty));
        }
        let inner = map_token(&element[..open], parameter, context)?;
        return Ok(TypeRepr::Array(Box::new(inner)));
    }

    match ty {
        "tuple" => {
            let components = parameter
                .components
                .as_deref()
                .filter(|components| !components.is_empty())
                .ok_or_else(|| AbiError::MalformedAbi {
                    parameter: parameter.name.clone(),
                    ty: parameter.ty.clone(),
                })?;
            let members = components
                .iter()
                .map(|component| -> Result<(String, TypeRepr), AbiError> {
                    Ok((component.name.clone(), map_type(component, context)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeRepr::Tuple(members))
        }
        "string" => Ok(TypeRepr::Text),
        "address" => Ok(TypeRepr::Address),
        "bool" => Ok(TypeRepr::Bool),
        "bytes" => Ok(TypeRepr::Bytes),
        _ => {
            if let Some(bits) = ty.strip_prefix("uint").or_else(|| ty.strip_prefix("int")) {
                if is_integer_width(bits) {
                    return Ok(TypeRepr::Number);
                }
            } else if let Some(size) = ty.strip_prefix("bytes") {
                if matches!(size.parse::<usize>(), Ok(1..=32)) {
                    return Ok(TypeRepr::Bytes);
                }
            }
            Err(context.unsupported(ty))
        }
    }
}

/// `""` (an alias for 256) or a multiple of 8 between 8 and 256.
fn is_integer_width(bits: &str) -> bool {
    if bits.is_empty() {
        return true;
    }
    if bits.starts_with('0') {
        return false;
    }
    matches!(bits.parse::<usize>(), Ok(n) if n % 8 == 0 && (8..=256).contains(&n))
}
