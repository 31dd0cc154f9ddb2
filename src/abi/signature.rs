//! Canonical signatures, function selectors and event topics.
//!
//! The canonical form of a parameter list is its comma-joined type list with
//! names dropped and tuples expanded to their component types, e.g.
//! `submit((uint256,address)[],bytes32)`. Hashing that string with keccak256
//! gives the event topic; its first four bytes give the function selector.
//!
//! The hash primitive is always passed in, so this module stays independent
//! of any particular crypto backend.

use super::{AbiError, AbiEvent, AbiFunction, AbiParameter};

/// `0x` plus four bytes.
const SELECTOR_HEX_LEN: usize = 10;

/// Canonical type of a single parameter.
///
/// Tuples expand recursively to `(<components>)` followed by whatever array
/// suffix the declared type carries, so `tuple[]` becomes `(...)[]`. Every
/// other type is returned verbatim.
pub fn canonical_type(parameter: &AbiParameter) -> Result<String, AbiError> {
    match parameter.ty.strip_prefix("tuple") {
        Some(suffix) => {
            let components = parameter
                .components
                .as_deref()
                .filter(|components| !components.is_empty())
                .ok_or_else(|| AbiError::MalformedAbi {
                    parameter: parameter.name.clone(),
                    ty: parameter.ty.clone(),
                })?;
            Ok(format!("({}){}", canonical_params(components)?, suffix))
        }
        None => Ok(parameter.ty.clone()),
    }
}

/// Comma-joined canonical types of a parameter list.
pub fn canonical_params<'a, I>(parameters: I) -> Result<String, AbiError>
where
    I: IntoIterator<Item = &'a AbiParameter>,
{
    let types = parameters
        .into_iter()
        .map(canonical_type)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(types.join(","))
}

pub fn signature<'a, I>(name: &str, parameters: I) -> Result<String, AbiError>
where
    I: IntoIterator<Item = &'a AbiParameter>,
{
    Ok(format!("{}({})", name, canonical_params(parameters)?))
}

pub fn function_signature(function: &AbiFunction) -> Result<String, AbiError> {
    signature(&function.name, &function.inputs)
}

pub fn event_signature(event: &AbiEvent) -> Result<String, AbiError> {
    signature(
        &event.name,
        event.inputs.iter().map(|input| &input.parameter),
    )
}

/// Four-byte selector of `function`, as `0x` + 8 hex characters.
pub fn selector<H>(keccak256: H, function: &AbiFunction) -> Result<String, AbiError>
where
    H: Fn(&str) -> String,
{
    let hash = keccak256(&function_signature(function)?);
    Ok(hash.get(..SELECTOR_HEX_LEN).unwrap_or(&hash).to_string())
}

/// Full 32-byte topic hash of `event`, lowercased.
pub fn topic_hash<H>(keccak256: H, event: &AbiEvent) -> Result<String, AbiError>
where
    H: Fn(&str) -> String,
{
    Ok(keccak256(&event_signature(event)?).to_ascii_lowercase())
}
