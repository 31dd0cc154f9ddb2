//! Conversions between engine [`Value`]s, alloy's dynamic ABI values and JSON.
//!
//! Signed integers travel through the engine as the raw two's complement
//! `U256`, so `int256(-1)` is `U256::MAX`. Typed conversions to JSON render
//! them signed again.

use alloy::dyn_abi::{DynSolType, DynSolValue, Word};
use alloy::primitives::{Address, I256, U256};
use anyhow::{anyhow, Result};
use serde_json::{Map, Value as Json};
use std::str::FromStr;

use crate::abi::signature::canonical_type;
use crate::abi::{AbiFunction, AbiParameter};
use crate::runtime::{Event, Value};

/// alloy type for `parameter`, tuples included.
pub fn sol_type(parameter: &AbiParameter) -> Result<DynSolType> {
    let canonical = canonical_type(parameter)?;
    DynSolType::parse(&canonical).map_err(|e| anyhow!("Invalid ABI type '{}': {}", canonical, e))
}

fn sol_types(parameters: &[AbiParameter]) -> Result<Vec<DynSolType>> {
    parameters.iter().map(sol_type).collect()
}

/// ABI-encodes `arguments` against the inputs of `function`, without a selector
/// and without `0x`.
pub fn encode_params(function: &AbiFunction, arguments: &[Value<U256>]) -> Result<String> {
    if arguments.len() != function.inputs.len() {
        return Err(anyhow!(
            "Parameter count mismatch for function '{}': expected {} parameters, got {}",
            function.name,
            function.inputs.len(),
            arguments.len()
        ));
    }

    let values = function
        .inputs
        .iter()
        .zip(arguments)
        .enumerate()
        .map(|(i, (input, argument))| {
            let ty = sol_type(input)?;
            to_dyn(argument, &ty).map_err(|e| {
                anyhow!(
                    "Invalid parameter #{} ('{}' of type '{}'): {}",
                    i + 1,
                    input.name,
                    input.ty,
                    e
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(hex::encode(DynSolValue::Tuple(values).abi_encode_params()))
}

pub fn decode_params(parameters: &[AbiParameter], encoded: &str) -> Result<Vec<Value<U256>>> {
    let types = sol_types(parameters)?;
    if types.is_empty() {
        return Ok(vec![]);
    }

    let bytes = hex::decode(encoded.trim_start_matches("0x"))
        .map_err(|e| anyhow!("Invalid hex payload: {}", e))?;
    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(&bytes)
        .map_err(|e| anyhow!("Failed to decode parameters: {}", e))?;

    match decoded {
        DynSolValue::Tuple(values) => values.into_iter().map(from_dyn).collect(),
        other => Ok(vec![from_dyn(other)?]),
    }
}

fn expect_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(anyhow!("expected {} elements, got {}", expected, actual));
    }
    Ok(())
}

pub fn to_dyn(value: &Value<U256>, ty: &DynSolType) -> Result<DynSolValue> {
    match (value, ty) {
        (Value::Number(n), DynSolType::Uint(bits)) => Ok(DynSolValue::Uint(*n, *bits)),
        (Value::Number(n), DynSolType::Int(bits)) => Ok(DynSolValue::Int(I256::from_raw(*n), *bits)),
        (Value::Text(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),
        (Value::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),
        (Value::Address(s), DynSolType::Address) => Address::from_str(s)
            .map(DynSolValue::Address)
            .map_err(|e| anyhow!("Invalid address '{}': {}", s, e)),
        (Value::Bytes(bytes), DynSolType::Bytes) => Ok(DynSolValue::Bytes(bytes.clone())),
        (Value::Bytes(bytes), DynSolType::FixedBytes(size)) => {
            if bytes.len() > *size {
                return Err(anyhow!("{} bytes do not fit in bytes{}", bytes.len(), size));
            }
            let mut word = [0u8; 32];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(DynSolValue::FixedBytes(Word::from(word), *size))
        }
        (Value::Sequence(items), DynSolType::Array(inner)) => Ok(DynSolValue::Array(
            items
                .iter()
                .map(|item| to_dyn(item, inner))
                .collect::<Result<_>>()?,
        )),
        (Value::Sequence(items), DynSolType::FixedArray(inner, len)) => {
            expect_len(*len, items.len())?;
            Ok(DynSolValue::FixedArray(
                items
                    .iter()
                    .map(|item| to_dyn(item, inner))
                    .collect::<Result<_>>()?,
            ))
        }
        (Value::Sequence(items), DynSolType::Tuple(types)) => {
            expect_len(types.len(), items.len())?;
            Ok(DynSolValue::Tuple(
                items
                    .iter()
                    .zip(types)
                    .map(|(item, ty)| to_dyn(item, ty))
                    .collect::<Result<_>>()?,
            ))
        }
        (Value::Record(fields), DynSolType::Tuple(types)) => {
            expect_len(types.len(), fields.len())?;
            Ok(DynSolValue::Tuple(
                fields
                    .values()
                    .zip(types)
                    .map(|(item, ty)| to_dyn(item, ty))
                    .collect::<Result<_>>()?,
            ))
        }
        (value, ty) => Err(anyhow!("Cannot encode {:?} as {}", value, ty.sol_type_name())),
    }
}

pub fn from_dyn(value: DynSolValue) -> Result<Value<U256>> {
    match value {
        DynSolValue::Address(addr) => Ok(Value::Address(format!("0x{:x}", addr))),
        DynSolValue::Uint(n, _) => Ok(Value::Number(n)),
        DynSolValue::Int(n, _) => Ok(Value::Number(n.into_raw())),
        DynSolValue::Bool(b) => Ok(Value::Bool(b)),
        DynSolValue::String(s) => Ok(Value::Text(s)),
        DynSolValue::Bytes(bytes) => Ok(Value::Bytes(bytes)),
        DynSolValue::FixedBytes(word, size) => Ok(Value::Bytes(word[..size].to_vec())),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Ok(Value::Sequence(
                items.into_iter().map(from_dyn).collect::<Result<_>>()?,
            ))
        }
        other => Err(anyhow!("Unsupported ABI value: {:?}", other)),
    }
}

/// Builds call arguments from JSON: either an array in input order or an
/// object keyed by input name.
pub fn json_arguments(function: &AbiFunction, arguments: &Json) -> Result<Vec<Value<U256>>> {
    let expected: Vec<String> = function
        .inputs
        .iter()
        .map(|input| format!("{}: {}", input.name, input.ty))
        .collect();

    let values: Vec<&Json> = match arguments {
        Json::Array(items) => {
            if items.len() != function.inputs.len() {
                return Err(anyhow!(
                    "Parameter count mismatch for function '{}': expected {} parameters, got {}.\nExpected parameters: [{}]",
                    function.name,
                    function.inputs.len(),
                    items.len(),
                    expected.join(", ")
                ));
            }
            items.iter().collect()
        }
        Json::Object(fields) => function
            .inputs
            .iter()
            .map(|input| {
                fields.get(&input.name).ok_or_else(|| {
                    anyhow!(
                        "Missing required parameter '{}' of type '{}' for function '{}'",
                        input.name,
                        input.ty,
                        function.name
                    )
                })
            })
            .collect::<Result<_>>()?,
        Json::Null if function.inputs.is_empty() => vec![],
        other => {
            return Err(anyhow!(
                "Arguments for '{}' must be a JSON array or object ({}), got {}",
                function.name,
                expected.join(", "),
                other
            ))
        }
    };

    function
        .inputs
        .iter()
        .zip(values)
        .map(|(input, json)| {
            let ty = sol_type(input)?;
            json_to_value(json, &ty)
                .map_err(|e| anyhow!("Invalid parameter '{}' of type '{}': {}", input.name, input.ty, e))
        })
        .collect()
}

fn json_number(json: &Json, signed: bool) -> Result<U256> {
    match json {
        Json::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(U256::from(u))
            } else if let (true, Some(i)) = (signed, n.as_i64()) {
                Ok(I256::try_from(i)
                    .map_err(|e| anyhow!("Invalid int value {}: {}", i, e))?
                    .into_raw())
            } else {
                Err(anyhow!("Invalid integer value: {}", n))
            }
        }
        Json::String(s) => {
            if let Some(hex) = s.strip_prefix("0x") {
                U256::from_str_radix(hex, 16).map_err(|_| anyhow!("Invalid hex integer: {}", s))
            } else if signed {
                I256::from_dec_str(s)
                    .map(I256::into_raw)
                    .map_err(|_| anyhow!("Invalid int string: {}", s))
            } else {
                U256::from_str(s).map_err(|_| anyhow!("Invalid uint string: {}", s))
            }
        }
        _ => Err(anyhow!("Integer must be a number or string")),
    }
}

fn json_hex(json: &Json) -> Result<Vec<u8>> {
    let text = json
        .as_str()
        .ok_or_else(|| anyhow!("Bytes must be a hex string"))?;
    hex::decode(text.trim_start_matches("0x")).map_err(|_| anyhow!("Invalid hex string: {}", text))
}

pub fn json_to_value(json: &Json, ty: &DynSolType) -> Result<Value<U256>> {
    match ty {
        DynSolType::Uint(_) => Ok(Value::Number(json_number(json, false)?)),
        DynSolType::Int(_) => Ok(Value::Number(json_number(json, true)?)),
        DynSolType::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| anyhow!("Bool parameter must be a boolean")),
        DynSolType::String => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| anyhow!("String parameter must be a string")),
        DynSolType::Address => {
            let text = json
                .as_str()
                .ok_or_else(|| anyhow!("Address must be a string"))?;
            Address::from_str(text).map_err(|e| anyhow!("Invalid address '{}': {}", text, e))?;
            Ok(Value::Address(text.to_string()))
        }
        DynSolType::Bytes | DynSolType::FixedBytes(_) => Ok(Value::Bytes(json_hex(json)?)),
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("Array parameter must be an array"))?;
            Ok(Value::Sequence(
                items
                    .iter()
                    .map(|item| json_to_value(item, inner))
                    .collect::<Result<_>>()?,
            ))
        }
        DynSolType::Tuple(types) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("Tuple parameter must be an array"))?;
            expect_len(types.len(), items.len())?;
            Ok(Value::Sequence(
                items
                    .iter()
                    .zip(types)
                    .map(|(item, ty)| json_to_value(item, ty))
                    .collect::<Result<_>>()?,
            ))
        }
        other => Err(anyhow!("Unsupported Solidity type: {}", other.sol_type_name())),
    }
}

/// JSON rendering of a value whose ABI type is known.
pub fn value_to_json(value: &Value<U256>, ty: &DynSolType) -> Json {
    match (value, ty) {
        (Value::Number(n), DynSolType::Int(_)) => Json::String(I256::from_raw(*n).to_string()),
        (Value::Sequence(items), DynSolType::Array(inner) | DynSolType::FixedArray(inner, _)) => {
            Json::Array(items.iter().map(|item| value_to_json(item, inner)).collect())
        }
        (Value::Sequence(items), DynSolType::Tuple(types)) => Json::Array(
            items
                .iter()
                .zip(types)
                .map(|(item, ty)| value_to_json(item, ty))
                .collect(),
        ),
        (value, _) => untyped_json(value),
    }
}

/// Renders function outputs: a bare value for one output, otherwise an
/// object keyed by output name (or position when unnamed).
pub fn outputs_to_json(outputs: &[AbiParameter], values: &[Value<U256>]) -> Result<Json> {
    let rendered = outputs
        .iter()
        .zip(values)
        .map(|(output, value)| -> Result<Json> { Ok(value_to_json(value, &sol_type(output)?)) })
        .collect::<Result<Vec<Json>>>()?;

    match rendered.len() {
        0 => Ok(Json::Null),
        1 => Ok(rendered.into_iter().next().unwrap_or(Json::Null)),
        _ => Ok(Json::Object(
            outputs
                .iter()
                .enumerate()
                .map(|(i, output)| {
                    if output.name.is_empty() {
                        i.to_string()
                    } else {
                        output.name.clone()
                    }
                })
                .zip(rendered)
                .collect(),
        )),
    }
}

pub fn event_to_json(event: &Event<U256>) -> Json {
    let parameters: Map<String, Json> = event
        .parameters
        .iter()
        .map(|(name, value)| (name.clone(), untyped_json(value)))
        .collect();
    serde_json::json!({
        "name": event.name,
        "parameters": parameters,
    })
}

fn untyped_json(value: &Value<U256>) -> Json {
    match value {
        Value::Number(n) => Json::String(n.to_string()),
        Value::Text(s) | Value::Address(s) => Json::String(s.clone()),
        Value::Bool(b) => Json::Bool(*b),
        Value::Bytes(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
        Value::Sequence(items) => Json::Array(items.iter().map(untyped_json).collect()),
        Value::Record(fields) => Json::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), untyped_json(value)))
                .collect(),
        ),
    }
}
