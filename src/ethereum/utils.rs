use alloy::primitives::{Address, B256, U256};
use anyhow::{anyhow, Result};
use std::str::FromStr;

fn check_hex_body<'a>(value: &'a str, what: &str, hex_len: usize) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("{} cannot be empty", what));
    }

    let body = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| anyhow!("Invalid {}: '{}'. Expected a '0x' prefix", what, value))?;

    if body.len() != hex_len {
        return Err(anyhow!(
            "Invalid {} length: '{}'. Expected 0x followed by {} hex characters",
            what,
            value,
            hex_len
        ));
    }
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "Invalid {}: '{}'. Contains non-hexadecimal characters",
            what,
            value
        ));
    }
    Ok(value)
}

/// Parses a `0x`-prefixed 20-byte address. Checksums are not enforced.
pub fn parse_address(address: &str) -> Result<Address> {
    let address = check_hex_body(address, "address", 40)?;
    Address::from_str(address).map_err(|e| anyhow!("Invalid address '{}': {}", address, e))
}

pub fn parse_tx_hash(hash: &str) -> Result<B256> {
    let hash = check_hex_body(hash, "transaction hash", 64)?;
    B256::from_str(hash).map_err(|e| anyhow!("Invalid transaction hash '{}': {}", hash, e))
}

/// Parses a wei amount given either in decimal or as `0x` hex.
pub fn parse_amount(value: &str) -> Result<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("Value cannot be empty"));
    }

    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => U256::from_str_radix(hex, 16)
            .map_err(|_| anyhow!("Invalid hexadecimal value: '{}'", value)),
        None => U256::from_str(value).map_err(|_| {
            anyhow!(
                "Invalid numeric value: '{}'. Use decimal format or '0x' prefixed hex",
                value
            )
        }),
    }
}

pub fn check_network(network: &str, available_networks: &[String]) -> Result<()> {
    if network.is_empty() {
        return Err(anyhow!("Network name cannot be empty"));
    }

    if !available_networks.iter().any(|name| name == network) {
        return Err(anyhow!(
            "Unknown network: '{}'. Available networks: {}",
            network,
            available_networks.join(", ")
        ));
    }

    Ok(())
}

/// Solidity identifier rules: a letter or `_` followed by alphanumerics or `_`.
pub fn check_function_name(function_name: &str) -> Result<()> {
    let mut chars = function_name.chars();
    match chars.next() {
        None => Err(anyhow!("Function name cannot be empty")),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_' || first == '$') => Err(anyhow!(
            "Invalid function name: '{}'. Function names must start with a letter or underscore",
            function_name
        )),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') => Err(anyhow!(
            "Invalid function name: '{}'. Function names can only contain letters, numbers, and underscores",
            function_name
        )),
        Some(_) => Ok(()),
    }
}

/// Turns common JSON-RPC failures into an actionable message.
pub fn describe_rpc_error(error: &str) -> String {
    let hint = if error.contains("execution reverted") {
        "The contract reverted. Check the arguments and the sender"
    } else if error.contains("insufficient funds") {
        "The sender cannot cover value plus gas"
    } else if error.contains("gas required exceeds allowance") {
        "Gas limit too low for this call"
    } else if error.contains("nonce too low") {
        "Another transaction with this nonce was already mined"
    } else if error.contains("connection refused") || error.contains("network unreachable") {
        "Cannot connect to the RPC endpoint. Check the rpc_url of the selected network"
    } else if error.contains("timeout") {
        "The RPC endpoint timed out"
    } else if error.contains("rate limit") {
        "The RPC endpoint is rate limiting requests"
    } else if error.contains("method not found") {
        "The RPC endpoint does not support this method"
    } else {
        return format!("RPC error: {}", error);
    };
    format!("{} ({})", hint, error)
}
