use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{AbiEntry, CompilerOutput, ContractOutput};

/// Load compiler output from disk.
///
/// Accepts the combined `{"contracts": {...}}` document, a single artifact
/// with an `abi` field, or a bare ABI array. The latter two are wrapped into
/// a one-contract output named after the artifact (or the file stem).
pub async fn load_compiler_output<P: AsRef<Path>>(path: P) -> Result<CompilerOutput> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read ABI file {:?}: {}", path, e))?;

    let fallback_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Contract");

    let output = parse_compiler_output(&content, fallback_name)
        .map_err(|e| anyhow!("Failed to parse ABI file {:?}: {}", path, e))?;

    debug!(
        "Loaded {} contract(s) from {:?}",
        output.contracts().count(),
        path
    );
    Ok(output)
}

pub fn parse_compiler_output(content: &str, fallback_name: &str) -> Result<CompilerOutput> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| anyhow!("Invalid JSON: {}", e))?;

    match &json {
        // straight from the text: `Value` objects would not keep contract order
        Value::Object(map) if map.contains_key("contracts") => serde_json::from_str(content)
            .map_err(|e| anyhow!("Invalid compiler output: {}", e)),
        Value::Object(map) if map.contains_key("abi") => {
            let name = map
                .get("contractName")
                .and_then(Value::as_str)
                .unwrap_or(fallback_name)
                .to_string();
            let abi: Vec<AbiEntry> = serde_json::from_value(map["abi"].clone())
                .map_err(|e| anyhow!("Invalid artifact ABI: {}", e))?;
            Ok(single_contract(fallback_name, name, abi))
        }
        Value::Array(_) => {
            let abi: Vec<AbiEntry> = serde_json::from_value(json.clone())
                .map_err(|e| anyhow!("Invalid ABI array: {}", e))?;
            Ok(single_contract(fallback_name, fallback_name.to_string(), abi))
        }
        _ => Err(anyhow!(
            "Expected compiler output, a contract artifact or an ABI array"
        )),
    }
}

fn single_contract(source: &str, name: String, abi: Vec<AbiEntry>) -> CompilerOutput {
    let mut contracts = IndexMap::new();
    contracts.insert(name, ContractOutput { abi });
    let mut sources = IndexMap::new();
    sources.insert(source.to_string(), contracts);
    CompilerOutput { contracts: sources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TRANSFER_ABI: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
         {"name":"from","type":"address","indexed":true},
         {"name":"to","type":"address","indexed":true},
         {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    #[tokio::test]
    async fn test_load_bare_abi_uses_file_stem() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("Token.json");
        std::fs::write(&path, TRANSFER_ABI).unwrap();

        let output = load_compiler_output(&path).await.unwrap();
        let token = output.find_contract("Token").unwrap();
        assert_eq!(token.functions().count(), 1);
        assert_eq!(token.events().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let temp_dir = tempdir().unwrap();
        let err = load_compiler_output(temp_dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read ABI file"));
    }

    #[test]
    fn test_artifact_prefers_contract_name() {
        let artifact = format!(r#"{{"contractName":"Coin","abi":{}}}"#, TRANSFER_ABI);
        let output = parse_compiler_output(&artifact, "artifact").unwrap();
        assert!(output.find_contract("Coin").is_some());
    }

    #[test]
    fn test_combined_output() {
        let combined = format!(r#"{{"contracts":{{"Token.sol":{{"Token":{{"abi":{}}}}}}}}}"#, TRANSFER_ABI);
        let output = parse_compiler_output(&combined, "ignored").unwrap();
        let (source, name, _) = output.contracts().next().unwrap();
        assert_eq!((source, name), ("Token.sol", "Token"));
    }

    #[test]
    fn test_combined_output_keeps_document_order() {
        let combined = r#"{"contracts":{"z.sol":{"Zeta":{"abi":[]},"Alpha":{"abi":[]}},"a.sol":{"Mid":{"abi":[]}}}}"#;
        let output = parse_compiler_output(combined, "ignored").unwrap();
        let names: Vec<&str> = output.contracts().map(|(_, name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_rejects_other_documents() {
        assert!(parse_compiler_output("42", "x").is_err());
        assert!(parse_compiler_output("{\"foo\":1}", "x").is_err());
    }
}
