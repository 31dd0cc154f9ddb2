use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Overrides the RPC endpoint of the selected network.
pub const RPC_URL_ENV: &str = "CONTRACT_BINDGEN_RPC_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub default_network: String,
    pub networks: HashMap<String, NetworkConfig>,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    /// Sender used when a call does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub allow_write_operations: bool,
    /// Environment variable holding the signing key for `send`.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

fn default_private_key_env() -> String {
    "PRIVATE_KEY".to_string()
}

fn default_runtime_crate() -> String {
    "contract_bindgen".to_string()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allow_write_operations: false,
            private_key_env: default_private_key_env(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: default_runtime_crate(),
            output: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut networks = HashMap::new();

        networks.insert(
            "local".to_string(),
            NetworkConfig {
                rpc_url: "http://127.0.0.1:8545".to_string(),
                chain_id: 31337,
                explorer_url: None,
                default_sender: None,
            },
        );

        networks.insert(
            "ethereum".to_string(),
            NetworkConfig {
                rpc_url: "https://eth-mainnet.g.alchemy.com/v2/demo".to_string(),
                chain_id: 1,
                explorer_url: Some("https://etherscan.io".to_string()),
                default_sender: None,
            },
        );

        networks.insert(
            "sepolia".to_string(),
            NetworkConfig {
                rpc_url: "https://eth-sepolia.g.alchemy.com/v2/demo".to_string(),
                chain_id: 11155111,
                explorer_url: Some("https://sepolia.etherscan.io".to_string()),
                default_sender: None,
            },
        );

        Self {
            default_network: "local".to_string(),
            networks,
            security: SecurityConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;

        toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))
    }

    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow!("Failed to create config directory {:?}: {}", parent, e)
                })?;
            }
        }

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {:?}: {}", path, e))
    }

    /// Loads `path` if given, falling back to the defaults when it cannot be
    /// read. Environment overrides are applied either way.
    pub async fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let mut config = match path {
            Some(path) => match Self::load_from_file(path).await {
                Ok(config) => {
                    tracing::info!("Loaded configuration from file");
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {}", e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.apply_env_vars();
        config
    }

    fn apply_env_vars(&mut self) {
        if let Ok(rpc_url) = std::env::var(RPC_URL_ENV) {
            tracing::info!("Using {} for network {}", RPC_URL_ENV, self.default_network);
            self.override_rpc_url(None, rpc_url);
        }

        for (name, network) in &self.networks {
            if network.rpc_url.contains("/demo") {
                tracing::debug!("Network {} uses a demo RPC endpoint", name);
            }
        }
    }

    /// Points `network` (or the default network) at `rpc_url`, adding an
    /// entry for it when none exists.
    pub fn override_rpc_url(&mut self, network: Option<&str>, rpc_url: String) {
        let name = network.unwrap_or(&self.default_network).to_string();
        match self.networks.get_mut(&name) {
            Some(existing) => existing.rpc_url = rpc_url,
            None => {
                self.networks.insert(
                    name,
                    NetworkConfig {
                        rpc_url,
                        chain_id: 0,
                        explorer_url: None,
                        default_sender: None,
                    },
                );
            }
        }
    }

    pub fn network(&self, network: Option<&str>) -> Result<&NetworkConfig> {
        let name = network.unwrap_or(&self.default_network);
        self.networks
            .get(name)
            .ok_or_else(|| anyhow!("Network '{}' not configured", name))
    }

    /// Reads the signing key from the configured environment variable.
    pub fn private_key(&self) -> Result<String> {
        std::env::var(&self.security.private_key_env).map_err(|_| {
            anyhow!(
                "Sending transactions requires a private key in the {} environment variable",
                self.security.private_key_env
            )
        })
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("contract-bindgen").join("config.toml"))
    }

    pub fn generate_sample() -> String {
        let sample_config = r#"# contract-bindgen configuration file

# Network used when --network is not given
default_network = "local"

[networks.local]
rpc_url = "http://127.0.0.1:8545"
chain_id = 31337
# default_sender = "0x..."

[networks.ethereum]
rpc_url = "https://eth-mainnet.g.alchemy.com/v2/YOUR_API_KEY_HERE"
chain_id = 1
explorer_url = "https://etherscan.io"

[networks.sepolia]
rpc_url = "https://eth-sepolia.g.alchemy.com/v2/YOUR_API_KEY_HERE"
chain_id = 11155111
explorer_url = "https://sepolia.etherscan.io"

[security]
# `send` is refused unless this is true or --allow-writes is passed
allow_write_operations = false
private_key_env = "PRIVATE_KEY"

[generator]
# Crate path the generated bindings import the runtime from
runtime_crate = "contract_bindgen"
# output = "src/bindings.rs"

# Environment variables:
# CONTRACT_BINDGEN_RPC_URL - overrides rpc_url of the selected network
# PRIVATE_KEY - signing key for `send` (name set by security.private_key_env)
"#;
        sample_config.to_string()
    }
}
