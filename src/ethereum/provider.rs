use crate::config::{Config, NetworkConfig};
use crate::ethereum::utils;
use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{Provider, ProviderBuilder, RootProvider},
    signers::local::PrivateKeySigner,
    transports::http::{reqwest::Url, Client, Http},
};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug)]
pub struct ProviderManager {
    providers: HashMap<String, RootProvider<Http<Client>>>,
    config: Config,
}

impl ProviderManager {
    pub fn new(config: Config) -> Result<Self> {
        let mut providers = HashMap::new();

        for (network_name, network_config) in &config.networks {
            let provider = Self::create_provider(network_config).map_err(|e| {
                anyhow!("Invalid RPC URL for network '{}': {}", network_name, e)
            })?;
            providers.insert(network_name.clone(), provider);
        }

        Ok(Self { providers, config })
    }

    fn create_provider(network_config: &NetworkConfig) -> Result<RootProvider<Http<Client>>> {
        let provider = ProviderBuilder::new().on_http(network_config.rpc_url.parse()?);

        Ok(provider)
    }

    fn network_name<'a>(&'a self, network: Option<&'a str>) -> Result<&'a str> {
        let name = network.unwrap_or(&self.config.default_network);
        utils::check_network(name, &self.available_networks())?;
        Ok(name)
    }

    pub fn get_provider(&self, network: Option<&str>) -> Result<&RootProvider<Http<Client>>> {
        let name = self.network_name(network)?;
        self.providers
            .get(name)
            .ok_or_else(|| anyhow!("Network '{}' not found", name))
    }

    pub fn get_network_config(&self, network: Option<&str>) -> Result<&NetworkConfig> {
        self.config.network(Some(self.network_name(network)?))
    }

    pub fn available_networks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.config.networks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Fails with a readable message when the endpoint cannot be reached.
    pub async fn validate_network_connection(&self, network: Option<&str>) -> Result<()> {
        let network_name = self.network_name(network)?;
        let provider = self.get_provider(network)?;

        match provider.get_block_number().await {
            Ok(block) => {
                tracing::debug!("Network {} is at block {}", network_name, block);
                Ok(())
            }
            Err(e) => Err(anyhow!(
                "Cannot connect to network '{}': {}",
                network_name,
                utils::describe_rpc_error(&e.to_string())
            )),
        }
    }

    /// A provider that signs and fills transactions locally with `private_key`.
    pub fn signing_provider(
        &self,
        network: Option<&str>,
        private_key: &str,
    ) -> Result<(impl Provider<Http<Client>>, Address)> {
        let network_config = self.get_network_config(network)?;

        let private_key = private_key.trim();
        let private_key = private_key.strip_prefix("0x").unwrap_or(private_key);
        let signer = PrivateKeySigner::from_str(private_key)
            .map_err(|e| anyhow!("Invalid private key: {}", e))?;
        let address = signer.address();

        let url: Url = network_config
            .rpc_url
            .parse()
            .map_err(|e| anyhow!("Invalid RPC URL '{}': {}", network_config.rpc_url, e))?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(url);

        tracing::info!("Signing transactions as 0x{:x}", address);
        Ok((provider, address))
    }
}
