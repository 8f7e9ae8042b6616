// Copyright (c) 2024 The Botho Foundation

//! Deployment configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, network::Network};

/// Settings for standing up one chain with a bridge on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Chain the bridge is deployed on
    #[serde(default)]
    pub chain: ChainSettings,

    /// Bridge contract settings
    #[serde(default)]
    pub bridge: BridgeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Named network preset
    #[serde(default)]
    pub network: Option<Network>,

    /// Explicit chain id; must agree with `network` when both are set
    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Seconds between consecutive blocks
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,

    /// Unix timestamp of the genesis block (wall clock when unset)
    #[serde(default)]
    pub genesis_timestamp: Option<i64>,
}

fn default_block_time() -> u64 {
    12
}

impl ChainSettings {
    pub fn for_network(network: Network) -> Self {
        Self {
            network: Some(network),
            ..Self::default()
        }
    }

    /// Settings for `chain_id`, tagged with its preset when it has one.
    pub fn for_chain_id(chain_id: u64) -> Self {
        Self {
            network: Network::from_chain_id(chain_id),
            chain_id: Some(chain_id),
            ..Self::default()
        }
    }

    /// Resolve the effective chain id.
    pub fn chain_id(&self) -> Result<u64, ConfigError> {
        let chain_id = match (self.network, self.chain_id) {
            (Some(network), Some(configured)) if network.chain_id() != configured => {
                return Err(ConfigError::ChainIdMismatch {
                    network: network.to_string(),
                    expected: network.chain_id(),
                    configured,
                });
            }
            (_, Some(configured)) => configured,
            (Some(network), None) => network.chain_id(),
            (None, None) => return Err(ConfigError::MissingChainId),
        };

        if chain_id == 0 {
            return Err(ConfigError::ZeroChainId);
        }
        Ok(chain_id)
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            network: Some(Network::Hardhat),
            chain_id: None,
            block_time_secs: default_block_time(),
            genesis_timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Contract name, also the signing domain name
    #[serde(default = "default_bridge_name")]
    pub name: String,

    /// Deploy paused; the owner unpauses once the factory is wired up
    #[serde(default = "default_start_paused")]
    pub start_paused: bool,
}

fn default_bridge_name() -> String {
    "Bridge".to_string()
}

fn default_start_paused() -> bool {
    true
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            name: default_bridge_name(),
            start_paused: default_start_paused(),
        }
    }
}

impl DeploymentConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate TOML configuration.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chain.chain_id()?;
        if self.bridge.name.is_empty() {
            return Err(ConfigError::EmptyBridgeName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = DeploymentConfig::default();
        assert_eq!(config.chain.chain_id().unwrap(), 31337);
        assert_eq!(config.chain.block_time_secs, 12);
        assert_eq!(config.bridge.name, "Bridge");
        assert!(config.bridge.start_paused);
    }

    #[test]
    fn test_parse_full_config() {
        let config = DeploymentConfig::parse(
            r#"
            [chain]
            network = "goerli"
            block_time_secs = 5
            genesis_timestamp = 1700000000

            [bridge]
            name = "Goerli Bridge"
            start_paused = false
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.chain_id().unwrap(), 5);
        assert_eq!(config.chain.block_time_secs, 5);
        assert_eq!(config.chain.genesis_timestamp, Some(1_700_000_000));
        assert_eq!(config.bridge.name, "Goerli Bridge");
        assert!(!config.bridge.start_paused);
    }

    #[test]
    fn test_explicit_chain_id() {
        let config = DeploymentConfig::parse(
            r#"
            [chain]
            chain_id = 99999
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.network, None);
        assert_eq!(config.chain.chain_id().unwrap(), 99999);
        assert_eq!(config.bridge, BridgeSettings::default());
    }

    #[test]
    fn test_settings_for_chain_id() {
        let goerli = ChainSettings::for_chain_id(5);
        assert_eq!(goerli.network, Some(Network::Goerli));
        assert_eq!(goerli.chain_id().unwrap(), 5);

        let custom = ChainSettings::for_chain_id(99999);
        assert_eq!(custom.network, None);
        assert_eq!(custom.chain_id().unwrap(), 99999);
    }

    #[test]
    fn test_invalid_configs() {
        assert_matches!(
            DeploymentConfig::parse("[chain]\nnetwork = \"mainnet\"\nchain_id = 5\n"),
            Err(ConfigError::ChainIdMismatch { expected: 1, configured: 5, .. })
        );
        assert_matches!(
            DeploymentConfig::parse("[chain]\nchain_id = 0\n"),
            Err(ConfigError::ZeroChainId)
        );
        assert_matches!(
            DeploymentConfig::parse("[chain]\nnetwork = \"ropsten\"\n"),
            Err(ConfigError::Parse(_))
        );
        assert_matches!(
            DeploymentConfig::parse("[bridge]\nname = \"\"\n"),
            Err(ConfigError::EmptyBridgeName)
        );
        assert_matches!(
            ChainSettings {
                network: None,
                chain_id: None,
                ..ChainSettings::default()
            }
            .chain_id(),
            Err(ConfigError::MissingChainId)
        );
    }

    #[test]
    fn test_from_file_missing() {
        assert_matches!(
            DeploymentConfig::from_file("/nonexistent/bridge.toml"),
            Err(ConfigError::Read(_))
        );
    }
}
