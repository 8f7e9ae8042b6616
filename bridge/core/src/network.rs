// Copyright (c) 2024 The Botho Foundation

//! Well-known networks a bridge can be deployed on.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Local development chain
    Hardhat,
    /// Ethereum mainnet
    Mainnet,
    /// Goerli testnet
    Goerli,
    /// Sepolia testnet
    Sepolia,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Hardhat,
        Network::Mainnet,
        Network::Goerli,
        Network::Sepolia,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Hardhat => 31337,
            Network::Mainnet => 1,
            Network::Goerli => 5,
            Network::Sepolia => 11155111,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Hardhat => write!(f, "hardhat"),
            Network::Mainnet => write!(f, "mainnet"),
            Network::Goerli => write!(f, "goerli"),
            Network::Sepolia => write!(f, "sepolia"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hardhat" | "localhost" => Ok(Network::Hardhat),
            "mainnet" | "ethereum" => Ok(Network::Mainnet),
            "goerli" => Ok(Network::Goerli),
            "sepolia" => Ok(Network::Sepolia),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}
