// Copyright (c) 2024 The Botho Foundation

//! Reasons a bridge call reverts.

use primitive_types::{H256, U256};

use crate::types::Address;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    // === Validation ===
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid chain id")]
    InvalidChainId,

    #[error("Invalid token amount")]
    InvalidTokenAmount,

    #[error("Sender {caller:?} is not the depositor {from:?}")]
    SenderIsNotDepositor { caller: Address, from: Address },

    #[error("Permit spender {spender:?} is not this bridge")]
    SpenderIsNotBridge { spender: Address },

    // === Signatures ===
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Recovered signer {recovered:?} is not the owner")]
    AddressIsNotTheOwner { recovered: Address },

    // === Replay ===
    #[error("Source transaction {0:?} already claimed")]
    AlreadyClaimed(H256),

    // === Routing ===
    #[error("Burned token must return to its origin chain {origin}")]
    IncorrectDestinationChain { origin: U256 },

    #[error("Claim targets chain {provided}, this is chain {current}")]
    CurrentAndProvidedChainsDoNotMatch { current: U256, provided: U256 },

    #[error("Wrapped token factory is not set")]
    FactoryNotSet,

    // === Transfer ===
    #[error("Token transfer failed")]
    TransferFailed,

    // === Access ===
    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Pausable: paused")]
    Paused,

    #[error("Pausable: not paused")]
    NotPaused,

    #[error("Reentrant call")]
    ReentrantCall,
}

/// Errors loading a deployment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Either a network or a chain id must be configured")]
    MissingChainId,

    #[error("Chain id must be non-zero")]
    ZeroChainId,

    #[error("Chain id {configured} does not match network {network} ({expected})")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        configured: u64,
    },

    #[error("Bridge name must not be empty")]
    EmptyBridgeName,
}
