// Copyright (c) 2024 The Botho Foundation

//! Errors that revert a transaction.

use primitive_types::U256;
use xcb_bridge_core::{Address, BridgeError, ConfigError};
use xcb_token::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Bridge: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Token: {0}")]
    Token(#[from] TokenError),

    #[error("Factory: {0}")]
    Factory(#[from] FactoryError),

    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("No contract at {0:?}")]
    NoContract(Address),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("Caller {caller:?} is not the bridge")]
    NotBridge { caller: Address },

    #[error("Zero address")]
    ZeroAddress,

    #[error("Invalid origin chain id {0}")]
    InvalidChainId(U256),

    #[error("Address {0:?} already holds a contract")]
    AddressInUse(Address),
}
