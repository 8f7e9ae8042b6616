// Copyright (c) 2024 The Botho Foundation

//! Core types for the cross-chain asset bridge.
//!
//! This crate holds the data shared by depositors, the relayer and the
//! bridge contracts:
//!
//! - Deposit and claim records and their typed-data encodings
//! - Events emitted by the bridge and the wrapped-token factory
//! - Revert reasons
//! - Deployment configuration and network presets

pub mod config;
pub mod error;
pub mod events;
pub mod network;
pub mod typed;
pub mod types;

pub use config::{BridgeSettings, ChainSettings, DeploymentConfig};
pub use error::{BridgeError, ConfigError};
pub use events::{BridgeEvent, ClaimEvent, ClaimKind, DepositEvent, DepositKind, FactoryEvent};
pub use network::Network;
pub use types::{
    Address, Claim, ClaimData, DepositData, OriginalToken, Permit, SourceTxData, User,
};
