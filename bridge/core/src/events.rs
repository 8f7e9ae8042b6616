// Copyright (c) 2024 The Botho Foundation

//! Events emitted by the bridge and the wrapped-token factory.

use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};

use crate::types::{Address, OriginalToken, User};

/// How a deposit took custody of the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositKind {
    /// Origin token moved into bridge custody
    Lock,
    /// Wrapped token destroyed, to be released on its origin chain
    Burn,
}

impl std::fmt::Display for DepositKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositKind::Lock => write!(f, "lock"),
            DepositKind::Burn => write!(f, "burn"),
        }
    }
}

/// How a claim paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// Wrapped token minted to the recipient
    Mint,
    /// Locked origin token transferred out of custody
    Release,
}

impl std::fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimKind::Mint => write!(f, "mint"),
            ClaimKind::Release => write!(f, "release"),
        }
    }
}

/// Everything a relayer needs from a deposit, besides its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub kind: DepositKind,
    pub from: User,
    pub to: User,
    /// The token the depositor handed over on this chain
    pub token: Address,
    /// Canonical identity of `token`
    pub original_token: OriginalToken,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub kind: ClaimKind,
    pub from: User,
    pub to: User,
    /// The token paid out on this chain
    pub token: Address,
    pub original_token: OriginalToken,
    pub value: U256,
    /// Dedup hash of the proven deposit
    pub source_tx_hash: H256,
    /// Nonce the authority signed over
    pub nonce: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeEvent {
    Deposit(DepositEvent),
    Claim(ClaimEvent),
    Paused {
        account: Address,
    },
    Unpaused {
        account: Address,
    },
    WrappedTokenFactoryUpdated {
        previous: Address,
        current: Address,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl std::fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeEvent::Deposit(deposit) => {
                write!(f, "deposit({}, {} -> {})", deposit.kind, deposit.from, deposit.to)
            }
            BridgeEvent::Claim(claim) => {
                write!(f, "claim({}, {} -> {})", claim.kind, claim.from, claim.to)
            }
            BridgeEvent::Paused { .. } => write!(f, "paused"),
            BridgeEvent::Unpaused { .. } => write!(f, "unpaused"),
            BridgeEvent::WrappedTokenFactoryUpdated { .. } => {
                write!(f, "wrapped_token_factory_updated")
            }
            BridgeEvent::OwnershipTransferred { .. } => write!(f, "ownership_transferred"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryEvent {
    WrappedTokenDeployed {
        original_token: OriginalToken,
        wrapped_token: Address,
        name: String,
        symbol: String,
    },
}
