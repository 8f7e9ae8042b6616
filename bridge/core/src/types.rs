// Copyright (c) 2024 The Botho Foundation

//! Records exchanged between depositors, the relayer and the bridge.

use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use xcb_crypto_secp256k1::{keccak256, Signature};

use crate::events::DepositEvent;

/// A 20-byte account or contract address.
pub type Address = H160;

/// A party on a specific chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub address: Address,
    pub chain_id: U256,
}

impl User {
    pub fn new(address: Address, chain_id: impl Into<U256>) -> Self {
        Self {
            address,
            chain_id: chain_id.into(),
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:?}", self.chain_id, self.address)
    }
}

/// Arguments of `deposit` / `depositWithPermit`.
///
/// `value`, `deadline` and `approve_signature` are only consulted on the
/// permit path; a plain deposit still moves `value` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositData {
    pub from: User,
    pub to: User,
    pub spender: Address,
    pub token: Address,
    pub value: U256,
    pub deadline: U256,
    pub approve_signature: Signature,
}

/// Canonical identity of an asset: its address on the chain it was issued on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginalToken {
    pub token_address: Address,
    pub origin_chain_id: U256,
}

impl OriginalToken {
    pub fn new(token_address: Address, origin_chain_id: impl Into<U256>) -> Self {
        Self {
            token_address,
            origin_chain_id: origin_chain_id.into(),
        }
    }
}

/// Location of the deposit event a claim proves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceTxData {
    pub transaction_hash: H256,
    pub block_hash: H256,
    pub log_index: U256,
}

impl SourceTxData {
    /// Dedup key: `keccak256(abi.encode(transactionHash, blockHash, logIndex))`.
    pub fn hash(&self) -> H256 {
        let mut encoded = [0u8; 96];
        encoded[..32].copy_from_slice(self.transaction_hash.as_bytes());
        encoded[32..64].copy_from_slice(self.block_hash.as_bytes());
        self.log_index.to_big_endian(&mut encoded[64..]);
        H256(keccak256(encoded))
    }
}

/// The record a relayer submits to the destination bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimData {
    pub from: User,
    pub to: User,
    pub value: U256,
    pub token: OriginalToken,
    pub deposit_tx_source_token: Address,
    pub target_token_address: Address,
    pub target_token_name: String,
    pub target_token_symbol: String,
    pub deadline: U256,
    pub source_tx_data: SourceTxData,
}

impl ClaimData {
    /// Build the claim for an observed deposit.
    ///
    /// The target token fields describe the asset expected on the destination
    /// chain; they are signed over but the bridge pays out based on `token`.
    pub fn for_deposit(
        deposit: &DepositEvent,
        proof: SourceTxData,
        target_token_address: Address,
        target_token_name: impl Into<String>,
        target_token_symbol: impl Into<String>,
        deadline: U256,
    ) -> Self {
        Self {
            from: deposit.from,
            to: deposit.to,
            value: deposit.value,
            token: deposit.original_token,
            deposit_tx_source_token: deposit.token,
            target_token_address,
            target_token_name: target_token_name.into(),
            target_token_symbol: target_token_symbol.into(),
            deadline,
            source_tx_data: proof,
        }
    }
}

/// The message the bridge authority signs: a claim bound to the current nonce
/// of its `from` address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim<'a> {
    pub claim_data: &'a ClaimData,
    pub nonce: U256,
}

/// A signed approval of `value` tokens from `owner` to `spender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
    pub nonce: U256,
    pub deadline: U256,
}
