// Copyright (c) 2024 The Botho Foundation

//! Contract storage of one chain.

use std::{collections::HashMap, sync::Arc};

use primitive_types::U256;
use xcb_bridge_core::Address;
use xcb_crypto_secp256k1::keccak256;
use xcb_token::PermitToken;

use crate::{bridge::BridgeState, error::Error, factory::FactoryState, transaction::Transaction};

/// External behaviour attached to a token, run after each of its balance
/// movements.
///
/// Hooks model tokens whose transfers call out to other contracts: they may
/// re-enter any contract through `tx`, fail outright, or return `Ok(false)` to
/// report the transfer as unsuccessful.
pub trait TransferHook: std::fmt::Debug + Send + Sync {
    fn on_transfer(
        &self,
        tx: &mut Transaction,
        token: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Error>;
}

/// Every contract deployed on a chain.
///
/// Transactions run against a clone, which replaces the committed state only
/// when the transaction succeeds.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub(crate) tokens: HashMap<Address, PermitToken>,
    pub(crate) bridges: HashMap<Address, BridgeState>,
    pub(crate) factories: HashMap<Address, FactoryState>,
    pub(crate) hooks: HashMap<Address, Arc<dyn TransferHook>>,
    create_nonces: HashMap<Address, u64>,
}

impl WorldState {
    pub fn token(&self, address: Address) -> Option<&PermitToken> {
        self.tokens.get(&address)
    }

    pub fn bridge(&self, address: Address) -> Option<&BridgeState> {
        self.bridges.get(&address)
    }

    pub fn factory(&self, address: Address) -> Option<&FactoryState> {
        self.factories.get(&address)
    }

    pub fn has_code(&self, address: Address) -> bool {
        self.tokens.contains_key(&address)
            || self.bridges.contains_key(&address)
            || self.factories.contains_key(&address)
    }

    /// Address of the next contract `deployer` creates:
    /// `keccak256(deployer || nonce)[12..]`.
    pub(crate) fn next_create_address(&mut self, deployer: Address) -> Address {
        let nonce = self.create_nonces.entry(deployer).or_default();
        let mut preimage = [0u8; 28];
        preimage[..20].copy_from_slice(deployer.as_bytes());
        preimage[20..].copy_from_slice(&nonce.to_be_bytes());
        *nonce += 1;
        Address::from_slice(&keccak256(preimage)[12..])
    }
}
