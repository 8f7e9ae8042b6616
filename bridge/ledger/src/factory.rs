// Copyright (c) 2024 The Botho Foundation

//! Deploys one wrapped token per (origin chain, origin token) pair.

use std::collections::HashMap;

use primitive_types::U256;
use tracing::{info, trace};
use xcb_bridge_core::{Address, FactoryEvent, OriginalToken};
use xcb_crypto_secp256k1::keccak256;
use xcb_token::PermitToken;

use crate::{
    error::{Error, FactoryError},
    transaction::Transaction,
};

#[derive(Debug, Clone)]
pub struct FactoryState {
    bridge: Address,
    wrapped_by_original: HashMap<(U256, Address), Address>,
    original_by_wrapped: HashMap<Address, OriginalToken>,
    deployed: Vec<Address>,
}

impl FactoryState {
    pub(crate) fn new(bridge: Address) -> Self {
        Self {
            bridge,
            wrapped_by_original: HashMap::new(),
            original_by_wrapped: HashMap::new(),
            deployed: Vec::new(),
        }
    }

    /// The only account allowed to request deployments.
    pub fn bridge(&self) -> Address {
        self.bridge
    }

    pub fn wrapped_token(&self, origin_chain_id: U256, token: Address) -> Option<Address> {
        self.wrapped_by_original
            .get(&(origin_chain_id, token))
            .copied()
    }

    pub fn original_token(&self, wrapped: Address) -> Option<OriginalToken> {
        self.original_by_wrapped.get(&wrapped).copied()
    }

    /// Wrapped tokens in deployment order.
    pub fn deployed_tokens(&self) -> &[Address] {
        &self.deployed
    }
}

/// Address of the wrapped token for `original`:
/// `keccak256(0xff || factory || keccak256(originChainId || tokenAddress))[12..]`.
pub fn wrapped_token_address(factory: Address, original: &OriginalToken) -> Address {
    let mut salt_preimage = [0u8; 52];
    original
        .origin_chain_id
        .to_big_endian(&mut salt_preimage[..32]);
    salt_preimage[32..].copy_from_slice(original.token_address.as_bytes());
    let salt = keccak256(salt_preimage);

    let mut preimage = [0u8; 53];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(factory.as_bytes());
    preimage[21..].copy_from_slice(&salt);
    Address::from_slice(&keccak256(preimage)[12..])
}

/// The factory bound to the running transaction.
pub struct WrappedTokenFactory<'a> {
    address: Address,
    tx: &'a mut Transaction,
}

impl<'a> WrappedTokenFactory<'a> {
    pub(crate) fn new(tx: &'a mut Transaction, address: Address) -> Result<Self, Error> {
        if !tx.state.factories.contains_key(&address) {
            return Err(Error::NoContract(address));
        }
        Ok(Self { address, tx })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The wrapped token for `original`, deploying it on first use.
    ///
    /// The deployed token is owned by the bridge, which is the only minter.
    pub fn get_or_deploy(
        &mut self,
        original: OriginalToken,
        name: &str,
        symbol: &str,
    ) -> Result<Address, Error> {
        let caller = self.tx.msg_sender();
        trace!(factory = ?self.address, ?caller, ?original, "get_or_deploy");

        let state = self.storage()?;
        if caller != state.bridge {
            return Err(FactoryError::NotBridge { caller }.into());
        }
        if original.token_address.is_zero() {
            return Err(FactoryError::ZeroAddress.into());
        }
        if original.origin_chain_id.is_zero() {
            return Err(FactoryError::InvalidChainId(original.origin_chain_id).into());
        }
        if let Some(existing) = state.wrapped_token(original.origin_chain_id, original.token_address)
        {
            return Ok(existing);
        }
        let bridge = state.bridge;

        let wrapped = wrapped_token_address(self.address, &original);
        if self.tx.state.has_code(wrapped) {
            return Err(FactoryError::AddressInUse(wrapped).into());
        }
        let token = PermitToken::new(wrapped, name, symbol, bridge, self.tx.chain_id());
        self.tx.state.tokens.insert(wrapped, token);

        let state = self.storage_mut()?;
        state
            .wrapped_by_original
            .insert((original.origin_chain_id, original.token_address), wrapped);
        state.original_by_wrapped.insert(wrapped, original);
        state.deployed.push(wrapped);

        info!(
            "Deployed wrapped token {} ({:?}) for {:?} from chain {}",
            symbol, wrapped, original.token_address, original.origin_chain_id
        );
        self.tx.emit(
            self.address,
            FactoryEvent::WrappedTokenDeployed {
                original_token: original,
                wrapped_token: wrapped,
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
        );
        Ok(wrapped)
    }

    fn storage(&self) -> Result<&FactoryState, Error> {
        self.tx
            .state
            .factories
            .get(&self.address)
            .ok_or(Error::NoContract(self.address))
    }

    fn storage_mut(&mut self) -> Result<&mut FactoryState, Error> {
        self.tx
            .state
            .factories
            .get_mut(&self.address)
            .ok_or(Error::NoContract(self.address))
    }
}
