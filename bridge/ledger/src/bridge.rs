// Copyright (c) 2024 The Botho Foundation

//! The bridge ledger: deposits lock or burn, claims release or mint.
//!
//! A deposit on one chain is proven on another by the location of its
//! `Deposit` log. The relayer packages that location into a [`ClaimData`] and
//! has the destination bridge's owner sign it together with the current nonce
//! of the claim's `from` address. Each proof can be claimed once and each
//! signature is consumed by the nonce bump.

use std::collections::{HashMap, HashSet};

use primitive_types::{H256, U256};
use tracing::{info, trace};
use xcb_bridge_core::{
    Address, BridgeError, BridgeEvent, Claim, ClaimData, ClaimEvent, ClaimKind, DepositData,
    DepositEvent, DepositKind, OriginalToken,
};
use xcb_crypto_eip712::{Domain, Verifier};
use xcb_crypto_secp256k1::Signature;

use crate::{error::Error, guard::Guard, transaction::Transaction};

/// Storage of one bridge contract.
#[derive(Debug, Clone)]
pub struct BridgeState {
    name: String,
    guard: Guard,
    nonces: HashMap<Address, U256>,
    claimed: HashSet<H256>,
    wrapped_by_original: HashMap<(U256, Address), Address>,
    original_by_wrapped: HashMap<Address, OriginalToken>,
    wrapped_token_factory: Address,
    verifier: Verifier,
}

impl BridgeState {
    pub(crate) fn new(
        address: Address,
        name: String,
        owner: Address,
        chain_id: U256,
        paused: bool,
    ) -> Self {
        let verifier = Verifier::new(&Domain::new(name.clone(), chain_id, address));
        Self {
            name,
            guard: Guard::new(owner, paused),
            nonces: HashMap::new(),
            claimed: HashSet::new(),
            wrapped_by_original: HashMap::new(),
            original_by_wrapped: HashMap::new(),
            wrapped_token_factory: Address::zero(),
            verifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The claim authority.
    pub fn owner(&self) -> Address {
        self.guard.owner()
    }

    pub fn paused(&self) -> bool {
        self.guard.paused()
    }

    pub fn nonce(&self, account: Address) -> U256 {
        self.nonces.get(&account).copied().unwrap_or_default()
    }

    pub fn is_claimed(&self, source_tx_hash: H256) -> bool {
        self.claimed.contains(&source_tx_hash)
    }

    /// Zero when no wrapped token exists for the pair.
    pub fn wrapped_token_by_original_token_by_chain_id(
        &self,
        origin_chain_id: U256,
        token: Address,
    ) -> Address {
        self.wrapped_by_original
            .get(&(origin_chain_id, token))
            .copied()
            .unwrap_or_default()
    }

    /// The zero value when `wrapped` is not a wrapped token of this bridge.
    pub fn original_token_by_wrapped_token(&self, wrapped: Address) -> OriginalToken {
        self.original_by_wrapped
            .get(&wrapped)
            .copied()
            .unwrap_or_default()
    }

    pub fn number_of_wrapped_tokens(&self) -> usize {
        self.original_by_wrapped.len()
    }

    pub fn wrapped_token_factory(&self) -> Address {
        self.wrapped_token_factory
    }

    pub fn domain_separator(&self) -> H256 {
        self.verifier.domain_separator()
    }
}

/// A bridge bound to the running transaction.
pub struct Bridge<'a> {
    address: Address,
    tx: &'a mut Transaction,
}

impl<'a> Bridge<'a> {
    pub(crate) fn new(tx: &'a mut Transaction, address: Address) -> Result<Self, Error> {
        if !tx.state.bridges.contains_key(&address) {
            return Err(Error::NoContract(address));
        }
        Ok(Self { address, tx })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Lock or burn `data.value` of `data.token`, using an allowance the
    /// depositor granted the bridge beforehand.
    pub fn deposit(&mut self, data: &DepositData) -> Result<DepositEvent, Error> {
        trace!(bridge = ?self.address, from = %data.from, to = %data.to, "deposit");
        self.storage()?.guard.when_not_paused()?;

        self.non_reentrant(|bridge| {
            bridge.validate_deposit(data)?;
            let route = bridge.route_deposit(data)?;
            bridge.take_custody(data, route)
        })
    }

    /// Like [`Bridge::deposit`], but first applies the depositor's signed
    /// approval of the bridge.
    pub fn deposit_with_permit(&mut self, data: &DepositData) -> Result<DepositEvent, Error> {
        trace!(bridge = ?self.address, from = %data.from, to = %data.to, "deposit_with_permit");
        self.storage()?.guard.when_not_paused()?;

        self.non_reentrant(|bridge| {
            bridge.validate_deposit(data)?;
            if data.value.is_zero() {
                return Err(BridgeError::InvalidTokenAmount.into());
            }
            if data.spender.is_zero() {
                return Err(BridgeError::InvalidAddress.into());
            }
            if data.spender != bridge.address {
                return Err(BridgeError::SpenderIsNotBridge {
                    spender: data.spender,
                }
                .into());
            }
            let route = bridge.route_deposit(data)?;

            let this = bridge.address;
            bridge.tx.call_as(this, |tx| {
                tx.token(data.token)?.permit(
                    data.from.address,
                    data.spender,
                    data.value,
                    data.deadline,
                    &data.approve_signature,
                )
            })?;
            bridge.take_custody(data, route)
        })
    }

    /// Pay out a deposit proven on another chain.
    ///
    /// Fails unless `signature` is the owner's signature over `claim_data`
    /// and the current nonce of `claim_data.from.address`. Any failure
    /// reverts the whole transaction, including the claimed mark and the
    /// nonce bump.
    pub fn claim(
        &mut self,
        claim_data: &ClaimData,
        signature: &Signature,
    ) -> Result<ClaimEvent, Error> {
        trace!(bridge = ?self.address, from = %claim_data.from, to = %claim_data.to, "claim");
        self.storage()?.guard.when_not_paused()?;

        self.non_reentrant(|bridge| {
            let chain_id = bridge.tx.chain_id();
            let source_tx_hash = claim_data.source_tx_data.hash();
            let from = claim_data.from.address;

            let state = bridge.storage_mut()?;
            if !state.claimed.insert(source_tx_hash) {
                return Err(BridgeError::AlreadyClaimed(source_tx_hash).into());
            }

            let nonce = state.nonce(from);
            let claim = Claim { claim_data, nonce };
            let signer = state
                .verifier
                .recover(&claim, signature)
                .map_err(|_| BridgeError::InvalidSignature)?;
            if signer != state.guard.owner() {
                return Err(BridgeError::AddressIsNotTheOwner { recovered: signer }.into());
            }
            state.nonces.insert(from, nonce + 1);

            if from.is_zero() || claim_data.to.address.is_zero() {
                return Err(BridgeError::InvalidAddress.into());
            }
            if claim_data.from.chain_id.is_zero() {
                return Err(BridgeError::InvalidChainId.into());
            }
            if claim_data.to.chain_id != chain_id {
                return Err(BridgeError::CurrentAndProvidedChainsDoNotMatch {
                    current: chain_id,
                    provided: claim_data.to.chain_id,
                }
                .into());
            }

            let (kind, token) = if claim_data.token.origin_chain_id == chain_id {
                (ClaimKind::Release, claim_data.token.token_address)
            } else {
                (ClaimKind::Mint, bridge.wrapped_token_for(claim_data)?)
            };

            let this = bridge.address;
            let to = claim_data.to.address;
            let value = claim_data.value;
            let succeeded = bridge.tx.call_as(this, |tx| {
                let mut contract = tx.token(token)?;
                match kind {
                    ClaimKind::Release => contract.transfer(to, value),
                    ClaimKind::Mint => contract.mint(to, value),
                }
            })?;
            if !succeeded {
                return Err(BridgeError::TransferFailed.into());
            }

            info!(
                "Claim {}: {} of {:?} to {} (nonce {})",
                kind, value, token, claim_data.to, nonce
            );
            let event = ClaimEvent {
                kind,
                from: claim_data.from,
                to: claim_data.to,
                token,
                original_token: claim_data.token,
                value,
                source_tx_hash,
                nonce,
            };
            bridge.tx.emit(this, BridgeEvent::Claim(event.clone()));
            Ok(event)
        })
    }

    pub fn pause(&mut self) -> Result<(), Error> {
        let caller = self.tx.msg_sender();
        self.storage_mut()?.guard.pause(caller)?;
        info!("Bridge {:?} paused by {:?}", self.address, caller);
        self.tx
            .emit(self.address, BridgeEvent::Paused { account: caller });
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), Error> {
        let caller = self.tx.msg_sender();
        self.storage_mut()?.guard.unpause(caller)?;
        info!("Bridge {:?} unpaused by {:?}", self.address, caller);
        self.tx
            .emit(self.address, BridgeEvent::Unpaused { account: caller });
        Ok(())
    }

    pub fn set_wrapper_token_factory(&mut self, factory: Address) -> Result<(), Error> {
        let caller = self.tx.msg_sender();
        let state = self.storage_mut()?;
        state.guard.only_owner(caller)?;
        if factory.is_zero() {
            return Err(BridgeError::InvalidAddress.into());
        }
        let previous = std::mem::replace(&mut state.wrapped_token_factory, factory);

        info!("Bridge {:?} now uses wrapped token factory {:?}", self.address, factory);
        self.tx.emit(
            self.address,
            BridgeEvent::WrappedTokenFactoryUpdated {
                previous,
                current: factory,
            },
        );
        Ok(())
    }

    /// Rotate the owner, which is also the claim authority.
    pub fn transfer_ownership(&mut self, new_owner: Address) -> Result<(), Error> {
        let caller = self.tx.msg_sender();
        let previous_owner = self
            .storage_mut()?
            .guard
            .transfer_ownership(caller, new_owner)?;

        info!("Bridge {:?} ownership {:?} -> {:?}", self.address, previous_owner, new_owner);
        self.tx.emit(
            self.address,
            BridgeEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            },
        );
        Ok(())
    }

    /// Run `f` holding the reentrancy lock, releasing it however `f` exits.
    fn non_reentrant<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        self.storage_mut()?.guard.enter()?;
        let result = f(self);
        if let Ok(state) = self.storage_mut() {
            state.guard.exit();
        }
        result
    }

    fn validate_deposit(&self, data: &DepositData) -> Result<(), Error> {
        let caller = self.tx.msg_sender();
        if data.from.address.is_zero() {
            return Err(BridgeError::InvalidAddress.into());
        }
        if data.from.address != caller {
            return Err(BridgeError::SenderIsNotDepositor {
                caller,
                from: data.from.address,
            }
            .into());
        }
        if data.to.address.is_zero() {
            return Err(BridgeError::InvalidAddress.into());
        }
        if data.to.chain_id.is_zero() {
            return Err(BridgeError::InvalidChainId.into());
        }
        if data.token.is_zero() {
            return Err(BridgeError::InvalidAddress.into());
        }
        Ok(())
    }

    /// Burn when `data.token` is one of our wrapped tokens, lock otherwise.
    fn route_deposit(&self, data: &DepositData) -> Result<(DepositKind, OriginalToken), Error> {
        let state = self.storage()?;
        match state.original_by_wrapped.get(&data.token) {
            Some(original) => {
                if data.to.chain_id != original.origin_chain_id {
                    return Err(BridgeError::IncorrectDestinationChain {
                        origin: original.origin_chain_id,
                    }
                    .into());
                }
                Ok((DepositKind::Burn, *original))
            }
            None => Ok((
                DepositKind::Lock,
                OriginalToken::new(data.token, self.tx.chain_id()),
            )),
        }
    }

    fn take_custody(
        &mut self,
        data: &DepositData,
        (kind, original_token): (DepositKind, OriginalToken),
    ) -> Result<DepositEvent, Error> {
        let this = self.address;
        let from = data.from.address;
        let value = data.value;
        let succeeded = self.tx.call_as(this, |tx| {
            let mut token = tx.token(data.token)?;
            match kind {
                DepositKind::Lock => token.transfer_from(from, this, value),
                DepositKind::Burn => token.burn_from(from, value),
            }
        })?;
        if !succeeded {
            return Err(BridgeError::TransferFailed.into());
        }

        info!(
            "Deposit {}: {} of {:?} from {} to {}",
            kind, value, data.token, data.from, data.to
        );
        let event = DepositEvent {
            kind,
            from: data.from,
            to: data.to,
            token: data.token,
            original_token,
            value,
        };
        self.tx.emit(this, BridgeEvent::Deposit(event.clone()));
        Ok(event)
    }

    /// The wrapped token for a claim's origin token, deploying it through the
    /// factory on a registry miss.
    fn wrapped_token_for(&mut self, claim_data: &ClaimData) -> Result<Address, Error> {
        let original = claim_data.token;
        let state = self.storage()?;
        let existing = state.wrapped_token_by_original_token_by_chain_id(
            original.origin_chain_id,
            original.token_address,
        );
        if !existing.is_zero() {
            return Ok(existing);
        }
        let factory = state.wrapped_token_factory;
        if factory.is_zero() {
            return Err(BridgeError::FactoryNotSet.into());
        }

        let this = self.address;
        let wrapped = self.tx.call_as(this, |tx| {
            tx.factory(factory)?.get_or_deploy(
                original,
                &claim_data.target_token_name,
                &claim_data.target_token_symbol,
            )
        })?;

        let state = self.storage_mut()?;
        state
            .wrapped_by_original
            .insert((original.origin_chain_id, original.token_address), wrapped);
        state.original_by_wrapped.insert(wrapped, original);
        Ok(wrapped)
    }

    fn storage(&self) -> Result<&BridgeState, Error> {
        self.tx
            .state
            .bridges
            .get(&self.address)
            .ok_or(Error::NoContract(self.address))
    }

    fn storage_mut(&mut self) -> Result<&mut BridgeState, Error> {
        self.tx
            .state
            .bridges
            .get_mut(&self.address)
            .ok_or(Error::NoContract(self.address))
    }
}
