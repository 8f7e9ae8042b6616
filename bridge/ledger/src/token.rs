// Copyright (c) 2024 The Botho Foundation

//! Calls into a deployed permit token.

use primitive_types::U256;
use tracing::trace;
use xcb_bridge_core::Address;
use xcb_crypto_secp256k1::Signature;
use xcb_token::{PermitToken, TokenEvent};

use crate::{error::Error, transaction::Transaction};

/// A token bound to the running transaction. The message sender is the caller
/// of every operation.
///
/// Balance-moving calls return whether the transfer succeeded: a transfer hook
/// attached to the token has the final word.
pub struct Token<'a> {
    address: Address,
    tx: &'a mut Transaction,
}

impl<'a> Token<'a> {
    pub(crate) fn new(tx: &'a mut Transaction, address: Address) -> Result<Self, Error> {
        if !tx.state.tokens.contains_key(&address) {
            return Err(Error::NoContract(address));
        }
        Ok(Self { address, tx })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance_of(&self, account: Address) -> Result<U256, Error> {
        Ok(self.storage()?.balance_of(account))
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Error> {
        Ok(self.storage()?.allowance(owner, spender))
    }

    pub fn transfer(&mut self, to: Address, value: U256) -> Result<bool, Error> {
        let sender = self.tx.msg_sender();
        let event = self.storage_mut()?.transfer(sender, to, value)?;
        self.settle(event)
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, value: U256) -> Result<bool, Error> {
        let spender = self.tx.msg_sender();
        let event = self.storage_mut()?.transfer_from(spender, from, to, value)?;
        self.settle(event)
    }

    pub fn approve(&mut self, spender: Address, value: U256) -> Result<bool, Error> {
        let owner = self.tx.msg_sender();
        let event = self.storage_mut()?.approve(owner, spender, value)?;
        self.settle(event)
    }

    pub fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        signature: &Signature,
    ) -> Result<(), Error> {
        let now = U256::from(self.tx.timestamp());
        trace!(token = ?self.address, ?owner, ?spender, %value, "permit");
        let event = self
            .storage_mut()?
            .permit(now, owner, spender, value, deadline, signature)?;
        self.tx.emit(self.address, event);
        Ok(())
    }

    pub fn mint(&mut self, to: Address, value: U256) -> Result<bool, Error> {
        let caller = self.tx.msg_sender();
        let event = self.storage_mut()?.mint(caller, to, value)?;
        self.settle(event)
    }

    pub fn burn_from(&mut self, account: Address, value: U256) -> Result<bool, Error> {
        let spender = self.tx.msg_sender();
        let event = self.storage_mut()?.burn_from(spender, account, value)?;
        self.settle(event)
    }

    fn storage(&self) -> Result<&PermitToken, Error> {
        self.tx
            .state
            .tokens
            .get(&self.address)
            .ok_or(Error::NoContract(self.address))
    }

    fn storage_mut(&mut self) -> Result<&mut PermitToken, Error> {
        self.tx
            .state
            .tokens
            .get_mut(&self.address)
            .ok_or(Error::NoContract(self.address))
    }

    /// Log the event and, for balance movements, hand control to the token's
    /// hook if one is attached.
    fn settle(&mut self, event: TokenEvent) -> Result<bool, Error> {
        self.tx.emit(self.address, event.clone());
        let TokenEvent::Transfer { from, to, value } = event else {
            return Ok(true);
        };

        let Some(hook) = self.tx.state.hooks.get(&self.address).cloned() else {
            return Ok(true);
        };
        let token = self.address;
        self.tx
            .call_as(token, |tx| hook.on_transfer(tx, token, from, to, value))
    }
}
