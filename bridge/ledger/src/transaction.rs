// Copyright (c) 2024 The Botho Foundation

//! Execution context of a single transaction.

use primitive_types::U256;
use xcb_bridge_core::Address;

use crate::{
    bridge::Bridge, error::Error, factory::WrappedTokenFactory, receipt::Event,
    state::WorldState, token::Token,
};

/// Block fields visible to contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEnv {
    pub chain_id: U256,
    pub number: u64,
    pub timestamp: u64,
}

/// A working copy of world state plus the call stack and emitted events.
#[derive(Debug)]
pub struct Transaction {
    pub(crate) state: WorldState,
    env: BlockEnv,
    callers: Vec<Address>,
    events: Vec<(Address, Event)>,
}

impl Transaction {
    pub(crate) fn new(state: WorldState, env: BlockEnv, origin: Address) -> Self {
        Self {
            state,
            env,
            callers: vec![origin],
            events: Vec::new(),
        }
    }

    /// The immediate caller of the running contract.
    pub fn msg_sender(&self) -> Address {
        self.callers.last().copied().unwrap_or_default()
    }

    /// The externally owned account that sent the transaction.
    pub fn origin(&self) -> Address {
        self.callers.first().copied().unwrap_or_default()
    }

    /// Run `f` with `caller` as the message sender, as a contract does when it
    /// calls another contract.
    pub fn call_as<R>(&mut self, caller: Address, f: impl FnOnce(&mut Self) -> R) -> R {
        self.callers.push(caller);
        let result = f(self);
        self.callers.pop();
        result
    }

    pub fn emit(&mut self, address: Address, event: impl Into<Event>) {
        self.events.push((address, event.into()));
    }

    pub fn chain_id(&self) -> U256 {
        self.env.chain_id
    }

    pub fn block_number(&self) -> u64 {
        self.env.number
    }

    pub fn timestamp(&self) -> u64 {
        self.env.timestamp
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn bridge(&mut self, address: Address) -> Result<Bridge<'_>, Error> {
        Bridge::new(self, address)
    }

    pub fn token(&mut self, address: Address) -> Result<Token<'_>, Error> {
        Token::new(self, address)
    }

    pub fn factory(&mut self, address: Address) -> Result<WrappedTokenFactory<'_>, Error> {
        WrappedTokenFactory::new(self, address)
    }

    pub(crate) fn into_parts(self) -> (WorldState, Vec<(Address, Event)>) {
        (self.state, self.events)
    }
}
