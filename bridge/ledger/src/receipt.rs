// Copyright (c) 2024 The Botho Foundation

//! Logs and receipts of mined transactions.

use primitive_types::{H256, U256};
use xcb_bridge_core::{Address, BridgeEvent, ClaimEvent, DepositEvent, FactoryEvent, SourceTxData};
use xcb_token::TokenEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Bridge(BridgeEvent),
    Factory(FactoryEvent),
    Token(TokenEvent),
}

impl From<BridgeEvent> for Event {
    fn from(event: BridgeEvent) -> Self {
        Event::Bridge(event)
    }
}

impl From<FactoryEvent> for Event {
    fn from(event: FactoryEvent) -> Self {
        Event::Factory(event)
    }
}

impl From<TokenEvent> for Event {
    fn from(event: TokenEvent) -> Self {
        Event::Token(event)
    }
}

/// An event together with its position on the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    /// Contract that emitted the event
    pub address: Address,
    pub event: Event,
    pub block_number: u64,
    pub block_hash: H256,
    pub transaction_hash: H256,
    /// Position of the log within its block
    pub log_index: u64,
}

impl Log {
    /// The proof a claim must carry to reference this log.
    pub fn source_tx_data(&self) -> SourceTxData {
        SourceTxData {
            transaction_hash: self.transaction_hash,
            block_hash: self.block_hash,
            log_index: U256::from(self.log_index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Receipt<T> {
    /// Return value of the call
    pub output: T,
    pub transaction_hash: H256,
    pub block_hash: H256,
    pub block_number: u64,
    pub logs: Vec<Log>,
}

impl<T> Receipt<T> {
    /// The first deposit in this transaction and its proof.
    pub fn deposit(&self) -> Option<(DepositEvent, SourceTxData)> {
        self.logs.iter().find_map(|log| match &log.event {
            Event::Bridge(BridgeEvent::Deposit(deposit)) => {
                Some((deposit.clone(), log.source_tx_data()))
            }
            _ => None,
        })
    }

    pub fn claim(&self) -> Option<&ClaimEvent> {
        self.logs.iter().find_map(|log| match &log.event {
            Event::Bridge(BridgeEvent::Claim(claim)) => Some(claim),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.logs.iter().map(|log| &log.event)
    }
}
