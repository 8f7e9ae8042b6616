// Copyright (c) 2024 The Botho Foundation

//! A single-threaded chain that mines one block per transaction.

use std::sync::Arc;

use chrono::Utc;
use primitive_types::{H256, U256};
use tracing::{debug, info};
use xcb_bridge_core::{Address, BridgeEvent, BridgeSettings, ChainSettings, ConfigError};
use xcb_crypto_secp256k1::keccak256;
use xcb_token::PermitToken;

use crate::{
    bridge::BridgeState,
    error::{Error, FactoryError},
    factory::FactoryState,
    receipt::{Log, Receipt},
    state::{TransferHook, WorldState},
    transaction::{BlockEnv, Transaction},
};

/// Header of a mined block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    pub timestamp: u64,
}

#[derive(Debug)]
pub struct Chain {
    chain_id: U256,
    block_time: u64,
    /// Seconds added to the next block's timestamp
    time_offset: u64,
    state: WorldState,
    blocks: Vec<Block>,
    logs: Vec<Log>,
    transaction_count: u64,
}

impl Chain {
    /// A chain whose genesis block is stamped with the current time.
    pub fn new(chain_id: u64) -> Self {
        let settings = ChainSettings::for_chain_id(chain_id);
        Self::with_genesis(chain_id, settings.block_time_secs, now())
    }

    pub fn from_config(settings: &ChainSettings) -> Result<Self, ConfigError> {
        let chain_id = settings.chain_id()?;
        let genesis = settings
            .genesis_timestamp
            .map(|ts| ts.max(0) as u64)
            .unwrap_or_else(now);
        Ok(Self::with_genesis(chain_id, settings.block_time_secs, genesis))
    }

    pub fn with_genesis(chain_id: u64, block_time: u64, timestamp: u64) -> Self {
        let chain_id = U256::from(chain_id);
        let mut preimage = [0u8; 40];
        chain_id.to_big_endian(&mut preimage[..32]);
        preimage[32..].copy_from_slice(&timestamp.to_be_bytes());
        let genesis = Block {
            number: 0,
            hash: H256(keccak256(preimage)),
            parent_hash: H256::zero(),
            timestamp,
        };
        info!("Genesis of chain {} at {}", chain_id, timestamp);

        Self {
            chain_id,
            block_time,
            time_offset: 0,
            state: WorldState::default(),
            blocks: vec![genesis],
            logs: Vec::new(),
            transaction_count: 0,
        }
    }

    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    pub fn head(&self) -> &Block {
        // The genesis block is never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn block(&self, number: u64) -> Option<&Block> {
        self.blocks.get(number as usize)
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn token(&self, address: Address) -> Option<&PermitToken> {
        self.state.token(address)
    }

    pub fn bridge(&self, address: Address) -> Option<&BridgeState> {
        self.state.bridge(address)
    }

    pub fn factory(&self, address: Address) -> Option<&FactoryState> {
        self.state.factory(address)
    }

    /// Every log emitted on this chain, oldest first.
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Move the clock forward; applies to the next mined block.
    pub fn increase_time(&mut self, seconds: u64) {
        self.time_offset = self.time_offset.saturating_add(seconds);
    }

    /// Attach `hook` to a deployed token, replacing any previous one.
    pub fn set_transfer_hook(
        &mut self,
        token: Address,
        hook: Arc<dyn TransferHook>,
    ) -> Result<(), Error> {
        if !self.state.tokens.contains_key(&token) {
            return Err(Error::NoContract(token));
        }
        self.state.hooks.insert(token, hook);
        Ok(())
    }

    pub fn clear_transfer_hook(&mut self, token: Address) {
        self.state.hooks.remove(&token);
    }

    /// Run `f` as a transaction sent by `caller`.
    ///
    /// `f` works on a copy of the world state. On success the copy is
    /// committed and a block is mined around the transaction; on failure the
    /// chain is left exactly as it was.
    pub fn execute<T>(
        &mut self,
        caller: Address,
        f: impl FnOnce(&mut Transaction) -> Result<T, Error>,
    ) -> Result<Receipt<T>, Error> {
        let parent = *self.head();
        let env = BlockEnv {
            chain_id: self.chain_id,
            number: parent.number + 1,
            timestamp: parent
                .timestamp
                .saturating_add(self.block_time)
                .saturating_add(self.time_offset),
        };

        let mut tx = Transaction::new(self.state.clone(), env, caller);
        let output = match f(&mut tx) {
            Ok(output) => output,
            Err(err) => {
                debug!("Transaction from {:?} reverted: {}", caller, err);
                return Err(err);
            }
        };
        let (state, events) = tx.into_parts();

        let transaction_hash = self.transaction_hash(caller, env.number);
        let block_hash = block_hash(&parent, &env, transaction_hash);
        let logs: Vec<Log> = events
            .into_iter()
            .enumerate()
            .map(|(index, (address, event))| Log {
                address,
                event,
                block_number: env.number,
                block_hash,
                transaction_hash,
                log_index: index as u64,
            })
            .collect();

        self.state = state;
        self.time_offset = 0;
        self.transaction_count += 1;
        self.blocks.push(Block {
            number: env.number,
            hash: block_hash,
            parent_hash: parent.hash,
            timestamp: env.timestamp,
        });
        self.logs.extend(logs.iter().cloned());

        Ok(Receipt {
            output,
            transaction_hash,
            block_hash,
            block_number: env.number,
            logs,
        })
    }

    /// Deploy a permit token; `deployer` becomes its minter.
    pub fn deploy_permit_token(
        &mut self,
        deployer: Address,
        name: &str,
        symbol: &str,
    ) -> Result<Address, Error> {
        let chain_id = self.chain_id;
        let receipt = self.execute(deployer, |tx| {
            let address = tx.state.next_create_address(deployer);
            let token = PermitToken::new(address, name, symbol, deployer, chain_id);
            tx.state.tokens.insert(address, token);
            Ok(address)
        })?;
        info!("Deployed token {} at {:?}", symbol, receipt.output);
        Ok(receipt.output)
    }

    /// Deploy a paused bridge owned by `deployer`.
    pub fn deploy_bridge(&mut self, deployer: Address, name: &str) -> Result<Address, Error> {
        self.deploy_bridge_with(
            deployer,
            &BridgeSettings {
                name: name.to_string(),
                start_paused: true,
            },
        )
    }

    pub fn deploy_bridge_with(
        &mut self,
        deployer: Address,
        settings: &BridgeSettings,
    ) -> Result<Address, Error> {
        if settings.name.is_empty() {
            return Err(ConfigError::EmptyBridgeName.into());
        }
        let chain_id = self.chain_id;
        let receipt = self.execute(deployer, |tx| {
            let address = tx.state.next_create_address(deployer);
            let bridge = BridgeState::new(
                address,
                settings.name.clone(),
                deployer,
                chain_id,
                settings.start_paused,
            );
            tx.state.bridges.insert(address, bridge);

            tx.emit(
                address,
                BridgeEvent::OwnershipTransferred {
                    previous_owner: Address::zero(),
                    new_owner: deployer,
                },
            );
            if settings.start_paused {
                tx.emit(address, BridgeEvent::Paused { account: deployer });
            }
            Ok(address)
        })?;
        info!("Deployed bridge {} at {:?}", settings.name, receipt.output);
        Ok(receipt.output)
    }

    /// Deploy a factory that only `bridge` may ask for wrapped tokens.
    pub fn deploy_wrapped_token_factory(
        &mut self,
        deployer: Address,
        bridge: Address,
    ) -> Result<Address, Error> {
        if bridge.is_zero() {
            return Err(FactoryError::ZeroAddress.into());
        }
        let receipt = self.execute(deployer, |tx| {
            let address = tx.state.next_create_address(deployer);
            tx.state.factories.insert(address, FactoryState::new(bridge));
            Ok(address)
        })?;
        info!("Deployed wrapped token factory at {:?}", receipt.output);
        Ok(receipt.output)
    }

    fn transaction_hash(&self, caller: Address, block_number: u64) -> H256 {
        let mut preimage = [0u8; 68];
        self.chain_id.to_big_endian(&mut preimage[..32]);
        preimage[32..52].copy_from_slice(caller.as_bytes());
        preimage[52..60].copy_from_slice(&self.transaction_count.to_be_bytes());
        preimage[60..].copy_from_slice(&block_number.to_be_bytes());
        H256(keccak256(preimage))
    }
}

fn block_hash(parent: &Block, env: &BlockEnv, transaction_hash: H256) -> H256 {
    let mut preimage = [0u8; 80];
    preimage[..32].copy_from_slice(parent.hash.as_bytes());
    preimage[32..40].copy_from_slice(&env.number.to_be_bytes());
    preimage[40..48].copy_from_slice(&env.timestamp.to_be_bytes());
    preimage[48..].copy_from_slice(transaction_hash.as_bytes());
    H256(keccak256(preimage))
}

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
