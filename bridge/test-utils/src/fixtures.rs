// Copyright (c) 2024 The Botho Foundation

use primitive_types::U256;
use xcb_bridge_core::{Address, ClaimData, DepositData, DepositEvent, DepositKind, User};
use xcb_bridge_ledger::{Chain, Receipt};
use xcb_crypto_secp256k1::{Secp256k1Keypair, Signature};

use crate::accounts::DevAccounts;

pub const SOURCE_CHAIN_ID: u64 = 31337;
pub const DESTINATION_CHAIN_ID: u64 = 5;
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
pub const BLOCK_TIME: u64 = 12;

/// Origin tokens minted to `user1` on the source chain.
pub const INITIAL_BALANCE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeDeployment {
    pub bridge: Address,
    pub factory: Address,
}

/// Deploy a bridge and its factory, wire them together and unpause.
pub fn deploy_bridge(chain: &mut Chain, owner: &Secp256k1Keypair, name: &str) -> BridgeDeployment {
    let owner = owner.address();
    let bridge = chain.deploy_bridge(owner, name).unwrap();
    let factory = chain.deploy_wrapped_token_factory(owner, bridge).unwrap();
    chain
        .execute(owner, |tx| {
            let mut bridge = tx.bridge(bridge)?;
            bridge.set_wrapper_token_factory(factory)?;
            bridge.unpause()
        })
        .unwrap();
    BridgeDeployment { bridge, factory }
}

/// Deposit arguments with no permit attached.
pub fn deposit_data(from: User, to: User, token: Address, value: u64) -> DepositData {
    DepositData {
        from,
        to,
        spender: Address::zero(),
        token,
        value: U256::from(value),
        deadline: U256::zero(),
        approve_signature: Signature::default(),
    }
}

/// What a relayer builds from a deposit receipt.
pub fn claim_for<T>(receipt: &Receipt<T>, name: &str, symbol: &str) -> ClaimData {
    let (deposit, proof): (DepositEvent, _) = receipt.deposit().unwrap();
    let target = match deposit.kind {
        DepositKind::Lock => Address::zero(),
        DepositKind::Burn => deposit.original_token.token_address,
    };
    ClaimData::for_deposit(&deposit, proof, target, name, symbol, U256::MAX)
}

/// Two chains with a live bridge each and an origin token on the source.
pub struct TwoChains {
    pub accounts: DevAccounts,
    pub source: Chain,
    pub destination: Chain,
    pub source_bridge: BridgeDeployment,
    pub destination_bridge: BridgeDeployment,
    /// Origin token on the source chain; `user1` holds [`INITIAL_BALANCE`]
    pub token: Address,
}

impl TwoChains {
    pub fn new() -> Self {
        let accounts = DevAccounts::new();
        let mut source = Chain::with_genesis(SOURCE_CHAIN_ID, BLOCK_TIME, GENESIS_TIMESTAMP);
        let mut destination =
            Chain::with_genesis(DESTINATION_CHAIN_ID, BLOCK_TIME, GENESIS_TIMESTAMP);

        let source_bridge = deploy_bridge(&mut source, &accounts.deployer, "Bridge1");
        let destination_bridge = deploy_bridge(&mut destination, &accounts.deployer, "Bridge2");

        let deployer = accounts.deployer();
        let user1 = accounts.user1();
        let token = source
            .deploy_permit_token(deployer, "DogeCoin", "DOGE")
            .unwrap();
        source
            .execute(deployer, |tx| {
                tx.token(token)?.mint(user1, U256::from(INITIAL_BALANCE))
            })
            .unwrap();

        Self {
            accounts,
            source,
            destination,
            source_bridge,
            destination_bridge,
            token,
        }
    }

    /// `user1` on the source chain.
    pub fn source_user(&self) -> User {
        User::new(self.accounts.user1(), SOURCE_CHAIN_ID)
    }

    /// `user1` on the destination chain.
    pub fn destination_user(&self) -> User {
        User::new(self.accounts.user1(), DESTINATION_CHAIN_ID)
    }

    pub fn source_balance(&self, token: Address, account: Address) -> U256 {
        self.source.token(token).unwrap().balance_of(account)
    }

    pub fn destination_balance(&self, token: Address, account: Address) -> U256 {
        self.destination.token(token).unwrap().balance_of(account)
    }

    /// `user1` approves the source bridge and locks `value` of the origin
    /// token towards the destination chain.
    pub fn lock(&mut self, value: u64) -> Receipt<DepositEvent> {
        let user1 = self.accounts.user1();
        let bridge = self.source_bridge.bridge;
        let data = deposit_data(self.source_user(), self.destination_user(), self.token, value);
        let token = self.token;
        self.source
            .execute(user1, |tx| {
                tx.token(token)?.approve(bridge, U256::from(value))?;
                tx.bridge(bridge)?.deposit(&data)
            })
            .unwrap()
    }

    /// The wrapped counterpart of the origin token, once claimed.
    pub fn wrapped_token(&self) -> Address {
        self.destination
            .bridge(self.destination_bridge.bridge)
            .unwrap()
            .wrapped_token_by_original_token_by_chain_id(U256::from(SOURCE_CHAIN_ID), self.token)
    }
}

impl Default for TwoChains {
    fn default() -> Self {
        Self::new()
    }
}
