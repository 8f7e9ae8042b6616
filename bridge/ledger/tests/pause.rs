// Copyright (c) 2024 The Botho Foundation

//! Ownership and pause switch of the bridge.

use assert_matches::assert_matches;
use primitive_types::{H256, U256};
use xcb_bridge_core::{
    BridgeError, BridgeEvent, ClaimData, OriginalToken, SourceTxData, User,
};
use xcb_bridge_ledger::{Chain, Error, Event};
use xcb_bridge_test_utils::{
    deposit_data, init_logging, sign_claim, DevAccounts, TwoChains, BLOCK_TIME,
    DESTINATION_CHAIN_ID, GENESIS_TIMESTAMP, SOURCE_CHAIN_ID,
};

fn fresh_chain() -> Chain {
    Chain::with_genesis(SOURCE_CHAIN_ID, BLOCK_TIME, GENESIS_TIMESTAMP)
}

// ============================================================================
// Deployment
// ============================================================================

#[test]
fn bridge_starts_paused_and_owned_by_deployer() {
    init_logging();
    let accounts = DevAccounts::new();
    let mut chain = fresh_chain();

    let bridge = chain.deploy_bridge(accounts.deployer(), "Bridge1").unwrap();
    let state = chain.bridge(bridge).unwrap();

    assert!(state.paused());
    assert_eq!(state.owner(), accounts.deployer());
    assert_eq!(state.name(), "Bridge1");
    assert!(state.wrapped_token_factory().is_zero());
    assert_eq!(state.number_of_wrapped_tokens(), 0);
}

// ============================================================================
// Pause / unpause
// ============================================================================

#[test]
fn only_owner_pauses_and_unpauses() {
    init_logging();
    let accounts = DevAccounts::new();
    let mut chain = fresh_chain();
    let bridge = chain.deploy_bridge(accounts.deployer(), "Bridge1").unwrap();

    assert_matches!(
        chain.execute(accounts.user2(), |tx| tx.bridge(bridge)?.unpause()),
        Err(Error::Bridge(BridgeError::NotOwner))
    );

    let receipt = chain
        .execute(accounts.deployer(), |tx| tx.bridge(bridge)?.unpause())
        .unwrap();
    assert_eq!(
        receipt.logs[0].event,
        Event::Bridge(BridgeEvent::Unpaused {
            account: accounts.deployer()
        })
    );
    assert!(!chain.bridge(bridge).unwrap().paused());

    assert_matches!(
        chain.execute(accounts.deployer(), |tx| tx.bridge(bridge)?.unpause()),
        Err(Error::Bridge(BridgeError::NotPaused))
    );
    assert_matches!(
        chain.execute(accounts.user2(), |tx| tx.bridge(bridge)?.pause()),
        Err(Error::Bridge(BridgeError::NotOwner))
    );

    chain
        .execute(accounts.deployer(), |tx| tx.bridge(bridge)?.pause())
        .unwrap();
    assert!(chain.bridge(bridge).unwrap().paused());
    assert_matches!(
        chain.execute(accounts.deployer(), |tx| tx.bridge(bridge)?.pause()),
        Err(Error::Bridge(BridgeError::Paused))
    );
}

#[test]
fn only_owner_sets_wrapped_token_factory() {
    init_logging();
    let accounts = DevAccounts::new();
    let mut chain = fresh_chain();
    let bridge = chain.deploy_bridge(accounts.deployer(), "Bridge1").unwrap();
    let factory = chain
        .deploy_wrapped_token_factory(accounts.deployer(), bridge)
        .unwrap();

    assert_matches!(
        chain.execute(accounts.user1(), |tx| {
            tx.bridge(bridge)?.set_wrapper_token_factory(factory)
        }),
        Err(Error::Bridge(BridgeError::NotOwner))
    );
    assert_matches!(
        chain.execute(accounts.deployer(), |tx| {
            tx.bridge(bridge)?.set_wrapper_token_factory(Default::default())
        }),
        Err(Error::Bridge(BridgeError::InvalidAddress))
    );

    let receipt = chain
        .execute(accounts.deployer(), |tx| {
            tx.bridge(bridge)?.set_wrapper_token_factory(factory)
        })
        .unwrap();

    assert_eq!(chain.bridge(bridge).unwrap().wrapped_token_factory(), factory);
    assert_eq!(
        receipt.logs[0].event,
        Event::Bridge(BridgeEvent::WrappedTokenFactoryUpdated {
            previous: Default::default(),
            current: factory,
        })
    );
}

// ============================================================================
// Entry points while paused
// ============================================================================

#[test]
fn deposit_reverts_while_paused() {
    init_logging();
    let mut fx = TwoChains::new();
    let deployer = fx.accounts.deployer();
    let user1 = fx.accounts.user1();
    let bridge = fx.source_bridge.bridge;
    let token = fx.token;

    fx.source
        .execute(deployer, |tx| tx.bridge(bridge)?.pause())
        .unwrap();

    let data = deposit_data(fx.source_user(), fx.destination_user(), token, 20);
    let result = fx.source.execute(user1, |tx| {
        tx.token(token)?.approve(bridge, U256::from(20))?;
        tx.bridge(bridge)?.deposit(&data)
    });

    assert_matches!(result, Err(Error::Bridge(BridgeError::Paused)));
    assert_eq!(fx.source_balance(token, user1), U256::from(100));
    assert_eq!(fx.source_balance(token, bridge), U256::zero());
}

#[test]
fn claim_reverts_while_paused() {
    init_logging();
    let mut fx = TwoChains::new();
    let deployer = fx.accounts.deployer();
    let bridge = fx.destination_bridge.bridge;

    fx.destination
        .execute(deployer, |tx| tx.bridge(bridge)?.pause())
        .unwrap();

    let claim_data = ClaimData {
        from: fx.source_user(),
        to: User::new(fx.accounts.user1(), DESTINATION_CHAIN_ID),
        value: U256::from(20),
        token: OriginalToken::new(fx.token, SOURCE_CHAIN_ID),
        deposit_tx_source_token: fx.token,
        target_token_address: Default::default(),
        target_token_name: "Wrapped DogeCoin".to_string(),
        target_token_symbol: "WDOGE".to_string(),
        deadline: U256::MAX,
        source_tx_data: SourceTxData {
            transaction_hash: H256::repeat_byte(1),
            block_hash: H256::repeat_byte(2),
            log_index: U256::zero(),
        },
    };
    let signature = sign_claim(&fx.destination, bridge, &fx.accounts.deployer, &claim_data);

    assert_matches!(
        fx.destination
            .execute(deployer, |tx| tx.bridge(bridge)?.claim(&claim_data, &signature)),
        Err(Error::Bridge(BridgeError::Paused))
    );
    assert!(!fx
        .destination
        .bridge(bridge)
        .unwrap()
        .is_claimed(claim_data.source_tx_data.hash()));
}
