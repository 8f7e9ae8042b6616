// Copyright (c) 2024 The Botho Foundation

//! A full round trip: lock, mint, burn, release.

use assert_matches::assert_matches;
use primitive_types::U256;
use xcb_bridge_core::{
    BridgeError, ClaimKind, DepositData, DepositKind, OriginalToken, User,
};
use xcb_bridge_ledger::Error;
use xcb_bridge_test_utils::{
    claim_for, deposit_data, init_logging, sign_claim, sign_permit, TwoChains,
    INITIAL_BALANCE, SOURCE_CHAIN_ID,
};

#[test]
fn tokens_travel_to_the_destination_and_back() {
    init_logging();
    let mut fx = TwoChains::new();
    let user1 = fx.accounts.user1();
    let relayer = fx.accounts.user3();
    let source_bridge = fx.source_bridge.bridge;
    let destination_bridge = fx.destination_bridge.bridge;
    let token = fx.token;
    let original = OriginalToken::new(token, SOURCE_CHAIN_ID);

    // Lock two tranches of 20 on the source chain.
    let first_lock = fx.lock(20);
    let second_lock = fx.lock(20);
    assert_eq!(fx.source_balance(token, user1), U256::from(60));
    assert_eq!(fx.source_balance(token, source_bridge), U256::from(40));

    // The relayer mints the first tranche on the destination chain.
    let first_claim = claim_for(&first_lock, "Wrapped DogeCoin", "WDOGE");
    let signature = sign_claim(
        &fx.destination,
        destination_bridge,
        &fx.accounts.deployer,
        &first_claim,
    );
    let receipt = fx
        .destination
        .execute(relayer, |tx| {
            tx.bridge(destination_bridge)?.claim(&first_claim, &signature)
        })
        .unwrap();
    assert_eq!(receipt.output.kind, ClaimKind::Mint);
    let wrapped = fx.wrapped_token();
    assert_eq!(fx.destination_balance(wrapped, user1), U256::from(20));

    // Relaying the same deposit twice is refused.
    let signature = sign_claim(
        &fx.destination,
        destination_bridge,
        &fx.accounts.deployer,
        &first_claim,
    );
    assert_matches!(
        fx.destination.execute(relayer, |tx| {
            tx.bridge(destination_bridge)?.claim(&first_claim, &signature)
        }),
        Err(Error::Bridge(BridgeError::AlreadyClaimed(_)))
    );

    let second_claim = claim_for(&second_lock, "Wrapped DogeCoin", "WDOGE");
    let signature = sign_claim(
        &fx.destination,
        destination_bridge,
        &fx.accounts.deployer,
        &second_claim,
    );
    fx.destination
        .execute(relayer, |tx| {
            tx.bridge(destination_bridge)?.claim(&second_claim, &signature)
        })
        .unwrap();
    assert_eq!(fx.destination_balance(wrapped, user1), U256::from(40));
    assert_eq!(
        fx.destination.token(wrapped).unwrap().total_supply(),
        U256::from(40)
    );

    // Burn the wrapped tokens back towards their origin, approving by permit.
    let deadline = U256::from(fx.destination.head().timestamp + 3600);
    let burn = DepositData {
        spender: destination_bridge,
        deadline,
        approve_signature: sign_permit(
            &fx.destination,
            wrapped,
            &fx.accounts.user1,
            destination_bridge,
            U256::from(40),
            deadline,
        ),
        ..deposit_data(fx.destination_user(), fx.source_user(), wrapped, 40)
    };

    let astray = DepositData {
        to: User::new(user1, 99999u64),
        ..burn.clone()
    };
    assert_matches!(
        fx.destination.execute(user1, |tx| {
            tx.bridge(destination_bridge)?.deposit_with_permit(&astray)
        }),
        Err(Error::Bridge(BridgeError::IncorrectDestinationChain { origin }))
            if origin == U256::from(SOURCE_CHAIN_ID)
    );

    let burn_receipt = fx
        .destination
        .execute(user1, |tx| {
            tx.bridge(destination_bridge)?.deposit_with_permit(&burn)
        })
        .unwrap();
    assert_eq!(burn_receipt.output.kind, DepositKind::Burn);
    assert_eq!(burn_receipt.output.original_token, original);

    let erc20 = fx.destination.token(wrapped).unwrap();
    assert_eq!(erc20.total_supply(), U256::zero());
    assert_eq!(erc20.balance_of(user1), U256::zero());
    assert_eq!(erc20.balance_of(destination_bridge), U256::zero());
    assert_eq!(erc20.nonces(user1), U256::one());

    // The relayer releases the origin tokens from custody.
    let release = claim_for(&burn_receipt, "", "");
    assert_eq!(release.target_token_address, token);
    let signature = sign_claim(&fx.source, source_bridge, &fx.accounts.deployer, &release);
    let receipt = fx
        .source
        .execute(relayer, |tx| {
            tx.bridge(source_bridge)?.claim(&release, &signature)
        })
        .unwrap();

    assert_eq!(receipt.output.kind, ClaimKind::Release);
    assert_eq!(receipt.output.token, token);
    assert_eq!(fx.source_balance(token, source_bridge), U256::zero());
    assert_eq!(fx.source_balance(token, user1), U256::from(INITIAL_BALANCE));
    assert_eq!(
        fx.source.token(token).unwrap().total_supply(),
        U256::from(INITIAL_BALANCE)
    );
}
