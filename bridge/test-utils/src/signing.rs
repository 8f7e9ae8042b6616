// Copyright (c) 2024 The Botho Foundation

use primitive_types::U256;
use xcb_bridge_core::{Address, Claim, ClaimData, Permit};
use xcb_bridge_ledger::Chain;
use xcb_crypto_eip712::Verifier;
use xcb_crypto_secp256k1::{Secp256k1Keypair, Signature};

/// `owner`'s permit for `spender`, at `owner`'s current permit nonce.
pub fn sign_permit(
    chain: &Chain,
    token: Address,
    owner: &Secp256k1Keypair,
    spender: Address,
    value: U256,
    deadline: U256,
) -> Signature {
    let token = chain.token(token).unwrap();
    let permit = Permit {
        owner: owner.address(),
        spender,
        value,
        nonce: token.nonces(owner.address()),
        deadline,
    };
    Verifier::from_separator(token.DOMAIN_SEPARATOR())
        .sign(owner, &permit)
        .unwrap()
}

/// `authority`'s signature authorizing `claim_data` on `bridge`, bound to the
/// current nonce of the claim's `from` address.
pub fn sign_claim(
    chain: &Chain,
    bridge: Address,
    authority: &Secp256k1Keypair,
    claim_data: &ClaimData,
) -> Signature {
    let bridge = chain.bridge(bridge).unwrap();
    let claim = Claim {
        claim_data,
        nonce: bridge.nonce(claim_data.from.address),
    };
    Verifier::from_separator(bridge.domain_separator())
        .sign(authority, &claim)
        .unwrap()
}
