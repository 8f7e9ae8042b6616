// Copyright (c) 2024 The Botho Foundation

//! A fungible token with allowance-based transfers and signed approvals.
//!
//! The same contract backs origin tokens that users lock in the bridge and the
//! wrapped tokens the factory deploys; for the latter the minter is the bridge.

use std::collections::HashMap;

use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use tracing::trace;
use xcb_bridge_core::{Address, Permit};
use xcb_crypto_eip712::{Domain, Verifier};
use xcb_crypto_secp256k1::Signature;

pub const DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Transfer amount exceeds balance")]
    InsufficientBalance,

    #[error("Insufficient allowance")]
    InsufficientAllowance,

    #[error("Zero address")]
    ZeroAddress,

    #[error("Caller is not the token owner")]
    NotOwner,

    #[error("Supply overflow")]
    SupplyOverflow,

    #[error("ERC20WithPermit: EXPIRED_SIGNATURE")]
    ExpiredSignature,

    #[error("ERC20WithPermit: INVALID_SIGNATURE")]
    InvalidSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },
}

/// Token state. Every mutating call takes the caller explicitly.
#[derive(Debug, Clone)]
pub struct PermitToken {
    address: Address,
    name: String,
    symbol: String,
    owner: Address,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    nonces: HashMap<Address, U256>,
    verifier: Verifier,
}

impl PermitToken {
    /// A token at `address` on `chain_id`, mintable by `owner`.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        owner: Address,
        chain_id: U256,
    ) -> Self {
        let name = name.into();
        let verifier = Verifier::new(&Domain::new(name.clone(), chain_id, address));
        Self {
            address,
            name,
            symbol: symbol.into(),
            owner,
            total_supply: U256::zero(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            nonces: HashMap::new(),
            verifier,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Next permit nonce of `owner`.
    pub fn nonces(&self, owner: Address) -> U256 {
        self.nonces.get(&owner).copied().unwrap_or_default()
    }

    #[allow(non_snake_case)]
    pub fn DOMAIN_SEPARATOR(&self) -> H256 {
        self.verifier.domain_separator()
    }

    pub fn transfer(
        &mut self,
        sender: Address,
        to: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        trace!(token = %self.symbol, ?sender, ?to, %value, "transfer");
        self.move_balance(sender, to, value)
    }

    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.allowances.insert((owner, spender), value);
        Ok(TokenEvent::Approval {
            owner,
            spender,
            value,
        })
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        trace!(token = %self.symbol, ?spender, ?from, ?to, %value, "transfer_from");
        self.spend_allowance(from, spender, value)?;
        self.move_balance(from, to, value)
    }

    /// Approve `spender` on behalf of `owner` using `owner`'s signature over a
    /// `Permit` under this token's domain.
    ///
    /// `now` is the timestamp of the executing block. A permit expires once
    /// `now` passes `deadline`.
    pub fn permit(
        &mut self,
        now: U256,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        signature: &Signature,
    ) -> Result<TokenEvent, TokenError> {
        if deadline < now {
            return Err(TokenError::ExpiredSignature);
        }

        let nonce = self.nonces(owner);
        let permit = Permit {
            owner,
            spender,
            value,
            nonce,
            deadline,
        };
        let recovered = self
            .verifier
            .recover(&permit, signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        if recovered.is_zero() || recovered != owner {
            return Err(TokenError::InvalidSignature);
        }

        self.nonces.insert(owner, nonce + 1);
        self.approve(owner, spender, value)
    }

    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        if caller != self.owner {
            return Err(TokenError::NotOwner);
        }
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }

        self.total_supply = self
            .total_supply
            .checked_add(value)
            .ok_or(TokenError::SupplyOverflow)?;
        let balance = self.balance_of(to);
        self.balances.insert(to, balance + value);

        Ok(TokenEvent::Transfer {
            from: Address::zero(),
            to,
            value,
        })
    }

    /// Destroy `value` of `account`'s tokens, spending `spender`'s allowance.
    pub fn burn_from(
        &mut self,
        spender: Address,
        account: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        if account.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.spend_allowance(account, spender, value)?;

        let balance = self.balance_of(account);
        let remaining = balance
            .checked_sub(value)
            .ok_or(TokenError::InsufficientBalance)?;
        self.balances.insert(account, remaining);
        self.total_supply -= value;

        Ok(TokenEvent::Transfer {
            from: account,
            to: Address::zero(),
            value,
        })
    }

    fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(owner, spender);
        if allowed == U256::MAX {
            return Ok(());
        }
        let remaining = allowed
            .checked_sub(value)
            .ok_or(TokenError::InsufficientAllowance)?;
        self.allowances.insert((owner, spender), remaining);
        Ok(())
    }

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<TokenEvent, TokenError> {
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }

        let from_balance = self.balance_of(from);
        let new_from_balance = from_balance
            .checked_sub(value)
            .ok_or(TokenError::InsufficientBalance)?;
        self.balances.insert(from, new_from_balance);

        let to_balance = self.balance_of(to);
        self.balances.insert(to, to_balance + value);

        Ok(TokenEvent::Transfer { from, to, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use xcb_crypto_secp256k1::{keccak256, Secp256k1Keypair};

    const CHAIN_ID: u64 = 31337;

    fn keypair(seed: &str) -> Secp256k1Keypair {
        Secp256k1Keypair::from_bytes(&keccak256(seed)).unwrap()
    }

    fn token(owner: Address) -> PermitToken {
        PermitToken::new(
            Address::repeat_byte(0xdd),
            "DogeCoin",
            "DOGE",
            owner,
            U256::from(CHAIN_ID),
        )
    }

    fn sign_permit(
        token: &PermitToken,
        signer: &Secp256k1Keypair,
        spender: Address,
        value: U256,
        deadline: U256,
    ) -> Signature {
        let permit = Permit {
            owner: signer.address(),
            spender,
            value,
            nonce: token.nonces(signer.address()),
            deadline,
        };
        Verifier::from_separator(token.DOMAIN_SEPARATOR())
            .sign(signer, &permit)
            .unwrap()
    }

    #[test]
    fn test_metadata() {
        let owner = Address::repeat_byte(1);
        let token = token(owner);
        assert_eq!(token.name(), "DogeCoin");
        assert_eq!(token.symbol(), "DOGE");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.owner(), owner);
        assert_eq!(token.total_supply(), U256::zero());
        assert_eq!(
            token.DOMAIN_SEPARATOR(),
            Domain::new("DogeCoin", U256::from(CHAIN_ID), token.address()).separator()
        );
    }

    #[test]
    fn test_mint_only_owner() {
        let owner = Address::repeat_byte(1);
        let user = Address::repeat_byte(2);
        let mut token = token(owner);

        assert_matches!(
            token.mint(user, user, U256::from(5)),
            Err(TokenError::NotOwner)
        );

        let event = token.mint(owner, user, U256::from(100)).unwrap();
        assert_eq!(
            event,
            TokenEvent::Transfer {
                from: Address::zero(),
                to: user,
                value: U256::from(100)
            }
        );
        assert_eq!(token.balance_of(user), U256::from(100));
        assert_eq!(token.total_supply(), U256::from(100));
    }

    #[test]
    fn test_transfer_and_allowance() {
        let owner = Address::repeat_byte(1);
        let alice = Address::repeat_byte(2);
        let bob = Address::repeat_byte(3);
        let mut token = token(owner);
        token.mint(owner, alice, U256::from(100)).unwrap();

        token.transfer(alice, bob, U256::from(30)).unwrap();
        assert_eq!(token.balance_of(alice), U256::from(70));
        assert_eq!(token.balance_of(bob), U256::from(30));

        assert_matches!(
            token.transfer(bob, alice, U256::from(31)),
            Err(TokenError::InsufficientBalance)
        );
        assert_matches!(
            token.transfer_from(bob, alice, bob, U256::from(1)),
            Err(TokenError::InsufficientAllowance)
        );

        token.approve(alice, bob, U256::from(50)).unwrap();
        token.transfer_from(bob, alice, bob, U256::from(20)).unwrap();
        assert_eq!(token.allowance(alice, bob), U256::from(30));
        assert_eq!(token.balance_of(bob), U256::from(50));
    }

    #[test]
    fn test_infinite_allowance_not_spent() {
        let owner = Address::repeat_byte(1);
        let alice = Address::repeat_byte(2);
        let bob = Address::repeat_byte(3);
        let mut token = token(owner);
        token.mint(owner, alice, U256::from(10)).unwrap();

        token.approve(alice, bob, U256::MAX).unwrap();
        token.transfer_from(bob, alice, bob, U256::from(10)).unwrap();
        assert_eq!(token.allowance(alice, bob), U256::MAX);
    }

    #[test]
    fn test_burn_from() {
        let owner = Address::repeat_byte(1);
        let alice = Address::repeat_byte(2);
        let mut token = token(owner);
        token.mint(owner, alice, U256::from(40)).unwrap();

        assert_matches!(
            token.burn_from(owner, alice, U256::from(40)),
            Err(TokenError::InsufficientAllowance)
        );

        token.approve(alice, owner, U256::from(40)).unwrap();
        token.burn_from(owner, alice, U256::from(40)).unwrap();
        assert_eq!(token.balance_of(alice), U256::zero());
        assert_eq!(token.total_supply(), U256::zero());
    }

    #[test]
    fn test_permit() {
        let alice = keypair("alice");
        let spender = Address::repeat_byte(9);
        let mut token = token(Address::repeat_byte(1));
        let deadline = U256::from(2_000);
        let value = U256::from(20);

        let signature = sign_permit(&token, &alice, spender, value, deadline);
        let event = token
            .permit(
                U256::from(1_000),
                alice.address(),
                spender,
                value,
                deadline,
                &signature,
            )
            .unwrap();

        assert_eq!(
            event,
            TokenEvent::Approval {
                owner: alice.address(),
                spender,
                value
            }
        );
        assert_eq!(token.allowance(alice.address(), spender), value);
        assert_eq!(token.nonces(alice.address()), U256::one());

        // Same signature again: the nonce moved on.
        assert_matches!(
            token.permit(
                U256::from(1_000),
                alice.address(),
                spender,
                value,
                deadline,
                &signature
            ),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_permit_expired() {
        let alice = keypair("alice");
        let spender = Address::repeat_byte(9);
        let mut token = token(Address::repeat_byte(1));
        let deadline = U256::from(1_000);
        let signature = sign_permit(&token, &alice, spender, U256::one(), deadline);

        // Still valid at the deadline itself.
        let mut at_deadline = token.clone();
        assert!(at_deadline
            .permit(deadline, alice.address(), spender, U256::one(), deadline, &signature)
            .is_ok());

        assert_matches!(
            token.permit(
                deadline + 1,
                alice.address(),
                spender,
                U256::one(),
                deadline,
                &signature
            ),
            Err(TokenError::ExpiredSignature)
        );
        assert_eq!(token.nonces(alice.address()), U256::zero());
    }

    #[test]
    fn test_permit_rejects_bad_signatures() {
        let alice = keypair("alice");
        let mallory = keypair("mallory");
        let spender = Address::repeat_byte(9);
        let mut token = token(Address::repeat_byte(1));
        let deadline = U256::from(5_000);

        let forged = sign_permit(&token, &mallory, spender, U256::one(), deadline);
        assert_matches!(
            token.permit(U256::zero(), alice.address(), spender, U256::one(), deadline, &forged),
            Err(TokenError::InvalidSignature)
        );

        let mut bad_v = sign_permit(&token, &alice, spender, U256::one(), deadline);
        bad_v.v = 17;
        assert_matches!(
            token.permit(U256::zero(), alice.address(), spender, U256::one(), deadline, &bad_v),
            Err(TokenError::InvalidSignature)
        );

        // A signature for a different value does not approve this one.
        let other_value = sign_permit(&token, &alice, spender, U256::one(), deadline);
        assert_matches!(
            token.permit(
                U256::zero(),
                alice.address(),
                spender,
                U256::from(2),
                deadline,
                &other_value
            ),
            Err(TokenError::InvalidSignature)
        );
    }
}
