// Copyright (c) 2024 The Botho Foundation

#![deny(unsafe_code)]

//! Secp256k1 keys and recoverable signatures for EVM-style chains.
//!
//! This crate provides Ethereum-compatible key derivation, prehash signing
//! and public key recovery using the secp256k1 elliptic curve, following
//! BIP-32/BIP-39/BIP-44 for deterministic accounts.
//!
//! # Examples
//!
//! ```
//! use xcb_crypto_secp256k1::{recover_address, Secp256k1Keypair};
//!
//! // Derive from a BIP-39 mnemonic
//! let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
//! let keypair = Secp256k1Keypair::from_mnemonic(mnemonic, "", 0).unwrap();
//!
//! // Sign a 32-byte digest and recover the signer
//! let digest = [7u8; 32];
//! let signature = keypair.sign_hash(&digest).unwrap();
//! assert_eq!(recover_address(&digest, &signature).unwrap(), keypair.address());
//! ```

use bip39::{Language, Mnemonic, Seed};
use hmac::{Hmac, Mac};
use k256::{
    ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey},
    elliptic_curve::{Field, PrimeField},
    FieldBytes, Scalar, SecretKey,
};
use primitive_types::{H160, H256};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha512 = Hmac<Sha512>;

/// Errors that can occur during key and signature operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid mnemonic phrase")]
    InvalidMnemonic,

    #[error("Key derivation failed: {0}")]
    DerivationError(String),

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Signing failed: {0}")]
    SigningError(String),

    #[error("Invalid signature recovery id v = {0}")]
    InvalidRecoveryId(u8),

    #[error("Signature s value is in the upper half of the curve order")]
    NonCanonicalS,

    #[error("Malformed signature scalars")]
    MalformedSignature,

    #[error("Public key recovery failed")]
    RecoveryFailed,
}

/// BIP-44 path components for Ethereum
const ETH_PURPOSE: u32 = 44;
const ETH_COIN_TYPE: u32 = 60;

/// Hardened key offset
const HARDENED: u32 = 0x80000000;

/// secp256k1n / 2, the largest `s` accepted in a signature (EIP-2).
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// A recoverable ECDSA signature split into its `v`, `r` and `s` components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub v: u8,
    pub r: H256,
    pub s: H256,
}

impl Signature {
    pub fn new(v: u8, r: H256, s: H256) -> Self {
        Self { v, r, s }
    }

    /// Split a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        Self {
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    /// Join into the 65-byte `r || s || v` form.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_bytes());
        out[32..64].copy_from_slice(self.s.as_bytes());
        out[64] = self.v;
        out
    }

    /// The recovery id encoded by `v`.
    ///
    /// Accepts the Ethereum form (27/28) and the raw parity form (0/1); any
    /// other value is rejected before recovery is attempted.
    pub fn recovery_id(&self) -> Result<RecoveryId, Error> {
        let parity = match self.v {
            27 | 28 => self.v - 27,
            0 | 1 => self.v,
            other => return Err(Error::InvalidRecoveryId(other)),
        };
        RecoveryId::from_byte(parity).ok_or(Error::InvalidRecoveryId(self.v))
    }

    /// Structural checks that do not require any curve arithmetic.
    pub fn validate(&self) -> Result<RecoveryId, Error> {
        let recovery_id = self.recovery_id()?;
        if self.r.is_zero() || self.s.is_zero() {
            return Err(Error::MalformedSignature);
        }
        if self.s.as_bytes() > &HALF_CURVE_ORDER[..] {
            return Err(Error::NonCanonicalS);
        }
        Ok(recovery_id)
    }
}

/// A secp256k1 keypair for Ethereum-compatible operations.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Secp256k1Keypair {
    #[zeroize(skip)] // SigningKey implements its own zeroization
    signing_key: SigningKey,
}

impl core::fmt::Debug for Secp256k1Keypair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Secp256k1Keypair {{ address: {:?} }}", self.address())
    }
}

impl Secp256k1Keypair {
    /// Create a keypair from a BIP-39 mnemonic phrase.
    ///
    /// Uses the standard Ethereum derivation path: m/44'/60'/0'/0/{index}
    pub fn from_mnemonic(mnemonic: &str, password: &str, index: u32) -> Result<Self, Error> {
        let mnemonic =
            Mnemonic::from_phrase(mnemonic, Language::English).map_err(|_| Error::InvalidMnemonic)?;

        let seed = Seed::new(&mnemonic, password);
        Self::from_seed(seed.as_bytes(), index)
    }

    /// Create a keypair from a 64-byte BIP-39 seed.
    pub fn from_seed(seed: &[u8], index: u32) -> Result<Self, Error> {
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
            .map_err(|e| Error::DerivationError(e.to_string()))?;
        mac.update(seed);
        let result = mac.finalize().into_bytes();

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);

        // m/44'/60'/0'/0/{index}
        let path = [
            ETH_PURPOSE | HARDENED,
            ETH_COIN_TYPE | HARDENED,
            HARDENED,
            0,
            index,
        ];

        for &child_index in &path {
            let (new_key, new_chain) = derive_child(&key, &chain_code, child_index)?;
            key = new_key;
            chain_code = new_chain;
        }

        let keypair = Self::from_bytes(&key);

        key.zeroize();
        chain_code.zeroize();

        keypair
    }

    /// Create a keypair from raw 32-byte private key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, Error> {
        let secret_key = SecretKey::from_bytes(&FieldBytes::clone_from_slice(bytes))
            .map_err(|_| Error::InvalidPrivateKey)?;

        Ok(Self {
            signing_key: SigningKey::from(secret_key),
        })
    }

    /// Get the public key as uncompressed bytes (65 bytes: 0x04 || x || y).
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let mut result = [0u8; 65];
        result.copy_from_slice(point.as_bytes());
        result
    }

    /// The 20-byte account address controlled by this keypair.
    pub fn address(&self) -> H160 {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a raw 32-byte digest.
    ///
    /// The returned `v` is the recovery id + 27.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature, Error> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| Error::SigningError(e.to_string()))?;

        let bytes = signature.to_bytes();
        Ok(Signature {
            v: recovery_id.to_byte() + 27,
            r: H256::from_slice(&bytes[..32]),
            s: H256::from_slice(&bytes[32..]),
        })
    }
}

/// Derive a child key from a parent key and chain code.
fn derive_child(
    parent_key: &[u8; 32],
    parent_chain: &[u8; 32],
    index: u32,
) -> Result<([u8; 32], [u8; 32]), Error> {
    let mut mac = HmacSha512::new_from_slice(parent_chain)
        .map_err(|e| Error::DerivationError(e.to_string()))?;

    if index >= HARDENED {
        // Hardened derivation: 0x00 || parent_key || index
        mac.update(&[0x00]);
        mac.update(parent_key);
    } else {
        // Normal derivation: compressed public key || index
        let secret = SecretKey::from_bytes(&FieldBytes::clone_from_slice(parent_key))
            .map_err(|_| Error::DerivationError("invalid parent key".to_string()))?;
        let pubkey = SigningKey::from(secret)
            .verifying_key()
            .to_encoded_point(true);
        mac.update(pubkey.as_bytes());
    }

    mac.update(&index.to_be_bytes());
    let result = mac.finalize().into_bytes();

    let tweak: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(&result[..32])).into();
    let parent: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(parent_key)).into();
    let (tweak, parent) = tweak
        .zip(parent)
        .ok_or_else(|| Error::DerivationError("derived scalar out of range".to_string()))?;

    let child = parent + tweak;
    if bool::from(child.is_zero()) {
        return Err(Error::DerivationError("derived zero key".to_string()));
    }

    let mut new_key = [0u8; 32];
    new_key.copy_from_slice(&child.to_bytes());

    let mut new_chain = [0u8; 32];
    new_chain.copy_from_slice(&result[32..]);

    Ok((new_key, new_chain))
}

fn address_from_verifying_key(key: &VerifyingKey) -> H160 {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 prefix, hash the 64 bytes of x || y
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    H160::from_slice(&hash[12..])
}

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Recover the signer address of a 32-byte digest.
///
/// The signature is validated structurally first; a malformed `v` or a
/// high-`s` signature never reaches the curve arithmetic.
pub fn recover_address(hash: &[u8; 32], signature: &Signature) -> Result<H160, Error> {
    let recovery_id = signature.validate()?;

    let mut r_s = [0u8; 64];
    r_s[..32].copy_from_slice(signature.r.as_bytes());
    r_s[32..].copy_from_slice(signature.s.as_bytes());

    let sig = K256Signature::from_slice(&r_s).map_err(|_| Error::MalformedSignature)?;
    let verifying_key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| Error::RecoveryFailed)?;

    Ok(address_from_verifying_key(&verifying_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Standard test mnemonic (DO NOT USE IN PRODUCTION)
    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

    fn addr(hex_str: &str) -> H160 {
        H160::from_slice(&hex::decode(hex_str.trim_start_matches("0x")).unwrap())
    }

    #[test]
    fn test_mnemonic_derivation() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 0).unwrap();

        // Known address for the test mnemonic at index 0
        assert_eq!(
            keypair.address(),
            addr("0x9858effd232b4033e47d90003d41ec34ecaeda94")
        );
    }

    #[test]
    fn test_dev_mnemonic_accounts() {
        let expected = [
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc",
        ];
        for (index, expected) in expected.iter().enumerate() {
            let keypair = Secp256k1Keypair::from_mnemonic(DEV_MNEMONIC, "", index as u32).unwrap();
            assert_eq!(keypair.address(), addr(expected));
        }
    }

    #[test]
    fn test_from_bytes_matches_derivation() {
        let key = hex::decode("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .unwrap();
        let keypair = Secp256k1Keypair::from_bytes(&key.try_into().unwrap()).unwrap();
        assert_eq!(
            keypair.address(),
            addr("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[test]
    fn test_sign_and_recover() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 0).unwrap();
        let digest = keccak256(b"Hello, Ethereum!");

        let signature = keypair.sign_hash(&digest).unwrap();
        assert!(signature.v == 27 || signature.v == 28);

        let recovered = recover_address(&digest, &signature).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn test_raw_parity_is_accepted() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 1).unwrap();
        let digest = keccak256(b"parity");

        let mut signature = keypair.sign_hash(&digest).unwrap();
        signature.v -= 27;

        assert_eq!(recover_address(&digest, &signature).unwrap(), keypair.address());
    }

    #[test]
    fn test_invalid_v_rejected() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 0).unwrap();
        let digest = keccak256(b"bad v");

        let mut signature = keypair.sign_hash(&digest).unwrap();
        signature.v = 17;

        assert_eq!(
            recover_address(&digest, &signature),
            Err(Error::InvalidRecoveryId(17))
        );
    }

    #[test]
    fn test_high_s_rejected() {
        let signature = Signature::new(27, H256::repeat_byte(1), H256::repeat_byte(0xff));
        assert_eq!(signature.validate().err(), Some(Error::NonCanonicalS));
    }

    #[test]
    fn test_zero_scalars_rejected() {
        let signature = Signature::new(28, H256::zero(), H256::repeat_byte(1));
        assert_eq!(signature.validate().err(), Some(Error::MalformedSignature));
    }

    #[test]
    fn test_signature_bytes_round_trip() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 0).unwrap();
        let signature = keypair.sign_hash(&keccak256(b"split")).unwrap();

        assert_eq!(Signature::from_bytes(&signature.to_bytes()), signature);
    }

    #[test]
    fn test_public_key_format() {
        let keypair = Secp256k1Keypair::from_mnemonic(TEST_MNEMONIC, "", 0).unwrap();

        let uncompressed = keypair.public_key_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
    }
}
