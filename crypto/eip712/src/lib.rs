// Copyright (c) 2024 The Botho Foundation

#![deny(unsafe_code)]

//! Domain-separated typed-data hashing (EIP-712) and signer recovery.
//!
//! Every signable struct implements [`TypedData`] with an explicit, stable
//! member list; there is no reflection. A [`Domain`] binds a signature to a
//! contract name, version, chain id and contract address, and a [`Verifier`]
//! holds the precomputed domain separator for one verifying contract.

use primitive_types::{H160, H256, U256};
use xcb_crypto_secp256k1::{keccak256, recover_address, Secp256k1Keypair, Signature};

/// Version string every domain in this protocol is created with.
pub const DOMAIN_VERSION: &str = "1";

/// Errors that can occur while signing or verifying typed data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed signature: {0}")]
    MalformedSignature(xcb_crypto_secp256k1::Error),

    #[error("Signer recovery failed")]
    RecoveryFailed,

    #[error("Signing failed: {0}")]
    SigningFailed(xcb_crypto_secp256k1::Error),
}

impl From<xcb_crypto_secp256k1::Error> for Error {
    fn from(err: xcb_crypto_secp256k1::Error) -> Self {
        use xcb_crypto_secp256k1::Error as E;
        match err {
            E::InvalidRecoveryId(_) | E::NonCanonicalS | E::MalformedSignature => {
                Error::MalformedSignature(err)
            }
            E::RecoveryFailed => Error::RecoveryFailed,
            other => Error::SigningFailed(other),
        }
    }
}

/// The name and member list of one struct type, e.g.
/// `User(address _address,uint256 chainId)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDef {
    pub name: &'static str,
    pub members: &'static str,
}

impl core::fmt::Display for TypeDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.name, self.members)
    }
}

/// A struct with a fixed typed-data encoding.
pub trait TypedData {
    /// This struct's own type definition.
    const TYPE: TypeDef;

    /// Every struct type referenced by a member, transitively.
    fn referenced_types() -> Vec<TypeDef> {
        Vec::new()
    }

    /// Append the encoded members, in declaration order.
    fn encode_data(&self, encoder: &mut Encoder);

    /// The primary type followed by the referenced types sorted by name.
    fn encode_type() -> String {
        let mut referenced = Self::referenced_types();
        referenced.retain(|def| def.name != Self::TYPE.name);
        referenced.sort_by(|a, b| a.name.cmp(b.name));
        referenced.dedup_by(|a, b| a.name == b.name);

        let mut out = Self::TYPE.to_string();
        for def in referenced {
            out.push_str(&def.to_string());
        }
        out
    }

    fn type_hash() -> H256 {
        H256(keccak256(Self::encode_type()))
    }

    fn hash_struct(&self) -> H256 {
        let mut encoder = Encoder::default();
        encoder.bytes32(Self::type_hash());
        self.encode_data(&mut encoder);
        H256(keccak256(encoder.finish()))
    }
}

/// `T`'s own type definition followed by everything it references.
///
/// Used by containing structs to build their `referenced_types`.
pub fn type_closure<T: TypedData>() -> Vec<TypeDef> {
    let mut defs = vec![T::TYPE];
    defs.extend(T::referenced_types());
    defs
}

/// Builds the `encodeData` byte string: one 32-byte word per member.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn address(&mut self, value: H160) -> &mut Self {
        self.buf.extend_from_slice(&[0u8; 12]);
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn uint(&mut self, value: U256) -> &mut Self {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        self.buf.extend_from_slice(&word);
        self
    }

    pub fn bytes32(&mut self, value: H256) -> &mut Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Dynamic `string` members are encoded as the hash of their bytes.
    pub fn string(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(&keccak256(value.as_bytes()));
        self
    }

    /// Nested struct members are encoded as their struct hash.
    pub fn typed<T: TypedData>(&mut self, value: &T) -> &mut Self {
        self.bytes32(value.hash_struct())
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// The `EIP712Domain` a signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: H160,
}

impl Domain {
    /// A domain with the protocol's fixed version.
    pub fn new(name: impl Into<String>, chain_id: U256, verifying_contract: H160) -> Self {
        Self {
            name: name.into(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn separator(&self) -> H256 {
        self.hash_struct()
    }
}

impl TypedData for Domain {
    const TYPE: TypeDef = TypeDef {
        name: "EIP712Domain",
        members: "string name,string version,uint256 chainId,address verifyingContract",
    };

    fn encode_data(&self, encoder: &mut Encoder) {
        encoder
            .string(&self.name)
            .string(&self.version)
            .uint(self.chain_id)
            .address(self.verifying_contract);
    }
}

/// `keccak256(0x19 || 0x01 || domainSeparator || hashStruct(value))`
pub fn signing_hash<T: TypedData>(domain_separator: H256, value: &T) -> [u8; 32] {
    let mut data = [0u8; 66];
    data[0] = 0x19;
    data[1] = 0x01;
    data[2..34].copy_from_slice(domain_separator.as_bytes());
    data[34..66].copy_from_slice(value.hash_struct().as_bytes());
    keccak256(data)
}

/// Verifies typed-data signatures for a single domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verifier {
    domain_separator: H256,
}

impl Verifier {
    pub fn new(domain: &Domain) -> Self {
        Self::from_separator(domain.separator())
    }

    pub fn from_separator(domain_separator: H256) -> Self {
        Self { domain_separator }
    }

    pub fn domain_separator(&self) -> H256 {
        self.domain_separator
    }

    pub fn digest<T: TypedData>(&self, value: &T) -> [u8; 32] {
        signing_hash(self.domain_separator, value)
    }

    /// Recover the address that signed `value` under this domain.
    ///
    /// A structurally invalid signature is rejected before recovery.
    pub fn recover<T: TypedData>(&self, value: &T, signature: &Signature) -> Result<H160, Error> {
        signature.validate()?;
        Ok(recover_address(&self.digest(value), signature)?)
    }

    pub fn sign<T: TypedData>(
        &self,
        keypair: &Secp256k1Keypair,
        value: &T,
    ) -> Result<Signature, Error> {
        Ok(keypair.sign_hash(&self.digest(value))?)
    }
}
