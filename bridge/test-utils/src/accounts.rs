// Copyright (c) 2024 The Botho Foundation

use xcb_bridge_core::Address;
use xcb_crypto_secp256k1::Secp256k1Keypair;

/// The standard development-chain mnemonic.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Account `index` of [`DEV_MNEMONIC`] (path m/44'/60'/0'/0/index).
pub fn dev_account(index: u32) -> Secp256k1Keypair {
    Secp256k1Keypair::from_mnemonic(DEV_MNEMONIC, "", index).unwrap()
}

/// The accounts every bridge test uses.
pub struct DevAccounts {
    /// Deploys everything and owns both bridges
    pub deployer: Secp256k1Keypair,
    pub user1: Secp256k1Keypair,
    pub user2: Secp256k1Keypair,
    pub user3: Secp256k1Keypair,
}

impl DevAccounts {
    pub fn new() -> Self {
        Self {
            deployer: dev_account(0),
            user1: dev_account(1),
            user2: dev_account(2),
            user3: dev_account(3),
        }
    }

    pub fn deployer(&self) -> Address {
        self.deployer.address()
    }

    pub fn user1(&self) -> Address {
        self.user1.address()
    }

    pub fn user2(&self) -> Address {
        self.user2.address()
    }

    pub fn user3(&self) -> Address {
        self.user3.address()
    }
}

impl Default for DevAccounts {
    fn default() -> Self {
        Self::new()
    }
}
