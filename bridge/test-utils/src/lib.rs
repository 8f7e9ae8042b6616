// Copyright (c) 2024 The Botho Foundation

//! Helpers shared by the bridge integration tests.

mod accounts;
mod fixtures;
mod hooks;
mod signing;

pub use accounts::{dev_account, DevAccounts, DEV_MNEMONIC};
pub use fixtures::{
    claim_for, deploy_bridge, deposit_data, BridgeDeployment, TwoChains, BLOCK_TIME,
    DESTINATION_CHAIN_ID, GENESIS_TIMESTAMP, INITIAL_BALANCE, SOURCE_CHAIN_ID,
};
pub use hooks::{FailingTransferHook, ReentrantCall, ReentrantHook};
pub use signing::{sign_claim, sign_permit};

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Install a test-friendly fmt subscriber filtered by `RUST_LOG`.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
