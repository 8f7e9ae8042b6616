// Copyright (c) 2024 The Botho Foundation

use std::sync::Mutex;

use primitive_types::U256;
use xcb_bridge_core::{Address, ClaimData, DepositData};
use xcb_bridge_ledger::{Error, Transaction, TransferHook};
use xcb_crypto_secp256k1::Signature;

/// The bridge entry point a [`ReentrantHook`] calls back into.
#[derive(Debug, Clone)]
pub enum ReentrantCall {
    Deposit(DepositData),
    Claim(ClaimData, Signature),
}

/// Calls back into a bridge from inside a token transfer.
///
/// With `swallow` set, the nested call's error is recorded and the transfer
/// still reports success; otherwise the error aborts the outer call.
#[derive(Debug)]
pub struct ReentrantHook {
    pub bridge: Address,
    pub caller: Address,
    pub call: ReentrantCall,
    pub swallow: bool,
    errors: Mutex<Vec<String>>,
}

impl ReentrantHook {
    pub fn new(bridge: Address, caller: Address, call: ReentrantCall) -> Self {
        Self {
            bridge,
            caller,
            call,
            swallow: false,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn swallowing(mut self) -> Self {
        self.swallow = true;
        self
    }

    /// Errors the nested calls returned.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl TransferHook for ReentrantHook {
    fn on_transfer(
        &self,
        tx: &mut Transaction,
        _token: Address,
        _from: Address,
        _to: Address,
        _value: U256,
    ) -> Result<bool, Error> {
        let result = tx.call_as(self.caller, |tx| {
            let mut bridge = tx.bridge(self.bridge)?;
            match &self.call {
                ReentrantCall::Deposit(data) => bridge.deposit(data).map(|_| ()),
                ReentrantCall::Claim(data, signature) => bridge.claim(data, signature).map(|_| ()),
            }
        });

        match result {
            Ok(()) => Ok(true),
            Err(err) => {
                self.errors.lock().unwrap().push(err.to_string());
                if self.swallow {
                    Ok(true)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Reports every transfer as failed without reverting.
#[derive(Debug)]
pub struct FailingTransferHook;

impl TransferHook for FailingTransferHook {
    fn on_transfer(
        &self,
        _tx: &mut Transaction,
        _token: Address,
        _from: Address,
        _to: Address,
        _value: U256,
    ) -> Result<bool, Error> {
        Ok(false)
    }
}
