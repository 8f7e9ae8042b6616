// Copyright (c) 2024 The Botho Foundation

//! Ownership, pause switch and reentrancy lock of a bridge.

use xcb_bridge_core::{Address, BridgeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    owner: Address,
    paused: bool,
    entered: bool,
}

impl Guard {
    pub fn new(owner: Address, paused: bool) -> Self {
        Self {
            owner,
            paused,
            entered: false,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn only_owner(&self, caller: Address) -> Result<(), BridgeError> {
        if caller != self.owner {
            return Err(BridgeError::NotOwner);
        }
        Ok(())
    }

    pub fn when_not_paused(&self) -> Result<(), BridgeError> {
        if self.paused {
            return Err(BridgeError::Paused);
        }
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> Result<(), BridgeError> {
        self.only_owner(caller)?;
        self.when_not_paused()?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), BridgeError> {
        self.only_owner(caller)?;
        if !self.paused {
            return Err(BridgeError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Hand ownership to `new_owner`, returning the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, BridgeError> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(BridgeError::InvalidAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Take the reentrancy lock. Every successful `enter` must be paired with
    /// an `exit`, whatever the outcome of the guarded call.
    pub fn enter(&mut self) -> Result<(), BridgeError> {
        if self.entered {
            return Err(BridgeError::ReentrantCall);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }
}
