// Copyright (c) 2024 The Botho Foundation

//! The bridge contracts and the in-process chain they execute on.
//!
//! A [`Chain`] owns the committed world state. Every state change goes
//! through [`Chain::execute`], which hands a [`Transaction`] to the caller's
//! closure and commits only if the closure succeeds. Contracts are reached
//! through handles borrowed from the transaction:
//!
//! - [`Bridge`]: deposits, claims and administration
//! - [`WrappedTokenFactory`]: lazily deployed wrapped tokens
//! - [`Token`]: permit tokens, with optional [`TransferHook`]s

pub mod bridge;
pub mod chain;
pub mod error;
pub mod factory;
pub mod guard;
pub mod receipt;
pub mod state;
pub mod token;
pub mod transaction;

pub use bridge::{Bridge, BridgeState};
pub use chain::{Block, Chain};
pub use error::{Error, FactoryError};
pub use factory::{wrapped_token_address, FactoryState, WrappedTokenFactory};
pub use guard::Guard;
pub use receipt::{Event, Log, Receipt};
pub use state::{TransferHook, WorldState};
pub use token::Token;
pub use transaction::{BlockEnv, Transaction};
