//! Lockstep - a deterministic, fixed-capacity ledger state machine.
//!
//! This crate multiplexes five market sub-ledgers - a perpetual order book,
//! constant-product swap pools, collateral lending, binary prediction
//! markets, and staking - plus the balance book that funds them, behind a
//! single operation dispatcher. Every replica that applies the same
//! operation log against the same configuration lands on the same state,
//! byte for byte.
//!
//! # Architecture
//!
//! Determinism is structural rather than incidental:
//!
//! - **Fixed capacity** - every book is bounded at construction and rejects
//!   rather than grows.
//! - **Integer arithmetic only** - fees and collateral bounds use basis
//!   points over `u128` intermediates; there is no floating point anywhere.
//! - **No ambient inputs** - no clock, no randomness; time-like fields are
//!   stamped from the operation sequence counter.
//! - **Atomic operations** - each operation proves every fallible step
//!   before its first mutation, so a rejection never leaves partial state.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files with genesis state
//! - [`domain`] - The six books and their entity types
//! - [`error`] - Error types for the crate
//! - [`ledger`] - The state machine, typed operations, and the dispatcher
//! - [`wire`] - Fixed-layout binary operation log (LSTP v1)
//! - [`cli`] - Command-line interface (`replay`, `inspect`, `check`)
//!
//! # Example
//!
//! ```
//! use lockstep::config::Config;
//! use lockstep::domain::{AccountId, AssetId};
//! use lockstep::ledger::{Ledger, Operation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::default();
//! config.genesis.balances.push(lockstep::config::GenesisBalance {
//!     account: AccountId::from_bytes([1; 32]),
//!     asset: AssetId::new(0),
//!     amount: 1_000,
//! });
//!
//! let mut ledger = Ledger::new(&config)?;
//! ledger.apply(
//!     AccountId::from_bytes([1; 32]),
//!     Operation::Stake {
//!         amount: 250,
//!         action: lockstep::domain::StakeAction::Deposit,
//!     },
//! )?;
//! assert_eq!(ledger.summary().stakers, 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod wire;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
