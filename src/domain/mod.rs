//! Deterministic ledger domain types.
//!
//! Each sub-ledger lives in its own module as an entity type plus a
//! capacity-bounded book. Books own their rules: input validation, capacity
//! refusal, authorization where the data carries an owner. Nothing in this
//! layer does I/O, reads a clock, or allocates past the capacity it was
//! created with.

pub mod balance;
pub mod error;
pub mod id;
pub mod lending;
pub mod market;
pub mod order;
pub mod pool;
pub mod staking;

// Core domain types
pub use balance::{Balance, BalanceBook};
pub use error::{LedgerError, RejectionKind};
pub use id::{AccountId, AssetId, MarketId, OrderId};
pub use lending::{LendAction, LendingBook, LendingPosition};
pub use market::{MarketBook, Outcome, PredictionMarket};
pub use order::{Order, OrderBook, Side};
pub use pool::{LiquidityPool, PoolBook, SwapQuote, BPS_DENOMINATOR};
pub use staking::{StakeAction, StakeBook, Staker};
