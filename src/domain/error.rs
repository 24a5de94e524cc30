//! Rejection errors for ledger operations.
//!
//! Every ledger operation either fully applies or returns one of these errors
//! with the state untouched. The host boundary has no return channel, so the
//! dispatcher downgrades rejections to log events and counters; internally
//! they stay fully typed so behavior is testable and auditable.
//!
//! # Examples
//!
//! Matching on a rejection:
//!
//! ```
//! use lockstep::domain::error::LedgerError;
//! use lockstep::domain::order::OrderBook;
//! use lockstep::domain::id::{AccountId, OrderId};
//!
//! let mut book = OrderBook::new(16);
//! let caller = AccountId::from_bytes([1; 32]);
//! let result = book.cancel(caller, OrderId::new(99));
//!
//! assert!(matches!(result, Err(LedgerError::OrderNotFound { .. })));
//! ```

use thiserror::Error;

use super::id::{AccountId, AssetId, MarketId, OrderId};

/// Coarse classification of a rejection, used for dispatch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// A ledger is at its fixed capacity.
    CapacityExceeded,
    /// A referenced id or identity does not exist.
    NotFound,
    /// The caller is not permitted to perform the operation.
    Unauthorized,
    /// The current state does not admit the operation.
    InvalidState,
    /// The payload itself is malformed or out of range.
    InvalidInput,
}

impl RejectionKind {
    /// Stable lowercase name for log fields and stats output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::CapacityExceeded => "capacity_exceeded",
            RejectionKind::NotFound => "not_found",
            RejectionKind::Unauthorized => "unauthorized",
            RejectionKind::InvalidState => "invalid_state",
            RejectionKind::InvalidInput => "invalid_input",
        }
    }
}

/// Errors that reject a ledger operation.
///
/// Rejections are ordinary outcomes, not faults: capacity exhaustion and
/// authorization mismatches must reproduce identically on every node.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// A ledger's fixed capacity is exhausted; nothing was stored.
    #[error("{ledger} ledger is full (capacity {capacity})")]
    CapacityExceeded {
        /// Which ledger refused the entry.
        ledger: &'static str,
        /// Its configured capacity.
        capacity: usize,
    },

    /// No resting order carries the requested id.
    #[error("order {id} not found")]
    OrderNotFound {
        /// The id that was looked up.
        id: OrderId,
    },

    /// No market carries the requested id.
    #[error("market {id} not found")]
    MarketNotFound {
        /// The id that was looked up.
        id: MarketId,
    },

    /// No pool trades the requested asset pair in either orientation.
    #[error("no pool for asset pair {asset_in} <-> {asset_out}")]
    PoolNotFound {
        /// Asset offered by the caller.
        asset_in: AssetId,
        /// Asset requested by the caller.
        asset_out: AssetId,
    },

    /// The caller has no lending position for the asset.
    #[error("no lending position for {user} in asset {asset}")]
    PositionNotFound {
        /// The position owner that was looked up.
        user: AccountId,
        /// The asset of the missing position.
        asset: AssetId,
    },

    /// The caller has never staked.
    #[error("no stake record for {user}")]
    StakerNotFound {
        /// The staker that was looked up.
        user: AccountId,
    },

    /// Only the order's owner may cancel it.
    #[error("caller {caller} does not own order {id}")]
    NotOrderOwner {
        /// The rejected caller.
        caller: AccountId,
        /// The order it tried to cancel.
        id: OrderId,
    },

    /// Only the configured oracle identity may resolve markets.
    #[error("caller {caller} is not the resolution oracle")]
    NotOracle {
        /// The rejected caller.
        caller: AccountId,
    },

    /// The market has already been resolved; its outcome never changes again.
    #[error("market {id} is already resolved")]
    MarketResolved {
        /// The resolved market.
        id: MarketId,
    },

    /// The payload is malformed or out of range.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The caller's available balance of the asset cannot cover the debit.
    #[error("insufficient balance of asset {asset}: need {needed}, have {available}")]
    InsufficientBalance {
        /// The asset being debited.
        asset: AssetId,
        /// The amount the operation requires.
        needed: u64,
        /// The caller's current balance.
        available: u64,
    },

    /// The caller's staked amount cannot cover the withdrawal.
    #[error("insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake {
        /// The requested withdrawal.
        requested: u64,
        /// The current staked amount.
        staked: u64,
    },

    /// The lending book cannot cover the trade or withdrawal for the asset.
    #[error("insufficient liquidity in asset {asset}: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// The affected asset.
        asset: AssetId,
        /// The requested amount.
        requested: u64,
        /// What the book can currently cover.
        available: u64,
    },

    /// The swap input is too small to produce any output after fees.
    #[error("swap input {amount_in} yields zero output")]
    SwapTooSmall {
        /// The offered input amount.
        amount_in: u64,
    },

    /// The quoted output fell below the caller's minimum.
    #[error("swap output {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded {
        /// The quoted output amount.
        amount_out: u64,
        /// The caller's acceptable minimum.
        min_amount_out: u64,
    },

    /// The position would end up past its collateral bound.
    #[error("borrowed {borrowed} would exceed collateral bound {limit}")]
    Undercollateralized {
        /// The borrowed total the operation would leave behind.
        borrowed: u64,
        /// The bound derived from the supplied collateral.
        limit: u64,
    },

    /// Applying the operation would overflow a 64-bit amount.
    #[error("amount overflow in {what}")]
    Overflow {
        /// Which quantity would overflow.
        what: &'static str,
    },
}

impl LedgerError {
    /// Classify this rejection for counters and log fields.
    #[must_use]
    pub const fn kind(&self) -> RejectionKind {
        match self {
            LedgerError::CapacityExceeded { .. } => RejectionKind::CapacityExceeded,
            LedgerError::OrderNotFound { .. }
            | LedgerError::MarketNotFound { .. }
            | LedgerError::PoolNotFound { .. }
            | LedgerError::PositionNotFound { .. }
            | LedgerError::StakerNotFound { .. } => RejectionKind::NotFound,
            LedgerError::NotOrderOwner { .. } | LedgerError::NotOracle { .. } => {
                RejectionKind::Unauthorized
            }
            LedgerError::MarketResolved { .. }
            | LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientStake { .. }
            | LedgerError::InsufficientLiquidity { .. }
            | LedgerError::SlippageExceeded { .. }
            | LedgerError::Undercollateralized { .. }
            | LedgerError::Overflow { .. } => RejectionKind::InvalidState,
            LedgerError::InvalidInput { .. } | LedgerError::SwapTooSmall { .. } => {
                RejectionKind::InvalidInput
            }
        }
    }
}
