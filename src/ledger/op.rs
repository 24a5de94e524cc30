//! Typed operations and their applied outcomes.
//!
//! [`Operation`] is the decoded form of a wire input record: one variant per
//! operation tag, fields in wire order. [`Applied`] is what the ledger
//! reports back internally after a successful application; the host boundary
//! itself carries no return value.

use std::fmt;

use crate::domain::{AssetId, LendAction, MarketId, OrderId, Outcome, Side, StakeAction};

/// A single ledger operation, ready to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Tag 1: rest a new order on the book.
    PlaceOrder {
        /// Limit price in lot-relative units.
        price: u64,
        /// Order size.
        size: u64,
        /// Long or short.
        side: Side,
    },
    /// Tag 2: cancel a resting order owned by the caller.
    CancelOrder {
        /// The order to remove.
        order_id: OrderId,
    },
    /// Tag 3: trade against the constant-product pool for the pair.
    Swap {
        /// Asset the caller pays in.
        asset_in: AssetId,
        /// Asset the caller wants out.
        asset_out: AssetId,
        /// Input amount, fee included.
        amount_in: u64,
        /// Slippage floor; the swap rejects below this output.
        min_amount_out: u64,
    },
    /// Tag 4: move the caller's lending position.
    Lend {
        /// The position's asset.
        asset: AssetId,
        /// Amount to supply, borrow, repay, or withdraw.
        amount: u64,
        /// Which of the four moves to make.
        action: LendAction,
    },
    /// Tag 5: create a market or bet on an existing one.
    Predict {
        /// Raw market id; 0 requests creation of a new market.
        market_id: u64,
        /// Bet amount, ignored on creation.
        amount: u64,
        /// Bet side, ignored on creation.
        prediction: Outcome,
        /// End-time marker for creation, ignored on bets.
        duration: u64,
    },
    /// Tag 6: move the caller's staking record.
    Stake {
        /// Amount to deposit or withdraw.
        amount: u64,
        /// Deposit or withdraw.
        action: StakeAction,
    },
    /// Tag 7: terminally resolve a market (oracle only).
    Resolve {
        /// The market to resolve.
        market_id: MarketId,
        /// The terminal outcome.
        outcome: Outcome,
    },
}

impl Operation {
    /// The wire tag routing this operation.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Operation::PlaceOrder { .. } => 1,
            Operation::CancelOrder { .. } => 2,
            Operation::Swap { .. } => 3,
            Operation::Lend { .. } => 4,
            Operation::Predict { .. } => 5,
            Operation::Stake { .. } => 6,
            Operation::Resolve { .. } => 7,
        }
    }

    /// Stable lowercase name for log fields and listings.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::PlaceOrder { .. } => "place_order",
            Operation::CancelOrder { .. } => "cancel_order",
            Operation::Swap { .. } => "swap",
            Operation::Lend { .. } => "lend",
            Operation::Predict { .. } => "predict",
            Operation::Stake { .. } => "stake",
            Operation::Resolve { .. } => "resolve",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::PlaceOrder { price, size, side } => {
                write!(f, "place_order price={price} size={size} side={side}")
            }
            Operation::CancelOrder { order_id } => {
                write!(f, "cancel_order order_id={order_id}")
            }
            Operation::Swap {
                asset_in,
                asset_out,
                amount_in,
                min_amount_out,
            } => write!(
                f,
                "swap asset_in={asset_in} asset_out={asset_out} amount_in={amount_in} min_amount_out={min_amount_out}"
            ),
            Operation::Lend {
                asset,
                amount,
                action,
            } => write!(f, "lend asset={asset} amount={amount} action={action}"),
            Operation::Predict {
                market_id,
                amount,
                prediction,
                duration,
            } => write!(
                f,
                "predict market_id={market_id} amount={amount} prediction={prediction} duration={duration}"
            ),
            Operation::Stake { amount, action } => {
                write!(f, "stake amount={amount} action={action}")
            }
            Operation::Resolve { market_id, outcome } => {
                write!(f, "resolve market_id={market_id} outcome={outcome}")
            }
        }
    }
}

/// What a successful application did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new order rests on the book.
    OrderPlaced {
        /// Its freshly issued id.
        id: OrderId,
    },
    /// An order left the book.
    OrderCancelled {
        /// The removed order's id.
        id: OrderId,
    },
    /// A swap traded against a pool.
    SwapExecuted {
        /// Output credited to the caller.
        amount_out: u64,
        /// Fee retained by the pool, in input-asset units.
        fee: u64,
    },
    /// A lending position moved.
    LendingApplied {
        /// Which move was made.
        action: LendAction,
        /// The amount moved.
        amount: u64,
    },
    /// A new market exists.
    MarketCreated {
        /// Its freshly issued id.
        id: MarketId,
    },
    /// A bet was added to a market side.
    BetAccepted {
        /// The market bet on.
        market: MarketId,
        /// The side backed.
        side: Outcome,
        /// The escrowed amount.
        amount: u64,
    },
    /// A market reached its terminal outcome.
    MarketResolved {
        /// The resolved market.
        market: MarketId,
        /// Its outcome.
        outcome: Outcome,
    },
    /// Stake was deposited.
    StakeDeposited {
        /// The deposited amount.
        amount: u64,
    },
    /// Stake was withdrawn.
    StakeWithdrawn {
        /// The withdrawn amount.
        amount: u64,
    },
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applied::OrderPlaced { id } => write!(f, "order {id} placed"),
            Applied::OrderCancelled { id } => write!(f, "order {id} cancelled"),
            Applied::SwapExecuted { amount_out, fee } => {
                write!(f, "swapped for {amount_out} (fee {fee})")
            }
            Applied::LendingApplied { action, amount } => {
                write!(f, "lending {action} of {amount}")
            }
            Applied::MarketCreated { id } => write!(f, "market {id} created"),
            Applied::BetAccepted {
                market,
                side,
                amount,
            } => write!(f, "bet {amount} on {side} of market {market}"),
            Applied::MarketResolved { market, outcome } => {
                write!(f, "market {market} resolved {outcome}")
            }
            Applied::StakeDeposited { amount } => write!(f, "staked {amount}"),
            Applied::StakeWithdrawn { amount } => write!(f, "unstaked {amount}"),
        }
    }
}
