//! Constant-product liquidity pools and the pool book.
//!
//! - [`LiquidityPool`] - Two assets and their integer reserves
//! - [`SwapQuote`] - A fully validated trade, ready to commit
//! - [`PoolBook`] - Capacity-bounded pool storage and swap math
//!
//! The correctness property for any pool is that `reserve_a * reserve_b`
//! never decreases across a swap. Reserves move only by the traded amounts:
//! the full input (fee included) enters the pool and the quoted output
//! leaves it, so a nonzero fee makes the product strictly grow. All
//! arithmetic is integer; intermediates widen to u128 and rounding always
//! favors the pool.

use super::error::LedgerError;
use super::id::AssetId;

/// Divisor for basis-point quantities.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// A single constant-product pool over an unordered asset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityPool {
    asset_a: AssetId,
    asset_b: AssetId,
    reserve_a: u64,
    reserve_b: u64,
}

impl LiquidityPool {
    /// Create a pool after validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if both sides name the same asset or either
    /// reserve is zero; an empty side would let a swap drain the pool
    /// entirely and divide by zero in the quote.
    pub fn try_new(
        asset_a: AssetId,
        asset_b: AssetId,
        reserve_a: u64,
        reserve_b: u64,
    ) -> Result<Self, LedgerError> {
        if asset_a == asset_b {
            return Err(LedgerError::InvalidInput {
                reason: "pool assets must differ",
            });
        }
        if reserve_a == 0 || reserve_b == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "pool reserves must be nonzero",
            });
        }
        Ok(Self {
            asset_a,
            asset_b,
            reserve_a,
            reserve_b,
        })
    }

    /// Get the first asset of the pair.
    #[must_use]
    pub const fn asset_a(&self) -> AssetId {
        self.asset_a
    }

    /// Get the second asset of the pair.
    #[must_use]
    pub const fn asset_b(&self) -> AssetId {
        self.asset_b
    }

    /// Get the reserve held for `asset_a`.
    #[must_use]
    pub const fn reserve_a(&self) -> u64 {
        self.reserve_a
    }

    /// Get the reserve held for `asset_b`.
    #[must_use]
    pub const fn reserve_b(&self) -> u64 {
        self.reserve_b
    }

    /// The constant-product invariant value.
    #[must_use]
    pub const fn product(&self) -> u128 {
        self.reserve_a as u128 * self.reserve_b as u128
    }

    /// Returns true if this pool trades the pair, in either orientation.
    #[must_use]
    pub fn trades(&self, x: AssetId, y: AssetId) -> bool {
        (self.asset_a == x && self.asset_b == y) || (self.asset_a == y && self.asset_b == x)
    }

    fn reserves_for(&self, asset_in: AssetId) -> (u64, u64) {
        if asset_in == self.asset_a {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    fn apply(&mut self, asset_in: AssetId, amount_in: u64, amount_out: u64) {
        // Bounds were proven when the quote was built.
        if asset_in == self.asset_a {
            self.reserve_a += amount_in;
            self.reserve_b -= amount_out;
        } else {
            self.reserve_b += amount_in;
            self.reserve_a -= amount_out;
        }
    }
}

/// A validated swap against a specific pool, ready to commit.
///
/// Produced by [`PoolBook::quote`] without mutating anything, so callers can
/// finish their own checks (balance debits, for one) before committing.
#[derive(Debug, Clone, Copy)]
pub struct SwapQuote {
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: u64,
    amount_out: u64,
    fee: u64,
}

impl SwapQuote {
    /// Get the asset the caller pays in.
    #[must_use]
    pub const fn asset_in(&self) -> AssetId {
        self.asset_in
    }

    /// Get the asset the caller receives.
    #[must_use]
    pub const fn asset_out(&self) -> AssetId {
        self.asset_out
    }

    /// Get the input amount, fee included.
    #[must_use]
    pub const fn amount_in(&self) -> u64 {
        self.amount_in
    }

    /// Get the output amount the caller will receive.
    #[must_use]
    pub const fn amount_out(&self) -> u64 {
        self.amount_out
    }

    /// Get the fee retained by the pool, in input-asset units.
    #[must_use]
    pub const fn fee(&self) -> u64 {
        self.fee
    }
}

/// Capacity-bounded pool storage with the swap arithmetic.
///
/// Pools are installed once, from genesis configuration; there is no
/// operation that creates a pool at runtime.
#[derive(Debug, Clone)]
pub struct PoolBook {
    pools: Vec<LiquidityPool>,
    capacity: usize,
    fee_bps: u16,
}

impl PoolBook {
    /// Create an empty book holding at most `capacity` pools, charging
    /// `fee_bps` basis points on every swap input.
    #[must_use]
    pub fn new(capacity: usize, fee_bps: u16) -> Self {
        Self {
            pools: Vec::with_capacity(capacity),
            capacity,
            fee_bps,
        }
    }

    /// Install a genesis pool.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` when the book is full and `InvalidInput`
    /// if a pool for the pair already exists.
    pub fn install(&mut self, pool: LiquidityPool) -> Result<(), LedgerError> {
        if self.pools.len() >= self.capacity {
            return Err(LedgerError::CapacityExceeded {
                ledger: "pool",
                capacity: self.capacity,
            });
        }
        if self.find(pool.asset_a(), pool.asset_b()).is_some() {
            return Err(LedgerError::InvalidInput {
                reason: "pool for asset pair already exists",
            });
        }
        self.pools.push(pool);
        Ok(())
    }

    /// Get the pool trading the pair, in either orientation.
    #[must_use]
    pub fn find(&self, x: AssetId, y: AssetId) -> Option<&LiquidityPool> {
        self.pools.iter().find(|pool| pool.trades(x, y))
    }

    /// Price a swap without mutating any state.
    ///
    /// The fee is taken from the input up front (rounded up, in the pool's
    /// favor) and the output is quoted from the remainder:
    /// `amount_out = reserve_out * effective_in / (reserve_in + effective_in)`,
    /// rounded down.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero input or identical assets,
    /// `PoolNotFound` for an unknown pair, `SwapTooSmall` when nothing would
    /// come out, `Overflow` if the input reserve would exceed `u64::MAX`, and
    /// `SlippageExceeded` when the output falls below `min_amount_out`.
    pub fn quote(
        &self,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<SwapQuote, LedgerError> {
        if asset_in == asset_out {
            return Err(LedgerError::InvalidInput {
                reason: "swap assets must differ",
            });
        }
        if amount_in == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "swap input must be nonzero",
            });
        }
        let pool = self
            .find(asset_in, asset_out)
            .ok_or(LedgerError::PoolNotFound {
                asset_in,
                asset_out,
            })?;
        let (reserve_in, reserve_out) = pool.reserves_for(asset_in);

        // Fee rounds up so dust inputs cannot trade fee-free.
        let fee = (amount_in as u128 * self.fee_bps as u128).div_ceil(BPS_DENOMINATOR) as u64;
        let effective_in = amount_in - fee;
        if effective_in == 0 {
            return Err(LedgerError::SwapTooSmall { amount_in });
        }

        reserve_in
            .checked_add(amount_in)
            .ok_or(LedgerError::Overflow {
                what: "pool reserve",
            })?;

        let numerator = reserve_out as u128 * effective_in as u128;
        let denominator = reserve_in as u128 + effective_in as u128;
        let amount_out = (numerator / denominator) as u64;
        if amount_out == 0 {
            return Err(LedgerError::SwapTooSmall { amount_in });
        }
        if amount_out < min_amount_out {
            return Err(LedgerError::SlippageExceeded {
                amount_out,
                min_amount_out,
            });
        }

        Ok(SwapQuote {
            asset_in,
            asset_out,
            amount_in,
            amount_out,
            fee,
        })
    }

    /// Apply a quote produced by [`PoolBook::quote`] against the same state.
    ///
    /// Both reserves move in the same call: the full input is added and the
    /// quoted output removed.
    ///
    /// # Errors
    ///
    /// Returns `PoolNotFound` if the quoted pair no longer exists; pools are
    /// never removed, so this cannot happen within a single operation.
    pub fn commit(&mut self, quote: &SwapQuote) -> Result<(), LedgerError> {
        let pool = self
            .pools
            .iter_mut()
            .find(|pool| pool.trades(quote.asset_in, quote.asset_out))
            .ok_or(LedgerError::PoolNotFound {
                asset_in: quote.asset_in,
                asset_out: quote.asset_out,
            })?;
        pool.apply(quote.asset_in, quote.amount_in, quote.amount_out);
        Ok(())
    }

    /// Get an iterator over all pools in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &LiquidityPool> {
        self.pools.iter()
    }

    /// Get the count of installed pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns true if no pools are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// The fee charged on swap inputs, in basis points.
    #[must_use]
    pub const fn fee_bps(&self) -> u16 {
        self.fee_bps
    }
}
