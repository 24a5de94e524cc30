//! Collateralized lending positions and the lending book.
//!
//! - [`LendAction`] - Supply, Borrow, Repay, or Withdraw
//! - [`LendingPosition`] - Per-user per-asset supplied and borrowed amounts
//! - [`LendingBook`] - Capacity-bounded storage enforcing the collateral bound
//!
//! The bound enforced after every operation is
//! `borrowed <= supplied * collateral_factor_bps / 10_000` per position, and
//! book-wide `total_borrowed <= total_supplied` per asset so borrows can only
//! draw on collateral that is actually deposited.

use std::fmt;

use super::error::LedgerError;
use super::id::{AccountId, AssetId};
use super::pool::BPS_DENOMINATOR;

/// What a lending operation does to the caller's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendAction {
    /// Deposit collateral into the position.
    Supply,
    /// Draw funds against the supplied collateral.
    Borrow,
    /// Pay down the borrowed amount.
    Repay,
    /// Take supplied collateral back out.
    Withdraw,
}

impl LendAction {
    /// Canonical numeric code, shared by the wire layout and the state digest.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            LendAction::Supply => 0,
            LendAction::Borrow => 1,
            LendAction::Repay => 2,
            LendAction::Withdraw => 3,
        }
    }
}

impl fmt::Display for LendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LendAction::Supply => write!(f, "supply"),
            LendAction::Borrow => write!(f, "borrow"),
            LendAction::Repay => write!(f, "repay"),
            LendAction::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// A user's lending position in one asset.
///
/// Created by the first supply and never removed afterwards, even when both
/// amounts return to zero; later supplies reuse the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingPosition {
    user: AccountId,
    asset: AssetId,
    supplied: u64,
    borrowed: u64,
}

impl LendingPosition {
    /// Get the position owner.
    #[must_use]
    pub const fn user(&self) -> AccountId {
        self.user
    }

    /// Get the position asset.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Get the supplied collateral amount.
    #[must_use]
    pub const fn supplied(&self) -> u64 {
        self.supplied
    }

    /// Get the borrowed amount.
    #[must_use]
    pub const fn borrowed(&self) -> u64 {
        self.borrowed
    }
}

/// Capacity-bounded lending storage keyed by (user, asset).
#[derive(Debug, Clone)]
pub struct LendingBook {
    positions: Vec<LendingPosition>,
    capacity: usize,
    collateral_factor_bps: u16,
}

impl LendingBook {
    /// Create an empty book holding at most `capacity` positions, with the
    /// collateral bound set to `collateral_factor_bps` of supplied value.
    #[must_use]
    pub fn new(capacity: usize, collateral_factor_bps: u16) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            capacity,
            collateral_factor_bps,
        }
    }

    /// Get the position for (user, asset).
    #[must_use]
    pub fn find(&self, user: AccountId, asset: AssetId) -> Option<&LendingPosition> {
        self.positions
            .iter()
            .find(|p| p.user() == user && p.asset() == asset)
    }

    fn find_index(&self, user: AccountId, asset: AssetId) -> Option<usize> {
        self.positions
            .iter()
            .position(|p| p.user() == user && p.asset() == asset)
    }

    /// Book-wide (supplied, borrowed) totals for an asset.
    #[must_use]
    pub fn asset_totals(&self, asset: AssetId) -> (u128, u128) {
        self.positions
            .iter()
            .filter(|p| p.asset() == asset)
            .fold((0u128, 0u128), |(s, b), p| {
                (s + u128::from(p.supplied()), b + u128::from(p.borrowed()))
            })
    }

    fn collateral_limit(&self, supplied: u64) -> u64 {
        // factor <= 10_000 keeps this within u64; larger factors saturate.
        let limit = u128::from(supplied) * u128::from(self.collateral_factor_bps) / BPS_DENOMINATOR;
        u64::try_from(limit).unwrap_or(u64::MAX)
    }

    fn liquidity_shortfall(&self, asset: AssetId, outflow: u64) -> Option<LedgerError> {
        let (supplied, borrowed) = self.asset_totals(asset);
        let available = supplied.saturating_sub(borrowed);
        if u128::from(outflow) > available {
            return Some(LedgerError::InsufficientLiquidity {
                asset,
                requested: outflow,
                available: u64::try_from(available).unwrap_or(u64::MAX),
            });
        }
        None
    }

    /// Deposit collateral, creating the position on first use.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `CapacityExceeded` when a new
    /// position cannot be stored, and `Overflow` if the supplied amount would
    /// exceed `u64::MAX`.
    pub fn supply(
        &mut self,
        user: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "lend amount must be nonzero",
            });
        }
        match self.find_index(user, asset) {
            Some(index) => {
                let position = &mut self.positions[index];
                position.supplied =
                    position
                        .supplied
                        .checked_add(amount)
                        .ok_or(LedgerError::Overflow {
                            what: "supplied collateral",
                        })?;
            }
            None => {
                if self.positions.len() >= self.capacity {
                    return Err(LedgerError::CapacityExceeded {
                        ledger: "lending",
                        capacity: self.capacity,
                    });
                }
                self.positions.push(LendingPosition {
                    user,
                    asset,
                    supplied: amount,
                    borrowed: 0,
                });
            }
        }
        Ok(())
    }

    /// Borrow against supplied collateral.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `PositionNotFound` without a
    /// prior supply, `Undercollateralized` past the collateral bound,
    /// `InsufficientLiquidity` when the book cannot cover the outflow, and
    /// `Overflow` on a u64 overflow of the borrowed amount.
    pub fn borrow(
        &mut self,
        user: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "lend amount must be nonzero",
            });
        }
        let index = self
            .find_index(user, asset)
            .ok_or(LedgerError::PositionNotFound { user, asset })?;

        let position = self.positions[index];
        let borrowed = position
            .borrowed
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                what: "borrowed amount",
            })?;
        let limit = self.collateral_limit(position.supplied);
        if borrowed > limit {
            return Err(LedgerError::Undercollateralized { borrowed, limit });
        }
        if let Some(err) = self.liquidity_shortfall(asset, amount) {
            return Err(err);
        }

        self.positions[index].borrowed = borrowed;
        Ok(())
    }

    /// Pay down the borrowed amount.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount or a repayment above the
    /// outstanding borrow, and `PositionNotFound` without a prior supply.
    pub fn repay(
        &mut self,
        user: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "lend amount must be nonzero",
            });
        }
        let index = self
            .find_index(user, asset)
            .ok_or(LedgerError::PositionNotFound { user, asset })?;
        if amount > self.positions[index].borrowed {
            return Err(LedgerError::InvalidInput {
                reason: "repay exceeds outstanding borrow",
            });
        }
        self.positions[index].borrowed -= amount;
        Ok(())
    }

    /// Take supplied collateral back out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `PositionNotFound` without a
    /// prior supply, `InsufficientBalance` when the withdrawal exceeds the
    /// supplied amount, `Undercollateralized` if the remaining collateral
    /// would no longer cover the borrow, and `InsufficientLiquidity` when the
    /// book cannot cover the outflow.
    pub fn withdraw(
        &mut self,
        user: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "lend amount must be nonzero",
            });
        }
        let index = self
            .find_index(user, asset)
            .ok_or(LedgerError::PositionNotFound { user, asset })?;

        let position = self.positions[index];
        if amount > position.supplied {
            return Err(LedgerError::InsufficientBalance {
                asset,
                needed: amount,
                available: position.supplied,
            });
        }
        let limit = self.collateral_limit(position.supplied - amount);
        if position.borrowed > limit {
            return Err(LedgerError::Undercollateralized {
                borrowed: position.borrowed,
                limit,
            });
        }
        if let Some(err) = self.liquidity_shortfall(asset, amount) {
            return Err(err);
        }

        self.positions[index].supplied -= amount;
        Ok(())
    }

    /// Get an iterator over all positions in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &LendingPosition> {
        self.positions.iter()
    }

    /// Get the count of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no positions exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The collateral factor applied to supplied value, in basis points.
    #[must_use]
    pub const fn collateral_factor_bps(&self) -> u16 {
        self.collateral_factor_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET: AssetId = AssetId::new(1);

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 32])
    }

    #[test]
    fn supply_creates_then_increments() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();
        book.supply(account(1), ASSET, 50).unwrap();

        let position = book.find(account(1), ASSET).unwrap();
        assert_eq!(position.supplied(), 150);
        assert_eq!(position.borrowed(), 0);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn positions_are_keyed_per_asset() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();
        book.supply(account(1), AssetId::new(2), 70).unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.find(account(1), ASSET).unwrap().supplied(), 100);
        assert_eq!(
            book.find(account(1), AssetId::new(2)).unwrap().supplied(),
            70
        );
    }

    #[test]
    fn borrow_respects_the_collateral_factor() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();

        // 75% of 100 is the bound.
        book.borrow(account(1), ASSET, 75).unwrap();
        let err = book.borrow(account(1), ASSET, 1);
        assert!(matches!(err, Err(LedgerError::Undercollateralized { .. })));
        assert_eq!(book.find(account(1), ASSET).unwrap().borrowed(), 75);
    }

    #[test]
    fn borrow_without_a_position_is_not_found() {
        let mut book = LendingBook::new(4, 7_500);
        let err = book.borrow(account(1), ASSET, 10);
        assert!(matches!(err, Err(LedgerError::PositionNotFound { .. })));
    }

    #[test]
    fn borrow_cannot_draw_past_book_liquidity() {
        // A factor above 100% makes the per-position bound looser than the
        // book's own funds, so the liquidity guard has to hold the line.
        let mut book = LendingBook::new(4, 20_000);
        book.supply(account(1), ASSET, 100).unwrap();

        let err = book.borrow(account(1), ASSET, 150);
        assert!(matches!(
            err,
            Err(LedgerError::InsufficientLiquidity { available: 100, .. })
        ));
        book.borrow(account(1), ASSET, 100).unwrap();
    }

    #[test]
    fn repay_reduces_borrow_and_rejects_overpayment() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();
        book.borrow(account(1), ASSET, 60).unwrap();

        book.repay(account(1), ASSET, 40).unwrap();
        assert_eq!(book.find(account(1), ASSET).unwrap().borrowed(), 20);

        let err = book.repay(account(1), ASSET, 21);
        assert!(matches!(err, Err(LedgerError::InvalidInput { .. })));
    }

    #[test]
    fn withdraw_cannot_break_the_collateral_bound() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();
        book.borrow(account(1), ASSET, 60).unwrap();

        // 60 borrowed needs at least 80 supplied at a 75% factor.
        book.withdraw(account(1), ASSET, 20).unwrap();
        let err = book.withdraw(account(1), ASSET, 1);
        assert!(matches!(err, Err(LedgerError::Undercollateralized { .. })));
        assert_eq!(book.find(account(1), ASSET).unwrap().supplied(), 80);
    }

    #[test]
    fn withdraw_more_than_supplied_is_rejected() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 30).unwrap();

        let err = book.withdraw(account(1), ASSET, 31);
        assert!(matches!(
            err,
            Err(LedgerError::InsufficientBalance {
                needed: 31,
                available: 30,
                ..
            })
        ));
    }

    #[test]
    fn full_cycle_leaves_an_empty_but_present_position() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 100).unwrap();
        book.borrow(account(1), ASSET, 50).unwrap();
        book.repay(account(1), ASSET, 50).unwrap();
        book.withdraw(account(1), ASSET, 100).unwrap();

        let position = book.find(account(1), ASSET).unwrap();
        assert_eq!(position.supplied(), 0);
        assert_eq!(position.borrowed(), 0);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn new_positions_are_refused_at_capacity() {
        let mut book = LendingBook::new(1, 7_500);
        book.supply(account(1), ASSET, 10).unwrap();

        let err = book.supply(account(2), ASSET, 10);
        assert!(matches!(err, Err(LedgerError::CapacityExceeded { .. })));

        // Existing positions still accept deposits.
        book.supply(account(1), ASSET, 10).unwrap();
    }

    #[test]
    fn zero_amounts_are_invalid_for_every_action() {
        let mut book = LendingBook::new(4, 7_500);
        book.supply(account(1), ASSET, 10).unwrap();
        for result in [
            book.supply(account(1), ASSET, 0),
            book.borrow(account(1), ASSET, 0),
            book.repay(account(1), ASSET, 0),
            book.withdraw(account(1), ASSET, 0),
        ] {
            assert!(matches!(result, Err(LedgerError::InvalidInput { .. })));
        }
    }
}
