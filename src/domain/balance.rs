//! Spot balances backing every cash flow in the ledger.
//!
//! - [`Balance`] - One (account, asset) row
//! - [`BalanceBook`] - Capacity-bounded storage with checked credit/debit
//!
//! Rows are created by the first credit (genesis allocation or an operation
//! paying out) and never removed, even at zero. Operations that move funds in
//! several books use the pure `check_*` forms to prove every later step
//! before the first mutation, so a rejected operation never leaves a partial
//! state behind.

use super::error::LedgerError;
use super::id::{AccountId, AssetId};

/// One account's balance in one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    account: AccountId,
    asset: AssetId,
    amount: u64,
}

impl Balance {
    /// Get the owning identity.
    #[must_use]
    pub const fn account(&self) -> AccountId {
        self.account
    }

    /// Get the asset.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Get the current amount.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }
}

/// Capacity-bounded balance storage keyed by (account, asset).
#[derive(Debug, Clone)]
pub struct BalanceBook {
    balances: Vec<Balance>,
    capacity: usize,
}

impl BalanceBook {
    /// Create an empty book holding at most `capacity` balance rows.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            balances: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn find_index(&self, account: AccountId, asset: AssetId) -> Option<usize> {
        self.balances
            .iter()
            .position(|b| b.account() == account && b.asset() == asset)
    }

    /// Get the current balance, zero when no row exists.
    #[must_use]
    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> u64 {
        self.find_index(account, asset)
            .map_or(0, |index| self.balances[index].amount)
    }

    /// Verify that a credit would succeed, without applying it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`BalanceBook::credit`].
    pub fn check_credit(
        &self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "credit amount must be nonzero",
            });
        }
        match self.find_index(account, asset) {
            Some(index) => {
                self.balances[index]
                    .amount
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow {
                        what: "account balance",
                    })?;
            }
            None => {
                if self.balances.len() >= self.capacity {
                    return Err(LedgerError::CapacityExceeded {
                        ledger: "balance",
                        capacity: self.capacity,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify that a debit would succeed, without applying it.
    ///
    /// # Errors
    ///
    /// Same conditions as [`BalanceBook::debit`].
    pub fn check_debit(
        &self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "debit amount must be nonzero",
            });
        }
        let available = self.balance_of(account, asset);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                asset,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Add to a balance, creating the row on first use.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `CapacityExceeded` when a
    /// new row cannot be stored, and `Overflow` past `u64::MAX`.
    pub fn credit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.check_credit(account, asset, amount)?;
        match self.find_index(account, asset) {
            Some(index) => {
                // Proven by check_credit just above.
                self.balances[index].amount += amount;
            }
            None => {
                self.balances.push(Balance {
                    account,
                    asset,
                    amount,
                });
            }
        }
        Ok(())
    }

    /// Subtract from a balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount and `InsufficientBalance`
    /// when the row is missing or short; the row always survives at zero.
    pub fn debit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.check_debit(account, asset, amount)?;
        if let Some(index) = self.find_index(account, asset) {
            self.balances[index].amount -= amount;
        }
        Ok(())
    }

    /// Book-wide total held in an asset.
    #[must_use]
    pub fn asset_total(&self, asset: AssetId) -> u128 {
        self.balances
            .iter()
            .filter(|b| b.asset() == asset)
            .map(|b| u128::from(b.amount()))
            .sum()
    }

    /// Get an iterator over all rows in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter()
    }

    /// Get the count of balance rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Returns true if no rows exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
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
    fn credit_creates_then_accumulates() {
        let mut book = BalanceBook::new(4);
        book.credit(account(1), ASSET, 100).unwrap();
        book.credit(account(1), ASSET, 50).unwrap();

        assert_eq!(book.balance_of(account(1), ASSET), 150);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn debit_requires_sufficient_funds() {
        let mut book = BalanceBook::new(4);
        book.credit(account(1), ASSET, 100).unwrap();

        let err = book.debit(account(1), ASSET, 101);
        assert!(matches!(
            err,
            Err(LedgerError::InsufficientBalance {
                needed: 101,
                available: 100,
                ..
            })
        ));

        book.debit(account(1), ASSET, 100).unwrap();
        assert_eq!(book.balance_of(account(1), ASSET), 0);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn debit_with_no_row_reports_zero_available() {
        let mut book = BalanceBook::new(4);
        let err = book.debit(account(1), ASSET, 1);
        assert!(matches!(
            err,
            Err(LedgerError::InsufficientBalance { available: 0, .. })
        ));
    }

    #[test]
    fn rows_are_keyed_per_asset() {
        let mut book = BalanceBook::new(4);
        book.credit(account(1), ASSET, 10).unwrap();
        book.credit(account(1), AssetId::new(2), 20).unwrap();

        assert_eq!(book.balance_of(account(1), ASSET), 10);
        assert_eq!(book.balance_of(account(1), AssetId::new(2)), 20);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn new_rows_are_refused_at_capacity() {
        let mut book = BalanceBook::new(1);
        book.credit(account(1), ASSET, 10).unwrap();

        let err = book.credit(account(2), ASSET, 10);
        assert!(matches!(err, Err(LedgerError::CapacityExceeded { .. })));

        // Existing rows still accept credits.
        book.credit(account(1), ASSET, 10).unwrap();
    }

    #[test]
    fn check_credit_catches_overflow_without_mutating() {
        let mut book = BalanceBook::new(4);
        book.credit(account(1), ASSET, u64::MAX - 1).unwrap();

        assert!(matches!(
            book.check_credit(account(1), ASSET, 2),
            Err(LedgerError::Overflow { .. })
        ));
        assert!(book.check_credit(account(1), ASSET, 1).is_ok());
        assert_eq!(book.balance_of(account(1), ASSET), u64::MAX - 1);
    }

    #[test]
    fn asset_total_sums_across_accounts() {
        let mut book = BalanceBook::new(4);
        book.credit(account(1), ASSET, 10).unwrap();
        book.credit(account(2), ASSET, 30).unwrap();
        book.credit(account(2), AssetId::new(2), 99).unwrap();

        assert_eq!(book.asset_total(ASSET), 40);
    }
}
