//! Staking balances and the stake book.
//!
//! - [`StakeAction`] - Deposit or withdraw
//! - [`Staker`] - One account's accumulated stake
//! - [`StakeBook`] - Capacity-bounded storage keyed by identity
//!
//! A staker record is created by the first deposit and never removed, even
//! when its amount returns to zero; later deposits reuse it.

use std::fmt;

use super::error::LedgerError;
use super::id::AccountId;

/// What a staking operation does to the caller's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeAction {
    /// Add to the staked amount, creating the record on first use.
    Deposit,
    /// Take part of the staked amount back out.
    Withdraw,
}

impl StakeAction {
    /// Canonical numeric code, shared by the wire layout and the state digest.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            StakeAction::Deposit => 0,
            StakeAction::Withdraw => 1,
        }
    }
}

impl fmt::Display for StakeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeAction::Deposit => write!(f, "deposit"),
            StakeAction::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// One account's staking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staker {
    user: AccountId,
    amount: u64,
    staked_at: u64,
}

impl Staker {
    /// Get the staking identity.
    #[must_use]
    pub const fn user(&self) -> AccountId {
        self.user
    }

    /// Get the accumulated staked amount.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    /// Get the operation sequence number of the record's first deposit.
    ///
    /// Reserved for future time-based logic; derived from the host's
    /// operation ordering, never from a clock.
    #[must_use]
    pub const fn staked_at(&self) -> u64 {
        self.staked_at
    }
}

/// Capacity-bounded staking storage.
#[derive(Debug, Clone)]
pub struct StakeBook {
    stakers: Vec<Staker>,
    capacity: usize,
}

impl StakeBook {
    /// Create an empty book holding at most `capacity` staker records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            stakers: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Get the record for an identity.
    #[must_use]
    pub fn find(&self, user: AccountId) -> Option<&Staker> {
        self.stakers.iter().find(|staker| staker.user() == user)
    }

    /// Add to an account's stake, creating the record on first use.
    ///
    /// `staked_at` is the ledger's operation sequence number; it is recorded
    /// only when the record is created.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `CapacityExceeded` when a
    /// new record cannot be stored, and `Overflow` past `u64::MAX`.
    pub fn deposit(
        &mut self,
        user: AccountId,
        amount: u64,
        staked_at: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "stake amount must be nonzero",
            });
        }
        match self.stakers.iter_mut().find(|staker| staker.user() == user) {
            Some(staker) => {
                staker.amount = staker
                    .amount
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow {
                        what: "staked amount",
                    })?;
            }
            None => {
                if self.stakers.len() >= self.capacity {
                    return Err(LedgerError::CapacityExceeded {
                        ledger: "staking",
                        capacity: self.capacity,
                    });
                }
                self.stakers.push(Staker {
                    user,
                    amount,
                    staked_at,
                });
            }
        }
        Ok(())
    }

    /// Take part of an account's stake back out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `StakerNotFound` if the
    /// account never staked, and `InsufficientStake` when the withdrawal
    /// exceeds the staked amount; the record itself always survives.
    pub fn withdraw(&mut self, user: AccountId, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "stake amount must be nonzero",
            });
        }
        let staker = self
            .stakers
            .iter_mut()
            .find(|staker| staker.user() == user)
            .ok_or(LedgerError::StakerNotFound { user })?;
        if amount > staker.amount {
            return Err(LedgerError::InsufficientStake {
                requested: amount,
                staked: staker.amount,
            });
        }
        staker.amount -= amount;
        Ok(())
    }

    /// Get an iterator over all records in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Staker> {
        self.stakers.iter()
    }

    /// Get the count of staker records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stakers.len()
    }

    /// Returns true if no records exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stakers.is_empty()
    }
}
