//! Binary prediction markets and the market book.
//!
//! - [`Outcome`] - The Yes/No side of a bet or a resolution
//! - [`PredictionMarket`] - Aggregated stakes and the terminal resolution
//! - [`MarketBook`] - Capacity-bounded storage with monotonic market ids
//!
//! A market accepts bets only while unresolved and resolves exactly once;
//! afterwards its aggregates never move again. Oracle authorization for
//! resolution is a deployment concern and is enforced by the ledger that owns
//! this book, not here.

use std::fmt;

use super::error::LedgerError;
use super::id::MarketId;

/// One side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The affirmative side.
    Yes,
    /// The negative side.
    No,
}

impl Outcome {
    /// Canonical numeric code, shared by the wire layout and the state
    /// digest. Code 0 is reserved for "unresolved".
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Outcome::Yes => 1,
            Outcome::No => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Yes => write!(f, "yes"),
            Outcome::No => write!(f, "no"),
        }
    }
}

/// A binary prediction market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionMarket {
    id: MarketId,
    end_time: u64,
    total_yes: u64,
    total_no: u64,
    resolution: Option<Outcome>,
}

impl PredictionMarket {
    /// Get the market id.
    #[must_use]
    pub const fn id(&self) -> MarketId {
        self.id
    }

    /// Get the end-time marker.
    ///
    /// This is the caller-supplied duration value from market creation, not a
    /// wall-clock timestamp; the ledger never reads a clock.
    #[must_use]
    pub const fn end_time(&self) -> u64 {
        self.end_time
    }

    /// Get the aggregate Yes stake.
    #[must_use]
    pub const fn total_yes(&self) -> u64 {
        self.total_yes
    }

    /// Get the aggregate No stake.
    #[must_use]
    pub const fn total_no(&self) -> u64 {
        self.total_no
    }

    /// Get the resolution, if the market has one.
    #[must_use]
    pub const fn resolution(&self) -> Option<Outcome> {
        self.resolution
    }

    /// Returns true once the market has been resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Numeric resolution code for the state digest: 0 while unresolved.
    #[must_use]
    pub const fn resolution_code(&self) -> u8 {
        match self.resolution {
            None => 0,
            Some(outcome) => outcome.code(),
        }
    }
}

/// Capacity-bounded market storage with monotonic id issuance.
#[derive(Debug, Clone)]
pub struct MarketBook {
    markets: Vec<PredictionMarket>,
    next_id: u64,
    capacity: usize,
}

impl MarketBook {
    /// Create an empty book holding at most `capacity` markets.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            markets: Vec::with_capacity(capacity),
            next_id: 1,
            capacity,
        }
    }

    /// Create a new market, returning its freshly issued id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero duration and `CapacityExceeded` when
    /// the book is full.
    pub fn create(&mut self, duration: u64) -> Result<MarketId, LedgerError> {
        if duration == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "market duration must be nonzero",
            });
        }
        if self.markets.len() >= self.capacity {
            return Err(LedgerError::CapacityExceeded {
                ledger: "market",
                capacity: self.capacity,
            });
        }

        let id = MarketId::new(self.next_id);
        self.next_id += 1;
        self.markets.push(PredictionMarket {
            id,
            end_time: duration,
            total_yes: 0,
            total_no: 0,
            resolution: None,
        });
        Ok(id)
    }

    /// Verify that a bet would be accepted, without applying it.
    ///
    /// Hosts that escrow funds before recording a bet use this to prove the
    /// recording step cannot refuse once the escrow has moved.
    ///
    /// # Errors
    ///
    /// Fails exactly when [`MarketBook::bet`] would.
    pub fn check_bet(&self, id: MarketId, side: Outcome, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "bet amount must be nonzero",
            });
        }
        let market = self.get(id).ok_or(LedgerError::MarketNotFound { id })?;
        if market.is_resolved() {
            return Err(LedgerError::MarketResolved { id });
        }
        let total = match side {
            Outcome::Yes => market.total_yes,
            Outcome::No => market.total_no,
        };
        total
            .checked_add(amount)
            .map(|_| ())
            .ok_or(LedgerError::Overflow {
                what: "market aggregate",
            })
    }

    /// Add a bet to one side of an unresolved market.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero amount, `MarketNotFound` for an
    /// unknown id, `MarketResolved` once resolution happened, and `Overflow`
    /// if an aggregate would exceed `u64::MAX`.
    pub fn bet(&mut self, id: MarketId, side: Outcome, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "bet amount must be nonzero",
            });
        }
        let market = self
            .markets
            .iter_mut()
            .find(|market| market.id() == id)
            .ok_or(LedgerError::MarketNotFound { id })?;
        if market.is_resolved() {
            return Err(LedgerError::MarketResolved { id });
        }

        let total = match side {
            Outcome::Yes => &mut market.total_yes,
            Outcome::No => &mut market.total_no,
        };
        *total = total.checked_add(amount).ok_or(LedgerError::Overflow {
            what: "market aggregate",
        })?;
        Ok(())
    }

    /// Resolve a market to its terminal outcome, exactly once.
    ///
    /// # Errors
    ///
    /// Returns `MarketNotFound` for an unknown id and `MarketResolved` when
    /// the outcome was already set; a second resolution never flips the first.
    pub fn resolve(&mut self, id: MarketId, outcome: Outcome) -> Result<(), LedgerError> {
        let market = self
            .markets
            .iter_mut()
            .find(|market| market.id() == id)
            .ok_or(LedgerError::MarketNotFound { id })?;
        if market.is_resolved() {
            return Err(LedgerError::MarketResolved { id });
        }
        market.resolution = Some(outcome);
        Ok(())
    }

    /// Get a market by id.
    #[must_use]
    pub fn get(&self, id: MarketId) -> Option<&PredictionMarket> {
        self.markets.iter().find(|market| market.id() == id)
    }

    /// Get an iterator over all markets in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &PredictionMarket> {
        self.markets.iter()
    }

    /// Get the count of markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// Returns true if no markets exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// The next market id that will be issued.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_issues_monotonic_ids_starting_at_one() {
        let mut book = MarketBook::new(4);
        let a = book.create(100).unwrap();
        let b = book.create(200).unwrap();
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);

        let market = book.get(a).unwrap();
        assert_eq!(market.end_time(), 100);
        assert_eq!(market.total_yes(), 0);
        assert_eq!(market.total_no(), 0);
        assert!(!market.is_resolved());
    }

    #[test]
    fn create_rejects_zero_duration_and_capacity() {
        let mut book = MarketBook::new(1);
        assert!(matches!(
            book.create(0),
            Err(LedgerError::InvalidInput { .. })
        ));
        book.create(10).unwrap();
        assert!(matches!(
            book.create(10),
            Err(LedgerError::CapacityExceeded { .. })
        ));
        // The refused creation must not consume an id.
        assert_eq!(book.next_id(), 2);
    }

    #[test]
    fn bets_accumulate_per_side() {
        let mut book = MarketBook::new(4);
        let id = book.create(100).unwrap();

        book.bet(id, Outcome::Yes, 30).unwrap();
        book.bet(id, Outcome::Yes, 20).unwrap();
        book.bet(id, Outcome::No, 5).unwrap();

        let market = book.get(id).unwrap();
        assert_eq!(market.total_yes(), 50);
        assert_eq!(market.total_no(), 5);
    }

    #[test]
    fn bets_after_resolution_are_rejected() {
        let mut book = MarketBook::new(4);
        let id = book.create(100).unwrap();
        book.bet(id, Outcome::Yes, 10).unwrap();
        book.resolve(id, Outcome::No).unwrap();

        let err = book.bet(id, Outcome::Yes, 10);
        assert!(matches!(err, Err(LedgerError::MarketResolved { .. })));
        assert_eq!(book.get(id).unwrap().total_yes(), 10);
    }

    #[test]
    fn resolve_happens_exactly_once() {
        let mut book = MarketBook::new(4);
        let id = book.create(100).unwrap();
        book.resolve(id, Outcome::Yes).unwrap();

        let err = book.resolve(id, Outcome::No);
        assert!(matches!(err, Err(LedgerError::MarketResolved { .. })));
        assert_eq!(book.get(id).unwrap().resolution(), Some(Outcome::Yes));
    }

    #[test]
    fn unknown_market_is_not_found() {
        let mut book = MarketBook::new(4);
        let missing = MarketId::new(9);
        assert!(matches!(
            book.bet(missing, Outcome::Yes, 10),
            Err(LedgerError::MarketNotFound { .. })
        ));
        assert!(matches!(
            book.resolve(missing, Outcome::Yes),
            Err(LedgerError::MarketNotFound { .. })
        ));
    }

    #[test]
    fn resolution_codes_match_the_wire_values() {
        let mut book = MarketBook::new(4);
        let id = book.create(100).unwrap();
        assert_eq!(book.get(id).unwrap().resolution_code(), 0);

        book.resolve(id, Outcome::Yes).unwrap();
        assert_eq!(book.get(id).unwrap().resolution_code(), Outcome::Yes.code());
    }

    #[test]
    fn check_bet_agrees_with_bet_and_leaves_totals_alone() {
        let mut book = MarketBook::new(4);
        let id = book.create(100).unwrap();

        book.check_bet(id, Outcome::Yes, 30).unwrap();
        assert_eq!(book.get(id).unwrap().total_yes(), 0);

        assert!(matches!(
            book.check_bet(id, Outcome::No, 0),
            Err(LedgerError::InvalidInput { .. })
        ));
        assert!(matches!(
            book.check_bet(MarketId::new(9), Outcome::No, 1),
            Err(LedgerError::MarketNotFound { .. })
        ));

        book.resolve(id, Outcome::No).unwrap();
        assert!(matches!(
            book.check_bet(id, Outcome::Yes, 1),
            Err(LedgerError::MarketResolved { .. })
        ));
    }
}
