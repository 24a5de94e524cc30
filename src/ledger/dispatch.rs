//! Operation dispatch with the uniform no-op rejection policy.
//!
//! The boundary contract is that a refused operation behaves exactly like an
//! operation that never arrived: no state change, no error surfaced to the
//! submitter. Internally every refusal still carries a precise
//! [`LedgerError`](crate::domain::LedgerError); the [`Dispatcher`] is where
//! the two meet. It applies each operation, logs the outcome with structured
//! fields, and folds rejections into per-kind counters instead of
//! propagating them.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{AccountId, RejectionKind};
use crate::ledger::op::{Applied, Operation};
use crate::ledger::state::Ledger;

/// Applies operations, swallowing rejections after counting them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ledger: Ledger,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Wrap a ledger behind the no-op rejection policy.
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            stats: DispatchStats::default(),
        }
    }

    /// Apply one operation; a rejection leaves the ledger untouched and
    /// returns `None`.
    pub fn dispatch(&mut self, caller: AccountId, op: Operation) -> Option<Applied> {
        let name = op.name();
        match self.ledger.apply(caller, op) {
            Ok(applied) => {
                self.stats.applied += 1;
                debug!(
                    op = name,
                    caller = %caller.short(),
                    outcome = %applied,
                    "Operation applied"
                );
                Some(applied)
            }
            Err(err) => {
                let kind = err.kind();
                self.stats.record_rejection(kind);
                warn!(
                    op = name,
                    caller = %caller.short(),
                    kind = kind.as_str(),
                    error = %err,
                    "Operation rejected"
                );
                None
            }
        }
    }

    /// Get the wrapped ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Get the running outcome counters.
    #[must_use]
    pub const fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

/// Outcome counters kept by the [`Dispatcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Operations applied.
    pub applied: u64,
    /// Operations refused, all kinds together.
    pub rejected: u64,
    /// Refusals because a book was full.
    pub capacity_exceeded: u64,
    /// Refusals because a referenced entity did not exist.
    pub not_found: u64,
    /// Refusals because the caller lacked authority.
    pub unauthorized: u64,
    /// Refusals because state forbade the transition.
    pub invalid_state: u64,
    /// Refusals because the operation itself was malformed.
    pub invalid_input: u64,
}

impl DispatchStats {
    fn record_rejection(&mut self, kind: RejectionKind) {
        self.rejected += 1;
        match kind {
            RejectionKind::CapacityExceeded => self.capacity_exceeded += 1,
            RejectionKind::NotFound => self.not_found += 1,
            RejectionKind::Unauthorized => self.unauthorized += 1,
            RejectionKind::InvalidState => self.invalid_state += 1,
            RejectionKind::InvalidInput => self.invalid_input += 1,
        }
    }

    /// Get the total number of operations seen.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.applied + self.rejected
    }
}
