//! Resting order types and the fixed-capacity order book.
//!
//! - [`Side`] - Long or short direction of an order
//! - [`Order`] - A resting order owned by an account
//! - [`OrderBook`] - Capacity-bounded storage with swap-truncate removal

use std::fmt;

use super::error::LedgerError;
use super::id::{AccountId, OrderId};

/// Direction of a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Buy-side exposure.
    Long,
    /// Sell-side exposure.
    Short,
}

impl Side {
    /// Canonical numeric code, shared by the wire layout and the state digest.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Side::Long => 0,
            Side::Short => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// A resting order.
///
/// Orders are created by placement and leave the book only through an
/// owner-authorized cancel. The id is unique for the lifetime of the ledger;
/// the storage slot an order occupies carries no meaning and may change when
/// another order is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    owner: AccountId,
    price: u64,
    size: u64,
    side: Side,
    placed_at: u64,
}

impl Order {
    /// Get the order id.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// Get the owning identity.
    #[must_use]
    pub const fn owner(&self) -> AccountId {
        self.owner
    }

    /// Get the limit price in lot-relative units.
    #[must_use]
    pub const fn price(&self) -> u64 {
        self.price
    }

    /// Get the order size.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Get the order side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Get the operation sequence number at which the order was placed.
    ///
    /// Reserved for future time-based logic; derived from the host's
    /// operation ordering, never from a clock.
    #[must_use]
    pub const fn placed_at(&self) -> u64 {
        self.placed_at
    }
}

/// Capacity-bounded order storage.
///
/// Lookups scan by order id; removal swaps the last entry into the vacated
/// slot and truncates, so no ordering guarantee exists over the storage.
/// The book never grows beyond the capacity it was created with.
#[derive(Debug, Clone)]
pub struct OrderBook {
    orders: Vec<Order>,
    next_id: u64,
    capacity: usize,
}

impl OrderBook {
    /// Create an empty book holding at most `capacity` orders.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            orders: Vec::with_capacity(capacity),
            next_id: 1,
            capacity,
        }
    }

    /// Place a new order for `owner`, returning its freshly issued id.
    ///
    /// `placed_at` is the ledger's operation sequence number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a zero price or size and `CapacityExceeded`
    /// when the book is full; the book is unchanged in both cases.
    pub fn place(
        &mut self,
        owner: AccountId,
        price: u64,
        size: u64,
        side: Side,
        placed_at: u64,
    ) -> Result<OrderId, LedgerError> {
        if price == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "order price must be nonzero",
            });
        }
        if size == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "order size must be nonzero",
            });
        }
        if self.orders.len() >= self.capacity {
            return Err(LedgerError::CapacityExceeded {
                ledger: "order",
                capacity: self.capacity,
            });
        }

        let id = OrderId::new(self.next_id);
        self.next_id += 1;
        self.orders.push(Order {
            id,
            owner,
            price,
            size,
            side,
            placed_at,
        });
        Ok(id)
    }

    /// Cancel the order with the given id on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns `OrderNotFound` if no order carries the id and `NotOrderOwner`
    /// if the caller does not own it.
    pub fn cancel(&mut self, caller: AccountId, id: OrderId) -> Result<(), LedgerError> {
        let index = self
            .orders
            .iter()
            .position(|order| order.id() == id)
            .ok_or(LedgerError::OrderNotFound { id })?;
        if self.orders[index].owner() != caller {
            return Err(LedgerError::NotOrderOwner { caller, id });
        }
        self.orders.swap_remove(index);
        Ok(())
    }

    /// Get an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    /// Get an iterator over all resting orders in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Get the count of resting orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns true if no orders are resting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The next order id that will be issued.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// The configured maximum number of resting orders.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(n: u8) -> AccountId {
        AccountId::from_bytes([n; 32])
    }

    #[test]
    fn place_issues_monotonic_ids_starting_at_one() {
        let mut book = OrderBook::new(4);
        let a = book.place(account(1), 100, 5, Side::Long, 1).unwrap();
        let b = book.place(account(1), 101, 5, Side::Short, 2).unwrap();
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn place_rejects_zero_price_and_zero_size() {
        let mut book = OrderBook::new(4);
        assert!(matches!(
            book.place(account(1), 0, 5, Side::Long, 1),
            Err(LedgerError::InvalidInput { .. })
        ));
        assert!(matches!(
            book.place(account(1), 100, 0, Side::Long, 1),
            Err(LedgerError::InvalidInput { .. })
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn place_rejects_when_full_and_keeps_state() {
        let mut book = OrderBook::new(2);
        book.place(account(1), 100, 5, Side::Long, 1).unwrap();
        book.place(account(1), 101, 5, Side::Long, 2).unwrap();

        let err = book.place(account(1), 102, 5, Side::Long, 3);
        assert!(matches!(err, Err(LedgerError::CapacityExceeded { .. })));
        assert_eq!(book.len(), 2);
        // The refused placement must not consume an id.
        assert_eq!(book.next_id(), 3);
    }

    #[test]
    fn cancel_requires_ownership() {
        let mut book = OrderBook::new(4);
        let id = book.place(account(1), 100, 5, Side::Long, 1).unwrap();

        let err = book.cancel(account(2), id);
        assert!(matches!(err, Err(LedgerError::NotOrderOwner { .. })));
        assert_eq!(book.len(), 1);

        book.cancel(account(1), id).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn cancel_unknown_id_is_not_found() {
        let mut book = OrderBook::new(4);
        let err = book.cancel(account(1), OrderId::new(9));
        assert!(matches!(err, Err(LedgerError::OrderNotFound { .. })));
    }

    #[test]
    fn cancel_preserves_other_ids_across_swap_truncate() {
        let mut book = OrderBook::new(4);
        let first = book.place(account(1), 100, 5, Side::Long, 1).unwrap();
        let second = book.place(account(1), 101, 5, Side::Long, 2).unwrap();
        let third = book.place(account(1), 102, 5, Side::Long, 3).unwrap();

        book.cancel(account(1), first).unwrap();

        assert_eq!(book.len(), 2);
        assert!(book.get(first).is_none());
        assert!(book.get(second).is_some());
        assert!(book.get(third).is_some());
    }

    #[test]
    fn ids_are_never_reissued_after_cancel() {
        let mut book = OrderBook::new(4);
        let id = book.place(account(1), 100, 5, Side::Long, 1).unwrap();
        book.cancel(account(1), id).unwrap();

        let next = book.place(account(1), 100, 5, Side::Long, 2).unwrap();
        assert_eq!(next.value(), 2);
    }
}
