//! The state machine and its boundary.
//!
//! [`Ledger`] applies typed [`Operation`]s atomically; [`Dispatcher`] wraps
//! it behind the uniform no-op rejection policy that external submitters
//! observe.

pub mod dispatch;
pub mod op;
pub mod state;

pub use dispatch::{DispatchStats, Dispatcher};
pub use op::{Applied, Operation};
pub use state::{Ledger, Summary};
