//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests). Single source of truth for the funded fixture so
//! tests focus on assertions rather than genesis boilerplate.

use crate::config::{Config, GenesisBalance, GenesisPool};
use crate::domain::{AccountId, AssetId};
use crate::ledger::Ledger;

/// Deterministic identity: 32 copies of `tag`.
#[must_use]
pub fn account(tag: u8) -> AccountId {
    AccountId::from_bytes([tag; 32])
}

/// The identity [`funded_config`] installs as the oracle.
#[must_use]
pub fn oracle() -> AccountId {
    account(99)
}

/// Config with one 1,000,000 / 1,000,000 pool on assets 1 and 2, a million
/// of assets 0 through 2 for accounts 1 through 3, and [`oracle`] configured.
#[must_use]
pub fn funded_config() -> Config {
    let mut config = Config::default();
    config.ledger.oracle = Some(oracle().to_string());
    config.genesis.pools.push(GenesisPool {
        asset_a: AssetId::new(1),
        asset_b: AssetId::new(2),
        reserve_a: 1_000_000,
        reserve_b: 1_000_000,
    });
    for tag in 1..=3 {
        for asset in 0..=2 {
            config.genesis.balances.push(GenesisBalance {
                account: account(tag),
                asset: AssetId::new(asset),
                amount: 1_000_000,
            });
        }
    }
    config
}

/// Ledger built from [`funded_config`].
#[must_use]
pub fn funded_ledger() -> Ledger {
    Ledger::new(&funded_config()).expect("funded fixture config is valid")
}
