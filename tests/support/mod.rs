#![allow(dead_code)]

//! Shared helpers for integration tests.

use std::fs;
use std::path::PathBuf;

use lockstep::domain::{AccountId, AssetId, LendAction, Outcome, Side, StakeAction};
use lockstep::ledger::Operation;
use lockstep::testkit;
use lockstep::wire::{self, Frame};

/// A frame submitted by the deterministic identity `tag`.
pub fn frame(tag: u8, op: Operation) -> Frame {
    Frame {
        caller: testkit::account(tag),
        op,
    }
}

/// A varied script touching every sub-ledger, valid against the funded
/// fixture. Applies cleanly end to end.
pub fn mixed_script() -> Vec<Frame> {
    vec![
        frame(
            1,
            Operation::PlaceOrder {
                price: 100,
                size: 5,
                side: Side::Long,
            },
        ),
        frame(
            2,
            Operation::Swap {
                asset_in: AssetId::new(1),
                asset_out: AssetId::new(2),
                amount_in: 10_000,
                min_amount_out: 9_000,
            },
        ),
        frame(
            1,
            Operation::Lend {
                asset: AssetId::new(1),
                amount: 50_000,
                action: LendAction::Supply,
            },
        ),
        frame(
            1,
            Operation::Lend {
                asset: AssetId::new(1),
                amount: 20_000,
                action: LendAction::Borrow,
            },
        ),
        frame(
            3,
            Operation::Predict {
                market_id: 0,
                amount: 0,
                prediction: Outcome::Yes,
                duration: 600,
            },
        ),
        frame(
            2,
            Operation::Predict {
                market_id: 1,
                amount: 7_500,
                prediction: Outcome::No,
                duration: 0,
            },
        ),
        frame(
            3,
            Operation::Stake {
                amount: 12_000,
                action: StakeAction::Deposit,
            },
        ),
        frame(
            99,
            Operation::Resolve {
                market_id: lockstep::domain::MarketId::new(1),
                outcome: Outcome::No,
            },
        ),
    ]
}

/// Encode `frames` as a log file inside `dir`, returning its path.
pub fn write_log(dir: &tempfile::TempDir, name: &str, frames: &[Frame]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, wire::encode_log(frames)).expect("write log file");
    path
}

/// Write TOML config contents inside `dir`, returning the path.
pub fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write config file");
    path
}

/// TOML matching [`lockstep::testkit::funded_config`].
pub fn funded_config_toml() -> String {
    let oracle = testkit::oracle();
    let mut toml = format!("[ledger]\noracle = \"{oracle}\"\n\n");
    toml.push_str(
        "[[genesis.pools]]\nasset_a = 1\nasset_b = 2\nreserve_a = 1000000\nreserve_b = 1000000\n",
    );
    for tag in 1..=3 {
        let account = testkit::account(tag);
        for asset in 0..=2 {
            toml.push_str(&format!(
                "\n[[genesis.balances]]\naccount = \"{account}\"\nasset = {asset}\namount = 1000000\n",
            ));
        }
    }
    toml
}

/// One wrong caller on an otherwise-valid resolve, to produce a rejection.
pub fn unauthorized_resolve() -> Frame {
    frame(
        1,
        Operation::Resolve {
            market_id: lockstep::domain::MarketId::new(1),
            outcome: Outcome::Yes,
        },
    )
}

/// The funded account tags used by the fixture.
pub const FUNDED_TAGS: [u8; 3] = [1, 2, 3];

/// Convenience re-export so tests can name identities tersely.
pub fn account(tag: u8) -> AccountId {
    testkit::account(tag)
}
