//! The ledger state machine.
//!
//! [`Ledger`] owns the six books, applies one [`Operation`] at a time, and
//! either commits it fully or leaves every book untouched. Each application
//! runs its fallible checks before its first mutation, so a rejection can
//! never strand a half-applied operation.
//!
//! All state lives in the books. There is no clock, no randomness, and no
//! iteration over unordered containers, so replaying the same operations
//! against the same configuration always lands on the same [state
//! digest](Ledger::state_digest).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::domain::{
    AccountId, AssetId, BalanceBook, LedgerError, LendAction, LendingBook, LiquidityPool,
    MarketBook, MarketId, OrderBook, Outcome, PoolBook, StakeAction, StakeBook,
};
use crate::ledger::op::{Applied, Operation};

/// Domain separator hashed ahead of the canonical state bytes.
const DIGEST_DOMAIN: &[u8] = b"lockstep.state.v1";

/// The full ledger: six fixed-capacity books plus the operation counter.
#[derive(Debug, Clone)]
pub struct Ledger {
    orders: OrderBook,
    pools: PoolBook,
    lending: LendingBook,
    markets: MarketBook,
    stakers: StakeBook,
    balances: BalanceBook,
    native_asset: AssetId,
    oracle: Option<AccountId>,
    ops_applied: u64,
}

impl Ledger {
    /// Build a ledger from configuration, installing the genesis pools and
    /// balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured oracle identity does not parse or
    /// if a genesis entry is invalid (duplicate pool, zero reserve, balance
    /// overflow, or more rows than the configured capacity).
    pub fn new(config: &Config) -> crate::error::Result<Self> {
        let ledger_config = &config.ledger;
        let mut ledger = Self {
            orders: OrderBook::new(ledger_config.max_orders),
            pools: PoolBook::new(ledger_config.max_pools, ledger_config.fee_bps),
            lending: LendingBook::new(
                ledger_config.max_positions,
                ledger_config.collateral_factor_bps,
            ),
            markets: MarketBook::new(ledger_config.max_markets),
            stakers: StakeBook::new(ledger_config.max_stakers),
            balances: BalanceBook::new(ledger_config.max_accounts),
            native_asset: ledger_config.native_asset,
            oracle: ledger_config.oracle_id()?,
            ops_applied: 0,
        };

        for pool in &config.genesis.pools {
            ledger.pools.install(LiquidityPool::try_new(
                pool.asset_a,
                pool.asset_b,
                pool.reserve_a,
                pool.reserve_b,
            )?)?;
        }
        for balance in &config.genesis.balances {
            ledger
                .balances
                .credit(balance.account, balance.asset, balance.amount)?;
        }

        Ok(ledger)
    }

    /// Apply one operation on behalf of `caller`.
    ///
    /// On success every affected book has moved and the operation counter
    /// advanced; on rejection nothing has.
    ///
    /// # Errors
    ///
    /// Returns the [`LedgerError`] describing exactly why the operation was
    /// refused. The caller decides what to surface; see
    /// [`Dispatcher`](crate::ledger::Dispatcher) for the no-op policy.
    pub fn apply(&mut self, caller: AccountId, op: Operation) -> Result<Applied, LedgerError> {
        // Sequence number this operation will hold if it commits. Time-like
        // fields are stamped from it, never from a clock.
        let seq = self.ops_applied + 1;

        let applied = match op {
            Operation::PlaceOrder { price, size, side } => {
                let id = self.orders.place(caller, price, size, side, seq)?;
                Applied::OrderPlaced { id }
            }
            Operation::CancelOrder { order_id } => {
                self.orders.cancel(caller, order_id)?;
                Applied::OrderCancelled { id: order_id }
            }
            Operation::Swap {
                asset_in,
                asset_out,
                amount_in,
                min_amount_out,
            } => self.apply_swap(caller, asset_in, asset_out, amount_in, min_amount_out)?,
            Operation::Lend {
                asset,
                amount,
                action,
            } => self.apply_lend(caller, asset, amount, action)?,
            Operation::Predict {
                market_id,
                amount,
                prediction,
                duration,
            } => self.apply_predict(caller, market_id, amount, prediction, duration)?,
            Operation::Stake { amount, action } => self.apply_stake(caller, amount, action, seq)?,
            Operation::Resolve { market_id, outcome } => {
                if self.oracle != Some(caller) {
                    return Err(LedgerError::NotOracle { caller });
                }
                self.markets.resolve(market_id, outcome)?;
                Applied::MarketResolved {
                    market: market_id,
                    outcome,
                }
            }
        };

        self.ops_applied = seq;
        Ok(applied)
    }

    fn apply_swap(
        &mut self,
        caller: AccountId,
        asset_in: AssetId,
        asset_out: AssetId,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<Applied, LedgerError> {
        let quote = self
            .pools
            .quote(asset_in, asset_out, amount_in, min_amount_out)?;
        self.balances.check_debit(caller, asset_in, amount_in)?;
        self.balances
            .check_credit(caller, asset_out, quote.amount_out())?;

        // Every refusal has been ruled out; the moves below cannot fail.
        self.balances.debit(caller, asset_in, amount_in)?;
        self.balances.credit(caller, asset_out, quote.amount_out())?;
        self.pools.commit(&quote)?;

        Ok(Applied::SwapExecuted {
            amount_out: quote.amount_out(),
            fee: quote.fee(),
        })
    }

    fn apply_lend(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        amount: u64,
        action: LendAction,
    ) -> Result<Applied, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "lend amount must be nonzero",
            });
        }
        match action {
            LendAction::Supply => {
                self.balances.check_debit(caller, asset, amount)?;
                self.lending.supply(caller, asset, amount)?;
                self.balances.debit(caller, asset, amount)?;
            }
            LendAction::Borrow => {
                self.balances.check_credit(caller, asset, amount)?;
                self.lending.borrow(caller, asset, amount)?;
                self.balances.credit(caller, asset, amount)?;
            }
            LendAction::Repay => {
                self.balances.check_debit(caller, asset, amount)?;
                self.lending.repay(caller, asset, amount)?;
                self.balances.debit(caller, asset, amount)?;
            }
            LendAction::Withdraw => {
                self.balances.check_credit(caller, asset, amount)?;
                self.lending.withdraw(caller, asset, amount)?;
                self.balances.credit(caller, asset, amount)?;
            }
        }
        Ok(Applied::LendingApplied { action, amount })
    }

    fn apply_predict(
        &mut self,
        caller: AccountId,
        market_id: u64,
        amount: u64,
        prediction: Outcome,
        duration: u64,
    ) -> Result<Applied, LedgerError> {
        // Market id 0 is the creation sentinel; real ids start at 1.
        if market_id == 0 {
            let id = self.markets.create(duration)?;
            return Ok(Applied::MarketCreated { id });
        }

        let id = MarketId::new(market_id);
        self.markets.check_bet(id, prediction, amount)?;
        self.balances.debit(caller, self.native_asset, amount)?;
        self.markets.bet(id, prediction, amount)?;

        Ok(Applied::BetAccepted {
            market: id,
            side: prediction,
            amount,
        })
    }

    fn apply_stake(
        &mut self,
        caller: AccountId,
        amount: u64,
        action: StakeAction,
        seq: u64,
    ) -> Result<Applied, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput {
                reason: "stake amount must be nonzero",
            });
        }
        match action {
            StakeAction::Deposit => {
                self.balances.check_debit(caller, self.native_asset, amount)?;
                self.stakers.deposit(caller, amount, seq)?;
                self.balances.debit(caller, self.native_asset, amount)?;
                Ok(Applied::StakeDeposited { amount })
            }
            StakeAction::Withdraw => {
                self.balances.check_credit(caller, self.native_asset, amount)?;
                self.stakers.withdraw(caller, amount)?;
                self.balances.credit(caller, self.native_asset, amount)?;
                Ok(Applied::StakeWithdrawn { amount })
            }
        }
    }

    /// Get the read-only occupancy summary.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            orders: self.orders.len() as u64,
            pools: self.pools.len() as u64,
            positions: self.lending.len() as u64,
            markets: self.markets.len() as u64,
            stakers: self.stakers.len() as u64,
            accounts: self.balances.len() as u64,
            ops_applied: self.ops_applied,
        }
    }

    /// Hash the full ledger state into 32 bytes.
    ///
    /// The digest covers every book row in storage order plus the id and
    /// operation counters, all little-endian, behind a fixed domain
    /// separator. Two ledgers replaying the same operations from the same
    /// configuration produce the same digest.
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_DOMAIN);
        hash_u64(&mut hasher, self.ops_applied);
        hasher.update([self.native_asset.value()]);

        hasher.update(b"orders");
        hash_u64(&mut hasher, self.orders.next_id());
        hash_u64(&mut hasher, self.orders.len() as u64);
        for order in self.orders.iter() {
            hash_u64(&mut hasher, order.id().value());
            hasher.update(order.owner().as_bytes());
            hash_u64(&mut hasher, order.price());
            hash_u64(&mut hasher, order.size());
            hasher.update([order.side().code()]);
            hash_u64(&mut hasher, order.placed_at());
        }

        hasher.update(b"pools");
        hash_u64(&mut hasher, self.pools.len() as u64);
        for pool in self.pools.iter() {
            hasher.update([pool.asset_a().value(), pool.asset_b().value()]);
            hash_u64(&mut hasher, pool.reserve_a());
            hash_u64(&mut hasher, pool.reserve_b());
        }

        hasher.update(b"lending");
        hash_u64(&mut hasher, self.lending.len() as u64);
        for position in self.lending.iter() {
            hasher.update(position.user().as_bytes());
            hasher.update([position.asset().value()]);
            hash_u64(&mut hasher, position.supplied());
            hash_u64(&mut hasher, position.borrowed());
        }

        hasher.update(b"markets");
        hash_u64(&mut hasher, self.markets.next_id());
        hash_u64(&mut hasher, self.markets.len() as u64);
        for market in self.markets.iter() {
            hash_u64(&mut hasher, market.id().value());
            hash_u64(&mut hasher, market.end_time());
            hash_u64(&mut hasher, market.total_yes());
            hash_u64(&mut hasher, market.total_no());
            hasher.update([market.resolution_code()]);
        }

        hasher.update(b"staking");
        hash_u64(&mut hasher, self.stakers.len() as u64);
        for staker in self.stakers.iter() {
            hasher.update(staker.user().as_bytes());
            hash_u64(&mut hasher, staker.amount());
            hash_u64(&mut hasher, staker.staked_at());
        }

        hasher.update(b"balances");
        hash_u64(&mut hasher, self.balances.len() as u64);
        for balance in self.balances.iter() {
            hasher.update(balance.account().as_bytes());
            hasher.update([balance.asset().value()]);
            hash_u64(&mut hasher, balance.amount());
        }

        hasher.finalize().into()
    }

    /// Get the order book.
    #[must_use]
    pub const fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// Get the swap pool book.
    #[must_use]
    pub const fn pools(&self) -> &PoolBook {
        &self.pools
    }

    /// Get the lending book.
    #[must_use]
    pub const fn lending(&self) -> &LendingBook {
        &self.lending
    }

    /// Get the prediction market book.
    #[must_use]
    pub const fn markets(&self) -> &MarketBook {
        &self.markets
    }

    /// Get the staking book.
    #[must_use]
    pub const fn stakers(&self) -> &StakeBook {
        &self.stakers
    }

    /// Get the balance book.
    #[must_use]
    pub const fn balances(&self) -> &BalanceBook {
        &self.balances
    }

    /// Get the asset used for bets and stakes.
    #[must_use]
    pub const fn native_asset(&self) -> AssetId {
        self.native_asset
    }

    /// Get the identity allowed to resolve markets, if one is configured.
    #[must_use]
    pub const fn oracle(&self) -> Option<AccountId> {
        self.oracle
    }

    /// Get the number of operations applied so far.
    #[must_use]
    pub const fn ops_applied(&self) -> u64 {
        self.ops_applied
    }
}

fn hash_u64(hasher: &mut Sha256, value: u64) {
    hasher.update(value.to_le_bytes());
}

/// Read-only occupancy counts, one per book, plus the operation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Resting orders.
    pub orders: u64,
    /// Installed swap pools.
    pub pools: u64,
    /// Lending positions.
    pub positions: u64,
    /// Prediction markets.
    pub markets: u64,
    /// Staking records.
    pub stakers: u64,
    /// Balance rows.
    pub accounts: u64,
    /// Operations applied since genesis.
    pub ops_applied: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenesisBalance, GenesisPool};
    use crate::domain::Side;

    fn account(tag: u8) -> AccountId {
        AccountId::from_bytes([tag; 32])
    }

    fn funded_config() -> Config {
        let mut config = Config::default();
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

    fn funded_ledger() -> Ledger {
        Ledger::new(&funded_config()).unwrap()
    }

    #[test]
    fn rejected_operations_leave_no_trace() {
        let mut ledger = funded_ledger();
        let before = ledger.state_digest();

        // Unfunded caller: the swap quote succeeds but the debit check fails.
        let err = ledger
            .apply(
                account(9),
                Operation::Swap {
                    asset_in: AssetId::new(1),
                    asset_out: AssetId::new(2),
                    amount_in: 10_000,
                    min_amount_out: 0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        assert_eq!(ledger.state_digest(), before);
        assert_eq!(ledger.ops_applied(), 0);
    }

    #[test]
    fn swap_moves_both_balances_and_the_pool() {
        let mut ledger = funded_ledger();
        let caller = account(1);

        let applied = ledger
            .apply(
                caller,
                Operation::Swap {
                    asset_in: AssetId::new(1),
                    asset_out: AssetId::new(2),
                    amount_in: 10_000,
                    min_amount_out: 9_871,
                },
            )
            .unwrap();
        assert_eq!(
            applied,
            Applied::SwapExecuted {
                amount_out: 9_871,
                fee: 30
            }
        );

        assert_eq!(ledger.balances().balance_of(caller, AssetId::new(1)), 990_000);
        assert_eq!(
            ledger.balances().balance_of(caller, AssetId::new(2)),
            1_009_871
        );
        let pool = ledger
            .pools()
            .find(AssetId::new(1), AssetId::new(2))
            .unwrap();
        assert_eq!(pool.reserve_a(), 1_010_000);
        assert_eq!(pool.reserve_b(), 990_129);
        assert_eq!(ledger.ops_applied(), 1);
    }

    #[test]
    fn lend_cycle_round_trips_the_balance() {
        let mut ledger = funded_ledger();
        let caller = account(1);
        let asset = AssetId::new(1);

        for (action, amount) in [
            (LendAction::Supply, 100_000),
            (LendAction::Borrow, 75_000),
            (LendAction::Repay, 75_000),
            (LendAction::Withdraw, 100_000),
        ] {
            ledger
                .apply(
                    caller,
                    Operation::Lend {
                        asset,
                        amount,
                        action,
                    },
                )
                .unwrap();
        }

        assert_eq!(ledger.balances().balance_of(caller, asset), 1_000_000);
        let position = ledger.lending().find(caller, asset).unwrap();
        assert_eq!(position.supplied(), 0);
        assert_eq!(position.borrowed(), 0);
    }

    #[test]
    fn bets_escrow_the_native_asset() {
        let mut ledger = funded_ledger();
        let creator = account(1);
        let bettor = account(2);

        let applied = ledger
            .apply(
                creator,
                Operation::Predict {
                    market_id: 0,
                    amount: 0,
                    prediction: Outcome::Yes,
                    duration: 500,
                },
            )
            .unwrap();
        let market = match applied {
            Applied::MarketCreated { id } => id,
            other => panic!("expected market creation, got {other:?}"),
        };
        assert_eq!(market, MarketId::new(1));

        ledger
            .apply(
                bettor,
                Operation::Predict {
                    market_id: market.value(),
                    amount: 40_000,
                    prediction: Outcome::No,
                    duration: 0,
                },
            )
            .unwrap();

        assert_eq!(
            ledger.balances().balance_of(bettor, AssetId::new(0)),
            960_000
        );
        assert_eq!(ledger.markets().get(market).unwrap().total_no(), 40_000);
    }

    #[test]
    fn broke_bettor_cannot_move_market_totals() {
        let mut ledger = funded_ledger();
        ledger
            .apply(
                account(1),
                Operation::Predict {
                    market_id: 0,
                    amount: 0,
                    prediction: Outcome::Yes,
                    duration: 500,
                },
            )
            .unwrap();

        let err = ledger
            .apply(
                account(9),
                Operation::Predict {
                    market_id: 1,
                    amount: 1,
                    prediction: Outcome::Yes,
                    duration: 0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(
            ledger.markets().get(MarketId::new(1)).unwrap().total_yes(),
            0
        );
    }

    #[test]
    fn resolve_requires_the_configured_oracle() {
        let oracle = account(7);
        let mut config = funded_config();
        config.ledger.oracle = Some(oracle.to_string());
        let mut ledger = Ledger::new(&config).unwrap();

        ledger
            .apply(
                account(1),
                Operation::Predict {
                    market_id: 0,
                    amount: 0,
                    prediction: Outcome::Yes,
                    duration: 500,
                },
            )
            .unwrap();

        let err = ledger
            .apply(
                account(1),
                Operation::Resolve {
                    market_id: MarketId::new(1),
                    outcome: Outcome::Yes,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotOracle { .. }));

        ledger
            .apply(
                oracle,
                Operation::Resolve {
                    market_id: MarketId::new(1),
                    outcome: Outcome::Yes,
                },
            )
            .unwrap();
        assert_eq!(
            ledger
                .markets()
                .get(MarketId::new(1))
                .unwrap()
                .resolution(),
            Some(Outcome::Yes)
        );
    }

    #[test]
    fn resolve_with_no_oracle_configured_is_always_unauthorized() {
        let mut ledger = funded_ledger();
        ledger
            .apply(
                account(1),
                Operation::Predict {
                    market_id: 0,
                    amount: 0,
                    prediction: Outcome::Yes,
                    duration: 500,
                },
            )
            .unwrap();

        let err = ledger
            .apply(
                account(1),
                Operation::Resolve {
                    market_id: MarketId::new(1),
                    outcome: Outcome::Yes,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotOracle { .. }));
    }

    #[test]
    fn stake_deposits_and_withdrawals_move_the_native_balance() {
        let mut ledger = funded_ledger();
        let caller = account(1);

        ledger
            .apply(
                caller,
                Operation::Stake {
                    amount: 30_000,
                    action: StakeAction::Deposit,
                },
            )
            .unwrap();
        ledger
            .apply(
                caller,
                Operation::Stake {
                    amount: 10_000,
                    action: StakeAction::Withdraw,
                },
            )
            .unwrap();

        assert_eq!(
            ledger.balances().balance_of(caller, AssetId::new(0)),
            980_000
        );
        assert_eq!(ledger.stakers().find(caller).unwrap().amount(), 20_000);
        // The deposit was operation 1; the record keeps that marker.
        assert_eq!(ledger.stakers().find(caller).unwrap().staked_at(), 1);
    }

    #[test]
    fn placed_at_tracks_the_operation_sequence() {
        let mut ledger = funded_ledger();
        let caller = account(1);

        ledger
            .apply(
                caller,
                Operation::Stake {
                    amount: 1,
                    action: StakeAction::Deposit,
                },
            )
            .unwrap();
        let applied = ledger
            .apply(
                caller,
                Operation::PlaceOrder {
                    price: 100,
                    size: 5,
                    side: Side::Long,
                },
            )
            .unwrap();
        let id = match applied {
            Applied::OrderPlaced { id } => id,
            other => panic!("expected order placement, got {other:?}"),
        };
        assert_eq!(ledger.orders().get(id).unwrap().placed_at(), 2);
    }

    #[test]
    fn summary_counts_every_book() {
        let mut ledger = funded_ledger();
        let caller = account(1);

        ledger
            .apply(
                caller,
                Operation::PlaceOrder {
                    price: 100,
                    size: 5,
                    side: Side::Long,
                },
            )
            .unwrap();
        ledger
            .apply(
                caller,
                Operation::Lend {
                    asset: AssetId::new(1),
                    amount: 10,
                    action: LendAction::Supply,
                },
            )
            .unwrap();
        ledger
            .apply(
                caller,
                Operation::Predict {
                    market_id: 0,
                    amount: 0,
                    prediction: Outcome::Yes,
                    duration: 9,
                },
            )
            .unwrap();
        ledger
            .apply(
                caller,
                Operation::Stake {
                    amount: 10,
                    action: StakeAction::Deposit,
                },
            )
            .unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.orders, 1);
        assert_eq!(summary.pools, 1);
        assert_eq!(summary.positions, 1);
        assert_eq!(summary.markets, 1);
        assert_eq!(summary.stakers, 1);
        assert_eq!(summary.accounts, 9);
        assert_eq!(summary.ops_applied, 4);
    }

    #[test]
    fn identical_histories_share_a_digest() {
        let script = |ledger: &mut Ledger| {
            ledger
                .apply(
                    account(1),
                    Operation::PlaceOrder {
                        price: 100,
                        size: 5,
                        side: Side::Long,
                    },
                )
                .unwrap();
            ledger
                .apply(
                    account(2),
                    Operation::Swap {
                        asset_in: AssetId::new(2),
                        asset_out: AssetId::new(1),
                        amount_in: 5_000,
                        min_amount_out: 0,
                    },
                )
                .unwrap();
        };

        let mut a = funded_ledger();
        let mut b = funded_ledger();
        script(&mut a);
        script(&mut b);
        assert_eq!(a.state_digest(), b.state_digest());

        // One extra operation forks the digests.
        b.apply(
            account(1),
            Operation::Stake {
                amount: 1,
                action: StakeAction::Deposit,
            },
        )
        .unwrap();
        assert_ne!(a.state_digest(), b.state_digest());
    }
}
