//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates ledger capacities,
//! market rules, genesis state, and logging settings. Configuration is loaded
//! from a TOML file with an environment variable override for the oracle
//! identity (`LOCKSTEP_ORACLE`).
//!
//! # Example
//!
//! ```no_run
//! use lockstep::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::{AccountId, AssetId};
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Aggregates all configuration settings for the ledger. Load from a TOML
/// file using [`Config::load`] or parse directly with [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Capacities and market rules for the ledger itself.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Pools and balances installed before any operation runs.
    #[serde(default)]
    pub genesis: GenesisConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Capacity limits and market rules.
///
/// Every capacity is fixed at construction; the ledger never grows past it.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum resting orders.
    #[serde(default = "default_max_orders")]
    pub max_orders: usize,

    /// Maximum installed swap pools.
    #[serde(default = "default_max_pools")]
    pub max_pools: usize,

    /// Maximum lending positions, one per (user, asset) pair.
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,

    /// Maximum prediction markets, resolved ones included.
    #[serde(default = "default_max_markets")]
    pub max_markets: usize,

    /// Maximum staking records.
    #[serde(default = "default_max_stakers")]
    pub max_stakers: usize,

    /// Maximum balance rows, one per (account, asset) pair.
    #[serde(default = "default_max_accounts")]
    pub max_accounts: usize,

    /// Swap fee in basis points, charged on the input amount.
    ///
    /// Defaults to 30 (0.30%); capped at 1000.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u16,

    /// Fraction of supplied collateral that may be borrowed, in basis points.
    ///
    /// Defaults to 7500 (75%); capped at 10000.
    #[serde(default = "default_collateral_factor_bps")]
    pub collateral_factor_bps: u16,

    /// Asset escrowed by bets and stakes.
    #[serde(default = "default_native_asset")]
    pub native_asset: AssetId,

    /// Hex identity of the only account allowed to resolve markets.
    ///
    /// Overridden by the `LOCKSTEP_ORACLE` environment variable. When unset,
    /// every resolution attempt is unauthorized.
    #[serde(default)]
    pub oracle: Option<String>,
}

fn default_max_orders() -> usize {
    1000
}

fn default_max_pools() -> usize {
    10
}

fn default_max_positions() -> usize {
    1000
}

fn default_max_markets() -> usize {
    50
}

fn default_max_stakers() -> usize {
    1000
}

fn default_max_accounts() -> usize {
    4096
}

fn default_fee_bps() -> u16 {
    30
}

fn default_collateral_factor_bps() -> u16 {
    7500
}

fn default_native_asset() -> AssetId {
    AssetId::new(0)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_orders: default_max_orders(),
            max_pools: default_max_pools(),
            max_positions: default_max_positions(),
            max_markets: default_max_markets(),
            max_stakers: default_max_stakers(),
            max_accounts: default_max_accounts(),
            fee_bps: default_fee_bps(),
            collateral_factor_bps: default_collateral_factor_bps(),
            native_asset: default_native_asset(),
            oracle: None,
        }
    }
}

impl LedgerConfig {
    /// Parse the configured oracle identity, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not 64 hex characters.
    pub fn oracle_id(&self) -> std::result::Result<Option<AccountId>, ConfigError> {
        match &self.oracle {
            None => Ok(None),
            Some(hex) => AccountId::from_hex(hex)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    field: "oracle",
                    reason: e.to_string(),
                }),
        }
    }
}

/// State installed at construction, before any operation runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenesisConfig {
    /// Constant-product pools. Pools cannot be added later.
    #[serde(default)]
    pub pools: Vec<GenesisPool>,

    /// Initial balances.
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
}

/// One genesis pool: an asset pair and its starting reserves.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GenesisPool {
    /// First asset of the pair.
    pub asset_a: AssetId,
    /// Second asset of the pair.
    pub asset_b: AssetId,
    /// Starting reserve of `asset_a`.
    pub reserve_a: u64,
    /// Starting reserve of `asset_b`.
    pub reserve_b: u64,
}

/// One genesis balance row.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GenesisBalance {
    /// The credited account, as 64 hex characters.
    pub account: AccountId,
    /// The credited asset.
    pub asset: AssetId,
    /// The credited amount.
    pub amount: u64,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// The oracle identity is overridden by the `LOCKSTEP_ORACLE` environment
    /// variable when set, so deployments can rotate it without editing the
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(oracle) = std::env::var("LOCKSTEP_ORACLE") {
            config.ledger.oracle = Some(oracle);
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        let ledger = &self.ledger;
        for (field, value) in [
            ("max_orders", ledger.max_orders),
            ("max_pools", ledger.max_pools),
            ("max_positions", ledger.max_positions),
            ("max_markets", ledger.max_markets),
            ("max_stakers", ledger.max_stakers),
            ("max_accounts", ledger.max_accounts),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if ledger.fee_bps > 1000 {
            return Err(ConfigError::InvalidValue {
                field: "fee_bps",
                reason: "must be at most 1000".to_string(),
            }
            .into());
        }
        if ledger.collateral_factor_bps > 10_000 {
            return Err(ConfigError::InvalidValue {
                field: "collateral_factor_bps",
                reason: "must be at most 10000".to_string(),
            }
            .into());
        }
        ledger.oracle_id()?;

        if self.genesis.pools.len() > ledger.max_pools {
            return Err(ConfigError::InvalidValue {
                field: "genesis.pools",
                reason: format!("more pools than max_pools ({})", ledger.max_pools),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `lockstep=debug`.
    pub level: String,
    /// Output format: `json` or `pretty`.
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// Diagnostics go to stderr so command output on stdout stays
    /// machine-readable.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
