//! Configuration validation command.

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::ledger::Ledger;

/// Validate a configuration file without replaying anything.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    println!("Checking configuration: {}", path.display());
    println!();

    let config = Config::load(path)?;
    println!("✓ Configuration file is valid");

    // Prove the genesis state actually installs.
    let ledger = Ledger::new(&config)?;
    println!("✓ Genesis state installs cleanly");
    println!();

    println!("Summary:");
    println!("  Max orders:        {}", config.ledger.max_orders);
    println!("  Max pools:         {}", config.ledger.max_pools);
    println!("  Max positions:     {}", config.ledger.max_positions);
    println!("  Max markets:       {}", config.ledger.max_markets);
    println!("  Max stakers:       {}", config.ledger.max_stakers);
    println!("  Max accounts:      {}", config.ledger.max_accounts);
    println!("  Swap fee:          {} bps", config.ledger.fee_bps);
    println!(
        "  Collateral factor: {} bps",
        config.ledger.collateral_factor_bps
    );
    println!("  Native asset:      {}", config.ledger.native_asset);
    println!("  Genesis pools:     {}", ledger.pools().len());
    println!("  Genesis balances:  {}", ledger.balances().len());
    println!();

    match ledger.oracle() {
        Some(oracle) => println!("✓ Oracle configured: {}", oracle.short()),
        None => {
            println!("⚠ No oracle configured - markets can never resolve");
            println!("  Set LOCKSTEP_ORACLE or [ledger].oracle to enable resolution");
        }
    }

    Ok(())
}
