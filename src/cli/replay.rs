//! Handler for the `replay` command.

use std::fs;

use serde::Serialize;
use tracing::info;

use crate::cli::ReplayArgs;
use crate::config::Config;
use crate::error::Result;
use crate::ledger::{DispatchStats, Dispatcher, Ledger, Summary};
use crate::wire;

#[derive(Serialize)]
struct Report {
    summary: Summary,
    stats: DispatchStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
}

/// Execute the replay command.
pub fn execute(args: &ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.init_logging();

    let bytes = fs::read(&args.log)?;
    let frames = wire::decode_log(&bytes)?;
    info!(frames = frames.len(), log = %args.log.display(), "Replaying operation log");

    let mut dispatcher = Dispatcher::new(Ledger::new(&config)?);
    for frame in &frames {
        dispatcher.dispatch(frame.caller, frame.op);
    }

    let summary = dispatcher.ledger().summary();
    let stats = *dispatcher.stats();
    let digest = args
        .digest
        .then(|| hex::encode(dispatcher.ledger().state_digest()));

    if args.json {
        let report = Report {
            summary,
            stats,
            digest,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Replayed {} operations: {} applied, {} rejected",
        stats.total(),
        stats.applied,
        stats.rejected
    );
    println!();
    println!("Summary:");
    println!("  Orders:    {}", summary.orders);
    println!("  Pools:     {}", summary.pools);
    println!("  Positions: {}", summary.positions);
    println!("  Markets:   {}", summary.markets);
    println!("  Stakers:   {}", summary.stakers);
    println!("  Accounts:  {}", summary.accounts);
    if stats.rejected > 0 {
        println!();
        println!("Rejections:");
        println!("  capacity_exceeded: {}", stats.capacity_exceeded);
        println!("  not_found:         {}", stats.not_found);
        println!("  unauthorized:      {}", stats.unauthorized);
        println!("  invalid_state:     {}", stats.invalid_state);
        println!("  invalid_input:     {}", stats.invalid_input);
    }
    if let Some(digest) = digest {
        println!();
        println!("State digest: {digest}");
    }
    Ok(())
}
