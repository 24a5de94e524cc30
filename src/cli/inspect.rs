//! Handler for the `inspect` command.

use std::fs;

use crate::cli::InspectArgs;
use crate::error::Result;
use crate::wire;

/// Execute the inspect command: decode a log and list every frame.
pub fn execute(args: &InspectArgs) -> Result<()> {
    let bytes = fs::read(&args.log)?;
    let frames = wire::decode_log(&bytes)?;

    println!("{}: {} frames", args.log.display(), frames.len());
    for (index, frame) in frames.iter().enumerate() {
        println!("{:>6}  {}  {}", index + 1, frame.caller.short(), frame.op);
    }
    Ok(())
}
