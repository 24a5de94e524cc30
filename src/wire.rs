//! Fixed-layout operation log (LSTP v1).
//!
//! Every record has a known size, so decoding is pure slicing:
//! - **Fail-closed**: short input, bad magic, unknown tags, and out-of-range
//!   enum codes all reject; no partial frames come back.
//! - **Canonical**: one byte layout per operation, little-endian throughout,
//!   so a log re-encodes to identical bytes.
//!
//! A log is `magic | version | frame count` followed by that many frames. A
//! frame is `tag u32 | caller 32 bytes | payload`, with the payload layout
//! fixed per tag. Enum fields travel as the codes the domain types expose
//! (`Side::code`, `LendAction::code`, `Outcome::code`, `StakeAction::code`).

use thiserror::Error;

use crate::domain::{AccountId, AssetId, LendAction, MarketId, OrderId, Outcome, Side, StakeAction};
use crate::ledger::{Operation, Summary};

pub const MAGIC: [u8; 4] = *b"LSTP";
pub const VERSION_V1: u16 = 1;
/// Log header: magic + version + frame count.
pub const LOG_HEADER_BYTES: usize = 10;
/// Frame prefix: tag + caller identity.
pub const FRAME_PREFIX_BYTES: usize = 36;
/// Encoded [`Summary`]: seven `u64` counters.
pub const SUMMARY_BYTES: usize = 56;

pub const TAG_PLACE_ORDER: u32 = 1;
pub const TAG_CANCEL_ORDER: u32 = 2;
pub const TAG_SWAP: u32 = 3;
pub const TAG_LEND: u32 = 4;
pub const TAG_PREDICT: u32 = 5;
pub const TAG_STAKE: u32 = 6;
pub const TAG_RESOLVE: u32 = 7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("input too short")]
    TooShort,
    #[error("bad magic")]
    BadMagic,
    #[error("unsupported log version: {0}")]
    UnsupportedVersion(u16),
    #[error("unknown operation tag: {0}")]
    UnknownTag(u32),
    #[error("invalid {field} code: {value}")]
    InvalidCode { field: &'static str, value: u8 },
    #[error("{0} trailing bytes after the last frame")]
    TrailingBytes(usize),
}

/// One log record: who submitted, and what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// The submitting identity.
    pub caller: AccountId,
    /// The decoded operation.
    pub op: Operation,
}

fn read_u16_le(input: &[u8]) -> u16 {
    u16::from_le_bytes([input[0], input[1]])
}

fn read_u32_le(input: &[u8]) -> u32 {
    u32::from_le_bytes([input[0], input[1], input[2], input[3]])
}

fn read_u64_le(input: &[u8]) -> u64 {
    u64::from_le_bytes([
        input[0], input[1], input[2], input[3], input[4], input[5], input[6], input[7],
    ])
}

fn need(input: &[u8], len: usize) -> Result<(), WireError> {
    if input.len() < len {
        return Err(WireError::TooShort);
    }
    Ok(())
}

fn side_from_code(value: u8) -> Result<Side, WireError> {
    match value {
        0 => Ok(Side::Long),
        1 => Ok(Side::Short),
        other => Err(WireError::InvalidCode {
            field: "side",
            value: other,
        }),
    }
}

fn lend_action_from_code(value: u8) -> Result<LendAction, WireError> {
    match value {
        0 => Ok(LendAction::Supply),
        1 => Ok(LendAction::Borrow),
        2 => Ok(LendAction::Repay),
        3 => Ok(LendAction::Withdraw),
        other => Err(WireError::InvalidCode {
            field: "lend action",
            value: other,
        }),
    }
}

fn outcome_from_code(value: u8) -> Result<Outcome, WireError> {
    match value {
        1 => Ok(Outcome::Yes),
        2 => Ok(Outcome::No),
        other => Err(WireError::InvalidCode {
            field: "outcome",
            value: other,
        }),
    }
}

fn stake_action_from_code(value: u8) -> Result<StakeAction, WireError> {
    match value {
        0 => Ok(StakeAction::Deposit),
        1 => Ok(StakeAction::Withdraw),
        other => Err(WireError::InvalidCode {
            field: "stake action",
            value: other,
        }),
    }
}

/// Encode one frame: `tag | caller | payload`.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_PREFIX_BYTES + 25);
    out.extend_from_slice(&frame.op.tag().to_le_bytes());
    out.extend_from_slice(frame.caller.as_bytes());
    match frame.op {
        Operation::PlaceOrder { price, size, side } => {
            out.extend_from_slice(&price.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.push(side.code());
        }
        Operation::CancelOrder { order_id } => {
            out.extend_from_slice(&order_id.value().to_le_bytes());
        }
        Operation::Swap {
            asset_in,
            asset_out,
            amount_in,
            min_amount_out,
        } => {
            out.push(asset_in.value());
            out.push(asset_out.value());
            out.extend_from_slice(&amount_in.to_le_bytes());
            out.extend_from_slice(&min_amount_out.to_le_bytes());
        }
        Operation::Lend {
            asset,
            amount,
            action,
        } => {
            out.push(asset.value());
            out.extend_from_slice(&amount.to_le_bytes());
            out.push(action.code());
        }
        Operation::Predict {
            market_id,
            amount,
            prediction,
            duration,
        } => {
            out.extend_from_slice(&market_id.to_le_bytes());
            out.extend_from_slice(&amount.to_le_bytes());
            out.push(prediction.code());
            out.extend_from_slice(&duration.to_le_bytes());
        }
        Operation::Stake { amount, action } => {
            out.extend_from_slice(&amount.to_le_bytes());
            out.push(action.code());
        }
        Operation::Resolve { market_id, outcome } => {
            out.extend_from_slice(&market_id.value().to_le_bytes());
            out.push(outcome.code());
        }
    }
    out
}

/// Decode one frame from the front of `input`, returning the remainder.
///
/// # Errors
///
/// Returns [`WireError::TooShort`] if the frame is truncated,
/// [`WireError::UnknownTag`] for a tag outside 1..=7, and
/// [`WireError::InvalidCode`] for an out-of-range enum byte.
pub fn decode_frame(input: &[u8]) -> Result<(Frame, &[u8]), WireError> {
    need(input, FRAME_PREFIX_BYTES)?;
    let tag = read_u32_le(&input[0..4]);
    let mut caller_bytes = [0u8; 32];
    caller_bytes.copy_from_slice(&input[4..36]);
    let caller = AccountId::from_bytes(caller_bytes);
    let rest = &input[FRAME_PREFIX_BYTES..];

    let (op, consumed) = match tag {
        TAG_PLACE_ORDER => {
            need(rest, 17)?;
            (
                Operation::PlaceOrder {
                    price: read_u64_le(&rest[0..8]),
                    size: read_u64_le(&rest[8..16]),
                    side: side_from_code(rest[16])?,
                },
                17,
            )
        }
        TAG_CANCEL_ORDER => {
            need(rest, 8)?;
            (
                Operation::CancelOrder {
                    order_id: OrderId::new(read_u64_le(&rest[0..8])),
                },
                8,
            )
        }
        TAG_SWAP => {
            need(rest, 18)?;
            (
                Operation::Swap {
                    asset_in: AssetId::new(rest[0]),
                    asset_out: AssetId::new(rest[1]),
                    amount_in: read_u64_le(&rest[2..10]),
                    min_amount_out: read_u64_le(&rest[10..18]),
                },
                18,
            )
        }
        TAG_LEND => {
            need(rest, 10)?;
            (
                Operation::Lend {
                    asset: AssetId::new(rest[0]),
                    amount: read_u64_le(&rest[1..9]),
                    action: lend_action_from_code(rest[9])?,
                },
                10,
            )
        }
        TAG_PREDICT => {
            need(rest, 25)?;
            (
                Operation::Predict {
                    market_id: read_u64_le(&rest[0..8]),
                    amount: read_u64_le(&rest[8..16]),
                    prediction: outcome_from_code(rest[16])?,
                    duration: read_u64_le(&rest[17..25]),
                },
                25,
            )
        }
        TAG_STAKE => {
            need(rest, 9)?;
            (
                Operation::Stake {
                    amount: read_u64_le(&rest[0..8]),
                    action: stake_action_from_code(rest[8])?,
                },
                9,
            )
        }
        TAG_RESOLVE => {
            need(rest, 9)?;
            (
                Operation::Resolve {
                    market_id: MarketId::new(read_u64_le(&rest[0..8])),
                    outcome: outcome_from_code(rest[8])?,
                },
                9,
            )
        }
        other => return Err(WireError::UnknownTag(other)),
    };

    Ok((Frame { caller, op }, &rest[consumed..]))
}

/// Encode a whole log: `magic | version | count` plus every frame.
#[must_use]
pub fn encode_log(frames: &[Frame]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LOG_HEADER_BYTES + frames.len() * (FRAME_PREFIX_BYTES + 25));
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION_V1.to_le_bytes());
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    for frame in frames {
        out.extend_from_slice(&encode_frame(frame));
    }
    out
}

/// Decode a whole log.
///
/// # Errors
///
/// Rejects a bad magic or version, any frame [`decode_frame`] rejects, a
/// truncated tail, and bytes left over after the declared frame count.
pub fn decode_log(input: &[u8]) -> Result<Vec<Frame>, WireError> {
    need(input, LOG_HEADER_BYTES)?;
    if input[0..4] != MAGIC {
        return Err(WireError::BadMagic);
    }
    let version = read_u16_le(&input[4..6]);
    if version != VERSION_V1 {
        return Err(WireError::UnsupportedVersion(version));
    }
    let count = read_u32_le(&input[6..10]) as usize;

    let mut frames = Vec::with_capacity(count.min(1024));
    let mut rest = &input[LOG_HEADER_BYTES..];
    for _ in 0..count {
        let (frame, remainder) = decode_frame(rest)?;
        frames.push(frame);
        rest = remainder;
    }
    if !rest.is_empty() {
        return Err(WireError::TrailingBytes(rest.len()));
    }
    Ok(frames)
}

/// Encode the occupancy summary as seven little-endian `u64` counters.
#[must_use]
pub fn encode_summary(summary: &Summary) -> [u8; SUMMARY_BYTES] {
    let mut out = [0u8; SUMMARY_BYTES];
    let fields = [
        summary.orders,
        summary.pools,
        summary.positions,
        summary.markets,
        summary.stakers,
        summary.accounts,
        summary.ops_applied,
    ];
    for (chunk, value) in out.chunks_exact_mut(8).zip(fields) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode an occupancy summary.
///
/// # Errors
///
/// Returns [`WireError::TooShort`] unless `input` is exactly
/// [`SUMMARY_BYTES`] long; longer input is [`WireError::TrailingBytes`].
pub fn decode_summary(input: &[u8]) -> Result<Summary, WireError> {
    need(input, SUMMARY_BYTES)?;
    if input.len() > SUMMARY_BYTES {
        return Err(WireError::TrailingBytes(input.len() - SUMMARY_BYTES));
    }
    Ok(Summary {
        orders: read_u64_le(&input[0..8]),
        pools: read_u64_le(&input[8..16]),
        positions: read_u64_le(&input[16..24]),
        markets: read_u64_le(&input[24..32]),
        stakers: read_u64_le(&input[32..40]),
        accounts: read_u64_le(&input[40..48]),
        ops_applied: read_u64_le(&input[48..56]),
    })
}
