// crates/ido-core/src/error.rs

use thiserror::Error;

use crate::asset::Address;
use crate::campaign::CampaignId;

/// Errors surfaced by the rewards engine.
///
/// Every variant is terminal for the call that produced it: the engine never
/// retries and never leaves a partially applied mutation behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdoError {
    /// A campaign with this id is already registered.
    #[error("Campaign {0} is already registered")]
    AlreadyRegistered(CampaignId),

    /// The campaign window is empty, inverted, or starts in the past.
    #[error("Invalid campaign window [{start}, {end}] at time {now}")]
    InvalidWindow { start: u64, end: u64, now: u64 },

    /// The reward token is the null (zero) address.
    #[error("Reward token must not be the zero address")]
    InvalidToken,

    /// The pool pair of a notification does not match the campaign's pair.
    #[error("Pool pair {pair} does not match campaign {campaign}")]
    CampaignMismatch { campaign: CampaignId, pair: String },

    /// A liquidity contribution arrived outside the campaign window.
    #[error("Time {now} is outside campaign window [{start}, {end}]")]
    OutsideWindow { now: u64, start: u64, end: u64 },

    /// A claim was attempted before the campaign window closed.
    #[error("Campaign has not ended: now {now} <= window end {end}")]
    CampaignNotEnded { now: u64, end: u64 },

    /// The user has no claimable allocation in this campaign.
    #[error("Nothing to claim for {user} in campaign {campaign}")]
    NothingToClaim { user: Address, campaign: CampaignId },

    /// Checked arithmetic overflowed; the call was aborted with no state change.
    #[error("Arithmetic overflow")]
    Overflow,

    /// The caller is not the authorized pool runtime.
    #[error("Unauthorized caller {0}")]
    Unauthorized(Address),

    /// No campaign is registered under this id.
    #[error("Campaign {0} not found")]
    CampaignNotFound(CampaignId),

    /// Storage layer error (RocksDB).
    #[error("Storage error: {0}")]
    Storage(String),

    /// The aggregate share counters disagree with the detailed records.
    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed input (bad address encoding, bad command).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for IdoError {
    fn from(e: serde_json::Error) -> Self {
        IdoError::Serialization(e.to_string())
    }
}
