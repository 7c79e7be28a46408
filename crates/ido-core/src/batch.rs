// crates/ido-core/src/batch.rs
//
// The persisted write set.
//
// Every mutating engine operation stages its changes as a `LedgerBatch`.
// The batch is committed to the store first and applied to the in-memory
// tables second, so a failed commit leaves no trace anywhere. Loading a
// store yields the same kind of batch, replayed on startup.

use serde::{Deserialize, Serialize};

use crate::asset::Address;
use crate::campaign::{Campaign, CampaignId};
use crate::contribution::ContributionState;
use crate::escrow::EscrowRequest;

/// A single record write. Later writes to the same key supersede earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerWrite {
    /// Upsert a campaign record, keyed by `campaign.id`.
    Campaign(Campaign),
    /// Upsert the contribution state for `(user, campaign)`.
    Contribution {
        user: Address,
        campaign: CampaignId,
        state: ContributionState,
    },
    /// Set a user's global weighted-share total.
    UserShares { user: Address, shares: u128 },
    /// Set the per-campaign weighted-share total (allocation denominator).
    CampaignShares { campaign: CampaignId, shares: u128 },
    /// Set the grand total across all users and campaigns.
    TotalShares(u128),
    /// Stage an escrow request for delivery, keyed by `EscrowRequest::key`.
    PendingEscrow(EscrowRequest),
    /// The vault accepted the request with this key; drop it from the outbox.
    EscrowDelivered(String),
}

/// An ordered, all-or-nothing group of writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBatch {
    writes: Vec<LedgerWrite>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    pub fn push(&mut self, write: LedgerWrite) {
        self.writes.push(write);
    }

    pub fn writes(&self) -> &[LedgerWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl From<Vec<LedgerWrite>> for LedgerBatch {
    fn from(writes: Vec<LedgerWrite>) -> Self {
        Self { writes }
    }
}

impl IntoIterator for LedgerBatch {
    type Item = LedgerWrite;
    type IntoIter = std::vec::IntoIter<LedgerWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}
