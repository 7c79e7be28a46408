// crates/ido-core/src/escrow.rs

use serde::{Deserialize, Serialize};

use crate::asset::Address;
use crate::campaign::CampaignId;

/// A disbursement request emitted by the engine for the external vault.
///
/// The engine never moves tokens itself. A request is staged in the same
/// batch as the operation that produced it and stays pending until the vault
/// accepts it, so a vault outage delays a request but never drops it.
/// Redelivery after a crash may repeat a request; consumers deduplicate on
/// [`EscrowRequest::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowRequest {
    /// Pull the campaign's total allocation from the registrant into the vault.
    Deposit {
        campaign: CampaignId,
        from: Address,
        token: Address,
        amount: u128,
    },
    /// Pay a claimed allocation from the vault to the user.
    Payout {
        campaign: CampaignId,
        to: Address,
        token: Address,
        amount: u128,
    },
}

impl EscrowRequest {
    /// Stable identity of the request. At most one deposit exists per
    /// campaign and at most one payout per (campaign, user).
    pub fn key(&self) -> String {
        match self {
            EscrowRequest::Deposit { campaign, .. } => format!("deposit:{}", campaign),
            EscrowRequest::Payout { campaign, to, .. } => format!("payout:{}:{}", campaign, to),
        }
    }

    pub fn amount(&self) -> u128 {
        match self {
            EscrowRequest::Deposit { amount, .. } | EscrowRequest::Payout { amount, .. } => *amount,
        }
    }
}
