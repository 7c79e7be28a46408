// crates/ido-core/src/contribution.rs
//
// Per-(user, campaign) contribution state.
//
// Lifecycle:
//
//   NoContribution --> Contributing (period open) <--> Settled (period closed)
//                                  \                    /
//                                   +--> ClaimedOut <--+
//                                        (terminal)

use serde::{Deserialize, Serialize};

/// Derived lifecycle phase of a [`ContributionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionPhase {
    /// Nothing recorded yet.
    NoContribution,
    /// A liquidity-provision period is open and still accruing.
    Contributing,
    /// Shares are finalized and no period is open.
    Settled,
    /// The user claimed this campaign. No transition leaves this phase.
    ClaimedOut,
}

/// Contribution bookkeeping for one user in one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionState {
    /// Start of the current liquidity-provision period, if one is open.
    pub open_since: Option<u64>,
    /// Weighted shares finalized so far. Reset to zero on claim.
    pub accrued_shares: u128,
    /// Liquidity deposited during the open period. Zero when no period is open.
    #[serde(default)]
    pub open_liquidity: u128,
    /// Set once the user has claimed.
    #[serde(default)]
    pub claimed: bool,
}

impl ContributionState {
    /// The lifecycle phase implied by the current fields.
    pub fn phase(&self) -> ContributionPhase {
        if self.claimed {
            ContributionPhase::ClaimedOut
        } else if self.open_since.is_some() {
            ContributionPhase::Contributing
        } else if self.accrued_shares > 0 {
            ContributionPhase::Settled
        } else {
            ContributionPhase::NoContribution
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_since.is_some()
    }
}
