// crates/ido-economics/src/ledger.rs
//
// Contribution ledger: per-(user, campaign) open-period and accrued-share
// state. Records are created implicitly on first contribution.

use std::collections::HashMap;

use ido_core::asset::Address;
use ido_core::batch::LedgerWrite;
use ido_core::campaign::CampaignId;
use ido_core::contribution::ContributionState;

/// Exclusive owner of all contribution records.
#[derive(Debug, Default)]
pub struct ContributionLedger {
    entries: HashMap<(Address, CampaignId), ContributionState>,
}

impl ContributionLedger {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The current state for `(user, campaign)`, or the empty state if none exists.
    pub fn state(&self, user: &Address, campaign: &CampaignId) -> ContributionState {
        self.entries
            .get(&(*user, *campaign))
            .cloned()
            .unwrap_or_default()
    }

    /// Finalized weighted shares for `(user, campaign)`.
    pub fn accrued_shares(&self, user: &Address, campaign: &CampaignId) -> u128 {
        self.entries
            .get(&(*user, *campaign))
            .map(|s| s.accrued_shares)
            .unwrap_or(0)
    }

    /// Stage a replacement state for `(user, campaign)`.
    pub fn plan(user: Address, campaign: CampaignId, state: ContributionState) -> LedgerWrite {
        LedgerWrite::Contribution {
            user,
            campaign,
            state,
        }
    }

    /// Install a committed state.
    pub fn apply(&mut self, user: Address, campaign: CampaignId, state: ContributionState) {
        self.entries.insert((user, campaign), state);
    }

    /// All `(user, state)` pairs recorded for a campaign.
    pub fn contributors(
        &self,
        campaign: &CampaignId,
    ) -> impl Iterator<Item = (&Address, &ContributionState)> + '_ {
        let campaign = *campaign;
        self.entries
            .iter()
            .filter(move |((_, c), _)| *c == campaign)
            .map(|((user, _), state)| (user, state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
