// crates/ido-economics/src/totals.rs
//
// Aggregate share counters.
//
// Three counters move together on every credit or debit:
//   - user_shares[user]        global per-user total
//   - campaign_shares[c]       per-campaign total, the allocation denominator
//   - total_shares             grand total across all users and campaigns
//
// Invariants (hold after every committed batch):
//   Σ_u user_shares[u] == total_shares
//   Σ_u accrued[u][c]  == campaign_shares[c]

use std::collections::HashMap;

use ido_core::asset::Address;
use ido_core::batch::LedgerWrite;
use ido_core::campaign::CampaignId;
use ido_core::error::IdoError;

use crate::math::SafeMath;

/// Shared aggregate counters, updated transactionally by every contribution and claim.
#[derive(Debug, Default, Clone)]
pub struct GlobalShareTotals {
    user_shares: HashMap<Address, u128>,
    campaign_shares: HashMap<CampaignId, u128>,
    total_shares: u128,
}

impl GlobalShareTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user's global weighted-share total.
    pub fn user_shares(&self, user: &Address) -> u128 {
        self.user_shares.get(user).copied().unwrap_or(0)
    }

    /// Weighted shares outstanding in one campaign.
    pub fn campaign_shares(&self, campaign: &CampaignId) -> u128 {
        self.campaign_shares.get(campaign).copied().unwrap_or(0)
    }

    /// Grand total across all users and campaigns.
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Stage `+credit - debit` on all three counters for `(user, campaign)`.
    ///
    /// The credit is applied before the debit, so a claim may burn shares it
    /// finalizes in the same batch. Fails with `Overflow` (and stages nothing)
    /// if any counter would overflow or go negative.
    pub fn plan_adjust(
        &self,
        user: Address,
        campaign: CampaignId,
        credit: u128,
        debit: u128,
    ) -> Result<Vec<LedgerWrite>, IdoError> {
        let user_shares = self.user_shares(&user).safe_add(credit)?.safe_sub(debit)?;
        let campaign_shares = self
            .campaign_shares(&campaign)
            .safe_add(credit)?
            .safe_sub(debit)?;
        let total_shares = self.total_shares.safe_add(credit)?.safe_sub(debit)?;

        Ok(vec![
            LedgerWrite::UserShares {
                user,
                shares: user_shares,
            },
            LedgerWrite::CampaignShares {
                campaign,
                shares: campaign_shares,
            },
            LedgerWrite::TotalShares(total_shares),
        ])
    }

    pub fn apply_user(&mut self, user: Address, shares: u128) {
        self.user_shares.insert(user, shares);
    }

    pub fn apply_campaign(&mut self, campaign: CampaignId, shares: u128) {
        self.campaign_shares.insert(campaign, shares);
    }

    pub fn apply_total(&mut self, total: u128) {
        self.total_shares = total;
    }

    /// Apply the counter writes in `writes`, ignoring any other kind.
    pub fn apply_writes(&mut self, writes: &[LedgerWrite]) {
        for write in writes {
            match write {
                LedgerWrite::UserShares { user, shares } => self.apply_user(*user, *shares),
                LedgerWrite::CampaignShares { campaign, shares } => {
                    self.apply_campaign(*campaign, *shares)
                }
                LedgerWrite::TotalShares(total) => self.apply_total(*total),
                _ => {}
            }
        }
    }

    /// Sum of all per-user totals. Equal to `total_shares()` while the ledger is consistent.
    pub fn sum_user_shares(&self) -> Result<u128, IdoError> {
        self.user_shares
            .values()
            .try_fold(0u128, |acc, s| acc.safe_add(*s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(totals: &mut GlobalShareTotals, writes: Vec<LedgerWrite>) {
        totals.apply_writes(&writes);
    }

    #[test]
    fn test_credit_moves_all_counters() {
        let mut totals = GlobalShareTotals::new();
        let user = Address([1u8; 20]);
        let campaign = CampaignId::generate();

        let writes = totals.plan_adjust(user, campaign, 50, 0).unwrap();
        apply_all(&mut totals, writes);

        assert_eq!(totals.user_shares(&user), 50);
        assert_eq!(totals.campaign_shares(&campaign), 50);
        assert_eq!(totals.total_shares(), 50);
    }

    #[test]
    fn test_sum_invariant_across_users() {
        let mut totals = GlobalShareTotals::new();
        let campaign = CampaignId::generate();
        for (i, amount) in [10u128, 20, 30].iter().enumerate() {
            let writes = totals
                .plan_adjust(Address([i as u8; 20]), campaign, *amount, 0)
                .unwrap();
            apply_all(&mut totals, writes);
        }
        assert_eq!(totals.sum_user_shares().unwrap(), totals.total_shares());
        assert_eq!(totals.total_shares(), 60);
    }

    #[test]
    fn test_credit_then_debit_in_one_adjustment() {
        let mut totals = GlobalShareTotals::new();
        let user = Address([1u8; 20]);
        let campaign = CampaignId::generate();
        let writes = totals.plan_adjust(user, campaign, 40, 0).unwrap();
        apply_all(&mut totals, writes);

        // Finalize 60 more and burn all 100 in the same batch.
        let writes = totals.plan_adjust(user, campaign, 60, 100).unwrap();
        apply_all(&mut totals, writes);
        assert_eq!(totals.user_shares(&user), 0);
        assert_eq!(totals.campaign_shares(&campaign), 0);
        assert_eq!(totals.total_shares(), 0);
    }

    #[test]
    fn test_debit_below_zero_rejected() {
        let totals = GlobalShareTotals::new();
        let result = totals.plan_adjust(Address([1u8; 20]), CampaignId::generate(), 0, 1);
        assert_eq!(result, Err(IdoError::Overflow));
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut totals = GlobalShareTotals::new();
        let user = Address([1u8; 20]);
        let campaign = CampaignId::generate();
        let writes = totals.plan_adjust(user, campaign, u128::MAX, 0).unwrap();
        apply_all(&mut totals, writes);
        assert_eq!(
            totals.plan_adjust(Address([2u8; 20]), campaign, 1, 0),
            Err(IdoError::Overflow)
        );
    }
}
