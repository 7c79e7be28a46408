// crates/ido-economics/src/settlement.rs
//
// Claim settlement: finalize any still-open liquidity period at window end,
// price the user's shares against the remaining pool, and stage the burn of
// exactly those shares together with the payout.

use ido_core::asset::Address;
use ido_core::campaign::Campaign;
use ido_core::contribution::ContributionState;
use ido_core::error::IdoError;
use ido_core::escrow::EscrowRequest;

use crate::accountant::ShareAccountant;
use crate::allocation::AllocationCalculator;
use crate::math::SafeMath;
use crate::registry::CampaignRegistry;

/// Everything a successful claim changes, computed before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Amount paid to the user.
    pub allocation: u128,
    /// Shares credited by finalizing an open period.
    pub finalized_credit: u128,
    /// Shares removed from every counter (the user's full accrued balance).
    pub burned_shares: u128,
    /// Campaign record with the pool reduced by `allocation`.
    pub campaign: Campaign,
    /// Terminal contribution state.
    pub state: ContributionState,
    /// Payout request for the vault.
    pub payout: EscrowRequest,
}

/// One-shot claim orchestration.
pub struct ClaimSettlement;

impl ClaimSettlement {
    /// Plan a claim for `user` at `now`.
    ///
    /// `outstanding_shares` is the campaign's current share total before any
    /// finalization credit.
    ///
    /// # Errors
    /// - `CampaignNotEnded` if `now <= window_end`.
    /// - `NothingToClaim` if the user already claimed or the allocation rounds to zero.
    /// - `Overflow` on any arithmetic failure.
    pub fn settle(
        campaign: &Campaign,
        state: &ContributionState,
        outstanding_shares: u128,
        user: Address,
        now: u64,
    ) -> Result<Settlement, IdoError> {
        if !campaign.has_ended(now) {
            return Err(IdoError::CampaignNotEnded {
                now,
                end: campaign.window_end,
            });
        }
        let nothing = IdoError::NothingToClaim {
            user,
            campaign: campaign.id,
        };
        if state.claimed {
            return Err(nothing);
        }

        let mut finalized = state.clone();
        let finalized_credit = if finalized.is_open() {
            ShareAccountant::finalize_open_period(campaign, &mut finalized)?
        } else {
            0
        };

        let outstanding = outstanding_shares.safe_add(finalized_credit)?;
        let shares = finalized.accrued_shares;
        let allocation =
            AllocationCalculator::compute(shares, campaign.reward_pool, outstanding)?;
        if allocation == 0 {
            return Err(nothing);
        }

        Ok(Settlement {
            allocation,
            finalized_credit,
            burned_shares: shares,
            campaign: CampaignRegistry::plan_pool_debit(campaign, allocation)?,
            state: ContributionState {
                claimed: true,
                ..ContributionState::default()
            },
            payout: EscrowRequest::Payout {
                campaign: campaign.id,
                to: user,
                token: campaign.reward_token,
                amount: allocation,
            },
        })
    }
}
