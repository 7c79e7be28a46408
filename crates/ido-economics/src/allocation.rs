// crates/ido-economics/src/allocation.rs
//
// Allocation calculator: a user's claimable amount is their share of the
// campaign's outstanding weighted shares applied to the remaining pool.
//
//   allocation = floor(shares * reward_pool / campaign_shares)
//
// Claims burn the claimed shares and pay out of the remaining pool, so each
// later claimant is priced against what is actually left. The last claimant
// holds every outstanding share and receives the remaining pool exactly.

use ido_core::error::IdoError;

use crate::math::mul_div_floor;

/// Pure, side-effect-free allocation math.
pub struct AllocationCalculator;

impl AllocationCalculator {
    /// Claimable amount for `shares` out of `outstanding_shares` against `reward_pool`.
    ///
    /// Returns 0 when either share count is zero. Rounds down.
    pub fn compute(
        shares: u128,
        reward_pool: u128,
        outstanding_shares: u128,
    ) -> Result<u128, IdoError> {
        if shares == 0 || outstanding_shares == 0 {
            return Ok(0);
        }
        let amount = mul_div_floor(shares, reward_pool, outstanding_shares)?;
        // Shares never exceed the outstanding total in a consistent ledger.
        Ok(amount.min(reward_pool))
    }
}
