// crates/ido-economics/src/accountant.rs
//
// Share accountant: converts raw pool activity into weighted shares.
//
// Weighting model:
//   - one unit of swap volume weighs WEIGHT (1.0)
//   - one unit of liquidity added at time t weighs (end - t) / (end - start),
//     decaying linearly from 1.0 at window start to 0.0 at window end
//   - liquidity removed after being provided since `open_since` is credited
//     again for the fraction of the window it was actually provided
//
// A second addition inside an open period first folds the accrued shares
// forward by the fraction of the window elapsed since the period opened,
// then adds the new weight and restarts the period. This compounds rather
// than integrates exactly; it is the intended behavior.
//
// Every function here works on a caller-owned copy of the state and returns
// the share credit, which the caller mirrors into the aggregate counters.

use ido_core::campaign::Campaign;
use ido_core::contribution::ContributionState;
use ido_core::error::IdoError;

use crate::math::{apply_ratio, ratio, SafeMath, WEIGHT};

/// Stateless weighting rules.
pub struct ShareAccountant;

impl ShareAccountant {
    /// Weighted shares for `volume` units of swap volume.
    pub fn swap_shares(volume: u128) -> Result<u128, IdoError> {
        apply_ratio(volume, WEIGHT)
    }

    /// Fraction of the window still ahead at `now`, in SCALE units.
    pub fn remaining_ratio(campaign: &Campaign, now: u64) -> Result<u128, IdoError> {
        let remaining = campaign.window_end.saturating_sub(now);
        ratio(remaining.min(campaign.duration()), campaign.duration())
    }

    /// Decayed weight of `amount` liquidity contributed at `now`.
    pub fn decayed_weight(campaign: &Campaign, amount: u128, now: u64) -> Result<u128, IdoError> {
        let weight = apply_ratio(amount, WEIGHT)?;
        apply_ratio(weight, Self::remaining_ratio(campaign, now)?)
    }

    /// Record `amount` of liquidity added at `now`.
    ///
    /// Opens a period if none is open; otherwise folds the accrued shares
    /// forward and restarts the period at `now`. Returns the total increase
    /// of `accrued_shares`.
    ///
    /// # Errors
    /// `OutsideWindow` if `now` is not within the campaign window.
    pub fn liquidity_added(
        campaign: &Campaign,
        state: &mut ContributionState,
        amount: u128,
        now: u64,
    ) -> Result<u128, IdoError> {
        if !campaign.is_within_window(now) {
            return Err(IdoError::OutsideWindow {
                now,
                start: campaign.window_start,
                end: campaign.window_end,
            });
        }
        if amount == 0 {
            return Ok(0);
        }

        let weighted = Self::decayed_weight(campaign, amount, now)?;
        let fold = match state.open_since {
            Some(since) => {
                let elapsed = now.saturating_sub(since).min(campaign.duration());
                apply_ratio(state.accrued_shares, ratio(elapsed, campaign.duration())?)?
            }
            None => 0,
        };

        let credit = fold.safe_add(weighted)?;
        let accrued = state.accrued_shares.safe_add(credit)?;
        let liquidity = state.open_liquidity.safe_add(amount)?;

        state.accrued_shares = accrued;
        state.open_liquidity = liquidity;
        state.open_since = Some(now);
        Ok(credit)
    }

    /// Record `amount` of liquidity removed at `now` and close the period.
    ///
    /// Credits the removed amount (capped at the liquidity deposited in the
    /// open period) weighted by the fraction of the window it was provided,
    /// counting no time past `window_end`. A no-op when no period is open.
    pub fn liquidity_removed(
        campaign: &Campaign,
        state: &mut ContributionState,
        amount: u128,
        now: u64,
    ) -> Result<u128, IdoError> {
        let Some(since) = state.open_since else {
            return Ok(0);
        };
        if amount == 0 {
            return Ok(0);
        }

        let duration = campaign.duration();
        let provided = now
            .min(campaign.window_end)
            .saturating_sub(since)
            .min(duration);
        // Not `amount * ratio`: only liquidity deposited in this period earns time credit.
        let credited_amount = amount.min(state.open_liquidity);
        let weighted = apply_ratio(credited_amount, ratio(provided, duration)?)?;
        let accrued = state.accrued_shares.safe_add(weighted)?;

        state.accrued_shares = accrued;
        state.open_since = None;
        state.open_liquidity = 0;
        Ok(weighted)
    }

    /// Close a still-open period as if all its liquidity were removed at window end.
    pub fn finalize_open_period(
        campaign: &Campaign,
        state: &mut ContributionState,
    ) -> Result<u128, IdoError> {
        let liquidity = state.open_liquidity;
        Self::liquidity_removed(campaign, state, liquidity, campaign.window_end)
    }
}
