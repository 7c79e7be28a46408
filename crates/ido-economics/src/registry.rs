// crates/ido-economics/src/registry.rs
//
// Campaign registry: immutable-once-set campaign metadata plus the mutable,
// monotonically decreasing reward pool.
//
// Registration validates and stages a campaign record together with the
// escrow deposit request; nothing is stored until the owning `RewardBook`
// commits the batch.

use std::collections::HashMap;

use ido_core::asset::{Address, PoolPair};
use ido_core::campaign::{Campaign, CampaignId};
use ido_core::error::IdoError;
use ido_core::escrow::EscrowRequest;

use crate::math::SafeMath;

/// Exclusive owner of all campaign records.
#[derive(Debug, Default)]
pub struct CampaignRegistry {
    campaigns: HashMap<CampaignId, Campaign>,
}

impl CampaignRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            campaigns: HashMap::new(),
        }
    }

    /// Validate a registration and build the campaign record and deposit request.
    ///
    /// # Errors
    /// - `AlreadyRegistered` if `id` exists.
    /// - `InvalidWindow` if `window_start < now` or `window_end <= window_start`.
    /// - `InvalidToken` if `reward_token` is the zero address.
    #[allow(clippy::too_many_arguments)]
    pub fn plan_register(
        &self,
        id: CampaignId,
        reward_token: Address,
        pair: PoolPair,
        registrant: Address,
        total_allocation: u128,
        window_start: u64,
        window_end: u64,
        now: u64,
    ) -> Result<(Campaign, EscrowRequest), IdoError> {
        if self.campaigns.contains_key(&id) {
            return Err(IdoError::AlreadyRegistered(id));
        }
        if window_start < now || window_end <= window_start {
            return Err(IdoError::InvalidWindow {
                start: window_start,
                end: window_end,
                now,
            });
        }
        if reward_token.is_zero() {
            return Err(IdoError::InvalidToken);
        }

        let campaign = Campaign {
            id,
            reward_token,
            pair,
            registrant,
            total_allocation,
            reward_pool: total_allocation,
            window_start,
            window_end,
        };
        let deposit = EscrowRequest::Deposit {
            campaign: id,
            from: registrant,
            token: reward_token,
            amount: total_allocation,
        };
        Ok((campaign, deposit))
    }

    /// Order-insensitive pool pair comparison.
    pub fn matches(pair: &PoolPair, campaign_pair: &PoolPair) -> bool {
        pair.matches(campaign_pair)
    }

    /// Look up a campaign and check that `pair` is the campaign's pool pair.
    pub fn get_matching(&self, id: &CampaignId, pair: &PoolPair) -> Result<&Campaign, IdoError> {
        let campaign = self.get(id)?;
        if !Self::matches(pair, &campaign.pair) {
            return Err(IdoError::CampaignMismatch {
                campaign: *id,
                pair: pair.to_string(),
            });
        }
        Ok(campaign)
    }

    /// Look up a campaign by id.
    pub fn get(&self, id: &CampaignId) -> Result<&Campaign, IdoError> {
        self.campaigns
            .get(id)
            .ok_or(IdoError::CampaignNotFound(*id))
    }

    /// A copy of `campaign` with `amount` removed from its reward pool.
    pub fn plan_pool_debit(campaign: &Campaign, amount: u128) -> Result<Campaign, IdoError> {
        let mut updated = campaign.clone();
        updated.reward_pool = campaign.reward_pool.safe_sub(amount)?;
        Ok(updated)
    }

    /// Install a committed campaign record.
    pub fn apply(&mut self, campaign: Campaign) {
        self.campaigns.insert(campaign.id, campaign);
    }

    /// Iterate over all registered campaigns.
    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.campaigns.values()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn pair() -> PoolPair {
        PoolPair::new(addr(1), addr(2))
    }

    fn plan(
        registry: &CampaignRegistry,
        id: CampaignId,
        token: Address,
        start: u64,
        end: u64,
        now: u64,
    ) -> Result<(Campaign, EscrowRequest), IdoError> {
        registry.plan_register(id, token, pair(), addr(7), 1_000, start, end, now)
    }

    #[test]
    fn test_plan_register_success() {
        let registry = CampaignRegistry::new();
        let id = CampaignId::generate();
        let (campaign, deposit) = plan(&registry, id, addr(9), 100, 200, 100).unwrap();

        assert_eq!(campaign.reward_pool, 1_000);
        assert_eq!(campaign.total_allocation, 1_000);
        assert_eq!(
            deposit,
            EscrowRequest::Deposit {
                campaign: id,
                from: addr(7),
                token: addr(9),
                amount: 1_000,
            }
        );
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = CampaignRegistry::new();
        let id = CampaignId::generate();
        let (campaign, _) = plan(&registry, id, addr(9), 100, 200, 50).unwrap();
        registry.apply(campaign);

        assert_eq!(
            plan(&registry, id, addr(9), 100, 200, 50),
            Err(IdoError::AlreadyRegistered(id))
        );
    }

    #[test]
    fn test_register_start_in_past() {
        let registry = CampaignRegistry::new();
        let result = plan(&registry, CampaignId::generate(), addr(9), 100, 200, 101);
        assert!(matches!(result, Err(IdoError::InvalidWindow { .. })));
    }

    #[test]
    fn test_register_empty_window() {
        let registry = CampaignRegistry::new();
        let result = plan(&registry, CampaignId::generate(), addr(9), 100, 100, 50);
        assert!(matches!(result, Err(IdoError::InvalidWindow { .. })));
        let result = plan(&registry, CampaignId::generate(), addr(9), 100, 90, 50);
        assert!(matches!(result, Err(IdoError::InvalidWindow { .. })));
    }

    #[test]
    fn test_register_zero_token() {
        let registry = CampaignRegistry::new();
        let result = plan(&registry, CampaignId::generate(), Address::ZERO, 100, 200, 50);
        assert_eq!(result, Err(IdoError::InvalidToken));
    }

    #[test]
    fn test_get_matching_reversed_pair() {
        let mut registry = CampaignRegistry::new();
        let id = CampaignId::generate();
        let (campaign, _) = plan(&registry, id, addr(9), 100, 200, 50).unwrap();
        registry.apply(campaign);

        assert!(registry
            .get_matching(&id, &PoolPair::new(addr(2), addr(1)))
            .is_ok());
        assert!(matches!(
            registry.get_matching(&id, &PoolPair::new(addr(2), addr(3))),
            Err(IdoError::CampaignMismatch { .. })
        ));
    }

    #[test]
    fn test_get_unknown() {
        let registry = CampaignRegistry::new();
        let id = CampaignId::generate();
        assert_eq!(registry.get(&id), Err(IdoError::CampaignNotFound(id)));
    }

    #[test]
    fn test_pool_debit_never_negative() {
        let registry = CampaignRegistry::new();
        let (campaign, _) = plan(&registry, CampaignId::generate(), addr(9), 100, 200, 50).unwrap();

        let debited = CampaignRegistry::plan_pool_debit(&campaign, 400).unwrap();
        assert_eq!(debited.reward_pool, 600);
        assert_eq!(
            CampaignRegistry::plan_pool_debit(&campaign, 1_001),
            Err(IdoError::Overflow)
        );
    }
}
