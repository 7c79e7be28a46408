// crates/ido-core/src/campaign.rs
//
// Campaign records: a time-boxed reward program tied to one pool pair and
// one reward-token pool. Metadata is immutable once registered; only the
// remaining reward pool decreases as users claim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::asset::{Address, PoolPair};
use crate::error::IdoError;

/// Opaque, unique campaign identifier (UUID v7 for time-ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    /// Generate a fresh time-ordered campaign id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CampaignId {
    type Err = IdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(CampaignId)
            .map_err(|e| IdoError::InvalidInput(format!("Bad campaign id {}: {}", s, e)))
    }
}

/// A registered reward campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier.
    pub id: CampaignId,
    /// Token paid out to claimants.
    pub reward_token: Address,
    /// Pool pair whose activity earns shares in this campaign.
    pub pair: PoolPair,
    /// Party that funded the reward pool at registration.
    pub registrant: Address,
    /// Allocation escrowed at registration. Never changes.
    pub total_allocation: u128,
    /// Reward tokens not yet claimed. Starts at `total_allocation`, only decreases.
    pub reward_pool: u128,
    /// Start of the contribution window (unix seconds, inclusive).
    pub window_start: u64,
    /// End of the contribution window (unix seconds, inclusive). Always > `window_start`.
    pub window_end: u64,
}

impl Campaign {
    /// Length of the contribution window in seconds. Never zero for a registered campaign.
    pub fn duration(&self) -> u64 {
        self.window_end - self.window_start
    }

    /// Whether `now` falls inside `[window_start, window_end]`.
    pub fn is_within_window(&self, now: u64) -> bool {
        now >= self.window_start && now <= self.window_end
    }

    /// Whether the window has closed, i.e. claims are allowed.
    pub fn has_ended(&self, now: u64) -> bool {
        now > self.window_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_campaign() -> Campaign {
        Campaign {
            id: CampaignId::generate(),
            reward_token: Address([9u8; 20]),
            pair: PoolPair::new(Address([1u8; 20]), Address([2u8; 20])),
            registrant: Address([7u8; 20]),
            total_allocation: 1_000,
            reward_pool: 1_000,
            window_start: 100,
            window_end: 200,
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(make_campaign().duration(), 100);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let c = make_campaign();
        assert!(!c.is_within_window(99));
        assert!(c.is_within_window(100));
        assert!(c.is_within_window(200));
        assert!(!c.is_within_window(201));
    }

    #[test]
    fn test_has_ended_strictly_after_end() {
        let c = make_campaign();
        assert!(!c.has_ended(200));
        assert!(c.has_ended(201));
    }

    #[test]
    fn test_campaign_id_parse() {
        let id = CampaignId::generate();
        let parsed: CampaignId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<CampaignId>().is_err());
    }
}
