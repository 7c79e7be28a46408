// crates/ido-store/src/memory.rs
//
// In-memory ledger store implementing the `LedgerStore` trait.
//
// Holds the latest value per key in ordered maps behind a single RwLock, so a
// batch is applied under one write guard and readers never observe half of it.
// Nothing survives the process; use `RocksStore` for durability.

use std::collections::BTreeMap;
use std::sync::RwLock;

use ido_core::asset::Address;
use ido_core::batch::{LedgerBatch, LedgerWrite};
use ido_core::campaign::{Campaign, CampaignId};
use ido_core::contribution::ContributionState;
use ido_core::error::IdoError;
use ido_core::escrow::EscrowRequest;
use ido_core::traits::LedgerStore;

#[derive(Debug, Default)]
struct Tables {
    campaigns: BTreeMap<CampaignId, Campaign>,
    contributions: BTreeMap<(CampaignId, Address), ContributionState>,
    user_shares: BTreeMap<Address, u128>,
    campaign_shares: BTreeMap<CampaignId, u128>,
    total_shares: u128,
    escrow: BTreeMap<String, EscrowRequest>,
}

/// Volatile `LedgerStore` backed by ordered maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of campaign records currently stored.
    pub fn campaign_count(&self) -> Result<usize, IdoError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| IdoError::Storage("In-memory store lock poisoned".to_string()))?;
        Ok(tables.campaigns.len())
    }
}

impl LedgerStore for InMemoryStore {
    fn commit(&self, batch: &LedgerBatch) -> Result<(), IdoError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| IdoError::Storage("In-memory store lock poisoned".to_string()))?;

        for write in batch.writes() {
            match write {
                LedgerWrite::Campaign(campaign) => {
                    tables.campaigns.insert(campaign.id, campaign.clone());
                }
                LedgerWrite::Contribution {
                    user,
                    campaign,
                    state,
                } => {
                    tables
                        .contributions
                        .insert((*campaign, *user), state.clone());
                }
                LedgerWrite::UserShares { user, shares } => {
                    tables.user_shares.insert(*user, *shares);
                }
                LedgerWrite::CampaignShares { campaign, shares } => {
                    tables.campaign_shares.insert(*campaign, *shares);
                }
                LedgerWrite::TotalShares(total) => {
                    tables.total_shares = *total;
                }
                LedgerWrite::PendingEscrow(request) => {
                    tables.escrow.insert(request.key(), request.clone());
                }
                LedgerWrite::EscrowDelivered(key) => {
                    tables.escrow.remove(key);
                }
            }
        }
        Ok(())
    }

    fn load(&self) -> Result<LedgerBatch, IdoError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| IdoError::Storage("In-memory store lock poisoned".to_string()))?;

        let mut batch = LedgerBatch::new();
        for campaign in tables.campaigns.values() {
            batch.push(LedgerWrite::Campaign(campaign.clone()));
        }
        for ((campaign, user), state) in &tables.contributions {
            batch.push(LedgerWrite::Contribution {
                user: *user,
                campaign: *campaign,
                state: state.clone(),
            });
        }
        for (user, shares) in &tables.user_shares {
            batch.push(LedgerWrite::UserShares {
                user: *user,
                shares: *shares,
            });
        }
        for (campaign, shares) in &tables.campaign_shares {
            batch.push(LedgerWrite::CampaignShares {
                campaign: *campaign,
                shares: *shares,
            });
        }
        for request in tables.escrow.values() {
            batch.push(LedgerWrite::PendingEscrow(request.clone()));
        }
        batch.push(LedgerWrite::TotalShares(tables.total_shares));
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ido_core::asset::PoolPair;

    fn make_campaign() -> Campaign {
        Campaign {
            id: CampaignId::generate(),
            reward_token: Address([9u8; 20]),
            pair: PoolPair::new(Address([1u8; 20]), Address([2u8; 20])),
            registrant: Address([7u8; 20]),
            total_allocation: 500,
            reward_pool: 500,
            window_start: 10,
            window_end: 20,
        }
    }

    #[test]
    fn test_empty_store_loads_zero_total() {
        let store = InMemoryStore::new();
        let batch = store.load().unwrap();
        assert_eq!(batch.writes(), &[LedgerWrite::TotalShares(0)]);
    }

    #[test]
    fn test_commit_then_load() {
        let store = InMemoryStore::new();
        let campaign = make_campaign();
        let user = Address([3u8; 20]);
        let state = ContributionState {
            open_since: Some(12),
            accrued_shares: 80,
            open_liquidity: 100,
            claimed: false,
        };

        let batch = LedgerBatch::from(vec![
            LedgerWrite::Campaign(campaign.clone()),
            LedgerWrite::Contribution {
                user,
                campaign: campaign.id,
                state: state.clone(),
            },
            LedgerWrite::UserShares { user, shares: 80 },
            LedgerWrite::CampaignShares {
                campaign: campaign.id,
                shares: 80,
            },
            LedgerWrite::TotalShares(80),
        ]);
        store.commit(&batch).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, batch);
        assert_eq!(store.campaign_count().unwrap(), 1);
    }

    #[test]
    fn test_later_write_supersedes() {
        let store = InMemoryStore::new();
        let user = Address([3u8; 20]);
        store
            .commit(&LedgerBatch::from(vec![
                LedgerWrite::UserShares { user, shares: 10 },
                LedgerWrite::UserShares { user, shares: 25 },
            ]))
            .unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded
            .writes()
            .contains(&LedgerWrite::UserShares { user, shares: 25 }));
        assert!(!loaded
            .writes()
            .contains(&LedgerWrite::UserShares { user, shares: 10 }));
    }

    #[test]
    fn test_delivered_escrow_leaves_outbox() {
        let store = InMemoryStore::new();
        let campaign = make_campaign();
        let deposit = EscrowRequest::Deposit {
            campaign: campaign.id,
            from: campaign.registrant,
            token: campaign.reward_token,
            amount: 500,
        };
        store
            .commit(&LedgerBatch::from(vec![LedgerWrite::PendingEscrow(
                deposit.clone(),
            )]))
            .unwrap();
        assert!(store
            .load()
            .unwrap()
            .writes()
            .contains(&LedgerWrite::PendingEscrow(deposit.clone())));

        store
            .commit(&LedgerBatch::from(vec![LedgerWrite::EscrowDelivered(
                deposit.key(),
            )]))
            .unwrap();
        assert_eq!(
            store.load().unwrap().writes(),
            &[LedgerWrite::TotalShares(0)]
        );
    }
}
