// crates/ido-store/src/rocks.rs
//
// RocksDB-backed persistent storage for the rewards ledger.
//
// Key format:
//   - `campaign:{campaign_id}`                -> JSON Campaign
//   - `contribution:{campaign_id}:{user}`     -> JSON ContributionState
//   - `user_shares:{user}`                    -> JSON u128
//   - `campaign_shares:{campaign_id}`         -> JSON u128
//   - `total_shares`                          -> JSON u128
//   - `escrow:{request_key}`                  -> JSON EscrowRequest (undelivered)
//
// Every batch is written with a single RocksDB `WriteBatch`, which the
// database applies atomically.

use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use serde::de::DeserializeOwned;

use ido_core::asset::Address;
use ido_core::batch::{LedgerBatch, LedgerWrite};
use ido_core::campaign::{Campaign, CampaignId};
use ido_core::contribution::ContributionState;
use ido_core::error::IdoError;
use ido_core::escrow::EscrowRequest;
use ido_core::traits::LedgerStore;

const CAMPAIGN_PREFIX: &str = "campaign:";
const CONTRIBUTION_PREFIX: &str = "contribution:";
const USER_SHARES_PREFIX: &str = "user_shares:";
const CAMPAIGN_SHARES_PREFIX: &str = "campaign_shares:";
const TOTAL_SHARES_KEY: &str = "total_shares";
const ESCROW_PREFIX: &str = "escrow:";

/// RocksDB wrapper implementing the `LedgerStore` trait.
#[derive(Debug)]
pub struct RocksStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, IdoError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| IdoError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        tracing::debug!("Opened ledger store at {}", path);
        Ok(Self { db })
    }

    fn campaign_key(id: &CampaignId) -> Vec<u8> {
        format!("{}{}", CAMPAIGN_PREFIX, id).into_bytes()
    }

    fn contribution_key(campaign: &CampaignId, user: &Address) -> Vec<u8> {
        format!("{}{}:{}", CONTRIBUTION_PREFIX, campaign, user).into_bytes()
    }

    fn user_shares_key(user: &Address) -> Vec<u8> {
        format!("{}{}", USER_SHARES_PREFIX, user).into_bytes()
    }

    fn campaign_shares_key(campaign: &CampaignId) -> Vec<u8> {
        format!("{}{}", CAMPAIGN_SHARES_PREFIX, campaign).into_bytes()
    }

    fn escrow_key(request_key: &str) -> Vec<u8> {
        format!("{}{}", ESCROW_PREFIX, request_key).into_bytes()
    }

    /// Collect every `(key suffix, decoded value)` under a prefix.
    fn scan_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<(String, T)>, IdoError> {
        let prefix_bytes = prefix.as_bytes();
        let mut out = Vec::new();

        for item in self.db.prefix_iterator(prefix_bytes) {
            let (key, value) = item
                .map_err(|e| IdoError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Without a prefix extractor the iterator runs past the prefix.
            if !key.starts_with(prefix_bytes) {
                break;
            }

            let suffix = std::str::from_utf8(&key[prefix_bytes.len()..])
                .map_err(|e| IdoError::Storage(format!("Non-UTF-8 key under {}: {}", prefix, e)))?
                .to_string();
            let decoded: T = serde_json::from_slice(&value)?;
            out.push((suffix, decoded));
        }

        Ok(out)
    }
}

impl LedgerStore for RocksStore {
    fn commit(&self, batch: &LedgerBatch) -> Result<(), IdoError> {
        let mut wb = WriteBatch::default();

        for write in batch.writes() {
            match write {
                LedgerWrite::Campaign(campaign) => {
                    wb.put(Self::campaign_key(&campaign.id), serde_json::to_vec(campaign)?);
                }
                LedgerWrite::Contribution {
                    user,
                    campaign,
                    state,
                } => {
                    wb.put(
                        Self::contribution_key(campaign, user),
                        serde_json::to_vec(state)?,
                    );
                }
                LedgerWrite::UserShares { user, shares } => {
                    wb.put(Self::user_shares_key(user), serde_json::to_vec(shares)?);
                }
                LedgerWrite::CampaignShares { campaign, shares } => {
                    wb.put(
                        Self::campaign_shares_key(campaign),
                        serde_json::to_vec(shares)?,
                    );
                }
                LedgerWrite::TotalShares(total) => {
                    wb.put(TOTAL_SHARES_KEY.as_bytes(), serde_json::to_vec(total)?);
                }
                LedgerWrite::PendingEscrow(request) => {
                    wb.put(
                        Self::escrow_key(&request.key()),
                        serde_json::to_vec(request)?,
                    );
                }
                LedgerWrite::EscrowDelivered(key) => {
                    wb.delete(Self::escrow_key(key));
                }
            }
        }

        self.db
            .write(wb)
            .map_err(|e| IdoError::Storage(format!("RocksDB batch write failed: {}", e)))?;

        tracing::trace!("Committed {} ledger writes", batch.len());
        Ok(())
    }

    fn load(&self) -> Result<LedgerBatch, IdoError> {
        let mut batch = LedgerBatch::new();

        for (_, campaign) in self.scan_prefix::<Campaign>(CAMPAIGN_PREFIX)? {
            batch.push(LedgerWrite::Campaign(campaign));
        }

        for (suffix, state) in self.scan_prefix::<ContributionState>(CONTRIBUTION_PREFIX)? {
            let (campaign, user) = suffix.split_once(':').ok_or_else(|| {
                IdoError::Storage(format!("Malformed contribution key suffix {}", suffix))
            })?;
            batch.push(LedgerWrite::Contribution {
                user: user.parse()?,
                campaign: campaign.parse()?,
                state,
            });
        }

        for (suffix, shares) in self.scan_prefix::<u128>(USER_SHARES_PREFIX)? {
            batch.push(LedgerWrite::UserShares {
                user: suffix.parse()?,
                shares,
            });
        }

        for (suffix, shares) in self.scan_prefix::<u128>(CAMPAIGN_SHARES_PREFIX)? {
            batch.push(LedgerWrite::CampaignShares {
                campaign: suffix.parse()?,
                shares,
            });
        }

        for (_, request) in self.scan_prefix::<EscrowRequest>(ESCROW_PREFIX)? {
            batch.push(LedgerWrite::PendingEscrow(request));
        }

        let total = match self
            .db
            .get(TOTAL_SHARES_KEY.as_bytes())
            .map_err(|e| IdoError::Storage(format!("RocksDB get failed: {}", e)))?
        {
            Some(bytes) => serde_json::from_slice::<u128>(&bytes)?,
            None => 0,
        };
        batch.push(LedgerWrite::TotalShares(total));

        tracing::debug!("Loaded {} ledger records", batch.len());
        Ok(batch)
    }
}
