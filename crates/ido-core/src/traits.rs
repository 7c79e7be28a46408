// crates/ido-core/src/traits.rs

use crate::batch::LedgerBatch;
use crate::error::IdoError;
use crate::escrow::EscrowRequest;

/// Trait for durable ledger storage.
///
/// Implemented by ido-store (RocksDB and in-memory backends). Keys are
/// `(campaign_id)` for campaigns and `(user, campaign_id)` for contribution
/// state, plus the share-total counters.
pub trait LedgerStore: Send + Sync {
    /// Apply every write in the batch atomically: either all land or none do.
    fn commit(&self, batch: &LedgerBatch) -> Result<(), IdoError>;

    /// Return a batch that reconstructs the full persisted state when replayed.
    fn load(&self) -> Result<LedgerBatch, IdoError>;
}

/// Trait for the external escrow/vault that custodies reward tokens.
///
/// Implemented by the daemon (outbox writer) and by test doubles.
pub trait Vault: Send + Sync {
    /// Hand a deposit or payout request to the vault.
    fn submit(&self, request: &EscrowRequest) -> Result<(), IdoError>;
}
