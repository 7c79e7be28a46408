// crates/ido-core/src/lib.rs
//
// ido-core: Core identifiers, records, error type and trait seams for the
// IDO liquidity rewards engine.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines the canonical campaign and contribution records, the persisted
// write set, the outbound escrow requests, and the storage/vault interfaces.

pub mod asset;
pub mod batch;
pub mod campaign;
pub mod contribution;
pub mod error;
pub mod escrow;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use ido_core::Campaign;`

// Identity types
pub use asset::{Address, PoolPair, SwapDirection};

// Records
pub use campaign::{Campaign, CampaignId};
pub use contribution::{ContributionPhase, ContributionState};

// Persistence write set
pub use batch::{LedgerBatch, LedgerWrite};

// Outbound side effects
pub use escrow::EscrowRequest;

// Error type
pub use error::IdoError;

// Traits
pub use traits::{LedgerStore, Vault};
