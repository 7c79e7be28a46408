// crates/ido-store/src/lib.rs
//
// ido-store: Storage layer for the IDO liquidity rewards engine.
//
// Provides a RocksDB-backed `LedgerStore` for durable deployments and an
// in-memory `LedgerStore` for tests and ephemeral runs. Both apply write
// batches atomically.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::InMemoryStore;
pub use rocks::RocksStore;
