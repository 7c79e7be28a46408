// crates/ido-daemon/src/shared.rs
//
// Shared handle to the reward book.
//
// Constructed once in main.rs and cloned into every task that needs it. The
// write lock serializes mutations so no two notifications interleave; queries
// take the read lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use ido_economics::RewardBook;

/// The reward book behind an async reader-writer lock.
pub type SharedBook = Arc<RwLock<RewardBook>>;

/// Wrap a freshly opened book for sharing across tasks.
pub fn share(book: RewardBook) -> SharedBook {
    Arc::new(RwLock::new(book))
}
