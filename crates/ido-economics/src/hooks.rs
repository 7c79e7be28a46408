// crates/ido-economics/src/hooks.rs
//
// Inbound adapter for the pool runtime.
//
// The runtime notifies every executed swap and every liquidity change. Only
// the configured runtime address may deliver notifications; anything else is
// rejected before the book is touched. Authentication of the caller itself
// happens upstream.

use ido_core::asset::{Address, PoolPair, SwapDirection};
use ido_core::campaign::CampaignId;
use ido_core::error::IdoError;

use crate::book::RewardBook;

/// Gatekeeper translating runtime notifications into book operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolHooks {
    runtime: Address,
}

impl PoolHooks {
    /// Accept notifications only from `runtime`.
    pub fn new(runtime: Address) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> Address {
        self.runtime
    }

    fn authorize(&self, caller: Address) -> Result<(), IdoError> {
        if caller != self.runtime {
            tracing::warn!("Rejected notification from unauthorized caller {}", caller);
            return Err(IdoError::Unauthorized(caller));
        }
        Ok(())
    }

    /// A swap executed. Volume is the absolute value of `signed_volume`.
    #[allow(clippy::too_many_arguments)]
    pub fn on_swap(
        &self,
        book: &mut RewardBook,
        caller: Address,
        pair: &PoolPair,
        user: Address,
        campaign: CampaignId,
        signed_volume: i128,
        direction: SwapDirection,
    ) -> Result<u128, IdoError> {
        self.authorize(caller)?;
        tracing::trace!(
            "Swap {:?} of {} by {} on {}",
            direction,
            signed_volume,
            user,
            pair
        );
        book.record_swap(user, campaign, pair, signed_volume.unsigned_abs())
    }

    /// Liquidity was added to the pool at `timestamp`.
    #[allow(clippy::too_many_arguments)]
    pub fn on_liquidity_added(
        &self,
        book: &mut RewardBook,
        caller: Address,
        pair: &PoolPair,
        user: Address,
        campaign: CampaignId,
        amount: u128,
        timestamp: u64,
    ) -> Result<u128, IdoError> {
        self.authorize(caller)?;
        book.record_liquidity_added(user, campaign, pair, amount, timestamp)
    }

    /// Liquidity was removed from the pool at `timestamp`.
    #[allow(clippy::too_many_arguments)]
    pub fn on_liquidity_removed(
        &self,
        book: &mut RewardBook,
        caller: Address,
        pair: &PoolPair,
        user: Address,
        campaign: CampaignId,
        amount: u128,
        timestamp: u64,
    ) -> Result<u128, IdoError> {
        self.authorize(caller)?;
        book.record_liquidity_removed(user, campaign, pair, amount, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::RegisterCampaign;
    use ido_store::InMemoryStore;
    use std::sync::Arc;

    const T: u64 = 1_000;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn setup() -> (RewardBook, PoolHooks, CampaignId) {
        let mut book = RewardBook::open(Arc::new(InMemoryStore::new())).unwrap();
        let id = CampaignId::generate();
        book.register(
            RegisterCampaign {
                id,
                reward_token: addr(9),
                pair: PoolPair::new(addr(1), addr(2)),
                registrant: addr(7),
                total_allocation: 1_000,
                window_start: T,
                window_end: T + 100,
            },
            T,
        )
        .unwrap();
        (book, PoolHooks::new(addr(0xee)), id)
    }

    #[test]
    fn test_unauthorized_caller_rejected() {
        let (mut book, hooks, id) = setup();
        let pair = PoolPair::new(addr(1), addr(2));

        let result = hooks.on_swap(&mut book, addr(0x66), &pair, addr(3), id, 10, SwapDirection::ZeroForOne);
        assert_eq!(result, Err(IdoError::Unauthorized(addr(0x66))));
        let result = hooks.on_liquidity_added(&mut book, addr(0x66), &pair, addr(3), id, 10, T);
        assert_eq!(result, Err(IdoError::Unauthorized(addr(0x66))));
        let result = hooks.on_liquidity_removed(&mut book, addr(0x66), &pair, addr(3), id, 10, T);
        assert_eq!(result, Err(IdoError::Unauthorized(addr(0x66))));

        assert_eq!(book.total_shares(), 0);
    }

    #[test]
    fn test_negative_swap_volume_counts_absolute() {
        let (mut book, hooks, id) = setup();
        let pair = PoolPair::new(addr(2), addr(1));
        let credited = hooks
            .on_swap(&mut book, addr(0xee), &pair, addr(3), id, -75, SwapDirection::OneForZero)
            .unwrap();
        assert_eq!(credited, 75);
        assert_eq!(book.get_user_shares(&addr(3)), 75);
    }

    #[test]
    fn test_liquidity_round_trip_through_hooks() {
        let (mut book, hooks, id) = setup();
        let pair = PoolPair::new(addr(1), addr(2));
        hooks
            .on_liquidity_added(&mut book, addr(0xee), &pair, addr(3), id, 100, T + 1)
            .unwrap();
        hooks
            .on_liquidity_removed(&mut book, addr(0xee), &pair, addr(3), id, 100, T + 50)
            .unwrap();
        assert_eq!(book.get_accrued_shares(&addr(3), &id), 99 + 49);
        assert!(!book.contribution(&addr(3), &id).is_open());
    }
}
