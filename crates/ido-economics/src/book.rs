// crates/ido-economics/src/book.rs
//
// RewardBook: the single context object owning the campaign registry, the
// contribution ledger and the share totals, plus the store they persist to.
//
// Constructed once per deployment and passed to whoever drives it. Mutating
// operations take `&mut self`, so callers serialize writers themselves (the
// daemon wraps the book in an `RwLock`).
//
// Every mutation follows the same shape:
//   1. compute the new records on copies (nothing touched yet)
//   2. commit them to the store as one atomic batch
//   3. apply the same batch to the in-memory tables
// A failure at 1 or 2 leaves memory and storage exactly as they were.
//
// Escrow requests are staged in the same batch as the operation that
// produced them and wait in the outbox until `acknowledge_escrow` records
// that the vault accepted them.

use std::collections::BTreeMap;
use std::sync::Arc;

use ido_core::asset::{Address, PoolPair};
use ido_core::batch::{LedgerBatch, LedgerWrite};
use ido_core::campaign::{Campaign, CampaignId};
use ido_core::contribution::ContributionState;
use ido_core::error::IdoError;
use ido_core::escrow::EscrowRequest;
use ido_core::traits::LedgerStore;

use crate::accountant::ShareAccountant;
use crate::allocation::AllocationCalculator;
use crate::ledger::ContributionLedger;
use crate::math::SafeMath;
use crate::registry::CampaignRegistry;
use crate::settlement::{ClaimSettlement, Settlement};
use crate::totals::GlobalShareTotals;

/// Parameters for registering a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCampaign {
    pub id: CampaignId,
    pub reward_token: Address,
    pub pair: PoolPair,
    pub registrant: Address,
    pub total_allocation: u128,
    pub window_start: u64,
    pub window_end: u64,
}

/// The rewards engine state and its persistence handle.
pub struct RewardBook {
    registry: CampaignRegistry,
    ledger: ContributionLedger,
    totals: GlobalShareTotals,
    outbox: BTreeMap<String, EscrowRequest>,
    store: Arc<dyn LedgerStore>,
}

impl RewardBook {
    /// Open a book over `store`, replaying everything it holds.
    pub fn open(store: Arc<dyn LedgerStore>) -> Result<Self, IdoError> {
        let mut book = Self {
            registry: CampaignRegistry::new(),
            ledger: ContributionLedger::new(),
            totals: GlobalShareTotals::new(),
            outbox: BTreeMap::new(),
            store,
        };

        let snapshot = book.store.load()?;
        for write in snapshot {
            book.apply(write);
        }

        tracing::info!(
            "Reward book opened: {} campaigns, {} contribution records, {} total shares, {} undelivered escrow requests",
            book.registry.len(),
            book.ledger.len(),
            book.totals.total_shares(),
            book.outbox.len()
        );
        Ok(book)
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Register a campaign and return the escrow deposit to request.
    ///
    /// The deposit request is committed to the outbox together with the
    /// campaign and returned only if that commit succeeded.
    pub fn register(
        &mut self,
        params: RegisterCampaign,
        now: u64,
    ) -> Result<EscrowRequest, IdoError> {
        let (campaign, deposit) = self.registry.plan_register(
            params.id,
            params.reward_token,
            params.pair,
            params.registrant,
            params.total_allocation,
            params.window_start,
            params.window_end,
            now,
        )?;

        self.commit(LedgerBatch::from(vec![
            LedgerWrite::Campaign(campaign.clone()),
            LedgerWrite::PendingEscrow(deposit.clone()),
        ]))?;

        tracing::info!(
            "Registered campaign {} on {} ({} of {}, window [{}, {}])",
            campaign.id,
            campaign.pair,
            campaign.total_allocation,
            campaign.reward_token,
            campaign.window_start,
            campaign.window_end
        );
        Ok(deposit)
    }

    /// Credit `volume` units of swap volume. Returns the shares credited.
    ///
    /// Swaps are not window-gated.
    pub fn record_swap(
        &mut self,
        user: Address,
        campaign_id: CampaignId,
        pair: &PoolPair,
        volume: u128,
    ) -> Result<u128, IdoError> {
        self.registry.get_matching(&campaign_id, pair)?;

        let mut state = self.ledger.state(&user, &campaign_id);
        let credit = ShareAccountant::swap_shares(volume)?;
        state.accrued_shares = state.accrued_shares.safe_add(credit)?;

        self.commit_contribution(user, campaign_id, state, credit)
    }

    /// Record liquidity added at `now`. Returns the shares credited.
    pub fn record_liquidity_added(
        &mut self,
        user: Address,
        campaign_id: CampaignId,
        pair: &PoolPair,
        amount: u128,
        now: u64,
    ) -> Result<u128, IdoError> {
        let campaign = self.registry.get_matching(&campaign_id, pair)?;

        let mut state = self.ledger.state(&user, &campaign_id);
        let credit = ShareAccountant::liquidity_added(campaign, &mut state, amount, now)?;

        self.commit_contribution(user, campaign_id, state, credit)
    }

    /// Record liquidity removed at `now`. Returns the shares credited.
    pub fn record_liquidity_removed(
        &mut self,
        user: Address,
        campaign_id: CampaignId,
        pair: &PoolPair,
        amount: u128,
        now: u64,
    ) -> Result<u128, IdoError> {
        let campaign = self.registry.get_matching(&campaign_id, pair)?;

        let mut state = self.ledger.state(&user, &campaign_id);
        let credit = ShareAccountant::liquidity_removed(campaign, &mut state, amount, now)?;

        self.commit_contribution(user, campaign_id, state, credit)
    }

    /// Settle a claim and return the payout request.
    ///
    /// Every still-open liquidity period in the campaign is closed at window
    /// end in the same batch, so all claimants are priced against the same
    /// finalized denominator regardless of claim order.
    pub fn claim(
        &mut self,
        user: Address,
        campaign_id: CampaignId,
        now: u64,
    ) -> Result<EscrowRequest, IdoError> {
        let (writes, settlement) = self.plan_claim(user, campaign_id, now)?;
        self.commit(LedgerBatch::from(writes))?;

        tracing::info!(
            "Claim settled: {} receives {} from campaign {} ({} shares burned, {} left in pool)",
            user,
            settlement.allocation,
            campaign_id,
            settlement.burned_shares,
            settlement.campaign.reward_pool
        );
        Ok(settlement.payout)
    }

    // ---------------------------------------------------------------
    // Queries (no side effects)
    // ---------------------------------------------------------------

    /// What `claim` would do at `now`, without committing anything.
    pub fn preview_claim(
        &self,
        user: Address,
        campaign_id: CampaignId,
        now: u64,
    ) -> Result<Settlement, IdoError> {
        self.plan_claim(user, campaign_id, now)
            .map(|(_, settlement)| settlement)
    }

    /// A user's global weighted-share total.
    pub fn get_user_shares(&self, user: &Address) -> u128 {
        self.totals.user_shares(user)
    }

    /// Finalized weighted shares for `(user, campaign)`.
    pub fn get_accrued_shares(&self, user: &Address, campaign_id: &CampaignId) -> u128 {
        self.ledger.accrued_shares(user, campaign_id)
    }

    /// Snapshot estimate of the user's claimable amount.
    ///
    /// Uses finalized shares only; an open period is credited at claim time.
    pub fn get_user_allocation(
        &self,
        user: &Address,
        campaign_id: &CampaignId,
    ) -> Result<u128, IdoError> {
        let campaign = self.registry.get(campaign_id)?;
        AllocationCalculator::compute(
            self.ledger.accrued_shares(user, campaign_id),
            campaign.reward_pool,
            self.totals.campaign_shares(campaign_id),
        )
    }

    /// Escrow requests committed but not yet accepted by the vault, oldest key first.
    pub fn pending_escrow(&self) -> Vec<EscrowRequest> {
        self.outbox.values().cloned().collect()
    }

    /// Record that the vault accepted `request`. A no-op if it is not pending.
    pub fn acknowledge_escrow(&mut self, request: &EscrowRequest) -> Result<(), IdoError> {
        let key = request.key();
        if !self.outbox.contains_key(&key) {
            return Ok(());
        }
        self.commit(LedgerBatch::from(vec![LedgerWrite::EscrowDelivered(key)]))?;
        tracing::debug!("Escrow request delivered: {}", request.key());
        Ok(())
    }

    pub fn get_campaign(&self, campaign_id: &CampaignId) -> Result<&Campaign, IdoError> {
        self.registry.get(campaign_id)
    }

    pub fn contribution(&self, user: &Address, campaign_id: &CampaignId) -> ContributionState {
        self.ledger.state(user, campaign_id)
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &Campaign> {
        self.registry.campaigns()
    }

    pub fn total_shares(&self) -> u128 {
        self.totals.total_shares()
    }

    pub fn campaign_shares(&self, campaign_id: &CampaignId) -> u128 {
        self.totals.campaign_shares(campaign_id)
    }

    /// Check the aggregate invariants against the detailed records.
    ///
    /// - Σ user_shares == total_shares
    /// - for each campaign, Σ accrued_shares == campaign_shares
    pub fn verify_invariants(&self) -> Result<(), IdoError> {
        let user_sum = self.totals.sum_user_shares()?;
        if user_sum != self.totals.total_shares() {
            return Err(IdoError::InvariantViolation(format!(
                "user shares sum to {} but total is {}",
                user_sum,
                self.totals.total_shares()
            )));
        }

        for campaign in self.registry.campaigns() {
            let accrued = self
                .ledger
                .contributors(&campaign.id)
                .try_fold(0u128, |acc, (_, s)| acc.safe_add(s.accrued_shares))?;
            let recorded = self.totals.campaign_shares(&campaign.id);
            if accrued != recorded {
                return Err(IdoError::InvariantViolation(format!(
                    "campaign {} accrues {} but records {}",
                    campaign.id, accrued, recorded
                )));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    /// Stage a contribution state change with its share credit, then commit.
    ///
    /// Contributions for a user who already claimed the campaign are dropped.
    fn commit_contribution(
        &mut self,
        user: Address,
        campaign_id: CampaignId,
        state: ContributionState,
        credit: u128,
    ) -> Result<u128, IdoError> {
        if state.claimed {
            tracing::debug!(
                "Ignoring contribution from {} to claimed-out campaign {}",
                user,
                campaign_id
            );
            return Ok(0);
        }
        if credit == 0 && state == self.ledger.state(&user, &campaign_id) {
            return Ok(0);
        }

        let mut writes = vec![ContributionLedger::plan(user, campaign_id, state)];
        writes.extend(self.totals.plan_adjust(user, campaign_id, credit, 0)?);
        self.commit(LedgerBatch::from(writes))?;

        tracing::debug!(
            "Credited {} shares to {} in campaign {}",
            credit,
            user,
            campaign_id
        );
        Ok(credit)
    }

    /// Stage a claim: close other contributors' open periods, then settle `user`.
    fn plan_claim(
        &self,
        user: Address,
        campaign_id: CampaignId,
        now: u64,
    ) -> Result<(Vec<LedgerWrite>, Settlement), IdoError> {
        let campaign = self.registry.get(&campaign_id)?;
        let mut totals = self.totals.clone();
        let mut writes = Vec::new();

        if campaign.has_ended(now) {
            for (other, state) in self.ledger.contributors(&campaign_id) {
                if *other == user || !state.is_open() || state.claimed {
                    continue;
                }
                let mut closed = state.clone();
                let credit = ShareAccountant::finalize_open_period(campaign, &mut closed)?;
                let adjust = totals.plan_adjust(*other, campaign_id, credit, 0)?;
                totals.apply_writes(&adjust);
                writes.push(ContributionLedger::plan(*other, campaign_id, closed));
                writes.extend(adjust);
            }
        }

        let state = self.ledger.state(&user, &campaign_id);
        let settlement = ClaimSettlement::settle(
            campaign,
            &state,
            totals.campaign_shares(&campaign_id),
            user,
            now,
        )?;

        writes.push(LedgerWrite::Campaign(settlement.campaign.clone()));
        writes.push(LedgerWrite::PendingEscrow(settlement.payout.clone()));
        writes.push(ContributionLedger::plan(
            user,
            campaign_id,
            settlement.state.clone(),
        ));
        writes.extend(totals.plan_adjust(
            user,
            campaign_id,
            settlement.finalized_credit,
            settlement.burned_shares,
        )?);
        Ok((writes, settlement))
    }

    /// Persist a batch, then apply it to memory.
    fn commit(&mut self, batch: LedgerBatch) -> Result<(), IdoError> {
        self.store.commit(&batch)?;
        for write in batch {
            self.apply(write);
        }
        Ok(())
    }

    fn apply(&mut self, write: LedgerWrite) {
        match write {
            LedgerWrite::Campaign(campaign) => self.registry.apply(campaign),
            LedgerWrite::Contribution {
                user,
                campaign,
                state,
            } => self.ledger.apply(user, campaign, state),
            LedgerWrite::UserShares { user, shares } => self.totals.apply_user(user, shares),
            LedgerWrite::CampaignShares { campaign, shares } => {
                self.totals.apply_campaign(campaign, shares)
            }
            LedgerWrite::TotalShares(total) => self.totals.apply_total(total),
            LedgerWrite::PendingEscrow(request) => {
                self.outbox.insert(request.key(), request);
            }
            LedgerWrite::EscrowDelivered(key) => {
                self.outbox.remove(&key);
            }
        }
    }
}
