// crates/ido-daemon/src/ingest.rs
//
// Notification ingest loop.
//
// Reads JSON-lines commands and applies each one to the reward book under the
// write lock. Escrow requests are committed to the book's outbox with the
// command itself; after every command the outbox is drained into the vault
// and each accepted request is acknowledged. A vault outage leaves requests
// pending for the next drain instead of failing the command.
// Rejected commands are logged and skipped; the core's error is reported
// unchanged.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use ido_core::{CampaignId, EscrowRequest, IdoError, Vault};
use ido_economics::{PoolHooks, RegisterCampaign, RewardBook};

use crate::commands::Command;
use crate::shared::SharedBook;

/// Counters reported when the stream ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub applied: u64,
    pub rejected: u64,
    pub malformed: u64,
}

/// Dispatches commands to the book and escrow requests to the vault.
pub struct Ingestor {
    book: SharedBook,
    hooks: PoolHooks,
    vault: Arc<dyn Vault>,
}

impl Ingestor {
    pub fn new(book: SharedBook, hooks: PoolHooks, vault: Arc<dyn Vault>) -> Self {
        Self { book, hooks, vault }
    }

    /// Apply one command. Returns the escrow request it produced, if any.
    ///
    /// The request is already committed when this returns; whether the vault
    /// has accepted it yet shows in `RewardBook::pending_escrow`.
    pub async fn handle(&self, command: Command) -> Result<Option<EscrowRequest>, IdoError> {
        let mut book = self.book.write().await;
        let request = match command {
            Command::Register {
                campaign,
                reward_token,
                pair,
                registrant,
                total_allocation,
                window_start,
                window_end,
                now,
            } => {
                let params = RegisterCampaign {
                    id: campaign.unwrap_or_else(CampaignId::generate),
                    reward_token,
                    pair,
                    registrant,
                    total_allocation,
                    window_start,
                    window_end,
                };
                Some(book.register(params, now.unwrap_or_else(wall_clock))?)
            }
            Command::Swap {
                caller,
                pair,
                user,
                campaign,
                signed_volume,
                direction,
            } => {
                self.hooks.on_swap(
                    &mut book,
                    caller,
                    &pair,
                    user,
                    campaign,
                    signed_volume,
                    direction,
                )?;
                None
            }
            Command::LiquidityAdded {
                caller,
                pair,
                user,
                campaign,
                amount,
                timestamp,
            } => {
                self.hooks.on_liquidity_added(
                    &mut book, caller, &pair, user, campaign, amount, timestamp,
                )?;
                None
            }
            Command::LiquidityRemoved {
                caller,
                pair,
                user,
                campaign,
                amount,
                timestamp,
            } => {
                self.hooks.on_liquidity_removed(
                    &mut book, caller, &pair, user, campaign, amount, timestamp,
                )?;
                None
            }
            Command::Claim {
                user,
                campaign,
                now,
            } => Some(book.claim(user, campaign, now.unwrap_or_else(wall_clock))?),
        };

        self.deliver_pending(&mut book);
        Ok(request)
    }

    /// Drain the outbox at startup, before any new command arrives.
    pub async fn redeliver(&self) -> usize {
        let mut book = self.book.write().await;
        self.deliver_pending(&mut book)
    }

    /// Submit pending escrow requests in key order, acknowledging each one the
    /// vault accepts. Stops at the first vault failure. Returns how many
    /// requests are still pending.
    fn deliver_pending(&self, book: &mut RewardBook) -> usize {
        for request in book.pending_escrow() {
            if let Err(e) = self.vault.submit(&request) {
                tracing::warn!("Vault rejected {}, will retry: {}", request.key(), e);
                break;
            }
            if let Err(e) = book.acknowledge_escrow(&request) {
                tracing::warn!(
                    "Delivered {} but could not acknowledge it, it will be resent: {}",
                    request.key(),
                    e
                );
                break;
            }
        }
        book.pending_escrow().len()
    }

    /// Consume `reader` line by line until EOF or Ctrl-C.
    pub async fn run<R>(&self, reader: R) -> Result<IngestStats, IdoError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut stats = IngestStats::default();

        let pending = self.redeliver().await;
        if pending > 0 {
            tracing::warn!("{} escrow requests still undelivered", pending);
        }

        loop {
            let line = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ingest received shutdown signal");
                    break;
                }
                next = lines.next_line() => next
                    .map_err(|e| IdoError::InvalidInput(format!("Input read failed: {}", e)))?,
            };
            let Some(line) = line else {
                break;
            };

            self.process_line(&line, &mut stats).await;
        }

        tracing::info!(
            "Ingest finished: {} applied, {} rejected, {} malformed",
            stats.applied,
            stats.rejected,
            stats.malformed
        );
        Ok(stats)
    }

    async fn process_line(&self, line: &str, stats: &mut IngestStats) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let command: Command = match serde_json::from_str(trimmed) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Skipping malformed line: {}", e);
                stats.malformed += 1;
                return;
            }
        };

        let name = command.name();
        match self.handle(command).await {
            Ok(_) => {
                stats.applied += 1;
            }
            Err(e) => {
                tracing::warn!("Rejected {}: {}", name, e);
                stats.rejected += 1;
            }
        }
    }
}

fn wall_clock() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use ido_core::{Address, PoolPair, SwapDirection};
    use ido_store::InMemoryStore;

    use crate::shared::share;

    const T: u64 = 10_000;

    #[derive(Default)]
    struct RecordingVault {
        requests: Mutex<Vec<EscrowRequest>>,
        down: AtomicBool,
    }

    impl Vault for RecordingVault {
        fn submit(&self, request: &EscrowRequest) -> Result<(), IdoError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(IdoError::Storage("vault down".to_string()));
            }
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn pair() -> PoolPair {
        PoolPair::new(addr(1), addr(2))
    }

    fn setup() -> (Ingestor, Arc<RecordingVault>, SharedBook) {
        let book = share(RewardBook::open(Arc::new(InMemoryStore::new())).unwrap());
        let vault = Arc::new(RecordingVault::default());
        let ingestor = Ingestor::new(book.clone(), PoolHooks::new(addr(0xee)), vault.clone());
        (ingestor, vault, book)
    }

    fn register(id: CampaignId) -> Command {
        Command::Register {
            campaign: Some(id),
            reward_token: addr(9),
            pair: pair(),
            registrant: addr(7),
            total_allocation: 1_000,
            window_start: T,
            window_end: T + 100,
            now: Some(T),
        }
    }

    #[tokio::test]
    async fn test_register_and_claim_reach_vault() {
        let (ingestor, vault, _) = setup();
        let id = CampaignId::generate();

        ingestor.handle(register(id)).await.unwrap();
        ingestor
            .handle(Command::Swap {
                caller: addr(0xee),
                pair: pair(),
                user: addr(3),
                campaign: id,
                signed_volume: 10,
                direction: SwapDirection::ZeroForOne,
            })
            .await
            .unwrap();
        ingestor
            .handle(Command::Claim {
                user: addr(3),
                campaign: id,
                now: Some(T + 101),
            })
            .await
            .unwrap();

        let requests = vault.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], EscrowRequest::Deposit { amount: 1_000, .. }));
        assert!(matches!(requests[1], EscrowRequest::Payout { amount: 1_000, .. }));
    }

    #[tokio::test]
    async fn test_failed_command_emits_nothing() {
        let (ingestor, vault, book) = setup();
        let id = CampaignId::generate();
        ingestor.handle(register(id)).await.unwrap();

        let result = ingestor
            .handle(Command::Claim {
                user: addr(3),
                campaign: id,
                now: Some(T + 50),
            })
            .await;
        assert!(matches!(result, Err(IdoError::CampaignNotEnded { .. })));
        assert_eq!(vault.requests.lock().unwrap().len(), 1);
        assert_eq!(book.read().await.get_campaign(&id).unwrap().reward_pool, 1_000);
    }

    #[tokio::test]
    async fn test_run_counts_lines() {
        let (ingestor, _, book) = setup();
        let id = CampaignId::generate();

        let good = serde_json::to_string(&register(id)).unwrap();
        let unauthorized = serde_json::to_string(&Command::LiquidityAdded {
            caller: addr(0x66),
            pair: pair(),
            user: addr(3),
            campaign: id,
            amount: 100,
            timestamp: T + 1,
        })
        .unwrap();
        let input = format!("{}\n\n# comment\nnot json\n{}\n", good, unauthorized);

        let stats = ingestor.run(input.as_bytes()).await.unwrap();
        assert_eq!(
            stats,
            IngestStats {
                applied: 1,
                rejected: 1,
                malformed: 1
            }
        );
        assert_eq!(book.read().await.total_shares(), 0);
    }

    #[tokio::test]
    async fn test_vault_outage_keeps_requests_pending() {
        let (ingestor, vault, book) = setup();
        let id = CampaignId::generate();
        vault.down.store(true, Ordering::SeqCst);

        ingestor.handle(register(id)).await.unwrap();
        ingestor
            .handle(Command::Swap {
                caller: addr(0xee),
                pair: pair(),
                user: addr(3),
                campaign: id,
                signed_volume: 10,
                direction: SwapDirection::ZeroForOne,
            })
            .await
            .unwrap();
        let payout = ingestor
            .handle(Command::Claim {
                user: addr(3),
                campaign: id,
                now: Some(T + 101),
            })
            .await
            .unwrap();
        assert!(matches!(payout, Some(EscrowRequest::Payout { amount: 1_000, .. })));
        assert!(vault.requests.lock().unwrap().is_empty());
        assert_eq!(book.read().await.pending_escrow().len(), 2);

        // The claim itself is settled; repeating it changes nothing.
        let again = ingestor
            .handle(Command::Claim {
                user: addr(3),
                campaign: id,
                now: Some(T + 102),
            })
            .await;
        assert!(matches!(again, Err(IdoError::NothingToClaim { .. })));

        vault.down.store(false, Ordering::SeqCst);
        assert_eq!(ingestor.redeliver().await, 0);
        assert!(book.read().await.pending_escrow().is_empty());

        let requests = vault.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], EscrowRequest::Deposit { amount: 1_000, .. }));
        assert_eq!(Some(requests[1].clone()), payout);
    }
}
