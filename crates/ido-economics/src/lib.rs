// crates/ido-economics/src/lib.rs
//
// ido-economics: Contribution-weighted share accounting and reward allocation
// for IDO liquidity campaigns.
//
// Raw pool activity (swap volume, liquidity added/removed) is converted into
// weighted shares. Liquidity earns linearly less weight the later it arrives
// in the campaign window. After the window closes each user claims a pro-rata
// share of the campaign's remaining reward pool, exactly once.
//
// All shares and token amounts are integers in base units. Ratios use a
// 1e18 fixed-point scale and every division rounds toward zero, so rounding
// can only under-pay, never over-draw a pool.

pub mod accountant;
pub mod allocation;
pub mod book;
pub mod hooks;
pub mod ledger;
pub mod math;
pub mod registry;
pub mod settlement;
pub mod totals;

// Re-export key types for ergonomic access from downstream crates.
pub use accountant::ShareAccountant;
pub use allocation::AllocationCalculator;
pub use book::{RegisterCampaign, RewardBook};
pub use hooks::PoolHooks;
pub use ledger::ContributionLedger;
pub use math::{SafeMath, SCALE, WEIGHT};
pub use registry::CampaignRegistry;
pub use settlement::{ClaimSettlement, Settlement};
pub use totals::GlobalShareTotals;
