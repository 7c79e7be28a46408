// crates/ido-daemon/src/commands.rs
//
// Wire format of the daemon's input stream: one JSON object per line,
// externally tagged by command name, e.g.
//
//   {"swap":{"caller":"0x..","pair":{"token0":"0x..","token1":"0x.."},
//            "user":"0x..","campaign":"<uuid>","signed_volume":-500,
//            "direction":"zero_for_one"}}

use serde::{Deserialize, Serialize};

use ido_core::{Address, CampaignId, PoolPair, SwapDirection};

/// A single inbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Register a campaign. A fresh id is generated when `campaign` is omitted;
    /// `now` defaults to the wall clock.
    Register {
        campaign: Option<CampaignId>,
        reward_token: Address,
        pair: PoolPair,
        registrant: Address,
        total_allocation: u128,
        window_start: u64,
        window_end: u64,
        now: Option<u64>,
    },
    /// Swap executed notification from the pool runtime.
    Swap {
        caller: Address,
        pair: PoolPair,
        user: Address,
        campaign: CampaignId,
        signed_volume: i128,
        direction: SwapDirection,
    },
    /// Liquidity added notification from the pool runtime.
    LiquidityAdded {
        caller: Address,
        pair: PoolPair,
        user: Address,
        campaign: CampaignId,
        amount: u128,
        timestamp: u64,
    },
    /// Liquidity removed notification from the pool runtime.
    LiquidityRemoved {
        caller: Address,
        pair: PoolPair,
        user: Address,
        campaign: CampaignId,
        amount: u128,
        timestamp: u64,
    },
    /// A user claims their allocation. `now` defaults to the wall clock.
    Claim {
        user: Address,
        campaign: CampaignId,
        now: Option<u64>,
    },
}

impl Command {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Swap { .. } => "swap",
            Command::LiquidityAdded { .. } => "liquidity_added",
            Command::LiquidityRemoved { .. } => "liquidity_removed",
            Command::Claim { .. } => "claim",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_addr(byte: &str) -> String {
        format!("0x{}", byte.repeat(20))
    }

    #[test]
    fn test_parse_swap() {
        let line = format!(
            r#"{{"swap":{{"caller":"{}","pair":{{"token0":"{}","token1":"{}"}},"user":"{}","campaign":"0190c8a4-0000-7000-8000-000000000001","signed_volume":-500,"direction":"one_for_zero"}}}}"#,
            hex_addr("ee"),
            hex_addr("01"),
            hex_addr("02"),
            hex_addr("03")
        );
        let command: Command = serde_json::from_str(&line).unwrap();
        match command {
            Command::Swap {
                signed_volume,
                direction,
                ..
            } => {
                assert_eq!(signed_volume, -500);
                assert_eq!(direction, SwapDirection::OneForZero);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_claim_without_now() {
        let line = format!(
            r#"{{"claim":{{"user":"{}","campaign":"0190c8a4-0000-7000-8000-000000000001"}}}}"#,
            hex_addr("03")
        );
        let command: Command = serde_json::from_str(&line).unwrap();
        assert_eq!(command.name(), "claim");
        assert!(matches!(command, Command::Claim { now: None, .. }));
    }

    #[test]
    fn test_large_amounts_survive() {
        let command = Command::LiquidityAdded {
            caller: Address([0xee; 20]),
            pair: PoolPair::new(Address([1; 20]), Address([2; 20])),
            user: Address([3; 20]),
            campaign: CampaignId::generate(),
            amount: u128::MAX,
            timestamp: 1,
        };
        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<Command>(r#"{"mint":{}}"#).is_err());
    }
}
