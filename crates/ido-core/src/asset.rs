// crates/ido-core/src/asset.rs
//
// Account and asset identifiers, and the unordered pool pair a campaign is
// bound to. Addresses are 20-byte values rendered as `0x`-prefixed hex.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdoError;

/// A 20-byte account or token address.
///
/// Used both for users (participants, registrants, the pool runtime) and
/// for asset identifiers (reward tokens, pool currencies). The zero address
/// is the null identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null identifier.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Whether this is the null identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, IdoError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| IdoError::InvalidInput(format!("Bad address {}: {}", s, e)))?;
        let array: [u8; 20] = bytes.try_into().map_err(|_| {
            IdoError::InvalidInput(format!("Address {} must be exactly 20 bytes", s))
        })?;
        Ok(Address(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = IdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = IdoError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Address::from_hex(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

/// An unordered pair of pool currencies.
///
/// Two pairs are equal for campaign matching if they hold the same two
/// assets in either order; see [`PoolPair::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolPair {
    pub token0: Address,
    pub token1: Address,
}

impl PoolPair {
    pub fn new(token0: Address, token1: Address) -> Self {
        Self { token0, token1 }
    }

    /// Order-insensitive comparison of the two asset identifiers.
    pub fn matches(&self, other: &PoolPair) -> bool {
        (self.token0 == other.token0 && self.token1 == other.token1)
            || (self.token0 == other.token1 && self.token1 == other.token0)
    }
}

impl fmt::Display for PoolPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

/// Direction of an executed swap, as reported by the pool runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// token0 in, token1 out.
    ZeroForOne,
    /// token1 in, token0 out.
    OneForZero,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn test_pair_matches_same_order() {
        let pair = PoolPair::new(addr(1), addr(2));
        assert!(pair.matches(&PoolPair::new(addr(1), addr(2))));
    }

    #[test]
    fn test_pair_matches_reversed_order() {
        let pair = PoolPair::new(addr(1), addr(2));
        assert!(pair.matches(&PoolPair::new(addr(2), addr(1))));
    }

    #[test]
    fn test_pair_mismatch() {
        let pair = PoolPair::new(addr(1), addr(2));
        assert!(!pair.matches(&PoolPair::new(addr(1), addr(3))));
        assert!(!pair.matches(&PoolPair::new(addr(1), addr(1))));
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let a = addr(0xab);
        let parsed = Address::from_hex(&a.to_string()).unwrap();
        assert_eq!(parsed, a);
        assert_eq!(a.to_string().len(), 42);
    }

    #[test]
    fn test_address_without_prefix() {
        let parsed = Address::from_hex(&"11".repeat(20)).unwrap();
        assert_eq!(parsed, addr(0x11));
    }

    #[test]
    fn test_address_wrong_length() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!addr(1).is_zero());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let json = serde_json::to_string(&addr(0x01)).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr(0x01));
    }
}
