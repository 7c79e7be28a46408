// crates/ido-economics/src/math.rs
//
// Fixed-point helpers.
//
// Ratios are expressed against SCALE (1e18). Products are formed in 256 bits
// so a u128 * u128 multiplication can never wrap before it is scaled back
// down; the quotient is then range-checked into u128.

use std::panic::Location;

use ido_core::error::IdoError;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for intermediate products.
    pub struct U256(4);
}

/// Fixed-point scale for ratios (1e18).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Weight of one unit of swap volume, in SCALE units (1.0).
pub const WEIGHT: u128 = SCALE;

/// Checked arithmetic that reports failures as `IdoError::Overflow`.
pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self, IdoError>;
    fn safe_sub(self, rhs: Self) -> Result<Self, IdoError>;
    fn safe_mul(self, rhs: Self) -> Result<Self, IdoError>;
    fn safe_div(self, rhs: Self) -> Result<Self, IdoError>;
}

macro_rules! checked_impl {
    ($t:ty) => {
        impl SafeMath for $t {
            #[track_caller]
            #[inline(always)]
            fn safe_add(self, v: $t) -> Result<$t, IdoError> {
                match self.checked_add(v) {
                    Some(result) => Ok(result),
                    None => Err(overflow()),
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_sub(self, v: $t) -> Result<$t, IdoError> {
                match self.checked_sub(v) {
                    Some(result) => Ok(result),
                    None => Err(overflow()),
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_mul(self, v: $t) -> Result<$t, IdoError> {
                match self.checked_mul(v) {
                    Some(result) => Ok(result),
                    None => Err(overflow()),
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_div(self, v: $t) -> Result<$t, IdoError> {
                match self.checked_div(v) {
                    Some(result) => Ok(result),
                    None => Err(overflow()),
                }
            }
        }
    };
}

checked_impl!(u128);
checked_impl!(u64);

#[track_caller]
fn overflow() -> IdoError {
    tracing::error!("Math error thrown at {}", Location::caller());
    IdoError::Overflow
}

/// `floor(a * b / denominator)` with a 256-bit intermediate product.
///
/// Fails with `Overflow` if the denominator is zero or the quotient does not
/// fit in a u128.
#[track_caller]
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, IdoError> {
    if denominator == 0 {
        return Err(overflow());
    }
    let quotient = U256::from(a) * U256::from(b) / U256::from(denominator);
    if quotient.bits() > 128 {
        return Err(overflow());
    }
    Ok(quotient.low_u128())
}

/// `numerator / denominator` as a SCALE-denominated ratio, floored.
#[track_caller]
pub fn ratio(numerator: u64, denominator: u64) -> Result<u128, IdoError> {
    mul_div_floor(numerator as u128, SCALE, denominator as u128)
}

/// Apply a SCALE-denominated ratio to an amount, flooring the result.
#[track_caller]
pub fn apply_ratio(amount: u128, ratio: u128) -> Result<u128, IdoError> {
    mul_div_floor(amount, ratio, SCALE)
}
