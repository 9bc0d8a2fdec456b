pub mod bits;
pub mod common;
pub mod shares;

pub use bits::PriceScale;

use crate::error::WrapperError;
use odra::casper_types::{U256, U512};

pub trait TryAdd: Sized {
    fn try_add(self, rhs: Self) -> Result<Self, WrapperError>;
}

pub trait TrySub: Sized {
    fn try_sub(self, rhs: Self) -> Result<Self, WrapperError>;
}

pub trait TryDiv<Rhs = Self>: Sized {
    fn try_div(self, rhs: Rhs) -> Result<Self, WrapperError>;
}

pub trait TryMul<Rhs = Self>: Sized {
    fn try_mul(self, rhs: Rhs) -> Result<Self, WrapperError>;
}

impl TryAdd for U256 {
    fn try_add(self, rhs: Self) -> Result<Self, WrapperError> {
        self.checked_add(rhs).ok_or(WrapperError::Overflow)
    }
}

impl TrySub for U256 {
    fn try_sub(self, rhs: Self) -> Result<Self, WrapperError> {
        self.checked_sub(rhs).ok_or(WrapperError::Overflow)
    }
}

impl TryDiv for U256 {
    fn try_div(self, rhs: Self) -> Result<Self, WrapperError> {
        self.checked_div(rhs).ok_or(WrapperError::Overflow)
    }
}

impl TryMul for U256 {
    fn try_mul(self, rhs: Self) -> Result<Self, WrapperError> {
        self.checked_mul(rhs).ok_or(WrapperError::Overflow)
    }
}

/// `a * b / denominator`, floored, with a 512-bit intermediate product.
///
/// Fails with [`WrapperError::Overflow`] when the denominator is zero or the
/// quotient does not fit in 256 bits.
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> Result<U256, WrapperError> {
    if denominator.is_zero() {
        return Err(WrapperError::Overflow);
    }
    let quotient = widen(a)
        .checked_mul(widen(b))
        .ok_or(WrapperError::Overflow)?
        / widen(denominator);
    narrow(quotient)
}

fn widen(value: U256) -> U512 {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    U512::from_little_endian(&bytes)
}

fn narrow(value: U512) -> Result<U256, WrapperError> {
    if value > widen(U256::MAX) {
        return Err(WrapperError::Overflow);
    }
    let mut bytes = [0u8; 64];
    value.to_little_endian(&mut bytes);
    Ok(U256::from_little_endian(&bytes[..32]))
}
