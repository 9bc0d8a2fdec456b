//! Bit arithmetic for the elastic wrapper.
//!
//! Every account balance is held in bits. Underlying units map to bits by a
//! fixed factor, wrapper units by a factor that moves with the price.

use {
    crate::{
        error::WrapperError,
        math::{common::*, TryDiv, TryMul},
    },
    odra::casper_types::U256,
};

/// Exact: `u_amount * BITS_PER_UNDERLYING`.
pub fn u_amount_to_bits(u_amount: U256) -> Result<U256, WrapperError> {
    u_amount.try_mul(BITS_PER_UNDERLYING)
}

/// Floors: bits below one underlying unit are dropped.
pub fn bits_to_u_amount(bits: U256) -> U256 {
    bits / BITS_PER_UNDERLYING
}

/// Largest accepted price for an oracle reporting `price_decimals` decimals.
pub fn max_price(price_decimals: u8) -> Result<U256, WrapperError> {
    let exponent = MAX_PRICE_EXPONENTS
        .get(price_decimals as usize)
        .ok_or(WrapperError::InvalidPriceDecimals)?;
    Ok((U256::one() << *exponent) - U256::one())
}

/// Price-dependent scale of the elastic ledger, fixed per oracle.
#[odra::odra_type]
pub struct PriceScale {
    /// Decimals reported by the oracle this scale was built for.
    pub price_decimals: u8,
    /// `BITS_PER_UNDERLYING * 10^price_decimals`.
    pub price_bits: U256,
    /// Prices above this are clamped.
    pub max_price: U256,
}

impl PriceScale {
    /// Scale for an oracle reporting `price_decimals` decimals, at most 18.
    pub fn for_decimals(price_decimals: u8) -> Result<Self, WrapperError> {
        if price_decimals > MAX_PRICE_DECIMALS {
            return Err(WrapperError::InvalidPriceDecimals);
        }
        Ok(Self {
            price_decimals,
            price_bits: BITS_PER_UNDERLYING.try_mul(U256::exp10(price_decimals as usize))?,
            max_price: max_price(price_decimals)?,
        })
    }

    pub fn clamp(&self, price: U256) -> U256 {
        price.min(self.max_price)
    }

    pub fn bits_per_token(&self, price: U256) -> Result<U256, WrapperError> {
        self.price_bits.try_div(price)
    }

    pub fn amount_to_bits(&self, amount: U256, price: U256) -> Result<U256, WrapperError> {
        amount.try_mul(self.bits_per_token(price)?)
    }

    pub fn bits_to_amount(&self, bits: U256, price: U256) -> Result<U256, WrapperError> {
        bits.try_div(self.bits_per_token(price)?)
    }
}
