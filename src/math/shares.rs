//! Share arithmetic for the share wrapper. The rate is never stored: callers
//! pass the live underlying balance and share supply on every call.

use {
    crate::{error::WrapperError, math::mul_div_floor},
    odra::casper_types::U256,
};

/// Shares worth `u_amount` of underlying, floored.
pub fn from_underlying(
    u_amount: U256,
    total_underlying: U256,
    total_shares: U256,
) -> Result<U256, WrapperError> {
    mul_div_floor(u_amount, total_shares, total_underlying)
}

/// Underlying backing `amount` shares, floored.
pub fn to_underlying(
    amount: U256,
    total_underlying: U256,
    total_shares: U256,
) -> Result<U256, WrapperError> {
    mul_div_floor(amount, total_underlying, total_shares)
}
