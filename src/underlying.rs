//! The wrapped asset, as seen by both wrappers.
//!
//! The entry points mirror CEP-18, so any CEP-18 contract can be wrapped. The
//! token is assumed to move exactly the requested amount (no transfer fee) and
//! not to call back into the wrapper.

use odra::casper_types::U256;
use odra::prelude::*;

#[odra::external_contract]
pub trait UnderlyingToken {
    fn decimals(&self) -> u8;
    fn balance_of(&self, address: &Address) -> U256;
    fn transfer(&mut self, recipient: &Address, amount: &U256);
    fn transfer_from(&mut self, owner: &Address, recipient: &Address, amount: &U256);
}
