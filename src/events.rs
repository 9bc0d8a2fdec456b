// Events emitted by the wrappers and the mock token.

use odra::casper_types::U256;
use odra::prelude::*;

#[odra::event]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

/// Wrapper units issued against `underlying` units pulled in.
#[odra::event]
pub struct Mint {
    pub recipient: Address,
    pub amount: U256,
    pub underlying: U256,
}

/// Wrapper units destroyed for `underlying` units paid out.
#[odra::event]
pub struct Burn {
    pub owner: Address,
    pub amount: U256,
    pub underlying: U256,
}

#[odra::event]
pub struct Rebase {
    pub epoch: u64,
    pub price: U256,
}

#[odra::event]
pub struct OracleUpdated {
    pub oracle: Address,
    pub price_decimals: u8,
}

#[odra::event]
pub struct InitialDepositLocked {
    pub initializer: Address,
    pub underlying: U256,
    pub shares: U256,
}
