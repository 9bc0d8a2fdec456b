// Ledger primitives shared by the wrapper contracts.

pub mod allowances;
pub mod balance_ledger;
pub mod bit_ledger;
pub mod checkpoint;

pub use allowances::*;
pub use balance_ledger::*;
pub use bit_ledger::*;
pub use checkpoint::*;

use crate::error::WrapperError;
use odra::casper_types::account::AccountHash;
use odra::prelude::*;

/// The all-zero account hash. Casper has no zero address, so this stands in
/// for it: nothing can be minted, deposited or transferred to it.
pub fn null_address() -> Address {
    Address::Account(AccountHash::new([0u8; 32]))
}

/// Rejects the null address and the contract's own address as targets.
pub fn validate_recipient(recipient: &Address, this: &Address) -> Result<(), WrapperError> {
    if *recipient == null_address() || recipient == this {
        return Err(WrapperError::InvalidRecipient);
    }
    Ok(())
}
