use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::WrapperError;
use crate::math::{TryAdd, TrySub};

/// Plain fungible balances with a tracked supply; `total_supply == Σ balances`.
#[odra::module]
pub struct BalanceLedger {
    balances: Mapping<Address, U256>,
    total_supply: Var<U256>,
}

#[odra::module]
impl BalanceLedger {
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get_or_default(owner)
    }
}

impl BalanceLedger {
    pub fn mint(&mut self, recipient: &Address, amount: U256) -> Result<(), WrapperError> {
        let supply = self.total_supply().try_add(amount)?;
        let balance = self.balance_of(recipient).try_add(amount)?;
        self.total_supply.set(supply);
        self.balances.set(recipient, balance);
        Ok(())
    }

    pub fn burn(&mut self, owner: &Address, amount: U256) -> Result<(), WrapperError> {
        let balance = self
            .balance_of(owner)
            .checked_sub(amount)
            .ok_or(WrapperError::InsufficientBalance)?;
        let supply = self.total_supply().try_sub(amount)?;
        self.balances.set(owner, balance);
        self.total_supply.set(supply);
        Ok(())
    }

    pub fn move_balance(&mut self, from: &Address, to: &Address, amount: U256) -> Result<(), WrapperError> {
        let remaining = self
            .balance_of(from)
            .checked_sub(amount)
            .ok_or(WrapperError::InsufficientBalance)?;
        self.balances.set(from, remaining);

        let credited = self.balance_of(to).try_add(amount)?;
        self.balances.set(to, credited);
        Ok(())
    }
}
