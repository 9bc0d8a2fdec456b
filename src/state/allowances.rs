use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::WrapperError;
use crate::math::TryAdd;

/// Spending allowances keyed by `(owner, spender)`. `U256::MAX` never decreases.
#[odra::module]
pub struct Allowances {
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl Allowances {
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances.get_or_default(&(*owner, *spender))
    }
}

impl Allowances {
    pub fn set(&mut self, owner: &Address, spender: &Address, amount: U256) {
        self.allowances.set(&(*owner, *spender), amount);
    }

    pub fn increase(&mut self, owner: &Address, spender: &Address, added: U256) -> Result<U256, WrapperError> {
        let allowance = self.allowance(owner, spender).try_add(added)?;
        self.set(owner, spender, allowance);
        Ok(allowance)
    }

    /// Floors at zero.
    pub fn decrease(&mut self, owner: &Address, spender: &Address, subtracted: U256) -> U256 {
        let allowance = self.allowance(owner, spender).saturating_sub(subtracted);
        self.set(owner, spender, allowance);
        allowance
    }

    /// Fails instead of flooring when `subtracted` exceeds the allowance.
    pub fn try_decrease(&mut self, owner: &Address, spender: &Address, subtracted: U256) -> Result<U256, WrapperError> {
        let allowance = self
            .allowance(owner, spender)
            .checked_sub(subtracted)
            .ok_or(WrapperError::InsufficientAllowance)?;
        self.set(owner, spender, allowance);
        Ok(allowance)
    }

    pub fn spend(&mut self, owner: &Address, spender: &Address, amount: U256) -> Result<(), WrapperError> {
        let allowance = self.allowance(owner, spender);
        if allowance == U256::MAX {
            return Ok(());
        }
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(WrapperError::InsufficientAllowance)?;
        self.set(owner, spender, remaining);
        Ok(())
    }
}
