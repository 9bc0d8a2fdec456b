use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::WrapperError;
use crate::math::{common::TOTAL_BITS, TryAdd};

/// Either side of a bit movement.
///
/// `Pool` holds every bit not issued to an account. It is reachable only
/// through this variant, never through an [`Address`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitHolder {
    Pool,
    Account(Address),
}

/// Bit balances of the elastic wrapper.
///
/// `unissued() + Σ bits_of(account) == TOTAL_BITS` once seeded.
#[odra::module]
pub struct BitLedger {
    account_bits: Mapping<Address, U256>,
    pool_bits: Var<U256>,
}

#[odra::module]
impl BitLedger {
    /// Bits still held by the pool.
    pub fn unissued(&self) -> U256 {
        self.pool_bits.get_or_default()
    }

    pub fn bits_of(&self, account: &Address) -> U256 {
        self.account_bits.get_or_default(account)
    }
}

impl BitLedger {
    /// Pre-issues the whole supply to the pool.
    pub fn seed(&mut self) {
        self.pool_bits.set(TOTAL_BITS);
    }

    /// Bits held by accounts.
    pub fn active(&self) -> U256 {
        TOTAL_BITS.saturating_sub(self.unissued())
    }

    pub fn holding(&self, holder: &BitHolder) -> U256 {
        match holder {
            BitHolder::Pool => self.unissued(),
            BitHolder::Account(account) => self.bits_of(account),
        }
    }

    /// The one primitive behind mint, burn and transfer.
    ///
    /// A pool shortfall means more than `MAX_UNDERLYING` would be issued and
    /// reports [`WrapperError::Overflow`]; an account shortfall reports
    /// [`WrapperError::InsufficientBalance`]. A drained account reads back as
    /// zero.
    pub fn move_bits(&mut self, from: BitHolder, to: BitHolder, bits: U256) -> Result<(), WrapperError> {
        let remaining = match self.holding(&from).checked_sub(bits) {
            Some(remaining) => remaining,
            None if from == BitHolder::Pool => return Err(WrapperError::Overflow),
            None => return Err(WrapperError::InsufficientBalance),
        };
        self.write(&from, remaining);

        let credited = self.holding(&to).try_add(bits)?;
        self.write(&to, credited);
        Ok(())
    }

    fn write(&mut self, holder: &BitHolder, bits: U256) {
        match holder {
            BitHolder::Pool => self.pool_bits.set(bits),
            BitHolder::Account(account) => self.account_bits.set(account, bits),
        }
    }
}
