//! A CEP-18 shaped token for tests and devnets. Anyone can `mint` and `burn`,
//! which is how an external rebase of a wrapped balance is simulated.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::{OrRevert, WrapperError};
use crate::events::{Approval, Burn, Mint, Transfer};
use crate::state::{Allowances, BalanceLedger};

#[odra::module(events = [Transfer, Approval, Mint, Burn], errors = WrapperError)]
pub struct MockToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    ledger: SubModule<BalanceLedger>,
    allowances: SubModule<Allowances>,
}

#[odra::module]
impl MockToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, address: &Address) -> U256 {
        self.ledger.balance_of(address)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances.allowance(owner, spender)
    }

    pub fn approve(&mut self, spender: &Address, amount: &U256) {
        let owner = self.env().caller();
        self.allowances.set(&owner, spender, *amount);
        self.env().emit_event(Approval {
            owner,
            spender: *spender,
            amount: *amount,
        });
    }

    pub fn transfer(&mut self, recipient: &Address, amount: &U256) {
        let sender = self.env().caller();
        self.move_tokens(&sender, recipient, *amount);
    }

    pub fn transfer_from(&mut self, owner: &Address, recipient: &Address, amount: &U256) {
        let spender = self.env().caller();
        self.allowances
            .spend(owner, &spender, *amount)
            .or_revert(&self.env());
        self.move_tokens(owner, recipient, *amount);
    }

    pub fn mint(&mut self, recipient: &Address, amount: &U256) {
        self.ledger.mint(recipient, *amount).or_revert(&self.env());
        self.env().emit_event(Mint {
            recipient: *recipient,
            amount: *amount,
            underlying: U256::zero(),
        });
    }

    pub fn burn(&mut self, owner: &Address, amount: &U256) {
        self.ledger.burn(owner, *amount).or_revert(&self.env());
        self.env().emit_event(Burn {
            owner: *owner,
            amount: *amount,
            underlying: U256::zero(),
        });
    }
}

impl MockToken {
    fn move_tokens(&mut self, from: &Address, to: &Address, amount: U256) {
        self.ledger
            .move_balance(from, to, amount)
            .or_revert(&self.env());
        self.env().emit_event(Transfer {
            from: *from,
            to: *to,
            amount,
        });
    }
}
