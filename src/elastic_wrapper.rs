//! Elastic-supply wrapper around a fixed-balance asset.
//!
//! Balances are kept in bits. An account's wrapper balance is its bits divided
//! by the price-dependent bits-per-token, so a price move reprices every
//! account at once without touching the ledger.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::{OrRevert, WrapperError};
use crate::events::{Approval, Burn, Mint, OracleUpdated, Rebase, Transfer};
use crate::math::bits::{bits_to_u_amount, u_amount_to_bits};
use crate::math::PriceScale;
use crate::oracle::{accepted_price, PriceSourceContractRef};
use crate::state::{
    null_address, validate_recipient, Allowances, BitHolder, BitLedger, PriceCheckpoint,
};
use crate::underlying::UnderlyingTokenContractRef;

#[odra::module(
    events = [Transfer, Approval, Mint, Burn, Rebase, OracleUpdated],
    errors = WrapperError
)]
pub struct ElasticWrapper {
    underlying: Var<Address>,
    oracle: Var<Address>,
    owner: Var<Address>,
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    scale: Var<PriceScale>,
    checkpoint: Var<PriceCheckpoint>,
    bits: SubModule<BitLedger>,
    allowances: SubModule<Allowances>,
}

#[odra::module]
impl ElasticWrapper {
    // ===========================================================================
    // CONSTRUCTOR
    // ===========================================================================
    pub fn init(&mut self, underlying: Address, oracle: Address, name: String, symbol: String) {
        let decimals = UnderlyingTokenContractRef::new(self.env(), underlying).decimals();

        self.underlying.set(underlying);
        self.owner.set(self.env().caller());
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.bits.seed();
        self.set_oracle(oracle).or_revert(&self.env());
    }

    // ===========================================================================
    // ORACLE
    // ===========================================================================

    /// Swap the price source. The new source must report a valid price first.
    pub fn update_oracle(&mut self, oracle: Address) {
        if self.env().caller() != self.owner() {
            self.env().revert(WrapperError::Unauthorized);
        }
        self.set_oracle(oracle).or_revert(&self.env());
    }

    /// Pull the oracle price without moving any tokens.
    pub fn rebase(&mut self) {
        self.sync_price().or_revert(&self.env());
    }

    // ===========================================================================
    // DEPOSIT / MINT
    // ===========================================================================

    /// Wrap `u_amount` underlying; returns the wrapper amount credited.
    pub fn deposit(&mut self, u_amount: U256) -> U256 {
        let caller = self.env().caller();
        self.deposit_underlying(caller, u_amount)
            .or_revert(&self.env())
    }

    /// As `deposit`, crediting `to`.
    pub fn deposit_for(&mut self, to: &Address, u_amount: U256) -> U256 {
        self.deposit_underlying(*to, u_amount)
            .or_revert(&self.env())
    }

    /// Mint exactly `amount` wrapper tokens; returns the underlying pulled.
    pub fn mint(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.mint_wrapper(caller, amount).or_revert(&self.env())
    }

    /// As `mint`, crediting `to`; the caller pays.
    pub fn mint_for(&mut self, to: &Address, amount: U256) -> U256 {
        self.mint_wrapper(*to, amount).or_revert(&self.env())
    }

    // ===========================================================================
    // WITHDRAW / BURN
    // ===========================================================================

    /// Unwrap `u_amount` underlying; returns the wrapper amount burned.
    pub fn withdraw(&mut self, u_amount: U256) -> U256 {
        let caller = self.env().caller();
        self.withdraw_underlying(caller, u_amount)
            .or_revert(&self.env())
    }

    /// As `withdraw`, paying the underlying to `to`.
    pub fn withdraw_to(&mut self, to: &Address, u_amount: U256) -> U256 {
        self.withdraw_underlying(*to, u_amount)
            .or_revert(&self.env())
    }

    /// Unwrap the caller's whole balance; returns the underlying paid out.
    pub fn withdraw_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.exit_all(caller).or_revert(&self.env())
    }

    /// As `withdraw_all`, paying the underlying to `to`.
    pub fn withdraw_all_to(&mut self, to: &Address) -> U256 {
        self.exit_all(*to).or_revert(&self.env())
    }

    /// Burn exactly `amount` wrapper tokens; returns the underlying paid out.
    pub fn burn(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.burn_wrapper(caller, amount).or_revert(&self.env())
    }

    /// As `burn`, paying the underlying to `to`.
    pub fn burn_to(&mut self, to: &Address, amount: U256) -> U256 {
        self.burn_wrapper(*to, amount).or_revert(&self.env())
    }

    /// Burn the caller's whole balance; returns the underlying paid out.
    pub fn burn_all(&mut self) -> U256 {
        let caller = self.env().caller();
        self.exit_all(caller).or_revert(&self.env())
    }

    /// As `burn_all`, paying the underlying to `to`.
    pub fn burn_all_to(&mut self, to: &Address) -> U256 {
        self.exit_all(*to).or_revert(&self.env())
    }

    // ===========================================================================
    // TRANSFERS AND ALLOWANCES
    // ===========================================================================

    pub fn transfer(&mut self, to: &Address, amount: U256) {
        let caller = self.env().caller();
        self.transfer_amount(None, caller, *to, Some(amount))
            .or_revert(&self.env());
    }

    /// Transfer every bit the caller holds, leaving no rounding dust.
    pub fn transfer_all(&mut self, to: &Address) {
        let caller = self.env().caller();
        self.transfer_amount(None, caller, *to, None)
            .or_revert(&self.env());
    }

    pub fn transfer_from(&mut self, from: &Address, to: &Address, amount: U256) {
        let spender = self.env().caller();
        self.transfer_amount(Some(spender), *from, *to, Some(amount))
            .or_revert(&self.env());
    }

    pub fn transfer_all_from(&mut self, from: &Address, to: &Address) {
        let spender = self.env().caller();
        self.transfer_amount(Some(spender), *from, *to, None)
            .or_revert(&self.env());
    }

    pub fn approve(&mut self, spender: &Address, amount: U256) {
        let owner = self.env().caller();
        self.allowances.set(&owner, spender, amount);
        self.emit_approval(owner, *spender, amount);
    }

    pub fn increase_allowance(&mut self, spender: &Address, added: U256) {
        let owner = self.env().caller();
        let amount = self
            .allowances
            .increase(&owner, spender, added)
            .or_revert(&self.env());
        self.emit_approval(owner, *spender, amount);
    }

    /// Floors at zero.
    pub fn decrease_allowance(&mut self, spender: &Address, subtracted: U256) {
        let owner = self.env().caller();
        let amount = self.allowances.decrease(&owner, spender, subtracted);
        self.emit_approval(owner, *spender, amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances.allowance(owner, spender)
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn underlying(&self) -> Address {
        self.underlying
            .get()
            .ok_or(WrapperError::NotInitialized)
            .or_revert(&self.env())
    }

    pub fn oracle(&self) -> Address {
        self.oracle
            .get()
            .ok_or(WrapperError::OracleUnavailable)
            .or_revert(&self.env())
    }

    pub fn owner(&self) -> Address {
        self.owner
            .get()
            .ok_or(WrapperError::NotInitialized)
            .or_revert(&self.env())
    }

    pub fn last_price(&self) -> U256 {
        self.price_checkpoint().last_price
    }

    pub fn epoch(&self) -> u64 {
        self.price_checkpoint().epoch
    }

    pub fn price_bits(&self) -> U256 {
        self.price_scale().price_bits
    }

    pub fn max_price(&self) -> U256 {
        self.price_scale().max_price
    }

    /// Supply at the current oracle price (not persisted).
    pub fn total_supply(&self) -> U256 {
        self.price_scale()
            .bits_to_amount(self.bits.active(), self.current_price())
            .or_revert(&self.env())
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        if *account == null_address() {
            return U256::zero();
        }
        self.price_scale()
            .bits_to_amount(self.bits.bits_of(account), self.current_price())
            .or_revert(&self.env())
    }

    /// Supply in underlying units.
    pub fn scaled_total_supply(&self) -> U256 {
        bits_to_u_amount(self.bits.active())
    }

    /// Balance in underlying units.
    pub fn scaled_balance_of(&self, account: &Address) -> U256 {
        if *account == null_address() {
            return U256::zero();
        }
        bits_to_u_amount(self.bits.bits_of(account))
    }

    /// Underlying backing the issued bits. Donations to the contract are not
    /// counted.
    pub fn total_underlying(&self) -> U256 {
        self.scaled_total_supply()
    }

    pub fn balance_of_underlying(&self, account: &Address) -> U256 {
        self.scaled_balance_of(account)
    }

    pub fn underlying_to_wrapper(&self, u_amount: U256) -> U256 {
        u_amount_to_bits(u_amount)
            .and_then(|bits| self.price_scale().bits_to_amount(bits, self.current_price()))
            .or_revert(&self.env())
    }

    pub fn wrapper_to_underlying(&self, amount: U256) -> U256 {
        self.price_scale()
            .amount_to_bits(amount, self.current_price())
            .map(bits_to_u_amount)
            .or_revert(&self.env())
    }

    /// Raw bit balance, 0 for the null address.
    pub fn bit_balance_of(&self, account: &Address) -> U256 {
        self.bits.bits_of(account)
    }

    /// Bits not issued to any account.
    pub fn unissued_bits(&self) -> U256 {
        self.bits.unissued()
    }
}

impl ElasticWrapper {
    fn set_oracle(&mut self, oracle: Address) -> Result<(), WrapperError> {
        let source = PriceSourceContractRef::new(self.env(), oracle);
        let (price, valid) = source.get_price();
        let scale = PriceScale::for_decimals(source.price_decimals())?;
        let price = accepted_price(price, valid, &scale).ok_or(WrapperError::OracleUnavailable)?;

        log::debug!(
            "oracle swapped: price_decimals={} max_price={}",
            scale.price_decimals,
            scale.max_price
        );
        self.oracle.set(oracle);
        self.env().emit_event(OracleUpdated {
            oracle,
            price_decimals: scale.price_decimals,
        });
        self.scale.set(scale);
        self.record_price(price)
    }

    fn record_price(&mut self, price: U256) -> Result<(), WrapperError> {
        let mut checkpoint = self
            .checkpoint
            .get()
            .unwrap_or_else(|| PriceCheckpoint::new(price));
        let epoch = checkpoint.advance(price)?;
        self.checkpoint.set(checkpoint);

        log::debug!("rebase: epoch={} price={}", epoch, price);
        self.env().emit_event(Rebase { epoch, price });
        Ok(())
    }

    /// Rebases when the oracle has a usable price; returns the price to trade at.
    fn sync_price(&mut self) -> Result<U256, WrapperError> {
        match self.query_price() {
            Some(price) => {
                self.record_price(price)?;
                Ok(price)
            }
            None => {
                let checkpoint = self.price_checkpoint();
                log::debug!(
                    "price feed unusable, holding epoch={} price={}",
                    checkpoint.epoch,
                    checkpoint.last_price
                );
                Ok(checkpoint.last_price)
            }
        }
    }

    fn query_price(&self) -> Option<U256> {
        let (price, valid) = PriceSourceContractRef::new(self.env(), self.oracle()).get_price();
        accepted_price(price, valid, &self.price_scale())
    }

    fn current_price(&self) -> U256 {
        self.query_price().unwrap_or_else(|| self.last_price())
    }

    fn price_scale(&self) -> PriceScale {
        self.scale
            .get()
            .ok_or(WrapperError::OracleUnavailable)
            .or_revert(&self.env())
    }

    fn price_checkpoint(&self) -> PriceCheckpoint {
        self.checkpoint
            .get()
            .ok_or(WrapperError::OracleUnavailable)
            .or_revert(&self.env())
    }

    fn underlying_token(&self) -> UnderlyingTokenContractRef {
        UnderlyingTokenContractRef::new(self.env(), self.underlying())
    }

    fn check_recipient(&self, to: &Address) -> Result<(), WrapperError> {
        validate_recipient(to, &self.env().self_address())
    }

    fn deposit_underlying(&mut self, to: Address, u_amount: U256) -> Result<U256, WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let bits = u_amount_to_bits(u_amount)?;
        let amount = self.price_scale().bits_to_amount(bits, price)?;
        self.issue(to, u_amount, amount, bits)?;
        Ok(amount)
    }

    fn mint_wrapper(&mut self, to: Address, amount: U256) -> Result<U256, WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let bits = self.price_scale().amount_to_bits(amount, price)?;
        let u_amount = bits_to_u_amount(bits);
        self.issue(to, u_amount, amount, bits)?;
        Ok(u_amount)
    }

    fn withdraw_underlying(&mut self, to: Address, u_amount: U256) -> Result<U256, WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let bits = u_amount_to_bits(u_amount)?;
        let amount = self.price_scale().bits_to_amount(bits, price)?;
        self.redeem(to, u_amount, amount, bits)?;
        Ok(amount)
    }

    fn burn_wrapper(&mut self, to: Address, amount: U256) -> Result<U256, WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let bits = self.price_scale().amount_to_bits(amount, price)?;
        let u_amount = bits_to_u_amount(bits);
        self.redeem(to, u_amount, amount, bits)?;
        Ok(u_amount)
    }

    /// Redeems every bit of the caller; returns the underlying paid out.
    fn exit_all(&mut self, to: Address) -> Result<U256, WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let bits = self.bits.bits_of(&self.env().caller());
        let u_amount = bits_to_u_amount(bits);
        let amount = self.price_scale().bits_to_amount(bits, price)?;
        self.redeem(to, u_amount, amount, bits)?;
        Ok(u_amount)
    }

    /// Pulls underlying from the caller, then issues bits from the pool.
    fn issue(&mut self, to: Address, u_amount: U256, amount: U256, bits: U256) -> Result<(), WrapperError> {
        if u_amount.is_zero() || amount.is_zero() {
            return Err(WrapperError::ZeroAmount);
        }
        let caller = self.env().caller();
        let this = self.env().self_address();
        self.underlying_token().transfer_from(&caller, &this, &u_amount);

        self.bits.move_bits(BitHolder::Pool, BitHolder::Account(to), bits)?;
        self.env().emit_event(Mint {
            recipient: to,
            amount,
            underlying: u_amount,
        });
        Ok(())
    }

    /// Returns the caller's bits to the pool, then pays out underlying.
    fn redeem(&mut self, to: Address, u_amount: U256, amount: U256, bits: U256) -> Result<(), WrapperError> {
        if u_amount.is_zero() || amount.is_zero() {
            return Err(WrapperError::ZeroAmount);
        }
        let caller = self.env().caller();
        self.bits.move_bits(BitHolder::Account(caller), BitHolder::Pool, bits)?;
        self.env().emit_event(Burn {
            owner: caller,
            amount,
            underlying: u_amount,
        });

        self.underlying_token().transfer(&to, &u_amount);
        Ok(())
    }

    /// `amount == None` moves the whole bit balance of `from`.
    fn transfer_amount(
        &mut self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: Option<U256>,
    ) -> Result<(), WrapperError> {
        self.check_recipient(&to)?;
        let price = self.sync_price()?;
        let scale = self.price_scale();
        let (bits, amount) = match amount {
            Some(amount) => (scale.amount_to_bits(amount, price)?, amount),
            None => {
                let bits = self.bits.bits_of(&from);
                (bits, scale.bits_to_amount(bits, price)?)
            }
        };
        if let Some(spender) = spender {
            self.allowances.spend(&from, &spender, amount)?;
        }

        self.bits
            .move_bits(BitHolder::Account(from), BitHolder::Account(to), bits)?;
        self.env().emit_event(Transfer { from, to, amount });
        Ok(())
    }

    fn emit_approval(&self, owner: Address, spender: Address, amount: U256) {
        self.env().emit_event(Approval {
            owner,
            spender,
            amount,
        });
    }
}
