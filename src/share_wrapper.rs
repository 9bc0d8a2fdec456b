//! Fixed-balance wrapper around a rebasing asset.
//!
//! Accounts hold shares. The share rate is never stored: every conversion reads
//! the contract's live underlying balance against the share supply, so an
//! external rebase of the wrapped asset is reflected on the next call.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::{OrRevert, WrapperError};
use crate::events::{Approval, Burn, InitialDepositLocked, Mint, Transfer};
use crate::math::{shares, TryMul};
use crate::state::{null_address, validate_recipient, Allowances, BalanceLedger};
use crate::underlying::UnderlyingTokenContractRef;

/// Underlying units locked forever by `initialize`.
pub const INITIAL_DEPOSIT: u64 = 1_000;

#[odra::module(
    events = [Transfer, Approval, Mint, Burn, InitialDepositLocked],
    errors = WrapperError
)]
pub struct ShareWrapper {
    underlying: Var<Address>,
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    initial_rate: Var<U256>,
    initialized: Var<bool>,
    shares: SubModule<BalanceLedger>,
    allowances: SubModule<Allowances>,
}

#[odra::module]
impl ShareWrapper {
    pub fn init(&mut self, underlying: Address, name: String, symbol: String, initial_rate: U256) {
        if initial_rate.is_zero() {
            self.env().revert(WrapperError::ZeroAmount);
        }
        let decimals = UnderlyingTokenContractRef::new(self.env(), underlying).decimals();

        self.underlying.set(underlying);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.initial_rate.set(initial_rate);
    }

    /// Locks `INITIAL_DEPOSIT` underlying from the caller against shares held
    /// by the contract itself. The caller must have approved this contract.
    pub fn initialize(&mut self) {
        self.lock_initial_deposit().or_revert(&self.env());
    }

    /// Wrap `u_amount` underlying; returns the shares minted.
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

    /// Mint exactly `amount` shares; returns the underlying pulled.
    pub fn mint(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.mint_shares(caller, amount).or_revert(&self.env())
    }

    /// As `mint`, crediting `to`; the caller pays.
    pub fn mint_for(&mut self, to: &Address, amount: U256) -> U256 {
        self.mint_shares(*to, amount).or_revert(&self.env())
    }

    /// Unwrap `u_amount` underlying; returns the shares burned.
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

    /// Burn every share of the caller; returns the underlying paid out.
    pub fn withdraw_all(&mut self) -> U256 {
        let caller = self.env().caller();
        let amount = self.shares.balance_of(&caller);
        self.burn_shares(caller, amount).or_revert(&self.env())
    }

    /// As `withdraw_all`, paying the underlying to `to`.
    pub fn withdraw_all_to(&mut self, to: &Address) -> U256 {
        let amount = self.shares.balance_of(&self.env().caller());
        self.burn_shares(*to, amount).or_revert(&self.env())
    }

    /// Burn exactly `amount` shares; returns the underlying paid out.
    pub fn burn(&mut self, amount: U256) -> U256 {
        let caller = self.env().caller();
        self.burn_shares(caller, amount).or_revert(&self.env())
    }

    /// As `burn`, paying the underlying to `to`.
    pub fn burn_to(&mut self, to: &Address, amount: U256) -> U256 {
        self.burn_shares(*to, amount).or_revert(&self.env())
    }

    /// Same as `withdraw_all`.
    pub fn burn_all(&mut self) -> U256 {
        self.withdraw_all()
    }

    pub fn burn_all_to(&mut self, to: &Address) -> U256 {
        self.withdraw_all_to(to)
    }

    pub fn transfer(&mut self, to: &Address, amount: U256) {
        let caller = self.env().caller();
        self.transfer_shares(None, caller, *to, amount)
            .or_revert(&self.env());
    }

    pub fn transfer_from(&mut self, from: &Address, to: &Address, amount: U256) {
        let spender = self.env().caller();
        self.transfer_shares(Some(spender), *from, *to, amount)
            .or_revert(&self.env());
    }

    pub fn approve(&mut self, spender: &Address, amount: U256) {
        self.require_initialized().or_revert(&self.env());
        let owner = self.env().caller();
        self.allowances.set(&owner, spender, amount);
        self.emit_approval(owner, *spender, amount);
    }

    pub fn increase_allowance(&mut self, spender: &Address, added: U256) {
        self.require_initialized().or_revert(&self.env());
        let owner = self.env().caller();
        let amount = self
            .allowances
            .increase(&owner, spender, added)
            .or_revert(&self.env());
        self.emit_approval(owner, *spender, amount);
    }

    /// Reverts with `InsufficientAllowance` instead of going below zero.
    pub fn decrease_allowance(&mut self, spender: &Address, subtracted: U256) {
        self.require_initialized().or_revert(&self.env());
        let owner = self.env().caller();
        let amount = self
            .allowances
            .try_decrease(&owner, spender, subtracted)
            .or_revert(&self.env());
        self.emit_approval(owner, *spender, amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances.allowance(owner, spender)
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.shares.balance_of(account)
    }

    pub fn total_supply(&self) -> U256 {
        self.shares.total_supply()
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

    pub fn underlying(&self) -> Address {
        self.underlying
            .get()
            .ok_or(WrapperError::NotInitialized)
            .or_revert(&self.env())
    }

    pub fn initial_rate(&self) -> U256 {
        self.initial_rate.get_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get_or_default()
    }

    /// Live underlying balance of this contract.
    pub fn total_underlying(&self) -> U256 {
        self.require_initialized().or_revert(&self.env());
        self.live_underlying()
    }

    pub fn balance_of_underlying(&self, account: &Address) -> U256 {
        if *account == null_address() {
            return U256::zero();
        }
        self.wrapper_to_underlying(self.shares.balance_of(account))
    }

    pub fn underlying_to_wrapper(&self, u_amount: U256) -> U256 {
        self.require_initialized()
            .and_then(|_| {
                shares::from_underlying(u_amount, self.live_underlying(), self.shares.total_supply())
            })
            .or_revert(&self.env())
    }

    pub fn wrapper_to_underlying(&self, amount: U256) -> U256 {
        self.require_initialized()
            .and_then(|_| {
                shares::to_underlying(amount, self.live_underlying(), self.shares.total_supply())
            })
            .or_revert(&self.env())
    }
}

impl ShareWrapper {
    fn lock_initial_deposit(&mut self) -> Result<(), WrapperError> {
        if self.is_initialized() {
            return Err(WrapperError::AlreadyInitialized);
        }
        let underlying = U256::from(INITIAL_DEPOSIT);
        let locked = underlying.try_mul(self.initial_rate())?;
        let initializer = self.env().caller();
        let this = self.env().self_address();

        self.initialized.set(true);
        self.underlying_token()
            .transfer_from(&initializer, &this, &underlying);
        self.shares.mint(&this, locked)?;

        log::debug!("initial deposit locked: underlying={} shares={}", underlying, locked);
        self.env().emit_event(InitialDepositLocked {
            initializer,
            underlying,
            shares: locked,
        });
        Ok(())
    }

    fn require_initialized(&self) -> Result<(), WrapperError> {
        if !self.is_initialized() {
            return Err(WrapperError::NotInitialized);
        }
        Ok(())
    }

    fn underlying_token(&self) -> UnderlyingTokenContractRef {
        UnderlyingTokenContractRef::new(self.env(), self.underlying())
    }

    fn live_underlying(&self) -> U256 {
        let this = self.env().self_address();
        self.underlying_token().balance_of(&this)
    }

    /// One snapshot of `(total_underlying, total_shares)` per operation.
    fn totals(&self) -> (U256, U256) {
        (self.live_underlying(), self.shares.total_supply())
    }

    fn prepare(&self, to: &Address) -> Result<(U256, U256), WrapperError> {
        self.require_initialized()?;
        validate_recipient(to, &self.env().self_address())?;
        Ok(self.totals())
    }

    fn deposit_underlying(&mut self, to: Address, u_amount: U256) -> Result<U256, WrapperError> {
        let (total_underlying, total_shares) = self.prepare(&to)?;
        let amount = shares::from_underlying(u_amount, total_underlying, total_shares)?;
        self.issue(to, u_amount, amount)?;
        Ok(amount)
    }

    fn mint_shares(&mut self, to: Address, amount: U256) -> Result<U256, WrapperError> {
        let (total_underlying, total_shares) = self.prepare(&to)?;
        let u_amount = shares::to_underlying(amount, total_underlying, total_shares)?;
        self.issue(to, u_amount, amount)?;
        Ok(u_amount)
    }

    fn withdraw_underlying(&mut self, to: Address, u_amount: U256) -> Result<U256, WrapperError> {
        let (total_underlying, total_shares) = self.prepare(&to)?;
        let amount = shares::from_underlying(u_amount, total_underlying, total_shares)?;
        self.redeem(to, u_amount, amount)?;
        Ok(amount)
    }

    fn burn_shares(&mut self, to: Address, amount: U256) -> Result<U256, WrapperError> {
        let (total_underlying, total_shares) = self.prepare(&to)?;
        let u_amount = shares::to_underlying(amount, total_underlying, total_shares)?;
        self.redeem(to, u_amount, amount)?;
        Ok(u_amount)
    }

    /// Pulls underlying from the caller, then mints shares to `to`.
    fn issue(&mut self, to: Address, u_amount: U256, amount: U256) -> Result<(), WrapperError> {
        if u_amount.is_zero() || amount.is_zero() {
            return Err(WrapperError::ZeroAmount);
        }
        let caller = self.env().caller();
        let this = self.env().self_address();
        self.underlying_token().transfer_from(&caller, &this, &u_amount);

        self.shares.mint(&to, amount)?;
        self.env().emit_event(Mint {
            recipient: to,
            amount,
            underlying: u_amount,
        });
        Ok(())
    }

    /// Burns the caller's shares, then pays underlying to `to`.
    fn redeem(&mut self, to: Address, u_amount: U256, amount: U256) -> Result<(), WrapperError> {
        if u_amount.is_zero() || amount.is_zero() {
            return Err(WrapperError::ZeroAmount);
        }
        let caller = self.env().caller();
        self.shares.burn(&caller, amount)?;
        self.env().emit_event(Burn {
            owner: caller,
            amount,
            underlying: u_amount,
        });

        self.underlying_token().transfer(&to, &u_amount);
        Ok(())
    }

    fn transfer_shares(
        &mut self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), WrapperError> {
        self.require_initialized()?;
        validate_recipient(&to, &self.env().self_address())?;
        if let Some(spender) = spender {
            self.allowances.spend(&from, &spender, amount)?;
        }
        self.shares.move_balance(&from, &to, amount)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockToken, MockTokenHostRef, MockTokenInitArgs};
    use odra::host::{Deployer, HostEnv, HostRef};

    fn n(value: u64) -> U256 {
        U256::from(value)
    }

    struct Fixture {
        env: HostEnv,
        token: MockTokenHostRef,
        wrapper: ShareWrapperHostRef,
        owner: Address,
        alice: Address,
        bob: Address,
    }

    impl Fixture {
        fn deploy(initial_rate: U256) -> Self {
            let env = odra_test::env();
            let token = MockToken::deploy(
                &env,
                MockTokenInitArgs {
                    name: "Staked Ether".to_string(),
                    symbol: "stETH".to_string(),
                    decimals: 18,
                },
            );
            let wrapper = ShareWrapper::deploy(
                &env,
                ShareWrapperInitArgs {
                    underlying: token.address().clone(),
                    name: "Wrapped Staked Ether".to_string(),
                    symbol: "wstETH".to_string(),
                    initial_rate,
                },
            );
            let mut fixture = Self {
                owner: env.get_account(0),
                alice: env.get_account(1),
                bob: env.get_account(2),
                env,
                token,
                wrapper,
            };
            fixture.fund(fixture.owner, n(INITIAL_DEPOSIT));
            fixture.fund(fixture.alice, n(10_000));
            fixture.fund(fixture.bob, n(10_000));
            fixture
        }

        fn new() -> Self {
            let mut fixture = Self::deploy(U256::one());
            fixture.wrapper.initialize();
            fixture
        }

        fn fund(&mut self, account: Address, amount: U256) {
            self.token.mint(&account, &amount);
            self.env.set_caller(account);
            self.token.approve(&self.wrapper.address().clone(), &U256::MAX);
            self.env.set_caller(self.owner);
        }

        fn shares_conserved(&self) -> bool {
            let this = self.wrapper.address().clone();
            let held = [this, self.owner, self.alice, self.bob]
                .iter()
                .fold(U256::zero(), |sum, account| sum + self.wrapper.balance_of(account));
            held == self.wrapper.total_supply()
        }
    }

    #[test]
    fn initialize_locks_the_initial_deposit() {
        let fx = Fixture::new();
        let this = fx.wrapper.address().clone();
        assert!(fx.wrapper.is_initialized());
        assert_eq!(fx.wrapper.total_underlying(), n(1000));
        assert_eq!(fx.wrapper.total_supply(), n(1000));
        assert_eq!(fx.wrapper.balance_of(&this), n(1000));
        assert_eq!(fx.token.balance_of(&fx.owner), U256::zero());
        assert!(fx.env.emitted(&fx.wrapper, "InitialDepositLocked"));
    }

    #[test]
    fn initialize_runs_once() {
        let mut fx = Fixture::new();
        fx.fund(fx.owner, n(INITIAL_DEPOSIT));
        assert_eq!(
            fx.wrapper.try_initialize(),
            Err(WrapperError::AlreadyInitialized.into())
        );
    }

    #[test]
    fn operations_wait_for_the_lock() {
        let mut fx = Fixture::deploy(U256::one());
        assert_eq!(fx.wrapper.name(), "Wrapped Staked Ether");
        assert_eq!(fx.wrapper.decimals(), 18);
        fx.env.set_caller(fx.alice);
        assert_eq!(
            fx.wrapper.try_deposit(n(100)),
            Err(WrapperError::NotInitialized.into())
        );
        assert_eq!(
            fx.wrapper.try_transfer(&fx.bob, U256::zero()),
            Err(WrapperError::NotInitialized.into())
        );
        assert_eq!(
            fx.wrapper.try_underlying_to_wrapper(n(1)),
            Err(WrapperError::NotInitialized.into())
        );
    }

    #[test]
    fn deposit_survives_an_external_rebase() {
        let mut fx = Fixture::new();
        fx.env.set_caller(fx.alice);
        assert_eq!(fx.wrapper.deposit(n(1000)), n(1000));
        assert_eq!(fx.wrapper.total_underlying(), n(2000));
        assert_eq!(fx.wrapper.total_supply(), n(2000));
        fx.wrapper.transfer(&fx.bob, n(500));

        // the asset doubles the wrapper's balance behind its back
        let this = fx.wrapper.address().clone();
        fx.token.mint(&this, &n(2000));
        assert_eq!(fx.wrapper.balance_of_underlying(&fx.bob), n(1000));
        assert_eq!(fx.wrapper.balance_of(&fx.bob), n(500));

        fx.env.set_caller(fx.bob);
        assert_eq!(fx.wrapper.withdraw_all(), n(1000));
        fx.env.set_caller(fx.alice);
        assert_eq!(fx.wrapper.burn_all(), n(1000));
        assert_eq!(fx.token.balance_of(&fx.alice), n(10_000 - 1000 + 1000));
        assert_eq!(fx.token.balance_of(&fx.bob), n(10_000 + 1000));
        assert_eq!(fx.wrapper.total_underlying(), n(2000));
        assert_eq!(fx.wrapper.total_supply(), n(1000));
    }

    #[test]
    fn zero_share_operations_are_rejected() {
        let mut fx = Fixture::new();
        let this = fx.wrapper.address().clone();
        fx.token.mint(&this, &n(2000));

        fx.env.set_caller(fx.alice);
        assert_eq!(
            fx.wrapper.try_deposit(U256::zero()),
            Err(WrapperError::ZeroAmount.into())
        );
        assert_eq!(
            fx.wrapper.try_deposit(n(2)),
            Err(WrapperError::ZeroAmount.into())
        );
        assert_eq!(
            fx.wrapper.try_withdraw(U256::zero()),
            Err(WrapperError::ZeroAmount.into())
        );
        assert_eq!(fx.token.balance_of(&fx.alice), n(10_000));
    }

    #[test]
    fn dust_mint_at_a_high_rate_is_rejected() {
        let mut fx = Fixture::deploy(n(1_000_000));
        fx.wrapper.initialize();
        assert_eq!(fx.wrapper.total_supply(), n(1_000_000_000));

        fx.env.set_caller(fx.alice);
        assert_eq!(
            fx.wrapper.try_mint(U256::one()),
            Err(WrapperError::ZeroAmount.into())
        );
        assert_eq!(fx.wrapper.deposit(U256::one()), n(1_000_000));
        assert_eq!(fx.wrapper.mint(n(2_000_000)), n(2));
    }

    #[test]
    fn rounding_never_favours_the_caller_on_deposit() {
        let mut fx = Fixture::new();
        let this = fx.wrapper.address().clone();
        fx.token.mint(&this, &n(2001));

        fx.env.set_caller(fx.alice);
        let minted = fx.wrapper.deposit(n(10));
        assert_eq!(minted, n(3));
        assert!(fx.wrapper.wrapper_to_underlying(minted) <= n(10));
    }

    #[test]
    fn recipients_are_validated() {
        let mut fx = Fixture::new();
        let this = fx.wrapper.address().clone();
        fx.env.set_caller(fx.alice);
        fx.wrapper.deposit(n(100));
        assert_eq!(
            fx.wrapper.try_deposit_for(&null_address(), n(100)),
            Err(WrapperError::InvalidRecipient.into())
        );
        assert_eq!(
            fx.wrapper.try_transfer(&this, n(1)),
            Err(WrapperError::InvalidRecipient.into())
        );
        assert_eq!(
            fx.wrapper.try_burn_to(&null_address(), n(1)),
            Err(WrapperError::InvalidRecipient.into())
        );
        assert_eq!(fx.wrapper.balance_of_underlying(&null_address()), U256::zero());
    }

    #[test]
    fn allowances_gate_transfer_from() {
        let mut fx = Fixture::new();
        fx.env.set_caller(fx.alice);
        fx.wrapper.deposit(n(600));
        fx.wrapper.approve(&fx.bob, n(250));

        fx.env.set_caller(fx.bob);
        fx.wrapper.transfer_from(&fx.alice, &fx.bob, n(200));
        assert_eq!(fx.wrapper.allowance(&fx.alice, &fx.bob), n(50));
        assert_eq!(
            fx.wrapper.try_transfer_from(&fx.alice, &fx.bob, n(51)),
            Err(WrapperError::InsufficientAllowance.into())
        );

        fx.env.set_caller(fx.alice);
        fx.wrapper.increase_allowance(&fx.bob, n(1000));
        fx.wrapper.decrease_allowance(&fx.bob, n(10));
        assert_eq!(fx.wrapper.allowance(&fx.alice, &fx.bob), n(1040));
        fx.env.set_caller(fx.bob);
        assert_eq!(
            fx.wrapper.try_transfer_from(&fx.alice, &fx.bob, n(401)),
            Err(WrapperError::InsufficientBalance.into())
        );
    }

    #[test]
    fn full_exits_return_underlying_units() {
        let mut fx = Fixture::new();
        let this = fx.wrapper.address().clone();
        fx.env.set_caller(fx.alice);
        fx.wrapper.deposit(n(1000));
        fx.token.mint(&this, &n(2000));

        assert_eq!(fx.wrapper.burn_all_to(&fx.bob), n(2000));
        assert_eq!(fx.token.balance_of(&fx.bob), n(12_000));

        fx.wrapper.deposit(n(400));
        assert_eq!(fx.wrapper.balance_of(&fx.alice), n(200));
        assert_eq!(fx.wrapper.withdraw_all_to(&fx.owner), n(400));
        assert_eq!(fx.token.balance_of(&fx.owner), n(400));
        assert_eq!(fx.wrapper.balance_of(&fx.alice), U256::zero());
        assert_eq!(fx.wrapper.total_supply(), n(1000));
    }

    #[test]
    fn allowance_cannot_be_decreased_below_zero() {
        let mut fx = Fixture::new();
        fx.env.set_caller(fx.alice);
        fx.wrapper.approve(&fx.bob, n(10));
        assert_eq!(
            fx.wrapper.try_decrease_allowance(&fx.bob, n(11)),
            Err(WrapperError::InsufficientAllowance.into())
        );
        fx.wrapper.decrease_allowance(&fx.bob, n(10));
        assert_eq!(fx.wrapper.allowance(&fx.alice, &fx.bob), U256::zero());
    }

    #[test]
    fn shares_are_conserved_across_mixed_operations() {
        let mut fx = Fixture::new();
        let this = fx.wrapper.address().clone();

        fx.env.set_caller(fx.alice);
        fx.wrapper.deposit(n(3000));
        fx.wrapper.mint_for(&fx.bob, n(700));
        assert!(fx.shares_conserved());

        fx.token.mint(&this, &n(1234));
        fx.env.set_caller(fx.bob);
        fx.wrapper.withdraw_to(&fx.owner, n(100));
        fx.wrapper.transfer(&fx.alice, n(50));
        assert!(fx.shares_conserved());

        fx.token.burn(&this, &n(500));
        fx.env.set_caller(fx.alice);
        fx.wrapper.burn_to(&fx.bob, n(1000));
        fx.wrapper.withdraw_all_to(&fx.owner);
        assert_eq!(fx.wrapper.balance_of(&fx.alice), U256::zero());
        assert!(fx.shares_conserved());
        assert!(!fx.wrapper.total_underlying().is_zero());
        assert!(fx.wrapper.balance_of(&this) >= n(1000));
    }
}
