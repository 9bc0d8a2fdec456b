use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::{OrRevert, WrapperError};
use crate::math::{common::MAX_PRICE_DECIMALS, PriceScale};

/// Price feed consumed by the elastic wrapper.
///
/// `get_price` returns the price and whether the feed considers it usable.
/// A zero price or `valid == false` never moves the wrapper's price.
#[odra::external_contract]
pub trait PriceSource {
    fn get_price(&self) -> (U256, bool);
    fn price_decimals(&self) -> u8;
}

/// The price a wrapper may record from a raw feed reading, clamped to the
/// scale's maximum. `None` means "keep the last price".
pub fn accepted_price(price: U256, valid: bool, scale: &PriceScale) -> Option<U256> {
    if !valid || price.is_zero() {
        return None;
    }
    Some(scale.clamp(price))
}

/// A price feed pushed by an admin and a set of approved publishers.
///
/// Readings go invalid when nothing was published yet, when the last publish
/// is older than `max_age` milliseconds, or after `invalidate` until the next
/// publish.
#[odra::module(
    events = [PriceUpdated, FeedInvalidated, PublisherAdded, PublisherRemoved],
    errors = WrapperError
)]
pub struct ManualPriceOracle {
    price: Var<U256>,
    published_at: Var<u64>,
    invalidated: Var<bool>,
    price_decimals: Var<u8>,
    max_age: Var<u64>,
    approved_publishers: Mapping<Address, bool>,
    admin: Var<Address>,
}

#[odra::module]
impl ManualPriceOracle {
    pub fn init(&mut self, price_decimals: u8, max_age: u64) {
        if price_decimals > MAX_PRICE_DECIMALS {
            self.env().revert(WrapperError::InvalidPriceDecimals);
        }
        self.admin.set(self.env().caller());
        self.price_decimals.set(price_decimals);
        self.max_age.set(max_age);
    }

    /// Publish a new price; admin or approved publisher only.
    pub fn publish_price(&mut self, price: U256) {
        let caller = self.env().caller();
        if caller != self.admin() && !self.is_approved_publisher(&caller) {
            self.env().revert(WrapperError::Unauthorized);
        }

        let now = self.env().get_block_time();
        self.price.set(price);
        self.published_at.set(now);
        self.invalidated.set(false);

        self.env().emit_event(PriceUpdated {
            price,
            publisher: caller,
            published_at: now,
        });
    }

    /// Mark the current price unusable until the next publish.
    pub fn invalidate(&mut self) {
        let caller = self.only_admin();
        self.invalidated.set(true);
        self.env().emit_event(FeedInvalidated { by: caller });
    }

    pub fn add_publisher(&mut self, publisher: &Address) {
        let caller = self.only_admin();
        self.approved_publishers.set(publisher, true);
        self.env().emit_event(PublisherAdded {
            publisher: *publisher,
            added_by: caller,
        });
    }

    pub fn remove_publisher(&mut self, publisher: &Address) {
        let caller = self.only_admin();
        self.approved_publishers.set(publisher, false);
        self.env().emit_event(PublisherRemoved {
            publisher: *publisher,
            removed_by: caller,
        });
    }

    pub fn set_max_age(&mut self, max_age: u64) {
        self.only_admin();
        self.max_age.set(max_age);
    }

    pub fn get_price(&self) -> (U256, bool) {
        let price = self.price.get_or_default();
        let valid = match self.published_at.get() {
            Some(published_at) => {
                let age = self.env().get_block_time().saturating_sub(published_at);
                !self.invalidated.get_or_default() && age <= self.max_age.get_or_default()
            }
            None => false,
        };
        (price, valid)
    }

    pub fn price_decimals(&self) -> u8 {
        self.price_decimals.get_or_default()
    }

    pub fn max_age(&self) -> u64 {
        self.max_age.get_or_default()
    }

    /// Block time of the last publish, 0 if none.
    pub fn last_published_at(&self) -> u64 {
        self.published_at.get_or_default()
    }

    pub fn is_approved_publisher(&self, address: &Address) -> bool {
        self.approved_publishers.get(address).unwrap_or(false)
    }

    pub fn admin(&self) -> Address {
        self.admin
            .get()
            .ok_or(WrapperError::NotInitialized)
            .or_revert(&self.env())
    }
}

impl ManualPriceOracle {
    fn only_admin(&self) -> Address {
        let caller = self.env().caller();
        if caller != self.admin() {
            self.env().revert(WrapperError::Unauthorized);
        }
        caller
    }
}

#[odra::event]
pub struct PriceUpdated {
    pub price: U256,
    pub publisher: Address,
    pub published_at: u64,
}

#[odra::event]
pub struct FeedInvalidated {
    pub by: Address,
}

#[odra::event]
pub struct PublisherAdded {
    pub publisher: Address,
    pub added_by: Address,
}

#[odra::event]
pub struct PublisherRemoved {
    pub publisher: Address,
    pub removed_by: Address,
}
