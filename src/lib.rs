#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(not(test), no_std)]

//! Elastic and share token wrappers for the casper blockchain.
//!
//! [`ElasticWrapper`] reprices a fixed-balance asset against a price feed,
//! [`ShareWrapper`] turns a rebasing asset into constant share balances.

extern crate alloc;

pub mod elastic_wrapper;
pub mod error;
pub mod events;
pub mod math;
pub mod mocks;
pub mod oracle;
pub mod share_wrapper;
pub mod state;
pub mod underlying;

pub use elastic_wrapper::ElasticWrapper;
pub use error::WrapperError;
pub use mocks::MockToken;
pub use oracle::ManualPriceOracle;
pub use share_wrapper::ShareWrapper;
