//! Constants shared by the conversion primitives.
//!
//! The bit constants are written out as little-endian limbs so they can live in
//! `const` position; the tests below re-derive each of them.

use odra::casper_types::U256;

/// Largest underlying amount the elastic ledger can ever hold (10^27 units).
pub const MAX_UNDERLYING: U256 = U256([0x9fd0803ce8000000, 0x033b2e3c, 0, 0]);

/// Largest multiple of [`MAX_UNDERLYING`] not above `U256::MAX`.
pub const TOTAL_BITS: U256 = U256([
    0xbc6a148440000000,
    0xfffffffffe2d6fff,
    0xffffffffffffffff,
    0xffffffffffffffff,
]);

/// `TOTAL_BITS / MAX_UNDERLYING`, an exact quotient.
pub const BITS_PER_UNDERLYING: U256 = U256([0xaa9a3ee524f8e028, 0xf03f243baf513267, 0x4f3a68dbc8, 0]);

/// Highest price precision an oracle may report.
pub const MAX_PRICE_DECIMALS: u8 = 18;

/// `max_price(d) == 2^MAX_PRICE_EXPONENTS[d] - 1`.
///
/// Each entry is the largest exponent for which one wrapper unit is still
/// backed by at least `MAX_UNDERLYING` bits at the maximum price.
pub const MAX_PRICE_EXPONENTS: [usize; MAX_PRICE_DECIMALS as usize + 1] = [
    76, 79, 83, 86, 89, 93, 96, 99, 103, 106, 109, 113, 116, 119, 123, 126, 129, 133, 136,
];
