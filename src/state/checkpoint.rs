use odra::casper_types::U256;

use crate::error::WrapperError;

/// Last accepted price and the number of rebases that produced it.
#[odra::odra_type]
pub struct PriceCheckpoint {
    pub last_price: U256,
    pub epoch: u64,
}

impl PriceCheckpoint {
    pub fn new(price: U256) -> Self {
        Self {
            last_price: price,
            epoch: 0,
        }
    }

    /// Records an accepted price and returns the new epoch.
    pub fn advance(&mut self, price: U256) -> Result<u64, WrapperError> {
        self.epoch = self.epoch.checked_add(1).ok_or(WrapperError::Overflow)?;
        self.last_price = price;
        Ok(self.epoch)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_advance_bumps_the_epoch() {
        let mut checkpoint = PriceCheckpoint::new(U256::from(5u64));
        assert_eq!(checkpoint.advance(U256::from(7u64)), Ok(1));
        assert_eq!(checkpoint.advance(U256::from(7u64)), Ok(2));
        assert_eq!(checkpoint.last_price, U256::from(7u64));
    }

    #[test]
    fn epoch_overflow_is_reported() {
        let mut checkpoint = PriceCheckpoint {
            last_price: U256::one(),
            epoch: u64::MAX,
        };
        assert_eq!(checkpoint.advance(U256::one()), Err(WrapperError::Overflow));
        assert_eq!(checkpoint.epoch, u64::MAX);
    }
}
