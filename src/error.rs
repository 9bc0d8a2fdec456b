use odra::prelude::*;
use core::fmt;

/// Errors raised by the wrapper ledgers, the bundled oracle and the mock token.
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WrapperError {
    // 1
    /// Target is the null address or the contract itself.
    InvalidRecipient = 1,
    /// An underlying or wrapper amount resolved to zero.
    ZeroAmount = 2,
    /// Ledger balance below the requested amount.
    InsufficientBalance = 3,
    /// Allowance below the requested amount.
    InsufficientAllowance = 4,
    /// No accepted price where one is required.
    OracleUnavailable = 5,

    // 6
    /// Checked arithmetic failed, or the unissued pool ran out.
    Overflow = 6,
    /// Oracle reports more than 18 price decimals.
    InvalidPriceDecimals = 7,
    /// Caller lacks the required role.
    Unauthorized = 8,
    /// Initial deposit already locked.
    AlreadyInitialized = 9,
    /// Initial deposit not locked yet.
    NotInitialized = 10,
}

impl WrapperError {
    pub fn message(&self) -> &str {
        match self {
            WrapperError::InvalidRecipient => "Recipient is the null address or the contract itself",
            WrapperError::ZeroAmount => "Amount resolves to zero",
            WrapperError::InsufficientBalance => "Balance too low",
            WrapperError::InsufficientAllowance => "Allowance too low",
            WrapperError::OracleUnavailable => "Oracle did not report a valid price",
            WrapperError::Overflow => "Math operation overflow",
            WrapperError::InvalidPriceDecimals => "Price decimals must be at most 18",
            WrapperError::Unauthorized => "Caller is not allowed to perform this action",
            WrapperError::AlreadyInitialized => "Initial deposit already locked",
            WrapperError::NotInitialized => "Initial deposit not locked yet",
        }
    }
}

impl core::fmt::Display for WrapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Resolves a ledger result inside an entry point, aborting the call on error.
pub(crate) trait OrRevert<T> {
    fn or_revert(self, env: &odra::ContractEnv) -> T;
}

impl<T> OrRevert<T> for Result<T, WrapperError> {
    fn or_revert(self, env: &odra::ContractEnv) -> T {
        self.unwrap_or_else(|err| env.revert(err))
    }
}
