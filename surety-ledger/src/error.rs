//! Ledger error types

use surety_core::{Address, SuretyError, Wei};
use thiserror::Error;

/// Ledger error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Insufficient balance
    #[error("Insufficient balance in {address}: required {required}, available {available}")]
    InsufficientBalance {
        address: Address,
        required: Wei,
        available: Wei,
    },

    /// Balance would overflow
    #[error("Balance overflow in {0}")]
    Overflow(Address),
}

impl From<LedgerError> for SuretyError {
    fn from(err: LedgerError) -> Self {
        SuretyError::Ledger(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
