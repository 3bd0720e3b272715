//! Account model

use crate::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use surety_core::{Address, Wei};

/// Account information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account balance
    pub balance: Wei,
}

impl Account {
    /// Create an account with initial balance
    pub fn with_balance(balance: Wei) -> Self {
        Self { balance }
    }

    /// Check if account is empty
    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }

    /// Add to balance
    pub fn add_balance(&mut self, address: Address, amount: Wei) -> LedgerResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(address))?;
        Ok(())
    }

    /// Subtract from balance
    pub fn sub_balance(&mut self, address: Address, amount: Wei) -> LedgerResult<()> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                address,
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_operations() {
        let address = Address::derive("alice");
        let mut account = Account::default();
        assert!(account.is_empty());

        account.add_balance(address, 500).unwrap();
        assert_eq!(account.balance, 500);

        account.sub_balance(address, 200).unwrap();
        assert_eq!(account.balance, 300);

        // Insufficient balance should fail and leave the balance alone
        let err = account.sub_balance(address, 400).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                address,
                required: 400,
                available: 300
            }
        );
        assert_eq!(account.balance, 300);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let address = Address::derive("whale");
        let mut account = Account::with_balance(Wei::MAX);
        assert_eq!(account.add_balance(address, 1), Err(LedgerError::Overflow(address)));
        assert_eq!(account.balance, Wei::MAX);
    }
}
