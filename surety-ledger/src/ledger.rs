//! Account ledger interface and in-memory implementation

use crate::account::Account;
use crate::LedgerResult;
use std::collections::HashMap;
use surety_core::{Address, Wei};
use tracing::debug;

/// Value-transfer primitives supplied by the execution substrate.
///
/// Implementations must leave balances untouched when an operation
/// returns an error.
pub trait AccountLedger: Send + Sync {
    /// Current balance of an account (zero if unknown)
    fn balance_of(&self, address: &Address) -> Wei;

    /// Add value to an account
    fn credit(&mut self, address: Address, amount: Wei) -> LedgerResult<()>;

    /// Remove value from an account
    fn debit(&mut self, address: Address, amount: Wei) -> LedgerResult<()>;

    /// Move value between accounts atomically
    fn transfer(&mut self, from: Address, to: Address, amount: Wei) -> LedgerResult<()> {
        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            // Undo the debit; crediting back what was just removed cannot overflow.
            self.credit(from, amount)?;
            return Err(e);
        }
        Ok(())
    }
}

/// In-memory ledger
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: HashMap<Address, Account>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial balances
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, Wei)>) -> Self {
        let accounts = balances
            .into_iter()
            .filter(|(_, balance)| *balance > 0)
            .map(|(address, balance)| (address, Account::with_balance(balance)))
            .collect();
        Self { accounts }
    }

    /// Get account by address
    pub fn get_account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> Wei {
        self.accounts.values().map(|account| account.balance).sum()
    }
}

impl AccountLedger for MemoryLedger {
    fn balance_of(&self, address: &Address) -> Wei {
        self.get_account(address).map(|a| a.balance).unwrap_or(0)
    }

    fn credit(&mut self, address: Address, amount: Wei) -> LedgerResult<()> {
        self.accounts
            .entry(address)
            .or_default()
            .add_balance(address, amount)?;
        debug!("Credited {} to {}", amount, address);
        Ok(())
    }

    fn debit(&mut self, address: Address, amount: Wei) -> LedgerResult<()> {
        let mut account = self.accounts.get(&address).cloned().unwrap_or_default();
        account.sub_balance(address, amount)?;

        if account.is_empty() {
            self.accounts.remove(&address);
        } else {
            self.accounts.insert(address, account);
        }
        debug!("Debited {} from {}", amount, address);
        Ok(())
    }
}
