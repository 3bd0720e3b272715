//! Account ledger
//!
//! The execution substrate owns balances and value transfer; this crate
//! defines the primitives the surety engine consumes from it and an
//! in-memory implementation for tests and local simulation.

pub mod account;
pub mod error;
pub mod ledger;

pub use account::Account;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{AccountLedger, MemoryLedger};
