//! Flight registry and insurance escrow
//!
//! Flights are registered by funded airlines and receive their status
//! from oracle consensus; passengers insure them through the pool, which
//! pays out on an airline-caused delay.

pub mod config;
pub mod flight;
pub mod pool;

pub use config::InsuranceConfig;
pub use flight::{Flight, FlightRegistry};
pub use pool::{InsurancePolicy, InsurancePool};
