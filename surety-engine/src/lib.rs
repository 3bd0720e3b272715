//! Flight surety engine
//!
//! Composes the airline registry, flight registry, insurance pool and
//! oracle consensus over one account ledger, and serializes every
//! operation behind a single lock.

pub mod config;
pub mod engine;

pub use config::{SuretyConfig, DEFAULT_POOL_LABEL};
pub use engine::ConsensusEngine;

// Re-export the component crates for downstream users
pub use surety_consensus;
pub use surety_core;
pub use surety_insurance;
pub use surety_ledger;
