//! Flight surety consensus
//!
//! This crate provides the two consensus mechanisms the insurance scheme
//! rests on: multi-party voting over airline admission, and majority
//! resolution of flight status across independent oracles.

pub mod airline;
pub mod config;
pub mod oracle;
pub mod selector;

pub use airline::{Airline, AirlineRegistry};
pub use config::{AirlineConfig, OracleConfig};
pub use oracle::{
    IgnoreReason, OracleConsensus, OracleRegistration, OracleRequest, RequestKey, RequestState,
    ResponseOutcome,
};
pub use selector::IndexSelector;
