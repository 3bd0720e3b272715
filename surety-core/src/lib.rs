//! Core flight surety data structures
//!
//! This crate provides the types shared by every component:
//! - Identity and value types (Address, Hash, Wei, Caller, BlockContext)
//! - Airline and flight status codes
//! - Flight identity
//! - The error taxonomy and observable events

pub mod error;
pub mod event;
pub mod flight;
pub mod serde_wei;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use error::*;
pub use event::*;
pub use flight::*;
pub use status::*;
pub use types::*;
