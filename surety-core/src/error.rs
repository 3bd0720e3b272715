//! Error taxonomy shared by every component

use crate::flight::FlightKey;
use crate::status::{AirlineStatus, FlightStatus};
use crate::types::{Address, Wei};
use thiserror::Error;

/// Flight surety error type.
///
/// Every variant aborts the whole operation that produced it; no partial
/// state change survives a returned error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuretyError {
    /// The system is administratively paused
    #[error("System is not operational")]
    NotOperational,

    /// Caller lacks the required role
    #[error("Caller {caller} is not authorized: {reason}")]
    Unauthorized { caller: Address, reason: String },

    /// Airline has not reached the funded stage
    #[error("Airline {airline} is not funded (status: {status})")]
    CallerNotFunded { airline: Address, status: AirlineStatus },

    /// Airline has not reached the registered stage
    #[error("Airline {airline} is not registered (status: {status})")]
    CallerNotRegistered { airline: Address, status: AirlineStatus },

    /// Candidate has already been admitted
    #[error("Airline {airline} is already registered (status: {status})")]
    AirlineAlreadyRegistered { airline: Address, status: AirlineStatus },

    /// Voter already voted for this candidate
    #[error("Airline {voter} already voted for {candidate}")]
    DuplicateVote { voter: Address, candidate: Address },

    /// Flight already registered
    #[error("Flight {0} is already registered")]
    DuplicateFlight(FlightKey),

    /// Flight code is empty
    #[error("Invalid flight code: {0:?}")]
    InvalidFlightCode(String),

    /// Passenger already holds a policy on this flight
    #[error("Passenger {passenger} already insured on flight {flight}")]
    DuplicatePolicy { passenger: Address, flight: FlightKey },

    /// Oracle registration fee too low
    #[error("Insufficient fee: required {required}, provided {provided}")]
    InsufficientFee { required: Wei, provided: Wei },

    /// Premium over the configured cap
    #[error("Premium {provided} exceeds the maximum of {maximum}")]
    ExcessPremium { maximum: Wei, provided: Wei },

    /// Premium of zero
    #[error("Premium must be greater than zero")]
    ZeroPremium,

    /// No flight under this key
    #[error("Flight {0} is not registered")]
    FlightNotRegistered(FlightKey),

    /// No policy for this passenger and flight
    #[error("Passenger {passenger} holds no policy on flight {flight}")]
    NoPolicy { passenger: Address, flight: FlightKey },

    /// Policy already paid out
    #[error("Policy of {passenger} on flight {flight} was already claimed")]
    AlreadyClaimed { passenger: Address, flight: FlightKey },

    /// Flight already has a final status; it can no longer be insured
    #[error("Flight {flight} is already settled (status: {status})")]
    FlightAlreadySettled { flight: FlightKey, status: FlightStatus },

    /// Flight status does not qualify for payout
    #[error("Flight {flight} was not delayed by the airline (status: {status})")]
    FlightNotDelayedByAirline { flight: FlightKey, status: FlightStatus },

    /// Oracle already registered
    #[error("Oracle {0} is already registered")]
    OracleAlreadyRegistered(Address),

    /// Oracle unknown
    #[error("Oracle {0} is not registered")]
    OracleNotRegistered(Address),

    /// Index is not one of the caller's assigned indexes
    #[error("Index {index} is not assigned to oracle {oracle}")]
    UnassignedIndex { oracle: Address, index: u8 },

    /// No open request matches the response
    #[error("No open request at index {index} for flight {flight}")]
    RequestNotOpen { index: u8, flight: FlightKey },

    /// Underlying ledger rejected a value transfer
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SuretyError {
    fn from(err: serde_json::Error) -> Self {
        SuretyError::Serialization(err.to_string())
    }
}

/// Result type for flight surety operations
pub type SuretyResult<T> = Result<T, SuretyError>;
