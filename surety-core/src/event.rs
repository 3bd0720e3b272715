//! Observable notifications emitted by committed operations

use crate::flight::FlightKey;
use crate::status::{AirlineStatus, FlightStatus};
use crate::types::{Address, Timestamp, Wei};
use serde::{Deserialize, Serialize};

/// Events published after an operation commits.
///
/// Off-chain collaborators subscribe to `OracleRequest` to know which
/// index to answer, and to `OracleReport` / `FlightStatusInfo` for
/// observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SuretyEvent {
    AirlineStatusChanged {
        airline: Address,
        status: AirlineStatus,
        votes: usize,
    },
    AirlineFunded {
        airline: Address,
        amount: Wei,
        total: Wei,
    },
    FlightRegistered {
        flight: FlightKey,
    },
    InsurancePurchased {
        passenger: Address,
        flight: FlightKey,
        premium: Wei,
    },
    InsurancePaid {
        passenger: Address,
        flight: FlightKey,
        payout: Wei,
    },
    OracleRegistered {
        oracle: Address,
        indexes: [u8; 3],
    },
    OracleRequest {
        index: u8,
        airline: Address,
        flight: String,
        timestamp: Timestamp,
    },
    OracleReport {
        oracle: Address,
        airline: Address,
        flight: String,
        timestamp: Timestamp,
        status: FlightStatus,
    },
    FlightStatusInfo {
        airline: Address,
        flight: String,
        timestamp: Timestamp,
        status: FlightStatus,
    },
    OperationalStatusChanged {
        operational: bool,
    },
}

impl SuretyEvent {
    /// Short event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SuretyEvent::AirlineStatusChanged { .. } => "AirlineStatusChanged",
            SuretyEvent::AirlineFunded { .. } => "AirlineFunded",
            SuretyEvent::FlightRegistered { .. } => "FlightRegistered",
            SuretyEvent::InsurancePurchased { .. } => "InsurancePurchased",
            SuretyEvent::InsurancePaid { .. } => "InsurancePaid",
            SuretyEvent::OracleRegistered { .. } => "OracleRegistered",
            SuretyEvent::OracleRequest { .. } => "OracleRequest",
            SuretyEvent::OracleReport { .. } => "OracleReport",
            SuretyEvent::FlightStatusInfo { .. } => "FlightStatusInfo",
            SuretyEvent::OperationalStatusChanged { .. } => "OperationalStatusChanged",
        }
    }

    /// Request notification for a flight
    pub fn oracle_request(index: u8, flight: &FlightKey) -> Self {
        SuretyEvent::OracleRequest {
            index,
            airline: flight.airline,
            flight: flight.code.clone(),
            timestamp: flight.timestamp,
        }
    }
}
