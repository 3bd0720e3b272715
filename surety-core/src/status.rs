//! Lifecycle status codes for airlines and flights

use serde::{Deserialize, Serialize};
use std::fmt;

/// Airline lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum AirlineStatus {
    #[default]
    Unregistered,
    /// Waiting for enough votes from registered airlines
    Pending,
    /// Admitted, but may not act until funded
    Registered,
    /// Admitted and funded; full participant
    Funded,
}

impl AirlineStatus {
    /// Numeric status code as exposed to external collaborators
    pub fn code(&self) -> u8 {
        match self {
            AirlineStatus::Unregistered => 0,
            AirlineStatus::Pending => 1,
            AirlineStatus::Registered => 2,
            AirlineStatus::Funded => 3,
        }
    }

    /// Whether the airline counts toward the registered-airline total
    pub fn is_registered(&self) -> bool {
        matches!(self, AirlineStatus::Registered | AirlineStatus::Funded)
    }
}

impl fmt::Display for AirlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AirlineStatus::Unregistered => "unregistered",
            AirlineStatus::Pending => "pending",
            AirlineStatus::Registered => "registered",
            AirlineStatus::Funded => "funded",
        };
        f.write_str(name)
    }
}

/// Flight status as reported by oracles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum FlightStatus {
    #[default]
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Every status an oracle may report
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Wire status code (0, 10, ..., 50)
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Parse a wire status code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Only an airline-caused delay is compensable
    pub fn is_compensable(&self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "unknown",
            FlightStatus::OnTime => "on-time",
            FlightStatus::LateAirline => "late-airline",
            FlightStatus::LateWeather => "late-weather",
            FlightStatus::LateTechnical => "late-technical",
            FlightStatus::LateOther => "late-other",
        };
        f.write_str(name)
    }
}
