//! Flight registry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surety_core::{
    Address, AirlineStatus, BlockNumber, Caller, FlightKey, FlightStatus, SuretyError,
    SuretyEvent, SuretyResult, Timestamp,
};
use tracing::{info, warn};

/// Registered flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
    pub is_registered: bool,
    pub registered_at: BlockNumber,
}

/// Flights keyed by identity
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight for the calling airline.
    ///
    /// `airline_status` is the caller's status as read from the airline registry.
    pub fn register_flight(
        &mut self,
        caller: Caller,
        airline_status: AirlineStatus,
        code: &str,
        timestamp: Timestamp,
        block_number: BlockNumber,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<FlightKey> {
        let airline = caller.address();
        if airline_status != AirlineStatus::Funded {
            return Err(SuretyError::CallerNotFunded {
                airline,
                status: airline_status,
            });
        }

        // Codes are part of the flight key and must already be trimmed
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed.len() != code.len() {
            return Err(SuretyError::InvalidFlightCode(code.to_string()));
        }

        let key = FlightKey::new(airline, code, timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::DuplicateFlight(key));
        }

        self.flights.insert(
            key.clone(),
            Flight {
                key: key.clone(),
                status: FlightStatus::Unknown,
                is_registered: true,
                registered_at: block_number,
            },
        );

        info!("Flight {} registered", key);
        events.push(SuretyEvent::FlightRegistered { flight: key.clone() });
        Ok(key)
    }

    /// Overwrite a flight's status with an oracle-finalized value.
    ///
    /// Returns false when no such flight exists, in which case nothing changes.
    pub fn apply_finalized_status(&mut self, key: &FlightKey, status: FlightStatus) -> bool {
        match self.flights.get_mut(key) {
            Some(flight) => {
                if flight.status != FlightStatus::Unknown && flight.status != status {
                    info!("Flight {} status changed from {} to {}", key, flight.status, status);
                }
                flight.status = status;
                true
            }
            None => {
                warn!("Finalized status {} for unregistered flight {}", status, key);
                false
            }
        }
    }

    pub fn fetch_flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn is_registered(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    /// All flights of one airline, ordered by code then departure
    pub fn flights_of<'a>(&'a self, airline: &'a Address) -> impl Iterator<Item = &'a Flight> + 'a {
        self.flights
            .values()
            .filter(move |flight| &flight.key.airline == airline)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
