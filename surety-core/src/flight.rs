//! Flight identity

use crate::types::{Address, Hash, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique flight identity: owning airline, flight code and scheduled departure.
///
/// The code alone is ambiguous across airlines and days, so all three
/// parts take part in equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Address,
    pub code: String,
    pub timestamp: Timestamp,
}

impl FlightKey {
    pub fn new(airline: Address, code: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            airline,
            code: code.into(),
            timestamp,
        }
    }

    /// Stable digest of the key, used as part of oracle seeds
    pub fn digest(&self) -> Hash {
        let mut data = Vec::with_capacity(20 + self.code.len() + 8);
        data.extend_from_slice(self.airline.as_bytes());
        data.extend_from_slice(self.code.as_bytes());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        Hash::digest(&data)
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.airline, self.code, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_key_identity_uses_all_parts() {
        let airline = Address::derive("airline");
        let base = FlightKey::new(airline, "TG1001", 1_700_000_000);

        assert_eq!(base, FlightKey::new(airline, "TG1001", 1_700_000_000));
        assert_ne!(base, FlightKey::new(airline, "TG1002", 1_700_000_000));
        assert_ne!(base, FlightKey::new(airline, "TG1001", 1_700_000_001));
        assert_ne!(base, FlightKey::new(Address::derive("other"), "TG1001", 1_700_000_000));

        assert_eq!(base.digest(), FlightKey::new(airline, "TG1001", 1_700_000_000).digest());
        assert_ne!(base.digest(), FlightKey::new(airline, "TG1002", 1_700_000_000).digest());
    }
}
