//! Consensus parameters

use serde::{Deserialize, Serialize};
use surety_core::{SuretyError, SuretyResult, Wei, UNIT};

/// Airline admission parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirlineConfig {
    /// Registered airlines below this count admit new ones without a vote
    pub fast_path_limit: usize,
    /// Funding an airline must provide before it participates
    #[serde(with = "surety_core::serde_wei")]
    pub minimum_funding: Wei,
}

impl Default for AirlineConfig {
    fn default() -> Self {
        Self {
            fast_path_limit: 4,
            minimum_funding: 10 * UNIT,
        }
    }
}

impl AirlineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SuretyResult<()> {
        if self.fast_path_limit == 0 {
            return Err(SuretyError::Config(
                "Fast path limit must be greater than 0".to_string(),
            ));
        }

        if self.minimum_funding == 0 {
            return Err(SuretyError::Config(
                "Minimum funding must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Oracle protocol parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Fee an oracle pays to register
    #[serde(with = "surety_core::serde_wei")]
    pub registration_fee: Wei,
    /// Indexes are drawn from `0..index_range`
    pub index_range: u8,
    /// Matching responses needed to finalize a request
    pub min_responses: usize,
    /// Blocks after which an open request stops accepting responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_ttl_blocks: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            registration_fee: UNIT,
            index_range: 10,
            min_responses: 3,
            request_ttl_blocks: None,
        }
    }
}

impl OracleConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SuretyResult<()> {
        // Each oracle holds three distinct indexes
        if self.index_range < 3 {
            return Err(SuretyError::Config(format!(
                "Index range must be at least 3, got {}",
                self.index_range
            )));
        }

        if self.min_responses == 0 {
            return Err(SuretyError::Config(
                "Minimum responses must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
