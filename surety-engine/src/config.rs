//! Engine configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use surety_consensus::{AirlineConfig, OracleConfig};
use surety_core::{Address, SuretyError, SuretyResult, Timestamp};
use surety_insurance::InsuranceConfig;

/// Label the default pool address is derived from
pub const DEFAULT_POOL_LABEL: &str = "flight-surety-pool";

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuretyConfig {
    /// Account allowed to pause and resume the system
    pub owner: Address,
    /// Airline that starts out funded
    pub first_airline: Address,
    /// Account holding funding, premiums and oracle fees
    pub pool_address: Address,
    /// Timestamp of the genesis block context
    pub genesis_timestamp: Timestamp,
    /// Airline admission
    pub airline: AirlineConfig,
    /// Premiums and payouts
    pub insurance: InsuranceConfig,
    /// Oracle protocol
    pub oracle: OracleConfig,
}

impl Default for SuretyConfig {
    fn default() -> Self {
        let owner = Address::derive("flight-surety-owner");
        Self {
            owner,
            first_airline: owner,
            pool_address: Address::derive(DEFAULT_POOL_LABEL),
            genesis_timestamp: 0,
            airline: AirlineConfig::default(),
            insurance: InsuranceConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl SuretyConfig {
    /// Default configuration with the given owner as first airline
    pub fn with_owner(owner: Address) -> Self {
        Self {
            owner,
            first_airline: owner,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SuretyResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SuretyError::Config(format!("Failed to read config file: {}", e)))?;

        let config: SuretyConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SuretyResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .map_err(|e| SuretyError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Parse configuration from TOML
    pub fn from_toml(toml_str: &str) -> SuretyResult<Self> {
        let config: SuretyConfig = toml::from_str(toml_str)
            .map_err(|e| SuretyError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> SuretyResult<String> {
        toml::to_string(self)
            .map_err(|e| SuretyError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load from a file, choosing the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> SuretyResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                let content = fs::read_to_string(path).map_err(|e| {
                    SuretyError::Config(format!("Failed to read config file: {}", e))
                })?;
                Self::from_toml(&content)
            }
            _ => Self::load_from_file(path),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> SuretyResult<()> {
        self.airline.validate()?;
        self.insurance.validate()?;
        self.oracle.validate()?;

        if self.pool_address == self.owner || self.pool_address == self.first_airline {
            return Err(SuretyError::Config(
                "Pool address must differ from the owner and first airline".to_string(),
            ));
        }

        if self.pool_address == Address::zero() {
            return Err(SuretyError::Config(
                "Pool address must not be the zero address".to_string(),
            ));
        }

        Ok(())
    }
}
