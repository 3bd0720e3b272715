//! Insurance parameters

use serde::{Deserialize, Serialize};
use surety_core::{SuretyError, SuretyResult, Wei, UNIT};

/// Premium cap and payout ratio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsuranceConfig {
    /// Largest premium a passenger may pay per policy
    #[serde(with = "surety_core::serde_wei")]
    pub max_premium: Wei,
    /// Payout is `premium * payout_numerator / payout_denominator`
    pub payout_numerator: u32,
    pub payout_denominator: u32,
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            max_premium: UNIT,
            payout_numerator: 3,
            payout_denominator: 2,
        }
    }
}

impl InsuranceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SuretyResult<()> {
        if self.max_premium == 0 {
            return Err(SuretyError::Config(
                "Maximum premium must be greater than 0".to_string(),
            ));
        }

        if self.payout_denominator == 0 {
            return Err(SuretyError::Config(
                "Payout denominator must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Payout owed for a premium
    pub fn payout_for(&self, premium: Wei) -> SuretyResult<Wei> {
        premium
            .checked_mul(self.payout_numerator as Wei)
            .map(|scaled| scaled / self.payout_denominator as Wei)
            .ok_or_else(|| SuretyError::Ledger(format!("Payout overflow for premium {}", premium)))
    }
}
