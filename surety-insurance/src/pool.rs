//! Premium escrow and payout

use crate::config::InsuranceConfig;
use crate::flight::FlightRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surety_core::{
    Address, Caller, FlightKey, FlightStatus, SuretyError, SuretyEvent, SuretyResult, Wei,
};
use surety_ledger::AccountLedger;
use tracing::{debug, info};

/// A passenger's policy on one flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub flight: FlightKey,
    pub passenger: Address,
    pub premium_paid: Wei,
    /// Set once, on payout
    pub claimed: bool,
}

/// Escrowed policies.
///
/// Premiums and payouts move through the pool account on the ledger;
/// the pool itself only tracks who is owed what.
#[derive(Debug, Clone)]
pub struct InsurancePool {
    config: InsuranceConfig,
    policies: HashMap<(FlightKey, Address), InsurancePolicy>,
}

impl InsurancePool {
    pub fn new(config: InsuranceConfig) -> Self {
        Self {
            config,
            policies: HashMap::new(),
        }
    }

    /// Buy a policy on a registered flight whose status is still unknown
    #[allow(clippy::too_many_arguments)]
    pub fn buy<L: AccountLedger + ?Sized>(
        &mut self,
        caller: Caller,
        flights: &FlightRegistry,
        flight: FlightKey,
        amount: Wei,
        ledger: &mut L,
        pool: Address,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<()> {
        let passenger = caller.address();
        let Some(status) = flights.fetch_flight(&flight).map(|f| f.status) else {
            return Err(SuretyError::FlightNotRegistered(flight));
        };

        if status != FlightStatus::Unknown {
            return Err(SuretyError::FlightAlreadySettled { flight, status });
        }

        if amount > self.config.max_premium {
            return Err(SuretyError::ExcessPremium {
                maximum: self.config.max_premium,
                provided: amount,
            });
        }

        if amount == 0 {
            return Err(SuretyError::ZeroPremium);
        }

        let policy_key = (flight, passenger);
        if self.policies.contains_key(&policy_key) {
            return Err(SuretyError::DuplicatePolicy {
                passenger,
                flight: policy_key.0,
            });
        }

        ledger.transfer(passenger, pool, amount)?;

        info!("Passenger {} insured flight {} for {}", passenger, policy_key.0, amount);
        events.push(SuretyEvent::InsurancePurchased {
            passenger,
            flight: policy_key.0.clone(),
            premium: amount,
        });
        self.policies.insert(
            policy_key.clone(),
            InsurancePolicy {
                flight: policy_key.0,
                passenger,
                premium_paid: amount,
                claimed: false,
            },
        );
        Ok(())
    }

    /// Pay out a qualifying policy, exactly once
    pub fn withdraw<L: AccountLedger + ?Sized>(
        &mut self,
        caller: Caller,
        flights: &FlightRegistry,
        flight: FlightKey,
        ledger: &mut L,
        pool: Address,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<Wei> {
        let passenger = caller.address();
        let policy_key = (flight, passenger);

        let Some(policy) = self.policies.get_mut(&policy_key) else {
            return Err(SuretyError::NoPolicy {
                passenger,
                flight: policy_key.0,
            });
        };

        if policy.claimed {
            return Err(SuretyError::AlreadyClaimed {
                passenger,
                flight: policy_key.0,
            });
        }

        let status = flights
            .fetch_flight(&policy.flight)
            .map(|f| f.status)
            .unwrap_or_default();
        if !status.is_compensable() {
            return Err(SuretyError::FlightNotDelayedByAirline {
                flight: policy_key.0,
                status,
            });
        }

        let payout = self.config.payout_for(policy.premium_paid)?;

        // Claimed before value moves; restored if the transfer is refused.
        policy.claimed = true;
        if let Err(e) = ledger.transfer(pool, passenger, payout) {
            policy.claimed = false;
            return Err(e.into());
        }

        let policy_flight = policy.flight.clone();
        debug!("Policy of {} on {} marked claimed", passenger, policy_flight);
        info!("Paid {} to {} for flight {}", payout, passenger, policy_flight);
        events.push(SuretyEvent::InsurancePaid {
            passenger,
            flight: policy_flight,
            payout,
        });
        Ok(payout)
    }

    pub fn policy(&self, flight: &FlightKey, passenger: &Address) -> Option<&InsurancePolicy> {
        self.policies.get(&(flight.clone(), *passenger))
    }

    /// Premiums of unclaimed policies on a flight
    pub fn exposure(&self, flight: &FlightKey) -> Wei {
        self.policies
            .values()
            .filter(|policy| &policy.flight == flight && !policy.claimed)
            .map(|policy| policy.premium_paid)
            .sum()
    }

    pub fn config(&self) -> &InsuranceConfig {
        &self.config
    }
}
