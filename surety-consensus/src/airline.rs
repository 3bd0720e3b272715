//! Airline admission: registration, multi-party voting and funding

use crate::config::AirlineConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use surety_core::{Address, AirlineStatus, Caller, SuretyError, SuretyEvent, SuretyResult, Wei};
use surety_ledger::AccountLedger;
use tracing::{debug, info};

/// Airline record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub address: Address,
    pub status: AirlineStatus,
    /// Registered airlines that voted for admission while pending
    votes: BTreeSet<Address>,
    pub funded_amount: Wei,
}

impl Airline {
    fn new(address: Address) -> Self {
        Self {
            address,
            status: AirlineStatus::Unregistered,
            votes: BTreeSet::new(),
            funded_amount: 0,
        }
    }

    /// Number of distinct voters
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    /// Whether `voter` has voted for this airline
    pub fn has_vote_from(&self, voter: &Address) -> bool {
        self.votes.contains(voter)
    }

    pub fn votes(&self) -> impl Iterator<Item = &Address> {
        self.votes.iter()
    }
}

/// Airline lifecycle state machine
#[derive(Debug, Clone)]
pub struct AirlineRegistry {
    config: AirlineConfig,
    airlines: HashMap<Address, Airline>,
}

impl AirlineRegistry {
    /// Create a registry whose first airline is already funded.
    ///
    /// Someone has to be funded for anyone to be registered; the genesis
    /// airline plays that role.
    pub fn new(config: AirlineConfig, first_airline: Address) -> Self {
        let mut genesis = Airline::new(first_airline);
        genesis.status = AirlineStatus::Funded;

        let mut airlines = HashMap::new();
        airlines.insert(first_airline, genesis);

        info!("Airline registry created with genesis airline {}", first_airline);
        Self { config, airlines }
    }

    /// Votes a pending candidate needs when `registered` airlines exist
    pub fn required_votes(registered: usize) -> usize {
        registered.div_ceil(2)
    }

    /// Register or vote for a candidate airline on behalf of a funded airline
    pub fn register_airline(
        &mut self,
        caller: Caller,
        candidate: Address,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<AirlineStatus> {
        let voter = caller.address();
        let voter_status = self.fetch_airline_status(&voter);
        if voter_status != AirlineStatus::Funded {
            return Err(SuretyError::CallerNotFunded {
                airline: voter,
                status: voter_status,
            });
        }

        let current = self.fetch_airline_status(&candidate);
        if current.is_registered() {
            return Err(SuretyError::AirlineAlreadyRegistered {
                airline: candidate,
                status: current,
            });
        }

        let registered = self.count_registered();

        if registered < self.config.fast_path_limit {
            let airline = self
                .airlines
                .entry(candidate)
                .or_insert_with(|| Airline::new(candidate));
            airline.status = AirlineStatus::Registered;

            info!(
                "Airline {} registered by {} ({} registered before)",
                candidate, voter, registered
            );
            events.push(SuretyEvent::AirlineStatusChanged {
                airline: candidate,
                status: AirlineStatus::Registered,
                votes: airline.vote_count(),
            });
            return Ok(AirlineStatus::Registered);
        }

        if self
            .airlines
            .get(&candidate)
            .is_some_and(|airline| airline.has_vote_from(&voter))
        {
            return Err(SuretyError::DuplicateVote { voter, candidate });
        }

        let required = Self::required_votes(registered);
        let airline = self
            .airlines
            .entry(candidate)
            .or_insert_with(|| Airline::new(candidate));
        airline.votes.insert(voter);

        let votes = airline.vote_count();
        let status = if votes >= required {
            AirlineStatus::Registered
        } else {
            AirlineStatus::Pending
        };

        debug!(
            "Vote from {} for {}: {}/{} votes",
            voter, candidate, votes, required
        );

        if airline.status != status {
            airline.status = status;
            if status == AirlineStatus::Registered {
                info!("Airline {} registered by consensus with {} votes", candidate, votes);
            }
            events.push(SuretyEvent::AirlineStatusChanged {
                airline: candidate,
                status,
                votes,
            });
        }

        Ok(status)
    }

    /// Accept funding from a registered airline
    pub fn fund<L: AccountLedger + ?Sized>(
        &mut self,
        caller: Caller,
        amount: Wei,
        ledger: &mut L,
        pool: Address,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<AirlineStatus> {
        let funder = caller.address();
        let status = self.fetch_airline_status(&funder);
        if !status.is_registered() {
            return Err(SuretyError::CallerNotRegistered {
                airline: funder,
                status,
            });
        }

        let airline = self
            .airlines
            .get_mut(&funder)
            .ok_or(SuretyError::CallerNotRegistered {
                airline: funder,
                status,
            })?;
        let total = airline
            .funded_amount
            .checked_add(amount)
            .ok_or_else(|| SuretyError::Ledger(format!("Funding overflow for {}", funder)))?;

        ledger.transfer(funder, pool, amount)?;

        airline.funded_amount = total;
        debug!("Airline {} funded {} (total {})", funder, amount, total);
        events.push(SuretyEvent::AirlineFunded {
            airline: funder,
            amount,
            total,
        });

        if airline.status == AirlineStatus::Registered && total >= self.config.minimum_funding {
            airline.status = AirlineStatus::Funded;
            info!("Airline {} is now funded", funder);
            events.push(SuretyEvent::AirlineStatusChanged {
                airline: funder,
                status: AirlineStatus::Funded,
                votes: airline.vote_count(),
            });
        }

        Ok(airline.status)
    }

    /// Current status of an airline
    pub fn fetch_airline_status(&self, airline: &Address) -> AirlineStatus {
        self.airlines
            .get(airline)
            .map(|a| a.status)
            .unwrap_or_default()
    }

    /// Full airline record
    pub fn fetch_airline(&self, airline: &Address) -> Option<&Airline> {
        self.airlines.get(airline)
    }

    /// Number of registered or funded airlines
    pub fn count_registered(&self) -> usize {
        self.airlines
            .values()
            .filter(|airline| airline.status.is_registered())
            .count()
    }

    pub fn config(&self) -> &AirlineConfig {
        &self.config
    }
}
