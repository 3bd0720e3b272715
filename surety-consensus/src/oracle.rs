//! Oracle consensus: index assignment, status requests and majority resolution

use crate::config::OracleConfig;
use crate::selector::IndexSelector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use surety_core::{
    Address, BlockContext, Caller, FlightKey, FlightStatus, SuretyError, SuretyEvent,
    SuretyResult, Wei,
};
use surety_ledger::AccountLedger;
use tracing::{debug, info, warn};

/// Registered oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRegistration {
    pub oracle: Address,
    pub indexes: [u8; 3],
    pub registered_at: BlockContext,
}

/// Identity of a status request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub index: u8,
    pub flight: FlightKey,
}

/// Request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Open,
    Finalized(FlightStatus),
}

/// A status request and the responses collected for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub key: RequestKey,
    pub requester: Address,
    pub opened_at: BlockContext,
    pub state: RequestState,
    responses: BTreeMap<FlightStatus, BTreeSet<Address>>,
}

impl OracleRequest {
    fn new(key: RequestKey, requester: Address, opened_at: BlockContext) -> Self {
        Self {
            key,
            requester,
            opened_at,
            state: RequestState::Open,
            responses: BTreeMap::new(),
        }
    }

    /// Whether the request still accepts responses at `block`
    pub fn is_open_at(&self, block: &BlockContext, ttl_blocks: Option<u64>) -> bool {
        if self.state != RequestState::Open {
            return false;
        }
        match ttl_blocks {
            Some(ttl) => block.number <= self.opened_at.number.saturating_add(ttl),
            None => true,
        }
    }

    /// Whether `oracle` already responded, with any status
    pub fn has_responded(&self, oracle: &Address) -> bool {
        self.responses.values().any(|voters| voters.contains(oracle))
    }

    /// Number of oracles that reported `status`
    pub fn response_count(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map(BTreeSet::len).unwrap_or(0)
    }

    /// Total responses across all statuses
    pub fn total_responses(&self) -> usize {
        self.responses.values().map(BTreeSet::len).sum()
    }
}

/// Why a response was accepted without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The request already reached consensus
    AlreadyFinalized,
    /// This oracle already answered the request
    DuplicateResponse,
}

/// Result of submitting a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Counted; consensus not reached yet
    Recorded { status: FlightStatus, count: usize },
    /// This response completed the majority
    Finalized { status: FlightStatus },
    /// Accepted as a no-op
    Ignored(IgnoreReason),
}

/// Oracle consensus state machine
#[derive(Debug, Clone)]
pub struct OracleConsensus {
    config: OracleConfig,
    selector: IndexSelector,
    oracles: HashMap<Address, OracleRegistration>,
    requests: HashMap<RequestKey, OracleRequest>,
    /// Requests replaced by a newer request under the same key
    closed: Vec<OracleRequest>,
    /// Monotonic counter mixed into every index draw
    nonce: u64,
}

impl OracleConsensus {
    /// Create a new oracle consensus
    pub fn new(config: OracleConfig) -> Self {
        let selector = IndexSelector::new(config.index_range);
        Self {
            config,
            selector,
            oracles: HashMap::new(),
            requests: HashMap::new(),
            closed: Vec::new(),
            nonce: 0,
        }
    }

    /// Register an oracle and assign its indexes
    pub fn register_oracle<L: AccountLedger + ?Sized>(
        &mut self,
        caller: Caller,
        fee: Wei,
        block: &BlockContext,
        ledger: &mut L,
        pool: Address,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<[u8; 3]> {
        let oracle = caller.address();
        if self.oracles.contains_key(&oracle) {
            return Err(SuretyError::OracleAlreadyRegistered(oracle));
        }

        if fee < self.config.registration_fee {
            return Err(SuretyError::InsufficientFee {
                required: self.config.registration_fee,
                provided: fee,
            });
        }

        ledger.transfer(oracle, pool, fee)?;

        self.nonce += 1;
        let indexes = self.selector.draw_indexes(&oracle, self.nonce, block);
        self.oracles.insert(
            oracle,
            OracleRegistration {
                oracle,
                indexes,
                registered_at: *block,
            },
        );

        info!("Oracle {} registered with indexes {:?}", oracle, indexes);
        events.push(SuretyEvent::OracleRegistered { oracle, indexes });
        Ok(indexes)
    }

    /// Indexes assigned to an oracle
    pub fn get_my_indexes(&self, caller: Caller) -> SuretyResult<[u8; 3]> {
        self.oracles
            .get(&caller.address())
            .map(|registration| registration.indexes)
            .ok_or(SuretyError::OracleNotRegistered(caller.address()))
    }

    /// Open a status request for a flight, returning the index oracles should answer
    pub fn fetch_flight_status(
        &mut self,
        requester: Caller,
        flight: FlightKey,
        block: &BlockContext,
        events: &mut Vec<SuretyEvent>,
    ) -> u8 {
        self.nonce += 1;
        let salt = flight.digest();
        let index = self
            .selector
            .draw(&requester.address(), self.nonce, block, salt.as_bytes());

        let key = RequestKey { index, flight };
        let ttl = self.config.request_ttl_blocks;

        let keep_existing = self
            .requests
            .get(&key)
            .is_some_and(|request| request.is_open_at(block, ttl));

        if keep_existing {
            debug!("Request at index {} for {} is already open", index, key.flight);
        } else {
            if let Some(previous) = self.requests.remove(&key) {
                self.closed.push(previous);
            }
            info!("Opened status request at index {} for {}", index, key.flight);
            self.requests.insert(
                key.clone(),
                OracleRequest::new(key.clone(), requester.address(), *block),
            );
        }

        events.push(SuretyEvent::oracle_request(index, &key.flight));
        index
    }

    /// Record an oracle's response to an open request
    pub fn submit_oracle_response(
        &mut self,
        caller: Caller,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
        block: &BlockContext,
        events: &mut Vec<SuretyEvent>,
    ) -> SuretyResult<ResponseOutcome> {
        let oracle = caller.address();
        let assigned = self
            .oracles
            .get(&oracle)
            .is_some_and(|registration| registration.indexes.contains(&index));
        if !assigned {
            return Err(SuretyError::UnassignedIndex { oracle, index });
        }

        let key = RequestKey { index, flight };
        let Some(request) = self.requests.get_mut(&key) else {
            return Err(SuretyError::RequestNotOpen {
                index,
                flight: key.flight,
            });
        };

        if let RequestState::Finalized(final_status) = request.state {
            debug!(
                "Ignoring response from {} for finalized {} ({})",
                oracle, key.flight, final_status
            );
            return Ok(ResponseOutcome::Ignored(IgnoreReason::AlreadyFinalized));
        }

        if !request.is_open_at(block, self.config.request_ttl_blocks) {
            return Err(SuretyError::RequestNotOpen {
                index,
                flight: key.flight,
            });
        }

        if request.has_responded(&oracle) {
            warn!("Duplicate response from {} for {}", oracle, key.flight);
            return Ok(ResponseOutcome::Ignored(IgnoreReason::DuplicateResponse));
        }

        let voters = request.responses.entry(status).or_default();
        voters.insert(oracle);
        let count = voters.len();

        debug!(
            "Oracle {} reported {} for {} ({}/{})",
            oracle, status, key.flight, count, self.config.min_responses
        );
        events.push(SuretyEvent::OracleReport {
            oracle,
            airline: key.flight.airline,
            flight: key.flight.code.clone(),
            timestamp: key.flight.timestamp,
            status,
        });

        if count >= self.config.min_responses {
            request.state = RequestState::Finalized(status);
            info!("Flight {} finalized as {} by {} oracles", key.flight, status, count);
            events.push(SuretyEvent::FlightStatusInfo {
                airline: key.flight.airline,
                flight: key.flight.code.clone(),
                timestamp: key.flight.timestamp,
                status,
            });
            return Ok(ResponseOutcome::Finalized { status });
        }

        Ok(ResponseOutcome::Recorded { status, count })
    }

    /// Current request under a key
    pub fn request(&self, key: &RequestKey) -> Option<&OracleRequest> {
        self.requests.get(key)
    }

    /// Requests superseded by newer requests, oldest first
    pub fn closed_requests(&self) -> &[OracleRequest] {
        &self.closed
    }

    /// Registration of an oracle
    pub fn oracle(&self, oracle: &Address) -> Option<&OracleRegistration> {
        self.oracles.get(oracle)
    }

    /// Number of registered oracles
    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}
