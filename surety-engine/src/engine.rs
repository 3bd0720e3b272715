//! Composition root: one lock over every registry, one entry point per operation

use crate::config::SuretyConfig;
use parking_lot::Mutex;
use surety_consensus::{
    Airline, AirlineRegistry, OracleConsensus, OracleRegistration, OracleRequest, RequestKey,
    ResponseOutcome,
};
use surety_core::{
    Address, AirlineStatus, BlockContext, Caller, FlightKey, FlightStatus, SuretyError,
    SuretyEvent, SuretyResult, Timestamp, Wei,
};
use surety_insurance::{Flight, FlightRegistry, InsurancePolicy, InsurancePool};
use surety_ledger::{AccountLedger, MemoryLedger};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// All mutable state, guarded as a unit
struct EngineState<L> {
    owner: Address,
    operational: bool,
    pool: Address,
    block: BlockContext,
    airlines: AirlineRegistry,
    flights: FlightRegistry,
    insurance: InsurancePool,
    oracles: OracleConsensus,
    ledger: L,
}

impl<L> EngineState<L> {
    fn require_operational(&self) -> SuretyResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::NotOperational)
        }
    }
}

/// Flight surety engine.
///
/// Every operation takes the engine lock for its whole duration, so each
/// runs to completion before the next one observes any state. Events are
/// published to subscribers only after the operation has committed, and
/// in commit order.
pub struct ConsensusEngine<L: AccountLedger = MemoryLedger> {
    state: Mutex<EngineState<L>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SuretyEvent>>>,
}

impl<L: AccountLedger> ConsensusEngine<L> {
    /// Create a new engine over a ledger
    pub fn new(config: SuretyConfig, ledger: L) -> SuretyResult<Self> {
        config.validate()?;

        info!(
            "Starting flight surety engine (owner {}, pool {})",
            config.owner, config.pool_address
        );

        let state = EngineState {
            owner: config.owner,
            operational: true,
            pool: config.pool_address,
            block: BlockContext::genesis(config.genesis_timestamp),
            airlines: AirlineRegistry::new(config.airline, config.first_airline),
            flights: FlightRegistry::new(),
            insurance: InsurancePool::new(config.insurance),
            oracles: OracleConsensus::new(config.oracle),
            ledger,
        };

        Ok(Self {
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SuretyEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Deliver committed events; callers hold the state lock
    fn publish(&self, events: Vec<SuretyEvent>) {
        if events.is_empty() {
            return;
        }

        let mut subscribers = self.subscribers.lock();
        for event in events {
            debug!("Publishing {}", event.name());
            subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        }
    }

    /// Run a state-changing operation under the lock
    fn execute<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut EngineState<L>, &mut Vec<SuretyEvent>) -> SuretyResult<T>,
    ) -> SuretyResult<T> {
        let mut events = Vec::new();
        let mut state = self.state.lock();
        let result = state
            .require_operational()
            .and_then(|_| f(&mut *state, &mut events));

        // Published under the state lock so delivery order matches commit order
        match &result {
            Ok(_) => self.publish(events),
            Err(e) => debug!("{} rejected: {}", operation, e),
        }
        drop(state);
        result
    }

    fn read<T>(&self, f: impl FnOnce(&EngineState<L>) -> T) -> T {
        f(&*self.state.lock())
    }

    // Operational control

    pub fn is_operational(&self) -> bool {
        self.read(|state| state.operational)
    }

    /// Pause or resume every state-changing operation (owner only)
    pub fn set_operational_status(&self, caller: Caller, operational: bool) -> SuretyResult<()> {
        let mut state = self.state.lock();
        if caller.address() != state.owner {
            warn!("Rejected operational change from non-owner {}", caller);
            return Err(SuretyError::Unauthorized {
                caller: caller.address(),
                reason: "only the owner may change the operational status".to_string(),
            });
        }
        state.operational = operational;

        info!("Operational status set to {}", operational);
        self.publish(vec![SuretyEvent::OperationalStatusChanged { operational }]);
        drop(state);
        Ok(())
    }

    pub fn owner(&self) -> Address {
        self.read(|state| state.owner)
    }

    // Airlines

    /// Register (or vote for) a candidate airline
    pub fn register_airline(&self, caller: Caller, candidate: Address) -> SuretyResult<AirlineStatus> {
        self.execute("register_airline", |state, events| {
            state.airlines.register_airline(caller, candidate, events)
        })
    }

    /// Fund the calling airline
    pub fn fund(&self, caller: Caller, amount: Wei) -> SuretyResult<AirlineStatus> {
        self.execute("fund", |state, events| {
            let pool = state.pool;
            state
                .airlines
                .fund(caller, amount, &mut state.ledger, pool, events)
        })
    }

    pub fn fetch_airline_status(&self, airline: &Address) -> AirlineStatus {
        self.read(|state| state.airlines.fetch_airline_status(airline))
    }

    pub fn fetch_airline(&self, airline: &Address) -> Option<Airline> {
        self.read(|state| state.airlines.fetch_airline(airline).cloned())
    }

    pub fn count_registered(&self) -> usize {
        self.read(|state| state.airlines.count_registered())
    }

    // Flights

    /// Register a flight owned by the calling airline
    pub fn register_flight(
        &self,
        caller: Caller,
        code: &str,
        timestamp: Timestamp,
    ) -> SuretyResult<FlightKey> {
        self.execute("register_flight", |state, events| {
            let status = state.airlines.fetch_airline_status(&caller.address());
            let block_number = state.block.number;
            state
                .flights
                .register_flight(caller, status, code, timestamp, block_number, events)
        })
    }

    pub fn fetch_flight(&self, flight: &FlightKey) -> Option<Flight> {
        self.read(|state| state.flights.fetch_flight(flight).cloned())
    }

    pub fn flights_of(&self, airline: &Address) -> Vec<Flight> {
        self.read(|state| state.flights.flights_of(airline).cloned().collect())
    }

    // Insurance

    /// Buy a policy on a flight for the calling passenger
    pub fn buy(
        &self,
        caller: Caller,
        airline: Address,
        code: &str,
        timestamp: Timestamp,
        amount: Wei,
    ) -> SuretyResult<()> {
        let flight = FlightKey::new(airline, code, timestamp);
        self.execute("buy", |state, events| {
            let pool = state.pool;
            state.insurance.buy(
                caller,
                &state.flights,
                flight,
                amount,
                &mut state.ledger,
                pool,
                events,
            )
        })
    }

    /// Claim the payout of the calling passenger's policy
    pub fn withdraw(
        &self,
        caller: Caller,
        airline: Address,
        code: &str,
        timestamp: Timestamp,
    ) -> SuretyResult<Wei> {
        let flight = FlightKey::new(airline, code, timestamp);
        self.execute("withdraw", |state, events| {
            let pool = state.pool;
            state
                .insurance
                .withdraw(caller, &state.flights, flight, &mut state.ledger, pool, events)
        })
    }

    pub fn policy(&self, flight: &FlightKey, passenger: &Address) -> Option<InsurancePolicy> {
        self.read(|state| state.insurance.policy(flight, passenger).cloned())
    }

    /// Premiums of unclaimed policies on a flight
    pub fn exposure(&self, flight: &FlightKey) -> Wei {
        self.read(|state| state.insurance.exposure(flight))
    }

    // Oracles

    /// Register the calling oracle, paying `fee`
    pub fn register_oracle(&self, caller: Caller, fee: Wei) -> SuretyResult<[u8; 3]> {
        self.execute("register_oracle", |state, events| {
            let pool = state.pool;
            let block = state.block;
            state
                .oracles
                .register_oracle(caller, fee, &block, &mut state.ledger, pool, events)
        })
    }

    pub fn get_my_indexes(&self, caller: Caller) -> SuretyResult<[u8; 3]> {
        self.read(|state| state.oracles.get_my_indexes(caller))
    }

    /// Ask oracles for a flight's status; returns the index they should answer
    pub fn fetch_flight_status(
        &self,
        caller: Caller,
        airline: Address,
        code: &str,
        timestamp: Timestamp,
    ) -> SuretyResult<u8> {
        let flight = FlightKey::new(airline, code, timestamp);
        self.execute("fetch_flight_status", |state, events| {
            let block = state.block;
            Ok(state
                .oracles
                .fetch_flight_status(caller, flight, &block, events))
        })
    }

    /// Submit an oracle's report for an open request
    pub fn submit_oracle_response(
        &self,
        caller: Caller,
        index: u8,
        airline: Address,
        code: &str,
        timestamp: Timestamp,
        status: FlightStatus,
    ) -> SuretyResult<ResponseOutcome> {
        let flight = FlightKey::new(airline, code, timestamp);
        self.execute("submit_oracle_response", |state, events| {
            let block = state.block;
            let outcome = state.oracles.submit_oracle_response(
                caller,
                index,
                flight.clone(),
                status,
                &block,
                events,
            )?;

            if let ResponseOutcome::Finalized { status } = outcome {
                state.flights.apply_finalized_status(&flight, status);
            }
            Ok(outcome)
        })
    }

    pub fn oracle(&self, oracle: &Address) -> Option<OracleRegistration> {
        self.read(|state| state.oracles.oracle(oracle).cloned())
    }

    pub fn oracle_request(&self, key: &RequestKey) -> Option<OracleRequest> {
        self.read(|state| state.oracles.request(key).cloned())
    }

    pub fn closed_requests(&self) -> Vec<OracleRequest> {
        self.read(|state| state.oracles.closed_requests().to_vec())
    }

    // Substrate

    /// Advance to the next block
    pub fn advance_block(&self, timestamp: Timestamp) -> BlockContext {
        let mut state = self.state.lock();
        state.block = state.block.next(timestamp);
        debug!("Advanced to block {}", state.block.number);
        state.block
    }

    pub fn block_context(&self) -> BlockContext {
        self.read(|state| state.block)
    }

    pub fn pool_address(&self) -> Address {
        self.read(|state| state.pool)
    }

    pub fn balance_of(&self, address: &Address) -> Wei {
        self.read(|state| state.ledger.balance_of(address))
    }

    /// Read directly from the underlying ledger.
    ///
    /// `f` runs under the engine lock and must not call back into the engine.
    pub fn with_ledger<T>(&self, f: impl FnOnce(&L) -> T) -> T {
        self.read(|state| f(&state.ledger))
    }
}
