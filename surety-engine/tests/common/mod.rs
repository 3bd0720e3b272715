#![allow(dead_code)]

use surety_consensus::ResponseOutcome;
use surety_core::{Address, Caller, FlightStatus, Timestamp, Wei, UNIT};
use surety_engine::{ConsensusEngine, SuretyConfig};
use surety_ledger::MemoryLedger;

pub const AIRLINE_BALANCE: Wei = 50 * UNIT;
pub const PASSENGER_BALANCE: Wei = 10 * UNIT;
pub const ORACLE_BALANCE: Wei = 5 * UNIT;

pub fn owner() -> Caller {
    Caller::new(Address::derive("owner"))
}

pub fn airline(n: usize) -> Caller {
    Caller::new(Address::derive(&format!("airline-{n}")))
}

pub fn passenger(n: usize) -> Caller {
    Caller::new(Address::derive(&format!("passenger-{n}")))
}

pub fn oracle(n: usize) -> Caller {
    Caller::new(Address::derive(&format!("oracle-{n}")))
}

pub fn config() -> SuretyConfig {
    SuretyConfig::with_owner(owner().address())
}

/// Engine whose first airline is the owner, with funded test accounts
pub fn engine_with(config: SuretyConfig) -> ConsensusEngine {
    let balances = (1..=20)
        .map(|n| (airline(n).address(), AIRLINE_BALANCE))
        .chain((1..=10).map(|n| (passenger(n).address(), PASSENGER_BALANCE)))
        .chain((1..=30).map(|n| (oracle(n).address(), ORACLE_BALANCE)));

    ConsensusEngine::new(config, MemoryLedger::with_balances(balances)).unwrap()
}

pub fn engine() -> ConsensusEngine {
    engine_with(config())
}

/// Engine where every oracle holds every index
pub fn engine_with_full_coverage() -> ConsensusEngine {
    let mut config = config();
    config.oracle.index_range = 3;
    engine_with(config)
}

/// Register airlines `1..=count` through the owner and fund them
pub fn register_and_fund(engine: &ConsensusEngine, count: usize) {
    for n in 1..=count {
        engine.register_airline(owner(), airline(n).address()).unwrap();
        engine.fund(airline(n), 10 * UNIT).unwrap();
    }
}

/// Register oracles `1..=count` paying the default fee
pub fn register_oracles(engine: &ConsensusEngine, count: usize) -> Vec<Caller> {
    (1..=count)
        .map(|n| {
            engine.register_oracle(oracle(n), UNIT).unwrap();
            oracle(n)
        })
        .collect()
}

/// Drive a flight's status to consensus; every oracle must hold the requested index
pub fn settle(
    engine: &ConsensusEngine,
    oracles: &[Caller],
    airline: Address,
    code: &str,
    timestamp: Timestamp,
    status: FlightStatus,
) {
    let index = engine
        .fetch_flight_status(owner(), airline, code, timestamp)
        .unwrap();

    for oracle in oracles {
        let outcome = engine
            .submit_oracle_response(*oracle, index, airline, code, timestamp, status)
            .unwrap();
        if matches!(outcome, ResponseOutcome::Finalized { .. }) {
            return;
        }
    }
    panic!("no consensus reached for {code}");
}
