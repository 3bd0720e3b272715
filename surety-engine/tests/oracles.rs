mod common;

use common::*;
use std::collections::HashSet;
use surety_consensus::{IgnoreReason, RequestKey, RequestState, ResponseOutcome};
use surety_core::{Caller, FlightKey, FlightStatus, SuretyError, SuretyEvent, UNIT};

const CODE: &str = "ND1309";
const DEPARTURE: u64 = 1_700_000_000;
const ORACLE_COUNT: usize = 20;

#[test]
fn test_register_oracles() {
    let engine = engine();
    let pool = engine.pool_address();

    for oracle in register_oracles(&engine, ORACLE_COUNT) {
        let indexes = engine.get_my_indexes(oracle).unwrap();
        let distinct: HashSet<u8> = indexes.iter().copied().collect();
        assert_eq!(distinct.len(), 3);
        assert!(indexes.iter().all(|index| *index < 10));
    }
    assert_eq!(engine.balance_of(&pool), ORACLE_COUNT as u128 * UNIT);

    assert_eq!(
        engine.register_oracle(oracle(1), UNIT),
        Err(SuretyError::OracleAlreadyRegistered(oracle(1).address()))
    );
    assert_eq!(
        engine.register_oracle(oracle(25), UNIT / 2),
        Err(SuretyError::InsufficientFee {
            required: UNIT,
            provided: UNIT / 2,
        })
    );
    assert_eq!(
        engine.get_my_indexes(oracle(25)),
        Err(SuretyError::OracleNotRegistered(oracle(25).address()))
    );
}

#[test]
fn test_twenty_oracles_reach_consensus() {
    let engine = engine();
    let a0 = owner().address();
    let oracles = register_oracles(&engine, ORACLE_COUNT);
    engine.register_flight(owner(), CODE, DEPARTURE).unwrap();
    let mut events = engine.subscribe();

    // Ask until the drawn index is held by enough oracles to finalize
    let (index, holders) = (0..64)
        .find_map(|_| {
            let index = engine.fetch_flight_status(owner(), a0, CODE, DEPARTURE).unwrap();
            let holders: Vec<Caller> = oracles
                .iter()
                .copied()
                .filter(|oracle| engine.get_my_indexes(*oracle).unwrap().contains(&index))
                .collect();
            (holders.len() >= 3).then_some((index, holders))
        })
        .expect("an index held by three oracles");

    // Oracles without the index are turned away
    for outsider in oracles.iter().filter(|oracle| !holders.contains(oracle)) {
        assert_eq!(
            engine.submit_oracle_response(*outsider, index, a0, CODE, DEPARTURE, FlightStatus::OnTime),
            Err(SuretyError::UnassignedIndex {
                oracle: outsider.address(),
                index,
            })
        );
    }

    let mut outcomes = holders.iter().map(|oracle| {
        engine
            .submit_oracle_response(*oracle, index, a0, CODE, DEPARTURE, FlightStatus::LateAirline)
            .unwrap()
    });
    assert_eq!(
        outcomes.next(),
        Some(ResponseOutcome::Recorded {
            status: FlightStatus::LateAirline,
            count: 1
        })
    );
    assert_eq!(
        outcomes.next(),
        Some(ResponseOutcome::Recorded {
            status: FlightStatus::LateAirline,
            count: 2
        })
    );
    assert_eq!(
        outcomes.next(),
        Some(ResponseOutcome::Finalized {
            status: FlightStatus::LateAirline
        })
    );
    assert!(outcomes.all(|outcome| outcome == ResponseOutcome::Ignored(IgnoreReason::AlreadyFinalized)));

    let key = FlightKey::new(a0, CODE, DEPARTURE);
    assert_eq!(engine.fetch_flight(&key).unwrap().status, FlightStatus::LateAirline);

    let request = engine
        .oracle_request(&RequestKey {
            index,
            flight: key.clone(),
        })
        .unwrap();
    assert_eq!(request.state, RequestState::Finalized(FlightStatus::LateAirline));
    assert_eq!(request.response_count(FlightStatus::LateAirline), 3);

    // A late dissenter after finalization changes nothing
    assert_eq!(
        engine
            .submit_oracle_response(holders[0], index, a0, CODE, DEPARTURE, FlightStatus::OnTime)
            .unwrap(),
        ResponseOutcome::Ignored(IgnoreReason::AlreadyFinalized)
    );
    assert_eq!(engine.fetch_flight(&key).unwrap().status, FlightStatus::LateAirline);

    let mut finalized = 0;
    while let Ok(event) = events.try_recv() {
        if let SuretyEvent::FlightStatusInfo { status, .. } = event {
            assert_eq!(status, FlightStatus::LateAirline);
            finalized += 1;
        }
    }
    assert_eq!(finalized, 1);
}

#[test]
fn test_response_without_request_is_rejected() {
    let engine = engine_with_full_coverage();
    let a0 = owner().address();
    let oracles = register_oracles(&engine, 1);

    assert!(matches!(
        engine.submit_oracle_response(oracles[0], 0, a0, CODE, DEPARTURE, FlightStatus::OnTime),
        Err(SuretyError::RequestNotOpen { index: 0, .. })
    ));
}

#[test]
fn test_duplicate_responses_count_once() {
    let engine = engine_with_full_coverage();
    let a0 = owner().address();
    let oracles = register_oracles(&engine, 3);
    engine.register_flight(owner(), CODE, DEPARTURE).unwrap();
    let index = engine.fetch_flight_status(owner(), a0, CODE, DEPARTURE).unwrap();

    for _ in 0..3 {
        engine
            .submit_oracle_response(oracles[0], index, a0, CODE, DEPARTURE, FlightStatus::LateAirline)
            .unwrap();
    }

    let request = engine
        .oracle_request(&RequestKey {
            index,
            flight: FlightKey::new(a0, CODE, DEPARTURE),
        })
        .unwrap();
    assert_eq!(request.state, RequestState::Open);
    assert_eq!(request.total_responses(), 1);
}

#[test]
fn test_requests_expire_when_configured() {
    let mut config = config();
    config.oracle.index_range = 3;
    config.oracle.request_ttl_blocks = Some(2);
    let engine = engine_with(config);
    let a0 = owner().address();
    let oracles = register_oracles(&engine, 3);

    let index = engine.fetch_flight_status(owner(), a0, CODE, DEPARTURE).unwrap();
    engine.advance_block(DEPARTURE + 10);
    engine
        .submit_oracle_response(oracles[0], index, a0, CODE, DEPARTURE, FlightStatus::OnTime)
        .unwrap();

    engine.advance_block(DEPARTURE + 20);
    engine.advance_block(DEPARTURE + 30);
    assert!(matches!(
        engine.submit_oracle_response(oracles[1], index, a0, CODE, DEPARTURE, FlightStatus::OnTime),
        Err(SuretyError::RequestNotOpen { .. })
    ));

    // A fresh request under the same key replaces the expired one
    (0..64)
        .map(|_| engine.fetch_flight_status(owner(), a0, CODE, DEPARTURE).unwrap())
        .find(|drawn| *drawn == index)
        .expect("the expired index drawn again");
    assert!(!engine.closed_requests().is_empty());
    engine
        .submit_oracle_response(oracles[1], index, a0, CODE, DEPARTURE, FlightStatus::OnTime)
        .unwrap();
}
