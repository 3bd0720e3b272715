mod common;

use common::*;
use surety_core::{AirlineStatus, SuretyError, UNIT};

#[test]
fn test_unfunded_airline_cannot_register_another() {
    let engine = engine();
    engine.register_airline(owner(), airline(1).address()).unwrap();

    let err = engine
        .register_airline(airline(1), airline(2).address())
        .unwrap_err();
    assert_eq!(
        err,
        SuretyError::CallerNotFunded {
            airline: airline(1).address(),
            status: AirlineStatus::Registered,
        }
    );
    assert_eq!(
        engine.fetch_airline_status(&airline(2).address()),
        AirlineStatus::Unregistered
    );
}

#[test]
fn test_funding_lifecycle() {
    let engine = engine();
    let pool = engine.pool_address();
    engine.register_airline(owner(), airline(1).address()).unwrap();

    assert_eq!(engine.fund(airline(1), 4 * UNIT).unwrap(), AirlineStatus::Registered);
    assert_eq!(engine.fund(airline(1), 6 * UNIT).unwrap(), AirlineStatus::Funded);
    assert_eq!(engine.balance_of(&pool), 10 * UNIT);
    assert_eq!(engine.balance_of(&airline(1).address()), AIRLINE_BALANCE - 10 * UNIT);

    let record = engine.fetch_airline(&airline(1).address()).unwrap();
    assert_eq!(record.funded_amount, 10 * UNIT);

    // Unregistered airlines cannot fund
    let err = engine.fund(airline(2), 10 * UNIT).unwrap_err();
    assert!(matches!(err, SuretyError::CallerNotRegistered { .. }));

    // Overdrawn funding fails without moving anything
    let err = engine.fund(airline(1), AIRLINE_BALANCE).unwrap_err();
    assert!(matches!(err, SuretyError::Ledger(_)));
    assert_eq!(engine.balance_of(&pool), 10 * UNIT);
}

#[test]
fn test_fast_path_then_multiparty_consensus() {
    let engine = engine();

    // Owner plus three more reach the fast path limit
    register_and_fund(&engine, 3);
    assert_eq!(engine.count_registered(), 4);

    // Fifth airline needs ceil(4 / 2) = 2 votes
    let fifth = airline(4).address();
    assert_eq!(engine.register_airline(owner(), fifth).unwrap(), AirlineStatus::Pending);
    assert_eq!(
        engine.register_airline(owner(), fifth),
        Err(SuretyError::DuplicateVote {
            voter: owner().address(),
            candidate: fifth,
        })
    );
    assert_eq!(engine.fetch_airline(&fifth).unwrap().vote_count(), 1);
    assert_eq!(engine.register_airline(airline(1), fifth).unwrap(), AirlineStatus::Registered);
    assert_eq!(engine.count_registered(), 5);

    // Sixth needs ceil(5 / 2) = 3
    let sixth = airline(5).address();
    engine.register_airline(owner(), sixth).unwrap();
    assert_eq!(engine.register_airline(airline(1), sixth).unwrap(), AirlineStatus::Pending);
    assert_eq!(engine.register_airline(airline(2), sixth).unwrap(), AirlineStatus::Registered);

    // Seventh needs ceil(6 / 2) = 3
    let seventh = airline(6).address();
    engine.register_airline(owner(), seventh).unwrap();
    engine.register_airline(airline(1), seventh).unwrap();
    assert_eq!(engine.fetch_airline_status(&seventh), AirlineStatus::Pending);
    engine.register_airline(airline(3), seventh).unwrap();
    assert_eq!(engine.fetch_airline_status(&seventh), AirlineStatus::Registered);
    assert_eq!(engine.count_registered(), 7);
}

#[test]
fn test_registered_airline_cannot_be_registered_again() {
    let engine = engine();
    engine.register_airline(owner(), airline(1).address()).unwrap();

    let err = engine
        .register_airline(owner(), airline(1).address())
        .unwrap_err();
    assert!(matches!(err, SuretyError::AirlineAlreadyRegistered { .. }));
    assert_eq!(engine.count_registered(), 2);
}

#[test]
fn test_pending_airline_cannot_fund() {
    let engine = engine();
    register_and_fund(&engine, 3);

    engine.register_airline(owner(), airline(4).address()).unwrap();
    let err = engine.fund(airline(4), 10 * UNIT).unwrap_err();
    assert_eq!(
        err,
        SuretyError::CallerNotRegistered {
            airline: airline(4).address(),
            status: AirlineStatus::Pending,
        }
    );
}
