mod common;

use common::*;
use proptest::prelude::*;
use surety_consensus::{IgnoreReason, ResponseOutcome};
use surety_core::{FlightKey, FlightStatus, UNIT};

const CODE: &str = "ND1309";
const DEPARTURE: u64 = 1_700_000_000;

/// Three oracles agree on the winner; the rest split so no other status reaches three
fn reports() -> Vec<FlightStatus> {
    vec![
        FlightStatus::LateAirline,
        FlightStatus::LateAirline,
        FlightStatus::LateAirline,
        FlightStatus::OnTime,
        FlightStatus::OnTime,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
    ]
}

proptest! {
    #[test]
    fn finalized_status_is_order_independent(order in Just(reports()).prop_shuffle()) {
        let engine = engine_with_full_coverage();
        let a0 = owner().address();
        let oracles = register_oracles(&engine, order.len());
        engine.register_flight(owner(), CODE, DEPARTURE).unwrap();
        let index = engine.fetch_flight_status(owner(), a0, CODE, DEPARTURE).unwrap();

        let mut finalized = false;
        for (oracle, status) in oracles.iter().zip(order.iter()) {
            let outcome = engine
                .submit_oracle_response(*oracle, index, a0, CODE, DEPARTURE, *status)
                .unwrap();
            match outcome {
                ResponseOutcome::Finalized { status } => {
                    prop_assert!(!finalized);
                    prop_assert_eq!(status, FlightStatus::LateAirline);
                    finalized = true;
                }
                ResponseOutcome::Ignored(reason) => {
                    prop_assert!(finalized);
                    prop_assert_eq!(reason, IgnoreReason::AlreadyFinalized);
                }
                ResponseOutcome::Recorded { .. } => prop_assert!(!finalized),
            }
        }

        prop_assert!(finalized);
        let flight = engine.fetch_flight(&FlightKey::new(a0, CODE, DEPARTURE)).unwrap();
        prop_assert_eq!(flight.status, FlightStatus::LateAirline);
    }

    #[test]
    fn vote_order_does_not_change_admission(order in Just(vec![0usize, 1, 2]).prop_shuffle()) {
        let engine = engine();
        register_and_fund(&engine, 3);
        engine.register_airline(owner(), airline(4).address()).unwrap();
        engine.register_airline(airline(1), airline(4).address()).unwrap();
        engine.fund(airline(4), 10 * UNIT).unwrap();

        // Five registered, the candidate needs three votes
        let voters = [owner(), airline(1), airline(2)];
        let candidate = airline(5).address();

        for (step, voter) in order.iter().enumerate() {
            let status = engine.register_airline(voters[*voter], candidate).unwrap();
            prop_assert_eq!(status.is_registered(), step == 2);
        }
    }
}
