//! Local end-to-end scenario
//!
//! Four airlines register flights, passengers insure them, and a pool of
//! mock reporters answers every oracle request it holds an index for.
//! Reporters pick a random status unless one is forced, so a request may
//! split without consensus; such flights are requested again up to a
//! bounded number of rounds.

use crate::cli::SimulateArgs;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use surety_consensus::ResponseOutcome;
use surety_core::{Address, Caller, FlightKey, FlightStatus, SuretyEvent, Wei};
use surety_engine::{ConsensusEngine, SuretyConfig};
use surety_ledger::MemoryLedger;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Flight codes and the airline (by position) operating them
const FLIGHTS: [(usize, &str); 4] = [(0, "TG1001"), (0, "TG1002"), (1, "AA1111"), (2, "BB2222")];

/// The first airline plus the ones it admits
const AIRLINE_COUNT: usize = 4;

/// Departure offset from genesis, in seconds
const DEPARTURE_OFFSET: u64 = 3_600;

/// Off-chain oracle stand-in
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    caller: Caller,
    indexes: [u8; 3],
}

impl Reporter {
    fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }

    fn report(&self, forced: Option<FlightStatus>, rng: &mut StdRng) -> FlightStatus {
        forced.unwrap_or_else(|| {
            FlightStatus::ALL
                .choose(rng)
                .copied()
                .unwrap_or_default()
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FlightOutcome {
    pub flight: String,
    pub status: String,
    pub status_code: u8,
    pub finalized: bool,
    pub requests: usize,
    pub policies_paid: usize,
    #[serde(serialize_with = "surety_core::serde_wei::serialize")]
    pub total_paid: Wei,
    /// Premiums still held for unclaimed policies
    #[serde(serialize_with = "surety_core::serde_wei::serialize")]
    pub open_exposure: Wei,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub oracles: usize,
    pub flights: Vec<FlightOutcome>,
    #[serde(serialize_with = "surety_core::serde_wei::serialize")]
    pub pool_balance: Wei,
    /// Sum of every ledger balance; unchanged by the scenario
    #[serde(serialize_with = "surety_core::serde_wei::serialize")]
    pub total_supply: Wei,
}

/// Final status and request count per flight
struct Settlement {
    statuses: BTreeMap<FlightKey, (Option<FlightStatus>, usize)>,
}

fn account(kind: &str, n: usize) -> Address {
    Address::derive(&format!("simulated-{kind}-{n}"))
}

/// Run the scenario to completion
pub async fn run(args: SimulateArgs) -> Result<SimulationReport> {
    let config = match &args.config {
        Some(path) => SuretyConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SuretyConfig::default(),
    };
    let forced = args
        .status
        .map(|code| FlightStatus::from_code(code).with_context(|| format!("unknown status code {code}")))
        .transpose()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let rng = StdRng::seed_from_u64(seed);

    let airlines: Vec<Address> = std::iter::once(config.first_airline)
        .chain((1..AIRLINE_COUNT).map(|n| account("airline", n)))
        .collect();
    let passengers: Vec<Address> = (1..=args.passengers).map(|n| account("passenger", n)).collect();
    let oracles: Vec<Address> = (1..=args.oracles).map(|n| account("oracle", n)).collect();

    let premium = config.insurance.max_premium;
    let minimum_funding = config.airline.minimum_funding;
    let registration_fee = config.oracle.registration_fee;
    let departure = config.genesis_timestamp + DEPARTURE_OFFSET;

    let balances = airlines
        .iter()
        .map(|a| (*a, minimum_funding * 2))
        .chain(passengers.iter().map(|p| (*p, premium * FLIGHTS.len() as Wei)))
        .chain(oracles.iter().map(|o| (*o, registration_fee)));
    let ledger = MemoryLedger::with_balances(balances);
    let engine = Arc::new(ConsensusEngine::new(config, ledger)?);

    info!(
        "Simulating {} airlines, {} flights, {} passengers, {} reporters (seed {})",
        airlines.len(),
        FLIGHTS.len(),
        passengers.len(),
        oracles.len(),
        seed
    );

    // Admit the remaining airlines; every funded airline votes until the candidate is in
    for (position, candidate) in airlines.iter().enumerate().skip(1) {
        for voter in &airlines[..position] {
            if engine
                .register_airline(Caller::new(*voter), *candidate)?
                .is_registered()
            {
                break;
            }
        }
        engine.fund(Caller::new(*candidate), minimum_funding)?;
    }

    let mut flights = Vec::with_capacity(FLIGHTS.len());
    for (operator, code) in FLIGHTS {
        let key = engine.register_flight(Caller::new(airlines[operator]), code, departure)?;
        for passenger in &passengers {
            engine.buy(Caller::new(*passenger), key.airline, &key.code, key.timestamp, premium)?;
        }
        flights.push(key);
    }

    let reporters = oracles
        .iter()
        .map(|oracle| {
            let caller = Caller::new(*oracle);
            let indexes = engine.register_oracle(caller, registration_fee)?;
            Ok::<_, anyhow::Error>(Reporter { caller, indexes })
        })
        .collect::<Result<Vec<_>>>()?;

    let requester = passengers
        .first()
        .map(|p| Caller::new(*p))
        .unwrap_or_else(|| Caller::new(engine.owner()));

    let events = engine.subscribe();
    for key in &flights {
        engine.fetch_flight_status(requester, key.airline, &key.code, key.timestamp)?;
    }

    let relay = Relay {
        engine: Arc::clone(&engine),
        reporters,
        requester,
        forced,
        rng,
        rounds: args.rounds.max(1),
    };
    let settlement = tokio::spawn(relay.run(events, flights.clone())).await??;

    let mut outcomes = Vec::with_capacity(flights.len());
    for key in &flights {
        let (status, requests) = settlement
            .statuses
            .get(key)
            .copied()
            .unwrap_or((None, 0));

        let mut policies_paid = 0;
        let mut total_paid = 0;
        for passenger in &passengers {
            match engine.withdraw(Caller::new(*passenger), key.airline, &key.code, key.timestamp) {
                Ok(payout) => {
                    policies_paid += 1;
                    total_paid += payout;
                }
                Err(e) => debug!("No payout for {} on {}: {}", passenger, key, e),
            }
        }

        let status_now = engine
            .fetch_flight(key)
            .map(|flight| flight.status)
            .unwrap_or_default();
        outcomes.push(FlightOutcome {
            flight: key.to_string(),
            status: status_now.to_string(),
            status_code: status_now.code(),
            finalized: status.is_some(),
            requests,
            policies_paid,
            total_paid,
            open_exposure: engine.exposure(key),
        });
    }

    Ok(SimulationReport {
        seed,
        oracles: args.oracles,
        flights: outcomes,
        pool_balance: engine.balance_of(&engine.pool_address()),
        total_supply: engine.with_ledger(|ledger| ledger.total_supply()),
    })
}

/// Answers oracle requests on behalf of every reporter
struct Relay {
    engine: Arc<ConsensusEngine>,
    reporters: Vec<Reporter>,
    requester: Caller,
    forced: Option<FlightStatus>,
    rng: StdRng,
    rounds: usize,
}

impl Relay {
    async fn run(
        mut self,
        mut events: UnboundedReceiver<SuretyEvent>,
        flights: Vec<FlightKey>,
    ) -> Result<Settlement> {
        let mut pending: BTreeMap<FlightKey, usize> = flights.into_iter().map(|key| (key, 1)).collect();
        let mut statuses = BTreeMap::new();

        while !pending.is_empty() {
            let Some(event) = events.recv().await else {
                warn!("Event stream closed with {} flights pending", pending.len());
                break;
            };

            match event {
                SuretyEvent::OracleRequest {
                    index,
                    airline,
                    flight,
                    timestamp,
                } => {
                    let key = FlightKey::new(airline, flight, timestamp);
                    let Some(requests) = pending.get(&key).copied() else {
                        continue;
                    };

                    if let Some(status) = self.answer(index, &key) {
                        pending.remove(&key);
                        statuses.insert(key, (Some(status), requests));
                    } else if requests >= self.rounds {
                        warn!("No consensus for {} after {} requests", key, requests);
                        pending.remove(&key);
                        statuses.insert(key, (None, requests));
                    } else {
                        pending.insert(key.clone(), requests + 1);
                        self.engine.fetch_flight_status(
                            self.requester,
                            key.airline,
                            &key.code,
                            key.timestamp,
                        )?;
                    }
                }
                SuretyEvent::OracleReport {
                    oracle,
                    flight,
                    status,
                    ..
                } => debug!("Report from {} on {}: {}", oracle, flight, status),
                SuretyEvent::FlightStatusInfo { flight, status, .. } => {
                    info!("Flight {} settled as {}", flight, status)
                }
                other => debug!("Event {}", other.name()),
            }
        }

        Ok(Settlement { statuses })
    }

    /// Submit a report from every reporter holding `index`; returns the status if it finalized
    fn answer(&mut self, index: u8, key: &FlightKey) -> Option<FlightStatus> {
        let mut finalized = None;
        for reporter in self.reporters.iter().filter(|r| r.holds(index)) {
            let status = reporter.report(self.forced, &mut self.rng);
            match self.engine.submit_oracle_response(
                reporter.caller,
                index,
                key.airline,
                &key.code,
                key.timestamp,
                status,
            ) {
                Ok(ResponseOutcome::Finalized { status }) => finalized = Some(status),
                Ok(outcome) => debug!("Reporter {}: {:?}", reporter.caller, outcome),
                Err(e) => warn!("Reporter {} rejected: {}", reporter.caller, e),
            }
        }
        finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_core::UNIT;

    fn args(status: Option<u8>) -> SimulateArgs {
        SimulateArgs {
            seed: Some(7),
            status,
            ..SimulateArgs::default()
        }
    }

    #[tokio::test]
    async fn test_forced_airline_delay_pays_every_passenger() {
        let report = run(args(Some(FlightStatus::LateAirline.code()))).await.unwrap();

        assert_eq!(report.flights.len(), FLIGHTS.len());
        for flight in &report.flights {
            assert!(flight.finalized, "{} did not settle", flight.flight);
            assert_eq!(flight.status_code, 20);
            assert_eq!(flight.policies_paid, 3);
            assert_eq!(flight.total_paid, 3 * UNIT * 3 / 2);
            assert_eq!(flight.open_exposure, 0);
        }
        // Four airlines at 20, three passengers at 4, twenty oracles at 1
        assert_eq!(report.total_supply, 112 * UNIT);
    }

    #[tokio::test]
    async fn test_forced_on_time_pays_nothing() {
        let report = run(args(Some(FlightStatus::OnTime.code()))).await.unwrap();

        for flight in &report.flights {
            assert!(flight.finalized);
            assert_eq!(flight.status_code, 10);
            assert_eq!(flight.policies_paid, 0);
            assert_eq!(flight.open_exposure, 3 * UNIT);
        }
        assert_eq!(report.total_supply, 112 * UNIT);
    }

    #[tokio::test]
    async fn test_unknown_status_code_is_rejected() {
        assert!(run(args(Some(42))).await.is_err());
    }

    #[tokio::test]
    async fn test_random_reports_terminate() {
        let report = run(SimulateArgs {
            seed: Some(11),
            rounds: 4,
            ..SimulateArgs::default()
        })
        .await
        .unwrap();

        for flight in &report.flights {
            assert!(flight.requests >= 1 && flight.requests <= 4);
        }
    }
}
