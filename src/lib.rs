pub mod geo;
pub mod igc;
pub mod optimize;
pub mod source;
pub mod track;

use serde::Serialize;

use crate::optimize::{Circuit, OptimizeError, Optimizer};
use crate::track::{Flight, FlightMetadata, FlightStats, Phase};

/// What a flight did, without the per-point detail.
#[derive(Clone, Debug, Serialize)]
pub struct FlightSummary {
    pub metadata: FlightMetadata,
    pub stats: FlightStats,
    pub points: usize,
    pub phases: Vec<Phase>,
}

impl FlightSummary {
    pub fn of(flight: &Flight) -> Self {
        FlightSummary {
            metadata: flight.metadata().clone(),
            stats: flight.stats().clone(),
            points: flight.len(),
            phases: flight.phases().to_vec(),
        }
    }
}

/// Best circuit for each requested turnpoint count, in request order.
pub fn best_circuits(flight: &Flight, counts: &[usize]) -> Result<Vec<(usize, Circuit)>, OptimizeError> {
    let optimizer = Optimizer::new(flight);
    counts
        .iter()
        .map(|&n| optimizer.optimize(n).map(|circuit| (n, circuit)))
        .collect()
}
