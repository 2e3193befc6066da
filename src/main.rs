use glide_engine::igc::{parse_flight_with, ParseOptions, ParsePolicy};
use glide_engine::optimize::MAX_TURNPOINTS;
use glide_engine::track::{Flight, PhaseControl, Point};
use glide_engine::{best_circuits, FlightSummary};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONTROL: Lazy<PhaseControl> = Lazy::new(PhaseControl::from_env);

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Analyze {
        igc: String,
        #[serde(default)]
        control: Option<PhaseControl>,
        #[serde(default)]
        policy: ParsePolicy,
        #[serde(default)]
        include_points: bool,
    },
    Optimize {
        igc: String,
        #[serde(default = "all_turnpoint_counts")]
        turnpoints: Vec<usize>,
        #[serde(default)]
        policy: ParsePolicy,
    },
}

fn all_turnpoint_counts() -> Vec<usize> {
    (1..=MAX_TURNPOINTS).collect()
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Analyze {
        summary: FlightSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        points: Option<Vec<Point>>,
    },
    Optimize {
        circuits: Vec<CircuitResult>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct CircuitResult {
    turnpoints: usize,
    indices: Vec<usize>,
    distance_km: f64,
}

fn parse(igc: &str, control: Option<PhaseControl>, policy: ParsePolicy) -> Result<Flight, String> {
    let options = ParseOptions {
        policy,
        control: control.unwrap_or_else(|| DEFAULT_CONTROL.clone()),
    };
    parse_flight_with(igc, &options).map_err(|e| e.to_string())
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    let req = event.payload;
    match req {
        EngineRequest::Analyze {
            igc,
            control,
            policy,
            include_points,
        } => {
            let flight = match parse(&igc, control, policy) {
                Ok(flight) => flight,
                Err(message) => return Ok(EngineResponse::Error { message }),
            };
            let points = include_points.then(|| flight.points().to_vec());
            Ok(EngineResponse::Analyze {
                summary: FlightSummary::of(&flight),
                points,
            })
        }
        EngineRequest::Optimize {
            igc,
            turnpoints,
            policy,
        } => {
            let flight = match parse(&igc, None, policy) {
                Ok(flight) => flight,
                Err(message) => return Ok(EngineResponse::Error { message }),
            };
            match best_circuits(&flight, &turnpoints) {
                Ok(found) => {
                    let circuits = found
                        .into_iter()
                        .map(|(n, circuit)| CircuitResult {
                            turnpoints: n,
                            indices: if circuit.is_empty() { Vec::new() } else { circuit.indices() },
                            distance_km: circuit.distance_km,
                        })
                        .collect();
                    Ok(EngineResponse::Optimize { circuits })
                }
                Err(e) => Ok(EngineResponse::Error { message: e.to_string() }),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}
