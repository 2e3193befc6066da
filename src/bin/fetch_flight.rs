use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glide_engine::igc::{parse_flight_bytes, ParseOptions};
use glide_engine::optimize::{Circuit, MAX_TURNPOINTS};
use glide_engine::source::{HttpSource, TrackSource, NETCOUPE_TRACK_URL};
use glide_engine::track::PhaseControl;
use glide_engine::{best_circuits, FlightSummary};
use log::info;
use serde::Serialize;

/// Downloads a competition track, scores it and writes a JSON report.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Competition file id of the track
    identifier: String,

    /// Where to write the report (stdout when omitted)
    output: Option<PathBuf>,

    /// Download URL, with `{id}` standing for the file id
    #[arg(long, env = "GLIDE_TRACK_URL", default_value = NETCOUPE_TRACK_URL)]
    url_template: String,
}

#[derive(Debug, Serialize)]
struct FlightReport {
    identifier: String,
    source_url: String,
    description: String,
    summary: FlightSummary,
    circuits: Vec<ScoredCircuit>,
}

#[derive(Debug, Serialize)]
struct ScoredCircuit {
    turnpoints: usize,
    circuit: Circuit,
}

fn main() -> Result<()> {
    env_logger::init();

    let Cli {
        identifier,
        output,
        url_template,
    } = Cli::parse();

    let source = HttpSource::new(url_template).context("failed to build HTTP client")?;
    let source_url = source.url_for(&identifier);

    let bytes = source
        .fetch(&identifier)
        .with_context(|| format!("failed to fetch track {identifier}"))?;
    let options = ParseOptions {
        control: PhaseControl::from_env(),
        ..ParseOptions::default()
    };
    let flight = parse_flight_bytes(&bytes, &options)
        .with_context(|| format!("failed to parse track {identifier}"))?;
    if flight.is_empty() {
        return Err(anyhow!("track {identifier} contains no fixes"));
    }

    let counts: Vec<usize> = (1..=MAX_TURNPOINTS).collect();
    let circuits = best_circuits(&flight, &counts)?
        .into_iter()
        .map(|(turnpoints, circuit)| {
            info!("{turnpoints} turnpoint(s): {:.2} km", circuit.distance_km);
            ScoredCircuit { turnpoints, circuit }
        })
        .collect();

    let report = FlightReport {
        identifier,
        source_url,
        description: flight.to_string(),
        summary: FlightSummary::of(&flight),
        circuits,
    };
    let json = serde_json::to_vec_pretty(&report)?;

    match output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("wrote report to {}", path.display());
        }
        None => println!("{}", String::from_utf8_lossy(&json)),
    }
    Ok(())
}
