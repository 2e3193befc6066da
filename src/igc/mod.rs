pub mod parser;
pub mod record;

use thiserror::Error;

use crate::geo::GeoError;
use crate::track::ConfigError;

pub use parser::{parse_flight, parse_flight_bytes, parse_flight_with, ParseOptions, ParsePolicy};
pub use record::{encode_fix, Record, RecordKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: malformed {kind} record: {reason}")]
    Record {
        line: usize,
        kind: RecordKind,
        reason: String,
    },
    #[error("line {line}: bad fix coordinates")]
    Coordinate {
        line: usize,
        #[source]
        source: GeoError,
    },
    #[error("invalid classifier settings: {0}")]
    Config(#[from] ConfigError),
}

impl ParseError {
    /// 1-based line of the offending record, if the error came from one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Record { line, .. } | ParseError::Coordinate { line, .. } => Some(*line),
            ParseError::Config(_) => None,
        }
    }
}
