use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordError};
use super::ParseError;
use crate::track::{Flight, FlightBuilder, PhaseControl};

/// What to do with a record that cannot be decoded.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Fail the whole parse; later metrics depend on an unbroken fix chain.
    #[default]
    Strict,
    /// Log and drop the offending line.
    SkipMalformed,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParseOptions {
    pub policy: ParsePolicy,
    pub control: PhaseControl,
}

/// Parses a complete track with default options.
pub fn parse_flight(text: &str) -> Result<Flight, ParseError> {
    parse_flight_with(text, &ParseOptions::default())
}

/// Parses raw track bytes; invalid UTF-8 is replaced rather than rejected.
pub fn parse_flight_bytes(bytes: &[u8], options: &ParseOptions) -> Result<Flight, ParseError> {
    parse_flight_with(&String::from_utf8_lossy(bytes), options)
}

pub fn parse_flight_with(text: &str, options: &ParseOptions) -> Result<Flight, ParseError> {
    options.control.validate()?;
    let mut builder = FlightBuilder::new(options.control.clone());

    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match apply(&mut builder, line, n + 1) {
            Ok(()) => {}
            Err(err) if options.policy == ParsePolicy::SkipMalformed => {
                warn!("skipping record: {err}");
            }
            Err(err) => return Err(err),
        }
    }

    let flight = builder.build();
    debug!(
        "parsed {} points in {} phases ({})",
        flight.len(),
        flight.phases().len(),
        flight
    );
    Ok(flight)
}

fn apply(builder: &mut FlightBuilder, line: &str, line_no: usize) -> Result<(), ParseError> {
    let record = Record::parse(line).map_err(|RecordError { kind, reason }| ParseError::Record {
        line: line_no,
        kind,
        reason,
    })?;

    match record {
        Record::Fix(fix) => {
            builder
                .append_point(fix)
                .map_err(|source| ParseError::Coordinate {
                    line: line_no,
                    source,
                })?;
        }
        Record::Manufacturer {
            manufacturer,
            logger_id,
            extension,
        } => {
            let meta = builder.metadata_mut();
            meta.manufacturer = Some(manufacturer.to_string());
            meta.logger_id = Some(logger_id.to_string());
            meta.logger_id_ext = Some(extension.to_string());
        }
        Record::Date(date) => builder.metadata_mut().date = Some(date),
        Record::Header { key, value } => builder.metadata_mut().set_text(key, value.to_string()),
        Record::UnknownHeader { code } => debug!("line {line_no}: ignoring header {code}"),
        Record::Ignored(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::igc::RecordKind;
    use chrono::NaiveDate;

    const TRACK: &str = "AXXXABC FLIGHT:1\r\n\
HFDTE160701\r\n\
HFPLTPILOTINCHARGE: Bloggs Bill D\r\n\
HFGTYGLIDERTYPE:Schleicher ASH-25\r\n\
HFGIDGLIDERID:ABC-1234\r\n\
HFCIDCOMPETITIONID:XYZ-78910\r\n\
HFCCLCOMPETITIONCLASS:15m Motor Glider\r\n\
I033638FXA3940SIU4143ENL\r\n\
LXXXRURITANIAN STANDARD NATIONALS DAY 1\r\n\
B1602405407121N00249342WA002800042120509950\r\n\
B1602455407126N00249367WA002840042520509950\r\n\
\r\n\
B1602505407131N00249392WA002880042920509950\r\n\
E160245PEV\r\n\
GREJNGJERJKNJKRE31895478537H43982FJN9248F942389T433T\r\n";

    #[test]
    fn parses_headers_and_fixes() {
        let flight = parse_flight(TRACK).unwrap();
        let meta = flight.metadata();
        assert_eq!(meta.manufacturer.as_deref(), Some("XXX"));
        assert_eq!(meta.logger_id.as_deref(), Some("ABC"));
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2001, 7, 16));
        assert_eq!(meta.pilot.as_deref(), Some("Bloggs Bill D"));
        assert_eq!(meta.glider_type.as_deref(), Some("Schleicher ASH-25"));
        assert_eq!(meta.glider_id.as_deref(), Some("ABC-1234"));
        assert_eq!(meta.competition_id.as_deref(), Some("XYZ-78910"));
        assert_eq!(meta.competition_class.as_deref(), Some("15m Motor Glider"));
        assert_eq!(meta.crew2, None);
        assert_eq!(flight.len(), 3);
        assert_eq!(flight.points()[2].fix.pressure_alt, 288);
        assert_eq!(flight.points()[2].fix.gnss_alt, 429);
    }

    #[test]
    fn malformed_fix_fails_with_its_line() {
        let text = "AXXXABC\nB1602405407121N00249342WA0028000421\nB16024\n";
        let err = parse_flight(text).unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(matches!(err, ParseError::Record { kind: RecordKind::Fix, .. }));
    }

    #[test]
    fn bad_coordinates_fail_with_their_line() {
        let text = "B1602405407121N00249342WA0028000421\nB1602455499121N00249342WA0028000421\n";
        let err = parse_flight(text).unwrap_err();
        assert!(matches!(err, ParseError::Coordinate { line: 2, .. }));
    }

    #[test]
    fn lenient_policy_skips_bad_lines() {
        let text = "B1602405407121N00249342WA0028000421\nB16024\nB1602455407126N00249367WA0028400425\n";
        let options = ParseOptions {
            policy: ParsePolicy::SkipMalformed,
            ..ParseOptions::default()
        };
        let flight = parse_flight_with(text, &options).unwrap();
        assert_eq!(flight.len(), 2);
    }

    #[test]
    fn invalid_control_is_rejected_up_front() {
        let options = ParseOptions {
            control: PhaseControl {
                min_straight_time_s: 0,
                ..PhaseControl::default()
            },
            ..ParseOptions::default()
        };
        assert!(matches!(
            parse_flight_with("", &options),
            Err(ParseError::Config(_))
        ));
    }

    #[test]
    fn bytes_with_invalid_utf8_still_parse() {
        let mut bytes = b"LXXX caf\xe9\n".to_vec();
        bytes.extend_from_slice(b"B1602405407121N00249342WA0028000421\n");
        let flight = parse_flight_bytes(&bytes, &ParseOptions::default()).unwrap();
        assert_eq!(flight.len(), 1);
    }
}
