//! Line-level decoding of the fixed-column IGC record types.
//!
//! Reference: https://xp-soaring.github.io/igc_file_format/igc_format_2008.html

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::track::{Fix, HeaderKey};

/// Minimum width of a fix record: `B HHMMSS DDMMmmmN DDDMMmmmE V PPPPP GGGGG`.
pub const FIX_RECORD_LEN: usize = 35;

/// Record type, selected by the first character of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Manufacturer,
    Fix,
    Task,
    Differential,
    Event,
    Satellites,
    Security,
    Header,
    FixExtensions,
    TaskExtensions,
    ExtensionData,
    Comment,
    Unknown(char),
}

impl RecordKind {
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'A' => RecordKind::Manufacturer,
            'B' => RecordKind::Fix,
            'C' => RecordKind::Task,
            'D' => RecordKind::Differential,
            'E' => RecordKind::Event,
            'F' => RecordKind::Satellites,
            'G' => RecordKind::Security,
            'H' => RecordKind::Header,
            'I' => RecordKind::FixExtensions,
            'J' => RecordKind::TaskExtensions,
            'K' => RecordKind::ExtensionData,
            'L' => RecordKind::Comment,
            other => RecordKind::Unknown(other),
        }
    }

    pub fn letter(self) -> char {
        match self {
            RecordKind::Manufacturer => 'A',
            RecordKind::Fix => 'B',
            RecordKind::Task => 'C',
            RecordKind::Differential => 'D',
            RecordKind::Event => 'E',
            RecordKind::Satellites => 'F',
            RecordKind::Security => 'G',
            RecordKind::Header => 'H',
            RecordKind::FixExtensions => 'I',
            RecordKind::TaskExtensions => 'J',
            RecordKind::ExtensionData => 'K',
            RecordKind::Comment => 'L',
            RecordKind::Unknown(c) => c,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A decoded line.
#[derive(Clone, Debug, PartialEq)]
pub enum Record<'a> {
    Manufacturer {
        manufacturer: &'a str,
        logger_id: &'a str,
        extension: &'a str,
    },
    Fix(Fix),
    Date(NaiveDate),
    Header {
        key: HeaderKey,
        value: &'a str,
    },
    UnknownHeader {
        code: &'a str,
    },
    /// Well-formed record types that carry nothing the flight keeps.
    Ignored(RecordKind),
}

/// Why a single line could not be decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordError {
    pub kind: RecordKind,
    pub reason: String,
}

impl<'a> Record<'a> {
    /// Decodes one non-empty, already trimmed line.
    pub fn parse(line: &'a str) -> Result<Record<'a>, RecordError> {
        let Some(letter) = line.chars().next() else {
            return Err(RecordError {
                kind: RecordKind::Unknown(' '),
                reason: "empty line".into(),
            });
        };
        let kind = RecordKind::from_letter(letter);
        let fail = |reason: String| RecordError { kind, reason };
        match kind {
            RecordKind::Manufacturer => parse_manufacturer(line).map_err(fail),
            RecordKind::Fix => parse_fix(line).map(Record::Fix).map_err(fail),
            RecordKind::Header => parse_header(line).map_err(fail),
            other => Ok(Record::Ignored(other)),
        }
    }
}

fn column<'a>(line: &'a str, start: usize, end: usize, name: &str) -> Result<&'a str, String> {
    line.get(start..end)
        .ok_or_else(|| format!("missing {name} at columns {}-{}", start + 1, end))
}

fn parse_manufacturer(line: &str) -> Result<Record<'_>, String> {
    Ok(Record::Manufacturer {
        manufacturer: column(line, 1, 4, "manufacturer")?,
        logger_id: column(line, 4, 7, "logger id")?,
        extension: line.get(7..).unwrap_or_default(),
    })
}

fn parse_fix(line: &str) -> Result<Fix, String> {
    if line.len() < FIX_RECORD_LEN {
        return Err(format!(
            "expected at least {FIX_RECORD_LEN} characters, got {}",
            line.len()
        ));
    }
    let time_raw = column(line, 1, 7, "time")?;
    let time = NaiveTime::parse_from_str(time_raw, "%H%M%S")
        .map_err(|e| format!("bad time {time_raw:?}: {e}"))?;
    let validity = column(line, 24, 25, "validity")?
        .chars()
        .next()
        .unwrap_or('V');
    Ok(Fix {
        time,
        latitude: column(line, 7, 15, "latitude")?.to_string(),
        longitude: column(line, 15, 24, "longitude")?.to_string(),
        validity,
        pressure_alt: altitude(column(line, 25, 30, "pressure altitude")?)?,
        gnss_alt: altitude(column(line, 30, 35, "gnss altitude")?)?,
    })
}

fn altitude(raw: &str) -> Result<i32, String> {
    raw.parse()
        .map_err(|_| format!("bad altitude {raw:?}"))
}

fn parse_header(line: &str) -> Result<Record<'_>, String> {
    let code = column(line, 2, 5, "header code")?;
    let rest = line.get(5..).unwrap_or_default();
    let Some(key) = HeaderKey::from_code(code) else {
        return Ok(Record::UnknownHeader { code });
    };
    match key {
        HeaderKey::Date => parse_date(rest).map(Record::Date),
        HeaderKey::FixAccuracy => Ok(Record::Header {
            key,
            value: rest.trim(),
        }),
        _ => Ok(Record::Header {
            key,
            value: after_colon(rest).trim(),
        }),
    }
}

fn after_colon(rest: &str) -> &str {
    rest.split_once(':').map_or(rest, |(_, value)| value)
}

/// Accepts `DDMMYY` as well as `DATE:DDMMYY,NN`.
fn parse_date(rest: &str) -> Result<NaiveDate, String> {
    let value = after_colon(rest);
    let digits = value.split(',').next().unwrap_or_default().trim();
    NaiveDate::parse_from_str(digits, "%d%m%y").map_err(|e| format!("bad date {digits:?}: {e}"))
}

/// Writes a canonical fix record for `fix`.
pub fn encode_fix(fix: &Fix) -> String {
    format!(
        "B{}{}{}{}{:05}{:05}",
        fix.time.format("%H%M%S"),
        fix.latitude,
        fix.longitude,
        fix.validity,
        fix.pressure_alt,
        fix.gnss_alt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIX: &str = "B1101355206343N00006198WA0058700558";

    #[test]
    fn decodes_fix_columns() {
        let Record::Fix(fix) = Record::parse(FIX).unwrap() else {
            panic!("expected a fix record");
        };
        assert_eq!(fix.time, NaiveTime::from_hms_opt(11, 1, 35).unwrap());
        assert_eq!(fix.latitude, "5206343N");
        assert_eq!(fix.longitude, "00006198W");
        assert_eq!(fix.validity, 'A');
        assert_eq!(fix.pressure_alt, 587);
        assert_eq!(fix.gnss_alt, 558);
        assert_eq!(encode_fix(&fix), FIX);
    }

    #[test]
    fn extra_fix_columns_are_ignored() {
        let line = format!("{FIX}0123456");
        assert!(matches!(Record::parse(&line), Ok(Record::Fix(_))));
    }

    #[test]
    fn short_or_garbled_fix_is_an_error() {
        let err = Record::parse("B110135520634").unwrap_err();
        assert_eq!(err.kind, RecordKind::Fix);
        assert!(Record::parse("B9901355206343N00006198WA0058700558").is_err());
        assert!(Record::parse("B1101355206343N00006198WA00x8700558").is_err());
    }

    #[test]
    fn negative_altitudes_are_allowed() {
        let Record::Fix(fix) = Record::parse("B1101355206343N00006198WA-0012-0020").unwrap() else {
            panic!("expected a fix record");
        };
        assert_eq!(fix.pressure_alt, -12);
        assert_eq!(encode_fix(&fix), "B1101355206343N00006198WA-0012-0020");
    }

    #[test]
    fn decodes_manufacturer() {
        assert_eq!(
            Record::parse("AXXXABC FLIGHT:1").unwrap(),
            Record::Manufacturer {
                manufacturer: "XXX",
                logger_id: "ABC",
                extension: " FLIGHT:1",
            }
        );
        assert!(Record::parse("AXX").is_err());
    }

    #[test]
    fn decodes_headers() {
        assert_eq!(
            Record::parse("HFDTE160701").unwrap(),
            Record::Date(NaiveDate::from_ymd_opt(2001, 7, 16).unwrap())
        );
        assert_eq!(
            Record::parse("HFDTEDATE:160701,01").unwrap(),
            Record::Date(NaiveDate::from_ymd_opt(2001, 7, 16).unwrap())
        );
        assert_eq!(
            Record::parse("HFPLTPILOTINCHARGE: Bloggs Bill D").unwrap(),
            Record::Header {
                key: HeaderKey::Pilot,
                value: "Bloggs Bill D",
            }
        );
        assert_eq!(
            Record::parse("HFgidGLIDERID:G-ABCD").unwrap(),
            Record::Header {
                key: HeaderKey::GliderId,
                value: "G-ABCD",
            }
        );
        assert_eq!(
            Record::parse("HFFXA035").unwrap(),
            Record::Header {
                key: HeaderKey::FixAccuracy,
                value: "035",
            }
        );
        assert_eq!(
            Record::parse("HFCM2CREW2:").unwrap(),
            Record::Header {
                key: HeaderKey::Crew2,
                value: "",
            }
        );
        assert_eq!(
            Record::parse("HFTZNTIMEZONE:2").unwrap(),
            Record::UnknownHeader { code: "TZN" }
        );
        assert!(Record::parse("HFDTE991301").is_err());
    }

    #[test]
    fn unused_record_types_are_ignored() {
        for line in ["C150701213841160701000102500K", "LXXXcomment", "GABCDEF", "I013638FXA", "Zwhatever"] {
            let record = Record::parse(line).unwrap();
            assert!(matches!(record, Record::Ignored(_)), "{line}");
        }
        assert_eq!(Record::parse("Zwhatever").unwrap(), Record::Ignored(RecordKind::Unknown('Z')));
    }
}
