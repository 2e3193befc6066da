use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::geo::{format_latitude, format_longitude, to_decimal_degrees, GeoError, Position};

const SECONDS_PER_DAY: i64 = 86_400;

/// What the aircraft is doing at a given fix.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    #[default]
    Stopped,
    Straight,
    Circling,
}

/// Raw fields of one fix, exactly as recorded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Fix {
    pub time: NaiveTime,
    /// `DDMMmmm` followed by `N` or `S`.
    pub latitude: String,
    /// `DDDMMmmm` followed by `E` or `W`.
    pub longitude: String,
    pub validity: char,
    pub pressure_alt: i32,
    pub gnss_alt: i32,
}

impl Fix {
    /// Builds a valid (`A`) fix from decimal degrees, encoding the coordinates
    /// at record resolution.
    pub fn from_degrees(time: NaiveTime, lat: f64, lon: f64, pressure_alt: i32, gnss_alt: i32) -> Self {
        Fix {
            time,
            latitude: format_latitude(lat),
            longitude: format_longitude(lon),
            validity: 'A',
            pressure_alt,
            gnss_alt,
        }
    }

    /// Decodes the recorded coordinates.
    pub fn position(&self) -> Result<Position, GeoError> {
        let lat = decode(&self.latitude, "latitude")?;
        let lon = decode(&self.longitude, "longitude")?;
        Ok(Position::from_degrees(lat, lon))
    }
}

fn decode(field: &str, name: &'static str) -> Result<f64, GeoError> {
    let Some(hemisphere) = field.chars().last() else {
        return Err(GeoError::Format {
            field: name,
            value: String::new(),
        });
    };
    to_decimal_degrees(&field[..field.len() - hemisphere.len_utf8()], hemisphere)
}

/// Values that only need the preceding fix.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Motion {
    pub distance_km: f64,
    pub bearing_deg: f64,
    pub elapsed_s: u32,
    pub pressure_alt_delta: i32,
    pub gnss_alt_delta: i32,
}

impl Motion {
    pub fn between(prev: &Point, current_fix: &Fix, current: &Position) -> Self {
        Motion {
            distance_km: prev.position.distance(current),
            bearing_deg: prev.position.bearing(current),
            elapsed_s: elapsed_seconds(prev.fix.time, current_fix.time),
            pressure_alt_delta: current_fix.pressure_alt - prev.fix.pressure_alt,
            gnss_alt_delta: current_fix.gnss_alt - prev.fix.gnss_alt,
        }
    }

    /// Bearing of the leg, if the aircraft actually moved over some time.
    pub fn heading(&self) -> Option<f64> {
        (self.elapsed_s > 0 && self.distance_km > 0.0).then_some(self.bearing_deg)
    }
}

/// Rates derived from [`Motion`]. Every field is `None` when no time elapsed
/// since the previous fix; the turn rate additionally needs a heading on both
/// this leg and the previous one.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Rates {
    pub ground_speed_kmh: Option<f64>,
    pub pressure_vario: Option<f64>,
    pub gnss_vario: Option<f64>,
    pub turn_rate_dps: Option<f64>,
}

impl Rates {
    pub fn derive(prev: &Point, motion: &Motion) -> Self {
        if motion.elapsed_s == 0 {
            return Rates::default();
        }
        let dt = f64::from(motion.elapsed_s);
        let turn_rate_dps = prev
            .motion
            .and_then(|before| before.heading())
            .zip(motion.heading())
            .map(|(from, to)| heading_change(from, to) / dt);
        Rates {
            ground_speed_kmh: Some(motion.distance_km * 3600.0 / dt),
            pressure_vario: Some(f64::from(motion.pressure_alt_delta) / dt),
            gnss_vario: Some(f64::from(motion.gnss_alt_delta) / dt),
            turn_rate_dps,
        }
    }
}

/// One fix plus every metric derived from it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub fix: Fix,
    pub position: Position,
    /// Unset on the first point.
    pub motion: Option<Motion>,
    /// Unset on the first point.
    pub rates: Option<Rates>,
    pub mode: FlightMode,
}

impl Point {
    pub fn ground_speed(&self) -> Option<f64> {
        self.rates.and_then(|r| r.ground_speed_kmh)
    }

    pub fn turn_rate(&self) -> Option<f64> {
        self.rates.and_then(|r| r.turn_rate_dps)
    }

    pub fn distance_from_previous(&self) -> Option<f64> {
        self.motion.map(|m| m.distance_km)
    }
}

/// Seconds from `from` to `to` as times of day, wrapping over midnight.
pub fn elapsed_seconds(from: NaiveTime, to: NaiveTime) -> u32 {
    (to - from).num_seconds().rem_euclid(SECONDS_PER_DAY) as u32
}

/// Signed heading change in `(-180, 180]`.
pub fn heading_change(from_deg: f64, to_deg: f64) -> f64 {
    let delta = (to_deg - from_deg).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
