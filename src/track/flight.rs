use std::fmt;

use serde::{Deserialize, Serialize};

use super::metadata::FlightMetadata;
use super::phase::{Phase, PhaseClassifier, PhaseControl};
use super::point::{Fix, FlightMode, Motion, Point, Rates};
use crate::geo::GeoError;

/// Running totals over the whole track.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightStats {
    pub total_distance_km: f64,
    pub max_altitude: Option<i32>,
    pub min_altitude: Option<i32>,
    pub max_ground_speed_kmh: Option<f64>,
    pub min_ground_speed_kmh: Option<f64>,
}

impl FlightStats {
    fn record(&mut self, point: &Point) {
        let alt = point.fix.pressure_alt;
        self.max_altitude = Some(self.max_altitude.map_or(alt, |m| m.max(alt)));
        self.min_altitude = Some(self.min_altitude.map_or(alt, |m| m.min(alt)));
        if let Some(d) = point.distance_from_previous() {
            self.total_distance_km += d;
        }
        if let Some(speed) = point.ground_speed() {
            self.max_ground_speed_kmh = Some(self.max_ground_speed_kmh.map_or(speed, |m| m.max(speed)));
            self.min_ground_speed_kmh = Some(self.min_ground_speed_kmh.map_or(speed, |m| m.min(speed)));
        }
    }
}

/// Append-only construction of a [`Flight`].
///
/// Every appended fix gets its derived metrics computed against the previous
/// point and is classified immediately.
#[derive(Clone, Debug)]
pub struct FlightBuilder {
    metadata: FlightMetadata,
    points: Vec<Point>,
    classifier: PhaseClassifier,
    stats: FlightStats,
}

impl Default for FlightBuilder {
    fn default() -> Self {
        FlightBuilder::new(PhaseControl::default())
    }
}

impl FlightBuilder {
    pub fn new(control: PhaseControl) -> Self {
        FlightBuilder {
            metadata: FlightMetadata::default(),
            points: Vec::new(),
            classifier: PhaseClassifier::new(control),
            stats: FlightStats::default(),
        }
    }

    pub fn metadata_mut(&mut self) -> &mut FlightMetadata {
        &mut self.metadata
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Phases so far; the last one is still open.
    pub fn phases(&self) -> &[Phase] {
        self.classifier.phases()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends one fix and returns its index. Nothing is appended when the
    /// coordinates cannot be decoded.
    pub fn append_point(&mut self, fix: Fix) -> Result<usize, GeoError> {
        let position = fix.position()?;
        let (motion, rates) = match self.points.last() {
            Some(prev) => {
                let motion = Motion::between(prev, &fix, &position);
                let rates = Rates::derive(prev, &motion);
                (Some(motion), Some(rates))
            }
            None => (None, None),
        };
        let mode = self.points.last().map_or(FlightMode::Stopped, |prev| prev.mode);
        let point = Point {
            fix,
            position,
            motion,
            rates,
            mode,
        };
        self.stats.record(&point);
        self.points.push(point);
        self.classifier.update(&mut self.points);
        Ok(self.points.len() - 1)
    }

    /// Seals the track: the last phase is closed and the phases cover every point.
    pub fn build(self) -> Flight {
        let control = self.classifier.control().clone();
        let phases = self.classifier.finish(self.points.len());
        Flight {
            metadata: self.metadata,
            control,
            points: self.points,
            phases,
            stats: self.stats,
        }
    }
}

/// A fully built, read-only flight track.
#[derive(Clone, Debug, Serialize)]
pub struct Flight {
    metadata: FlightMetadata,
    control: PhaseControl,
    points: Vec<Point>,
    phases: Vec<Phase>,
    stats: FlightStats,
}

impl Flight {
    pub fn metadata(&self) -> &FlightMetadata {
        &self.metadata
    }

    pub fn control(&self) -> &PhaseControl {
        &self.control
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn stats(&self) -> &FlightStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Phase the given point belongs to.
    pub fn phase_of(&self, index: usize) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.contains(index))
    }

    /// The track as a KML `LineString` of `lat,lon,gnss_alt` tuples.
    pub fn path_kml(&self) -> String {
        let coords: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("{:.2},{:.2},{}", p.position.lat_deg, p.position.lon_deg, p.fix.gnss_alt))
            .collect();
        format!("<LineString><coordinates>{}</coordinates></LineString>", coords.join(" "))
    }
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(v: &Option<String>) -> &str {
            v.as_deref().unwrap_or("-")
        }
        let date = self
            .metadata
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "date={} :: pilot={} :: type={} :: reg={}",
            date,
            show(&self.metadata.pilot),
            show(&self.metadata.glider_type),
            show(&self.metadata.glider_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveTime;

    fn at(secs: u32) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(10 * 3600 + secs, 0).unwrap()
    }

    #[test]
    fn first_point_has_only_position() {
        let mut builder = FlightBuilder::default();
        let idx = builder
            .append_point(Fix::from_degrees(at(0), 45.0, 6.0, 1000, 1010))
            .unwrap();
        assert_eq!(idx, 0);
        let p = &builder.points()[0];
        assert!(p.motion.is_none());
        assert!(p.rates.is_none());
        assert_eq!(p.mode, FlightMode::Stopped);
    }

    #[test]
    fn second_point_has_speed_but_no_turn_rate() {
        let mut builder = FlightBuilder::default();
        builder.append_point(Fix::from_degrees(at(0), 45.0, 6.0, 1000, 1000)).unwrap();
        builder.append_point(Fix::from_degrees(at(10), 45.001, 6.0, 1005, 1002)).unwrap();
        let p = &builder.points()[1];
        let motion = p.motion.unwrap();
        assert_eq!(motion.elapsed_s, 10);
        assert_eq!(motion.pressure_alt_delta, 5);
        assert_eq!(motion.gnss_alt_delta, 2);
        let rates = p.rates.unwrap();
        assert_approx_eq!(rates.ground_speed_kmh.unwrap(), motion.distance_km * 360.0);
        assert_approx_eq!(rates.pressure_vario.unwrap(), 0.5);
        assert_approx_eq!(rates.gnss_vario.unwrap(), 0.2);
        assert!(rates.turn_rate_dps.is_none());
    }

    #[test]
    fn bad_coordinates_leave_builder_untouched() {
        let mut builder = FlightBuilder::default();
        let mut fix = Fix::from_degrees(at(0), 45.0, 6.0, 0, 0);
        fix.latitude = "45X0000N".into();
        assert!(builder.append_point(fix).is_err());
        assert!(builder.is_empty());
    }

    #[test]
    fn stats_track_extremes() {
        let mut builder = FlightBuilder::default();
        builder.append_point(Fix::from_degrees(at(0), 45.0, 6.0, 900, 900)).unwrap();
        builder.append_point(Fix::from_degrees(at(4), 45.002, 6.0, 1200, 1200)).unwrap();
        builder.append_point(Fix::from_degrees(at(8), 45.003, 6.0, 800, 800)).unwrap();
        let flight = builder.build();
        let stats = flight.stats();
        assert_eq!(stats.max_altitude, Some(1200));
        assert_eq!(stats.min_altitude, Some(800));
        let legs: f64 = flight.points().iter().filter_map(Point::distance_from_previous).sum();
        assert_approx_eq!(stats.total_distance_km, legs);
        assert!(stats.max_ground_speed_kmh.unwrap() > stats.min_ground_speed_kmh.unwrap());
    }

    #[test]
    fn kml_and_display() {
        let mut builder = FlightBuilder::default();
        builder.metadata_mut().pilot = Some("Jane Doe".into());
        builder.append_point(Fix::from_degrees(at(0), 45.0, 6.0, 0, 1234)).unwrap();
        builder.append_point(Fix::from_degrees(at(1), 45.5, 6.25, 0, 1300)).unwrap();
        let flight = builder.build();
        assert_eq!(
            flight.path_kml(),
            "<LineString><coordinates>45.00,6.00,1234 45.50,6.25,1300</coordinates></LineString>"
        );
        assert_eq!(flight.to_string(), "date=- :: pilot=Jane Doe :: type=- :: reg=-");
    }

    #[test]
    fn built_flight_phases_cover_all_points() {
        let mut builder = FlightBuilder::default();
        for i in 0..5 {
            builder.append_point(Fix::from_degrees(at(i), 45.0, 6.0, 0, 0)).unwrap();
        }
        let flight = builder.build();
        assert_eq!(flight.phases().len(), 1);
        assert_eq!(flight.phase_of(4).map(|p| p.mode), Some(FlightMode::Stopped));
        assert_eq!(flight.phases()[0].end, Some(4));
    }
}
