use std::env;
use std::ops::RangeInclusive;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::point::{elapsed_seconds, FlightMode, Point};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    Invalid { field: &'static str, value: f64 },
}

/// Tuning of the flight-mode classifier.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhaseControl {
    /// Ground speed above which the aircraft counts as flying.
    pub min_speed_kmh: f64,
    /// Absolute turn rate at or above which a fix counts as turning.
    pub min_circle_rate_dps: f64,
    /// Sustained turning needed to enter circling.
    pub min_circle_time_s: u32,
    /// Sustained non-turning needed to leave circling.
    pub min_straight_time_s: u32,
}

impl Default for PhaseControl {
    fn default() -> Self {
        Self {
            min_speed_kmh: 50.0,
            min_circle_rate_dps: 4.0,
            min_circle_time_s: 45,
            min_straight_time_s: 15,
        }
    }
}

impl PhaseControl {
    /// Defaults overridden by `GLIDE_*` environment variables.
    pub fn from_env() -> Self {
        let mut control = PhaseControl::default();
        if let Some(v) = env_override("GLIDE_MIN_SPEED_KMH") {
            control.min_speed_kmh = v;
        }
        if let Some(v) = env_override("GLIDE_MIN_CIRCLE_RATE") {
            control.min_circle_rate_dps = v;
        }
        if let Some(v) = env_override("GLIDE_MIN_CIRCLE_TIME_S") {
            control.min_circle_time_s = v;
        }
        if let Some(v) = env_override("GLIDE_MIN_STRAIGHT_TIME_S") {
            control.min_straight_time_s = v;
        }
        control
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("min_speed_kmh", self.min_speed_kmh),
            ("min_circle_rate_dps", self.min_circle_rate_dps),
            ("min_circle_time_s", f64::from(self.min_circle_time_s)),
            ("min_straight_time_s", f64::from(self.min_straight_time_s)),
        ];
        for (field, value) in checks {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    fn is_turning(&self, point: &Point) -> bool {
        point
            .turn_rate()
            .is_some_and(|rate| rate.abs() >= self.min_circle_rate_dps)
    }
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {name}={raw:?}: not a valid number");
            None
        }
    }
}

/// A maximal run of points sharing one mode. `end` stays `None` while the
/// phase is still open.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub start: usize,
    pub end: Option<usize>,
    pub mode: FlightMode,
}

impl Phase {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && self.end.map_or(true, |end| index <= end)
    }
}

/// Streaming flight-mode state machine, fed one appended point at a time.
///
/// Entering or leaving circling relabels the whole qualifying window behind
/// the current point, so earlier points' modes can change after the fact.
#[derive(Clone, Debug)]
pub struct PhaseClassifier {
    control: PhaseControl,
    phases: Vec<Phase>,
}

impl PhaseClassifier {
    pub fn new(control: PhaseControl) -> Self {
        PhaseClassifier {
            control,
            phases: Vec::new(),
        }
    }

    pub fn control(&self) -> &PhaseControl {
        &self.control
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Classifies the last point of `points`, which must have just been appended.
    pub fn update(&mut self, points: &mut [Point]) {
        let Some(idx) = points.len().checked_sub(1) else {
            return;
        };
        if idx == 0 {
            points[0].mode = FlightMode::Stopped;
            return;
        }

        let mode = points[idx - 1].mode;
        points[idx].mode = mode;
        match mode {
            FlightMode::Stopped => {
                let moving = points[idx]
                    .ground_speed()
                    .is_some_and(|speed| speed > self.control.min_speed_kmh);
                if moving {
                    self.relabel(points, idx..=idx, FlightMode::Straight);
                }
            }
            FlightMode::Straight => {
                let window = self.control.min_circle_time_s;
                let control = &self.control;
                let start = self.sustained_since(points, idx, window, |p| control.is_turning(p));
                if let Some(start) = start {
                    self.relabel(points, start..=idx, FlightMode::Circling);
                }
            }
            FlightMode::Circling => {
                let window = self.control.min_straight_time_s;
                let control = &self.control;
                let start = self.sustained_since(points, idx, window, |p| !control.is_turning(p));
                if let Some(start) = start {
                    self.relabel(points, start..=idx, FlightMode::Straight);
                }
            }
        }
    }

    /// Walks back from `idx` over the points less than `window_s` seconds
    /// older than it. Returns the earliest of them when all qualify and the
    /// walk reached a point at least `window_s` old without leaving the
    /// current phase.
    fn sustained_since(
        &self,
        points: &[Point],
        idx: usize,
        window_s: u32,
        qualifies: impl Fn(&Point) -> bool,
    ) -> Option<usize> {
        let floor = self.phases.last().map_or(0, |phase| phase.start);
        let now = points[idx].fix.time;
        let mut earliest = None;
        for k in (floor..=idx).rev() {
            if elapsed_seconds(points[k].fix.time, now) >= window_s {
                return earliest;
            }
            if k == floor || !qualifies(&points[k]) {
                return None;
            }
            earliest = Some(k);
        }
        None
    }

    fn relabel(&mut self, points: &mut [Point], range: RangeInclusive<usize>, mode: FlightMode) {
        let start = *range.start();
        for point in &mut points[range] {
            point.mode = mode;
        }
        self.open_phase(start, mode);
    }

    fn open_phase(&mut self, start: usize, mode: FlightMode) {
        if let Some(open) = self.phases.last_mut() {
            open.end = Some(start - 1);
        } else if start > 0 {
            self.phases.push(Phase {
                start: 0,
                end: Some(start - 1),
                mode: FlightMode::Stopped,
            });
        }
        debug!("phase {:?} opened at point {}", mode, start);
        self.phases.push(Phase {
            start,
            end: None,
            mode,
        });
    }

    /// Closes the open phase at the last point, so that the phases cover
    /// every index of a track of `len` points.
    pub fn finish(mut self, len: usize) -> Vec<Phase> {
        if len == 0 {
            return Vec::new();
        }
        if self.phases.is_empty() {
            self.phases.push(Phase {
                start: 0,
                end: None,
                mode: FlightMode::Stopped,
            });
        }
        if let Some(open) = self.phases.last_mut() {
            open.end = Some(len - 1);
        }
        self.phases
    }
}
