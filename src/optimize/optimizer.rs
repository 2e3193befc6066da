use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Position;
use crate::track::Flight;

/// Largest turnpoint count the optimizer knows how to search.
pub const MAX_TURNPOINTS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("track has {points} points, {required} needed")]
    DegenerateTrack { points: usize, required: usize },
    #[error("unsupported turnpoint count {0} (expected 1 to {MAX_TURNPOINTS})")]
    UnsupportedTurnpoints(usize),
}

/// A scored route through the track. Indices refer to the flight's points.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Circuit {
    pub start: usize,
    pub turnpoints: Vec<usize>,
    pub end: usize,
    pub distance_km: f64,
}

impl Circuit {
    /// The circuit returned when nothing scored: no turnpoints, zero distance.
    pub fn empty() -> Self {
        Circuit::default()
    }

    pub fn is_empty(&self) -> bool {
        self.turnpoints.is_empty()
    }

    /// Every index of the circuit in flying order.
    pub fn indices(&self) -> Vec<usize> {
        let mut all = Vec::with_capacity(self.turnpoints.len() + 2);
        all.push(self.start);
        all.extend_from_slice(&self.turnpoints);
        all.push(self.end);
        all
    }
}

/// Best open-distance circuits from the first to the last fix.
///
/// Inner scans skip ahead whenever a candidate falls short of the best so far,
/// by as many fixes as the largest fix-to-fix distance says cannot close the gap.
pub struct Optimizer<'a> {
    positions: Vec<&'a Position>,
    max_leg_km: f64,
}

impl<'a> Optimizer<'a> {
    pub fn new(flight: &'a Flight) -> Self {
        let positions: Vec<&Position> = flight.points().iter().map(|p| &p.position).collect();
        let max_leg_km = positions
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .fold(0.0, f64::max);
        Optimizer {
            positions,
            max_leg_km,
        }
    }

    pub fn max_leg_km(&self) -> f64 {
        self.max_leg_km
    }

    /// Next index to try after a candidate at `i` fell `shortfall_km` short.
    pub fn forward(&self, i: usize, shortfall_km: f64) -> usize {
        if self.max_leg_km <= 0.0 {
            return i + 1;
        }
        let step = (shortfall_km / self.max_leg_km).floor();
        if step >= 1.0 {
            i + step as usize
        } else {
            i + 1
        }
    }

    /// Dispatches on the number of turnpoints.
    pub fn optimize(&self, turnpoints: usize) -> Result<Circuit, OptimizeError> {
        match turnpoints {
            1 => Ok(self.optimize1()),
            2 => Ok(self.optimize2()),
            3 => Ok(self.optimize3()),
            n => Err(OptimizeError::UnsupportedTurnpoints(n)),
        }
    }

    /// Like [`Optimizer::optimize`], but a track too short for the requested
    /// count is an error instead of an empty circuit.
    pub fn require(&self, turnpoints: usize) -> Result<Circuit, OptimizeError> {
        let required = turnpoints + 2;
        if (1..=MAX_TURNPOINTS).contains(&turnpoints) && self.positions.len() < required {
            return Err(OptimizeError::DegenerateTrack {
                points: self.positions.len(),
                required,
            });
        }
        self.optimize(turnpoints)
    }

    fn dist(&self, a: usize, b: usize) -> f64 {
        self.positions[a].distance(self.positions[b])
    }

    fn last(&self, turnpoints: usize) -> Option<usize> {
        let n = self.positions.len();
        if n < turnpoints + 2 {
            None
        } else {
            Some(n - 1)
        }
    }

    /// One turnpoint (out and return).
    pub fn optimize1(&self) -> Circuit {
        let mut best = Circuit::empty();
        let Some(end) = self.last(1) else {
            return best;
        };
        self.scan_last_turnpoint(&mut best, 0.0, &[], 1, end);
        best
    }

    /// Two turnpoints.
    pub fn optimize2(&self) -> Circuit {
        let mut best = Circuit::empty();
        let Some(end) = self.last(2) else {
            return best;
        };
        for tp1 in 1..end - 1 {
            let leg1 = self.dist(0, tp1);
            self.scan_last_turnpoint(&mut best, leg1, &[tp1], tp1 + 1, end);
        }
        best
    }

    /// Three turnpoints.
    pub fn optimize3(&self) -> Circuit {
        let mut best = Circuit::empty();
        let Some(end) = self.last(3) else {
            return best;
        };
        for tp1 in 1..end - 2 {
            let leg1 = self.dist(0, tp1);
            for tp2 in tp1 + 1..end - 1 {
                let legs = leg1 + self.dist(tp1, tp2);
                self.scan_last_turnpoint(&mut best, legs, &[tp1, tp2], tp2 + 1, end);
            }
        }
        best
    }

    /// Pruned scan over the last turnpoint, after `fixed` turnpoints whose
    /// legs from the start add up to `fixed_km`.
    fn scan_last_turnpoint(&self, best: &mut Circuit, fixed_km: f64, fixed: &[usize], from: usize, end: usize) {
        let prev = fixed.last().copied().unwrap_or(0);
        let mut tp = from;
        while tp < end {
            let distance = fixed_km + self.dist(prev, tp) + self.dist(tp, end);
            if distance > best.distance_km {
                let mut turnpoints = fixed.to_vec();
                turnpoints.push(tp);
                *best = Circuit {
                    start: 0,
                    turnpoints,
                    end,
                    distance_km: distance,
                };
                debug!("new best circuit {:?} ({:.3} km)", best.indices(), distance);
                tp += 1;
            } else {
                // Moving tp by k fixes changes each of its two legs by at most k * max_leg.
                tp = self.forward(tp, 0.5 * (best.distance_km - distance));
            }
        }
    }
}
