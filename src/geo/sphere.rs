use serde::{Deserialize, Serialize};

/// FAI sphere radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A location on the sphere, kept in both degrees and radians.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub lat_rad: f64,
    pub lon_rad: f64,
}

impl Position {
    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Position {
            lat_deg,
            lon_deg,
            lat_rad: lat_deg.to_radians(),
            lon_rad: lon_deg.to_radians(),
        }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        distance(self, other)
    }

    pub fn bearing(&self, other: &Position) -> f64 {
        bearing(self, other)
    }
}

/// Great-circle (haversine) distance in kilometres.
pub fn distance(p1: &Position, p2: &Position) -> f64 {
    let half_dlat = (p2.lat_rad - p1.lat_rad) / 2.0;
    let half_dlon = (p2.lon_rad - p1.lon_rad) / 2.0;
    let h = half_dlat.sin().powi(2) + p1.lat_rad.cos() * p2.lat_rad.cos() * half_dlon.sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin() * EARTH_RADIUS_KM
}

/// Initial bearing from `p1` towards `p2`, in degrees within `[0, 360)`.
pub fn bearing(p1: &Position, p2: &Position) -> f64 {
    let dlon = p2.lon_rad - p1.lon_rad;
    let y = dlon.sin() * p2.lat_rad.cos();
    let x = p1.lat_rad.cos() * p2.lat_rad.sin() - p1.lat_rad.sin() * p2.lat_rad.cos() * dlon.cos();
    let deg = y.atan2(x).to_degrees().rem_euclid(360.0);
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use proptest::prelude::*;

    fn position() -> impl Strategy<Value = Position> {
        (-90.0..=90.0_f64, -180.0..=180.0_f64).prop_map(|(lat, lon)| Position::from_degrees(lat, lon))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric_and_zero_on_self(a in position(), b in position()) {
            prop_assert_eq!(distance(&a, &a), 0.0);
            prop_assert!((distance(&a, &b) - distance(&b, &a)).abs() <= 1e-6);
            prop_assert!(distance(&a, &b) <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }

        /// The optimizer's forward skip relies on this bound.
        #[test]
        fn triangle_inequality_holds(a in position(), b in position(), c in position()) {
            prop_assert!(distance(&a, &c) <= distance(&a, &b) + distance(&b, &c) + 1e-3);
        }

        #[test]
        fn bearing_stays_in_range(a in position(), b in position()) {
            let deg = bearing(&a, &b);
            prop_assert!((0.0..360.0).contains(&deg), "{}", deg);
        }
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Position::from_degrees(0.0, 0.0);
        let b = Position::from_degrees(1.0, 0.0);
        assert_approx_eq!(distance(&a, &b), EARTH_RADIUS_KM * 1f64.to_radians(), 1e-9);
    }

    #[test]
    fn bearings_point_the_right_way() {
        let origin = Position::from_degrees(10.0, 10.0);
        assert_approx_eq!(bearing(&origin, &Position::from_degrees(11.0, 10.0)), 0.0, 1e-9);
        assert_approx_eq!(bearing(&origin, &Position::from_degrees(9.0, 10.0)), 180.0, 1e-9);
        let east = bearing(&origin, &Position::from_degrees(10.0, 11.0));
        assert!(east > 89.0 && east < 91.0);
        let west = bearing(&origin, &Position::from_degrees(10.0, 9.0));
        assert!(west > 269.0 && west < 271.0);
    }
}
