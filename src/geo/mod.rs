pub mod dms;
pub mod sphere;

use thiserror::Error;

pub use dms::{format_latitude, format_longitude, to_decimal_degrees};
pub use sphere::{bearing, distance, Position, EARTH_RADIUS_KM};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("malformed {field} {value:?}")]
    Format { field: &'static str, value: String },
    #[error("unknown hemisphere {0:?}")]
    Hemisphere(char),
}
