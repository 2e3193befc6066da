//! In-memory flight model: points with their derived metrics, the flight-mode
//! classifier and the resulting phases.

pub mod flight;
pub mod metadata;
pub mod phase;
pub mod point;

pub use flight::{Flight, FlightBuilder, FlightStats};
pub use metadata::{FlightMetadata, HeaderKey};
pub use phase::{ConfigError, Phase, PhaseClassifier, PhaseControl};
pub use point::{Fix, FlightMode, Motion, Point, Rates};
