pub mod optimizer;

pub use optimizer::{Circuit, OptimizeError, Optimizer, MAX_TURNPOINTS};
