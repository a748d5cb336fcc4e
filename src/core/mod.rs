mod channels;
pub mod errors;
mod gates;
mod measurements;
mod state;
pub mod utils;

pub use channels::{NoiseChannel, NoiseKind};
pub use gates::Gate;
pub use measurements::{Basis, Measurement, MeasurementResult};
pub use state::QuantumState;
