//! BB84 quantum key distribution under Pauli channel noise and
//! intercept-resend eavesdropping, with Monte-Carlo estimation of how often
//! the eavesdropper is detected.

pub mod config;
mod core;
pub mod experiments;
pub mod protocols;
mod sampler;

pub use crate::config::{ChannelScenario, SessionConfig, StandardErrorConvention, SweepConfig};
pub use crate::core::{
    Basis, Gate, Measurement, MeasurementResult, NoiseChannel, NoiseKind, QuantumState, errors,
    utils,
};
pub use crate::protocols::bb84::{SessionRecord, simulate, simulate_bb84};
pub use crate::sampler::RandomSource;
