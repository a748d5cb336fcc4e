use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Gate matrix must be 2x2, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}

#[derive(Error, Debug, Clone)]
pub enum MeasurementError {
    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions")]
    InvalidDimensions,

    #[error("Outcome probabilities sum to zero, state is not a valid density operator")]
    DegenerateDistribution,
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Vector is not normalized. Norm squared: {0}")]
    NotNormalized(f64),

    #[error("Invalid dimensions: single-qubit states are 2x2")]
    InvalidDimensions,

    #[error("Measurement error: {0}")]
    MeasurementError(#[from] MeasurementError),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),

    #[error("Channel error: {0}")]
    ChannelError(#[from] ChannelError),
}

#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("Kraus operators do not sum to Identity (Trace preserving relation failed)")]
    NotComplete,

    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Qubit count must be positive")]
    ZeroQubits,

    #[error("Invalid {name}: {value}. Must be between 0.0 and 1.0")]
    OutOfUnitRange { name: &'static str, value: f64 },

    #[error("Repetition count must be positive")]
    ZeroRepetitions,

    #[error("Parameter grid is empty")]
    EmptyGrid,

    #[error("Significance level must be strictly between 0.0 and 1.0, got {0}")]
    InvalidSignificance(f64),
}

#[derive(Error, Debug, Clone)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),
}

#[derive(Error, Debug, Clone)]
pub enum StatisticsError {
    #[error("Could not build the reference normal distribution: {0}")]
    Distribution(String),

    #[error("Critical value is not finite for significance level {0}")]
    NonFiniteCritical(f64),
}
