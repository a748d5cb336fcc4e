//! Monte-Carlo sweeps of the BB84 simulator over a parameter grid.
//!
//! Runs are seeded on a fixed schedule: within a parameter value each
//! repetition advances the seed by the qubit count, and moving to the next
//! parameter value adds one more. [`derive_seed`] gives the seed of any run
//! in closed form.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{ChannelScenario, SessionConfig, SweepConfig};
use crate::core::errors::{ConfigError, SimulationError};
use crate::experiments::table::AggregateTable;
use crate::protocols::bb84;

/// One simulated session tagged with its place in the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRow {
    /// Swept value, p or k.
    pub parameter: f64,
    pub repetition: usize,
    pub seed: u64,
    pub global_mismatch_ratio: f64,
    pub z_mismatch_ratio: f64,
    pub x_mismatch_ratio: f64,
    pub eavesdropper_detected: bool,
}

/// Per-row quantity that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    GlobalMismatch,
    ZMismatch,
    XMismatch,
    /// 1 when the eavesdropper went undetected, 0 otherwise.
    Undetected,
}

impl Metric {
    pub const MISMATCH: [Metric; 3] = [Metric::GlobalMismatch, Metric::ZMismatch, Metric::XMismatch];

    /// Column stem in result tables.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::GlobalMismatch => "global_R_miss",
            Metric::ZMismatch => "Z_R_miss",
            Metric::XMismatch => "X_R_miss",
            Metric::Undetected => "undetected",
        }
    }

    pub fn value(&self, row: &ExperimentRow) -> f64 {
        match self {
            Metric::GlobalMismatch => row.global_mismatch_ratio,
            Metric::ZMismatch => row.z_mismatch_ratio,
            Metric::XMismatch => row.x_mismatch_ratio,
            Metric::Undetected => {
                if row.eavesdropper_detected {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

/// Seed of run `repetition_index` at grid position `parameter_index`.
///
/// Equal to running `seed += qubit_count` after every run and `seed += 1`
/// after every parameter value, starting from `base_seed`.
pub fn derive_seed(
    base_seed: u64,
    qubit_count: usize,
    repetitions: usize,
    parameter_index: usize,
    repetition_index: usize,
) -> u64 {
    let l = qubit_count as u64;
    let per_parameter = (repetitions as u64).wrapping_mul(l).wrapping_add(1);

    base_seed
        .wrapping_add((parameter_index as u64).wrapping_mul(per_parameter))
        .wrapping_add((repetition_index as u64).wrapping_mul(l))
}

/// Runs `sweep.repetitions` sessions for every grid value.
///
/// Every configuration is validated before the first run.
fn collect_rows<F>(
    sweep: &SweepConfig,
    grid: &[f64],
    make_config: F,
) -> Result<Vec<ExperimentRow>, SimulationError>
where
    F: Fn(f64) -> SessionConfig,
{
    sweep.validate()?;
    if grid.is_empty() {
        return Err(ConfigError::EmptyGrid.into());
    }
    for &value in grid {
        make_config(value).validate()?;
    }

    let mut rows = Vec::with_capacity(grid.len() * sweep.repetitions);

    for (parameter_index, &value) in grid.iter().enumerate() {
        debug!(parameter = value, "sweeping parameter value");

        for repetition in 0..sweep.repetitions {
            let seed = derive_seed(
                sweep.base_seed,
                sweep.qubit_count,
                sweep.repetitions,
                parameter_index,
                repetition,
            );
            let record = bb84::simulate(&make_config(value).with_seed(seed))?;

            rows.push(ExperimentRow {
                parameter: value,
                repetition,
                seed,
                global_mismatch_ratio: record.global_mismatch_ratio,
                z_mismatch_ratio: record.z_mismatch_ratio,
                x_mismatch_ratio: record.x_mismatch_ratio,
                eavesdropper_detected: record.eavesdropper_detected,
            });
        }
    }

    Ok(rows)
}

/// Raw rows of the mismatch sweep over channel error probabilities.
///
/// Nothing is disclosed, the runs only measure channel mismatch.
pub fn mismatch_rows(
    scenario: ChannelScenario,
    sweep: &SweepConfig,
    p_values: &[f64],
) -> Result<Vec<ExperimentRow>, SimulationError> {
    collect_rows(sweep, p_values, |p| {
        SessionConfig::new(sweep.qubit_count)
            .with_scenario(scenario)
            .with_noise_probability(p)
            .with_disclosed_fraction(0.0)
    })
}

/// Raw rows of the detection sweep over disclosed key fractions at a fixed
/// channel error probability.
pub fn undetected_rows(
    scenario: ChannelScenario,
    sweep: &SweepConfig,
    noise_probability: f64,
    k_values: &[f64],
) -> Result<Vec<ExperimentRow>, SimulationError> {
    collect_rows(sweep, k_values, |k| {
        SessionConfig::new(sweep.qubit_count)
            .with_scenario(scenario)
            .with_noise_probability(noise_probability)
            .with_disclosed_fraction(k)
    })
}

/// Mean global, Z and X mismatch per channel error probability.
pub fn sweep_mismatch(
    scenario: ChannelScenario,
    sweep: &SweepConfig,
    p_values: &[f64],
) -> Result<AggregateTable, SimulationError> {
    info!(
        scenario = %scenario.label(),
        points = p_values.len(),
        repetitions = sweep.repetitions,
        "mismatch sweep"
    );
    let rows = mismatch_rows(scenario, sweep, p_values)?;
    AggregateTable::from_rows("p", &Metric::MISMATCH, &rows, sweep)
}

/// Probability that the eavesdropper evades detection per disclosed fraction.
pub fn sweep_undetected_probability(
    scenario: ChannelScenario,
    sweep: &SweepConfig,
    noise_probability: f64,
    k_values: &[f64],
) -> Result<AggregateTable, SimulationError> {
    info!(
        scenario = %scenario.label(),
        noise_probability,
        points = k_values.len(),
        repetitions = sweep.repetitions,
        "undetected eavesdropping sweep"
    );
    let rows = undetected_rows(scenario, sweep, noise_probability, k_values)?;
    AggregateTable::from_rows("k", &[Metric::Undetected], &rows, sweep)
}
