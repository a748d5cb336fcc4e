//! Configuration for BB84 sessions and Monte-Carlo sweeps.
//!
//! All configuration types deserialize with `serde` and fill missing fields
//! from their `Default`, so a partial JSON/TOML document is a valid config.

use serde::{Deserialize, Serialize};

use crate::core::NoiseKind;
use crate::core::errors::ConfigError;

/// Fixed channel error probability used by the undetected-eavesdropping sweep.
pub const DEFAULT_UNDETECTED_NOISE: f64 = 0.20;

/// Channel error probabilities 0.0, 0.1, ..., 1.0.
pub fn default_noise_grid() -> Vec<f64> {
    (0..=10).map(|i| i as f64 / 10.0).collect()
}

/// Disclosed key fractions 0.1, 0.2, ..., 1.0.
pub fn default_disclosure_grid() -> Vec<f64> {
    (1..=10).map(|i| i as f64 / 10.0).collect()
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { name, value });
    }
    Ok(())
}

/// Eavesdropping and link-noise flags of one experimental condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelScenario {
    pub eavesdropping: bool,
    pub bit_flip: bool,
    pub phase_flip: bool,
}

impl ChannelScenario {
    pub const fn new(eavesdropping: bool, bit_flip: bool, phase_flip: bool) -> Self {
        Self {
            eavesdropping,
            bit_flip,
            phase_flip,
        }
    }

    /// The eight flag combinations, noise-only conditions first.
    pub fn all() -> [ChannelScenario; 8] {
        [
            Self::new(false, false, false),
            Self::new(false, true, false),
            Self::new(false, false, true),
            Self::new(false, true, true),
            Self::new(true, false, false),
            Self::new(true, true, false),
            Self::new(true, false, true),
            Self::new(true, true, true),
        ]
    }

    pub fn noise_kind(&self) -> NoiseKind {
        NoiseKind::from_flags(self.bit_flip, self.phase_flip)
    }

    /// File-stem style label, e.g. `bitflip` or `eavesdropping_phaseflip`.
    pub fn label(&self) -> String {
        let noise = match self.noise_kind() {
            NoiseKind::None => None,
            NoiseKind::BitFlip => Some("bitflip"),
            NoiseKind::PhaseFlip => Some("phaseflip"),
            NoiseKind::BitPhaseFlip => Some("bitphaseflip"),
        };

        match (self.eavesdropping, noise) {
            (false, None) => "ideal".to_string(),
            (false, Some(n)) => n.to_string(),
            (true, None) => "eavesdropping".to_string(),
            (true, Some(n)) => format!("eavesdropping_{n}"),
        }
    }
}

/// Parameters of a single BB84 key exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of qubits sent (L).
    pub qubit_count: usize,
    /// Whether an intercept-resend eavesdropper sits on the link.
    pub eavesdropping: bool,
    /// Link applies Pauli-X errors.
    pub bit_flip: bool,
    /// Link applies Pauli-Z errors.
    pub phase_flip: bool,
    /// Error probability p of the link.
    pub noise_probability: f64,
    /// Fraction k of the sifted key disclosed for the detection test.
    pub disclosed_fraction: f64,
    /// Seed of the run's random source.
    pub seed: u64,
    /// Log the session summary at info instead of debug level.
    pub verbose: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            qubit_count: 300,
            eavesdropping: false,
            bit_flip: false,
            phase_flip: false,
            noise_probability: 0.0,
            disclosed_fraction: 0.0,
            seed: 1,
            verbose: false,
        }
    }
}

impl SessionConfig {
    pub fn new(qubit_count: usize) -> Self {
        Self {
            qubit_count,
            ..Self::default()
        }
    }

    pub fn with_scenario(mut self, scenario: ChannelScenario) -> Self {
        self.eavesdropping = scenario.eavesdropping;
        self.bit_flip = scenario.bit_flip;
        self.phase_flip = scenario.phase_flip;
        self
    }

    pub fn with_eavesdropping(mut self, eavesdropping: bool) -> Self {
        self.eavesdropping = eavesdropping;
        self
    }

    pub fn with_bit_flip(mut self, bit_flip: bool) -> Self {
        self.bit_flip = bit_flip;
        self
    }

    pub fn with_phase_flip(mut self, phase_flip: bool) -> Self {
        self.phase_flip = phase_flip;
        self
    }

    pub fn with_noise_probability(mut self, p: f64) -> Self {
        self.noise_probability = p;
        self
    }

    pub fn with_disclosed_fraction(mut self, k: f64) -> Self {
        self.disclosed_fraction = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn scenario(&self) -> ChannelScenario {
        ChannelScenario::new(self.eavesdropping, self.bit_flip, self.phase_flip)
    }

    pub fn noise_kind(&self) -> NoiseKind {
        NoiseKind::from_flags(self.bit_flip, self.phase_flip)
    }

    /// Rejects zero qubits and probabilities outside [0, 1] (NaN included).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qubit_count == 0 {
            return Err(ConfigError::ZeroQubits);
        }
        check_unit("noise probability", self.noise_probability)?;
        check_unit("disclosed fraction", self.disclosed_fraction)?;
        Ok(())
    }
}

/// Denominator used for the standard error of a swept group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardErrorConvention {
    /// sqrt(repetitions per swept value).
    #[default]
    Repetitions,
    /// sqrt(number of distinct swept values). Reproduces existing result tables.
    ParameterGroups,
}

/// Parameters shared by every run of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Seed of the first run, later runs advance from it.
    pub base_seed: u64,
    pub qubit_count: usize,
    /// Runs per swept parameter value.
    pub repetitions: usize,
    /// Two-tailed significance level of the confidence interval.
    pub alpha: f64,
    pub standard_error: StandardErrorConvention,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_seed: 1,
            qubit_count: 300,
            repetitions: 100,
            alpha: 0.01,
            standard_error: StandardErrorConvention::Repetitions,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qubit_count == 0 {
            return Err(ConfigError::ZeroQubits);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::InvalidSignificance(self.alpha));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grids() {
        let p = default_noise_grid();
        assert_eq!(p.len(), 11);
        assert_eq!(p[0], 0.0);
        assert_eq!(p[3], 0.3);
        assert_eq!(p[10], 1.0);

        let k = default_disclosure_grid();
        assert_eq!(k.len(), 10);
        assert_eq!(k[0], 0.1);
        assert_eq!(k[9], 1.0);
    }

    #[test]
    fn test_scenario_labels() {
        let labels: Vec<String> = ChannelScenario::all().iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            vec![
                "ideal",
                "bitflip",
                "phaseflip",
                "bitphaseflip",
                "eavesdropping",
                "eavesdropping_bitflip",
                "eavesdropping_phaseflip",
                "eavesdropping_bitphaseflip",
            ]
        );
    }

    #[test]
    fn test_session_validation() {
        assert!(SessionConfig::default().validate().is_ok());
        assert_eq!(
            SessionConfig::new(0).validate(),
            Err(ConfigError::ZeroQubits)
        );
        assert!(matches!(
            SessionConfig::new(10).with_noise_probability(1.2).validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "noise probability",
                ..
            })
        ));
        assert!(matches!(
            SessionConfig::new(10)
                .with_disclosed_fraction(f64::NAN)
                .validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "disclosed fraction",
                ..
            })
        ));
    }

    #[test]
    fn test_builder_and_scenario_agree() {
        let scenario = ChannelScenario::new(true, false, true);
        let config = SessionConfig::new(50).with_scenario(scenario);
        assert_eq!(config.scenario(), scenario);
        assert_eq!(config.noise_kind(), NoiseKind::PhaseFlip);
    }

    #[test]
    fn test_sweep_validation() {
        assert!(SweepConfig::default().validate().is_ok());
        let bad = SweepConfig {
            repetitions: 0,
            ..SweepConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::ZeroRepetitions));
        let bad_alpha = SweepConfig {
            alpha: 1.0,
            ..SweepConfig::default()
        };
        assert_eq!(
            bad_alpha.validate(),
            Err(ConfigError::InvalidSignificance(1.0))
        );
    }
}
