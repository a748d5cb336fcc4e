use crate::core::Gate;
use crate::core::errors::ChannelError;
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Error operator applied by a Pauli noise channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Identity channel, the state is never disturbed.
    #[default]
    None,
    /// Pauli-X error.
    BitFlip,
    /// Pauli-Z error.
    PhaseFlip,
    /// Pauli-Y error, bit and phase flipped together by one event.
    BitPhaseFlip,
}

impl NoiseKind {
    /// Maps the two link flags onto a single error operator.
    ///
    /// Both flags set selects the combined Y operator rather than two
    /// independent X and Z events.
    pub fn from_flags(bit_flip: bool, phase_flip: bool) -> Self {
        match (bit_flip, phase_flip) {
            (false, false) => NoiseKind::None,
            (true, false) => NoiseKind::BitFlip,
            (false, true) => NoiseKind::PhaseFlip,
            (true, true) => NoiseKind::BitPhaseFlip,
        }
    }

    /// The error operator, `None` for the identity channel.
    pub fn operator(self) -> Option<Gate> {
        match self {
            NoiseKind::None => None,
            NoiseKind::BitFlip => Some(Gate::x()),
            NoiseKind::PhaseFlip => Some(Gate::z()),
            NoiseKind::BitPhaseFlip => Some(Gate::y()),
        }
    }

    /// Number of Pauli flags the kind was built from.
    pub fn flag_count(self) -> usize {
        match self {
            NoiseKind::None => 0,
            NoiseKind::BitFlip | NoiseKind::PhaseFlip => 1,
            NoiseKind::BitPhaseFlip => 2,
        }
    }
}

/// Probabilistic single-qubit Pauli error model in Kraus form.
///
/// With probability `p` the error operator `E` is applied, otherwise the
/// identity: `rho -> (1 - p) rho + p E rho E†`.
#[derive(Clone, Debug)]
pub struct NoiseChannel {
    kind: NoiseKind,
    probability: f64,
    kraus_ops: Vec<Array2<Complex64>>,
}

impl NoiseChannel {
    pub fn new(kind: NoiseKind, probability: f64) -> Result<Self, ChannelError> {
        validate_prob(probability)?;

        let kraus_ops = match kind.operator() {
            None => vec![Gate::i().matrix],
            Some(error_op) => {
                let p_stay = (1.0 - probability).sqrt();
                let p_flip = probability.sqrt();
                vec![Gate::i().scaled(p_stay), error_op.scaled(p_flip)]
            }
        };

        if !utils::check_completeness(&kraus_ops, 2) {
            return Err(ChannelError::NotComplete);
        }

        Ok(Self {
            kind,
            probability,
            kraus_ops,
        })
    }

    /// Builds the channel from the bit-flip and phase-flip link flags.
    pub fn from_flags(
        bit_flip: bool,
        phase_flip: bool,
        probability: f64,
    ) -> Result<Self, ChannelError> {
        Self::new(NoiseKind::from_flags(bit_flip, phase_flip), probability)
    }

    /// Noise-free channel.
    pub fn identity() -> Self {
        Self {
            kind: NoiseKind::None,
            probability: 0.0,
            kraus_ops: vec![Gate::i().matrix],
        }
    }

    /// Bit Flip Channel -> X
    pub fn bit_flip(p: f64) -> Result<NoiseChannel, ChannelError> {
        Self::new(NoiseKind::BitFlip, p)
    }

    /// Phase Flip Channel -> Z
    pub fn phase_flip(p: f64) -> Result<NoiseChannel, ChannelError> {
        Self::new(NoiseKind::PhaseFlip, p)
    }

    /// Bit-Phase Flip Channel -> Y
    pub fn bit_phase_flip(p: f64) -> Result<NoiseChannel, ChannelError> {
        Self::new(NoiseKind::BitPhaseFlip, p)
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Trace-preserving Kraus set, each operator 2x2.
    pub fn kraus_ops(&self) -> &[Array2<Complex64>] {
        &self.kraus_ops
    }

    /// `true` when the channel can never disturb a state.
    pub fn is_identity(&self) -> bool {
        self.kind == NoiseKind::None || self.probability == 0.0
    }
}

/// Validate probability parameter
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}
