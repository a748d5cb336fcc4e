use crate::core::errors::{MeasurementError, StateError};
use crate::core::utils::{self, TOLERANCE, trace};
use crate::core::{Basis, Gate, Measurement, MeasurementResult, NoiseChannel};
use crate::sampler::RandomSource;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Outcome probabilities below this are treated as exactly zero.
const PROBABILITY_FLOOR: f64 = 1e-12;

/// Single-qubit density operator.
#[derive(Clone, Debug)]
pub struct QuantumState {
    density_matrix: Array2<Complex64>,
}

impl QuantumState {
    /// Creates a new quantum state initialized to |0>.
    pub fn new() -> Self {
        let mut density_matrix = Array2::<Complex64>::zeros((2, 2));
        density_matrix[[0, 0]] = Complex64::new(1.0, 0.0);

        Self { density_matrix }
    }

    /// Pure state encoding `bit` in `basis`.
    ///
    /// Starts from |0>, flips with X for bit 1 and rotates with H into the
    /// X basis, giving |0>, |1>, |+> or |->.
    pub fn prepare(basis: Basis, bit: bool) -> Self {
        let mut state = Self::new();

        if bit {
            state.evolve(&Gate::x().matrix);
        }
        if basis == Basis::X {
            state.evolve(&Gate::h().matrix);
        }
        state
    }

    /// Validates that the input vector is a valid quantum state.
    fn check_vector_state(vector: &Array1<Complex64>) -> Result<(), StateError> {
        if vector.len() != 2 {
            return Err(StateError::InvalidDimensions);
        }

        // Sum of squared amplitudes must be 1.
        let norm_sqr: f64 = vector.iter().map(|c| c.norm_sqr()).sum();

        if (norm_sqr - 1.0).abs() > PROBABILITY_FLOOR {
            return Err(StateError::NotNormalized(norm_sqr));
        }

        Ok(())
    }

    /// Checks the validity of a density matrix
    fn check_density_matrix(matrix: &Array2<Complex64>) -> Result<(), StateError> {
        if matrix.dim() != (2, 2) || !utils::is_hermitian(matrix, TOLERANCE) {
            return Err(StateError::InvalidDimensions);
        }

        let tr = trace(matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > PROBABILITY_FLOOR {
            return Err(StateError::InvalidTrace(tr));
        }

        Ok(())
    }

    /// Creates a QuantumState from a state vector.
    pub fn from_state_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        Self::check_vector_state(&vector)?;

        // rho = |psi><psi|
        Ok(Self {
            density_matrix: utils::outer_product(&vector, &vector),
        })
    }

    /// Creates a QuantumState from a density matrix.
    pub fn from_density_matrix(matrix: Array2<Complex64>) -> Result<Self, StateError> {
        Self::check_density_matrix(&matrix)?;
        Ok(Self {
            density_matrix: matrix,
        })
    }

    pub fn density_matrix(&self) -> &Array2<Complex64> {
        &self.density_matrix
    }

    /// Checks if a QuantumState is valid.
    pub fn is_valid(&self) -> Result<(), StateError> {
        Self::check_density_matrix(&self.density_matrix)
    }

    /// tr(rho^2): 1 for pure states, 1/2 for the maximally mixed state.
    pub fn purity(&self) -> f64 {
        trace(&self.density_matrix.dot(&self.density_matrix)).re
    }

    /// rho -> U rho U†, for operators known to be 2x2.
    fn evolve(&mut self, u: &Array2<Complex64>) {
        self.density_matrix = utils::sandwich(u, &self.density_matrix);
    }

    /// Applies a quantum gate
    pub fn apply(&mut self, gate: &Gate) -> Result<(), StateError> {
        let (rows, cols) = gate.matrix.dim();
        if rows != 2 || cols != 2 {
            return Err(StateError::InvalidDimensions);
        }
        self.evolve(&gate.matrix);
        Ok(())
    }

    /// Apply NoiseChannel to QuantumState
    pub fn apply_channel(&mut self, channel: &NoiseChannel) {
        let mut new_rho = Array2::<Complex64>::zeros((2, 2));

        // Sum of K rho K† over the Kraus set
        for k in channel.kraus_ops() {
            new_rho = new_rho + utils::sandwich(k, &self.density_matrix);
        }

        self.density_matrix = new_rho;
    }

    /// Consuming form of [`QuantumState::apply_channel`].
    pub fn with_noise(mut self, channel: &NoiseChannel) -> Self {
        self.apply_channel(channel);
        self
    }

    /// Returns the probability of each projector outcome.
    ///
    /// p_k = Re tr(P_k rho P_k), with values under the floor snapped to zero
    /// and the pair renormalized to absorb floating-point drift.
    pub fn outcome_probabilities(
        &self,
        measurement: &Measurement,
    ) -> Result<[f64; 2], MeasurementError> {
        let mut probs = [0.0; 2];
        let mut sum_probs = 0.0;

        for (p, op) in probs.iter_mut().zip(measurement.operators()) {
            let tr = trace(&utils::sandwich(op, &self.density_matrix));
            *p = if tr.re < PROBABILITY_FLOOR { 0.0 } else { tr.re };
            sum_probs += *p;
        }

        if sum_probs <= 0.0 {
            return Err(MeasurementError::DegenerateDistribution);
        }

        for p in &mut probs {
            *p /= sum_probs;
        }

        Ok(probs)
    }

    /// Physical measurement, collapses the state onto the sampled outcome.
    pub fn measure(
        &mut self,
        measurement: &Measurement,
        rng: &mut RandomSource,
    ) -> Result<MeasurementResult, StateError> {
        let probs = self.outcome_probabilities(measurement)?;

        let outcome_idx = rng.pick_outcome(&probs);
        let p_selected = probs[outcome_idx];

        // rho' = (P_k * rho * P_k) / p_k
        let projector = &measurement.operators()[outcome_idx];
        self.density_matrix = utils::sandwich(projector, &self.density_matrix)
            .mapv(|val| val / Complex64::new(p_selected, 0.0));

        Ok(MeasurementResult {
            index: outcome_idx,
            probability: p_selected,
        })
    }

    /// Measures in `basis` and returns the decoded bit.
    pub fn measure_in(&mut self, basis: Basis, rng: &mut RandomSource) -> Result<bool, StateError> {
        Ok(self.measure(&basis.measurement(), rng)?.bit())
    }
}

impl Default for QuantumState {
    fn default() -> Self {
        Self::new()
    }
}
