use crate::core::errors::GateError;
use crate::core::utils::{self, TOLERANCE};
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a single-qubit unitary operator.
///
/// Pauli operators double as the error operators of the noise channels,
/// the Pauli-X and Hadamard gates prepare the BB84 encoding states.
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    /// The 2x2 unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if the matrix is not 2x2 or is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != 2 || cols != 2 {
            return Err(GateError::InvalidDimensions { rows, cols });
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        Ok(Self { matrix })
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let eye = Array2::<Complex64>::eye(2);
        let product = matrix.dot(&utils::dagger(matrix));

        product
            .iter()
            .zip(eye.iter())
            .all(|(a, b)| (*a - *b).norm() < TOLERANCE)
    }

    /// Known-unitary constant matrices skip validation.
    fn fixed(rows: [[Complex64; 2]; 2]) -> Gate {
        Gate {
            matrix: arr2(&rows),
        }
    }

    /// Returns the matrix scaled by a real factor, as used for Kraus weights.
    pub fn scaled(&self, factor: f64) -> Array2<Complex64> {
        self.matrix.mapv(|c| c * factor)
    }

    // --- Standard Gates ---

    /// Creates an Identity gate.
    pub fn i() -> Gate {
        Gate::fixed([
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ])
    }

    /// Creates a Pauli-X gate (bit flip).
    pub fn x() -> Gate {
        Gate::fixed([
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ])
    }

    /// Creates a Pauli-Y gate (bit and phase flip).
    pub fn y() -> Gate {
        Gate::fixed([
            [Complex64::new(0.0, 0.0), Complex64::new(0.0, -1.0)],
            [Complex64::new(0.0, 1.0), Complex64::new(0.0, 0.0)],
        ])
    }

    /// Creates a Pauli-Z gate (phase flip).
    pub fn z() -> Gate {
        Gate::fixed([
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(-1.0, 0.0)],
        ])
    }

    /// Creates a Hadamard gate.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate::fixed([
            [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
            [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
        ])
    }
}
