use crate::core::errors::MeasurementError;
use crate::core::utils;
use ndarray::{Array1, Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two mutually unbiased BB84 bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis {|0>, |1>}.
    Z,
    /// Hadamard basis {|+>, |->}.
    X,
}

impl Basis {
    /// State vector encoding `bit` in this basis.
    ///
    /// Z: 0 -> |0>, 1 -> |1>. X: 0 -> |+>, 1 -> |->.
    pub fn eigenstate(self, bit: bool) -> Array1<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let inv_sqrt2 = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);

        match (self, bit) {
            (Basis::Z, false) => array![one, zero],
            (Basis::Z, true) => array![zero, one],
            (Basis::X, false) => array![inv_sqrt2, inv_sqrt2],
            (Basis::X, true) => array![inv_sqrt2, -inv_sqrt2],
        }
    }

    /// Projective measurement in this basis.
    pub fn measurement(self) -> Measurement {
        match self {
            Basis::Z => Measurement::z_basis(),
            Basis::X => Measurement::x_basis(),
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Z => write!(f, "Z"),
            Basis::X => write!(f, "X"),
        }
    }
}

/// Two-outcome projective measurement. Outcome index `k` decodes to bit `k`.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// Projectors {P_0, P_1}
    operators: [Array2<Complex64>; 2],
}

impl Measurement {
    pub fn new(operators: [Array2<Complex64>; 2]) -> Result<Self, MeasurementError> {
        for op in &operators {
            if op.dim() != (2, 2) {
                return Err(MeasurementError::InvalidDimensions);
            }
        }

        if !utils::check_completeness(&operators, 2) {
            return Err(MeasurementError::NotComplete);
        }

        Ok(Self { operators })
    }

    fn from_basis(basis: Basis) -> Measurement {
        let v0 = basis.eigenstate(false);
        let v1 = basis.eigenstate(true);

        Measurement {
            operators: [
                utils::outer_product(&v0, &v0),
                utils::outer_product(&v1, &v1),
            ],
        }
    }

    pub fn operators(&self) -> &[Array2<Complex64>; 2] {
        &self.operators
    }

    /// Z basis (Computational) -> {|0>, |1>}.
    pub fn z_basis() -> Measurement {
        Self::from_basis(Basis::Z)
    }

    /// X basis (Hadamard) -> {|+>, |->}.
    pub fn x_basis() -> Measurement {
        Self::from_basis(Basis::X)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Applied projector index
    pub index: usize,
    /// Probability the outcome had before sampling
    pub probability: f64,
}

impl MeasurementResult {
    /// Decoded bit.
    pub fn bit(&self) -> bool {
        self.index == 1
    }
}
