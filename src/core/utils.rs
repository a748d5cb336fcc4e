//! Utility functions for single-qubit operator algebra.
//!
//! This module contains helper functions for:
//! - Matrix operations (trace, conjugate transpose, outer product, sandwich products).
//! - Completeness checks for measurements and channels.
//! - Hermiticity checks for density operators.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Tolerance used when comparing operator entries against their ideal values.
pub const TOLERANCE: f64 = 1e-9;

/// Computes the trace of a matrix (sum of diagonal elements).
pub fn trace(matrix: &Array2<Complex64>) -> Complex64 {
    matrix.diag().sum()
}

/// Conjugate transpose $A^\dagger$.
pub fn dagger(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|c| c.conj())
}

/// Computes $A \rho A^\dagger$.
pub fn sandwich(op: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    op.dot(rho).dot(&dagger(op))
}

/// Computes the outer product of two vectors $|a\rangle\langle b|$.
pub fn outer_product(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array2<Complex64> {
    let n = a.len();
    let m = b.len();
    let mut res = Array2::zeros((n, m));

    for i in 0..n {
        for j in 0..m {
            res[[i, j]] = a[i] * b[j].conj();
        }
    }
    res
}

/// Checks completeness relation for Kraus or measurement operators.
///
/// Verifies if $\sum M_k^\dagger M_k = I$.
pub fn check_completeness(ops: &[Array2<Complex64>], dim: usize) -> bool {
    let eye = Array2::<Complex64>::eye(dim);
    let sum = ops
        .iter()
        .fold(Array2::<Complex64>::zeros((dim, dim)), |acc, op| {
            acc + dagger(op).dot(op)
        });
    sum.iter()
        .zip(eye.iter())
        .all(|(a, b)| (a - b).norm() < TOLERANCE)
}

/// Checks if a matrix is Hermitian
pub fn is_hermitian(mat: &Array2<Complex64>, tol: f64) -> bool {
    mat.iter()
        .zip(mat.t().iter())
        .all(|(a, b)| (a - b.conj()).norm() < tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_outer_product_is_projector() {
        let v = array![c(1.0, 0.0), c(0.0, 0.0)];
        let p = outer_product(&v, &v);
        assert_eq!(p[[0, 0]], c(1.0, 0.0));
        assert_eq!(p[[1, 1]], c(0.0, 0.0));
        assert_eq!(trace(&p), c(1.0, 0.0));
    }

    #[test]
    fn test_dagger_conjugates_and_transposes() {
        let m = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(2.0, 1.0), c(0.0, 0.0)]];
        let d = dagger(&m);
        assert_eq!(d[[0, 1]], c(2.0, -1.0));
        assert_eq!(d[[1, 0]], c(0.0, 1.0));
    }

    #[test]
    fn test_completeness_of_split_identity() {
        let half = c(0.5_f64.sqrt(), 0.0);
        let zero = c(0.0, 0.0);
        let k = array![[half, zero], [zero, half]];
        assert!(check_completeness(&[k.clone(), k.clone()], 2));
        assert!(!check_completeness(&[k], 2));
    }

    #[test]
    fn test_hermitian_detection() {
        let y = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        assert!(is_hermitian(&y, TOLERANCE));
        let not_h = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]];
        assert!(!is_hermitian(&not_h, TOLERANCE));
    }
}
