//! Equilibrium polynomial of the lake model and a dense real-polynomial root finder.
//!
//! Setting `x^q / (1 + x^q) - b x + l = 0` and multiplying through by
//! `1 + x^q` gives
//!
//! ```text
//! l - b x + (l + 1) x^q - b x^(q+1) = 0
//! ```
//!
//! Coefficients are stored in ascending degree order.

use crate::error::ClassificationError;
use crate::model::LakeParameters;
use nalgebra::DMatrix;
use num_complex::Complex;

/// Imaginary parts below this (relative to the root's magnitude) count as real.
pub const IMAG_TOLERANCE: f64 = 1e-8;

const POLISH_STEPS: usize = 8;

/// Coefficients (ascending degree, length `q + 2`) of the equilibrium polynomial.
///
/// Terms are accumulated so that `q = 1` folds the `x^q` and `-b x` terms into
/// a single degree-one coefficient `l + 1 - b`.
pub fn equilibrium_polynomial(params: &LakeParameters, input: f64) -> Vec<f64> {
    let q = params.exponent as usize;
    let b = params.recycling;
    let mut coeffs = vec![0.0; q + 2];
    coeffs[0] += input;
    coeffs[1] -= b;
    coeffs[q] += input + 1.0;
    coeffs[q + 1] -= b;
    coeffs
}

/// Horner evaluation.
pub fn evaluate(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

pub fn derivative(coeffs: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(degree, &c)| degree as f64 * c)
        .collect()
}

/// All complex roots of a real polynomial.
///
/// Exact zero low-order coefficients are peeled off as exact roots at zero; the
/// rest come from the eigenvalues of the companion matrix. Roots that are real
/// up to [`IMAG_TOLERANCE`] are refined with a few Newton steps on the real line.
pub fn roots(coeffs: &[f64]) -> Result<Vec<Complex<f64>>, ClassificationError> {
    for (index, &value) in coeffs.iter().enumerate() {
        if !value.is_finite() {
            return Err(ClassificationError::NonFiniteCoefficient { index, value });
        }
    }

    let degree = match coeffs.iter().rposition(|&c| c != 0.0) {
        Some(d) => d,
        None => return Err(ClassificationError::ZeroLeadingCoefficient),
    };
    let coeffs = &coeffs[..=degree];

    let zero_roots = coeffs.iter().take_while(|&&c| c == 0.0).count();
    let reduced = &coeffs[zero_roots..];
    let mut found = vec![Complex::new(0.0, 0.0); zero_roots];

    let n = reduced.len() - 1;
    if n == 0 {
        return Ok(found);
    }

    let leading = reduced[n];
    let mut companion = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        companion[(i, n - 1)] = -reduced[i] / leading;
    }

    let dpoly = derivative(reduced);
    for root in companion.complex_eigenvalues().iter() {
        if is_real(root) {
            let polished = polish_real_root(reduced, &dpoly, root.re);
            found.push(Complex::new(polished, 0.0));
        } else {
            found.push(*root);
        }
    }
    Ok(found)
}

pub fn is_real(root: &Complex<f64>) -> bool {
    root.im.abs() <= IMAG_TOLERANCE * root.re.abs().max(1.0)
}

fn polish_real_root(coeffs: &[f64], dcoeffs: &[f64], start: f64) -> f64 {
    let mut x = start;
    let mut residual = evaluate(coeffs, x).abs();
    for _ in 0..POLISH_STEPS {
        if residual == 0.0 {
            break;
        }
        let slope = evaluate(dcoeffs, x);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let candidate = x - evaluate(coeffs, x) / slope;
        let candidate_residual = evaluate(coeffs, candidate).abs();
        // Near a double root Newton can wander; only accept real improvements.
        if !candidate.is_finite() || candidate_residual >= residual {
            break;
        }
        x = candidate;
        residual = candidate_residual;
    }
    x
}
