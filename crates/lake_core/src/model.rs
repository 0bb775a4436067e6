//! The shallow lake phosphorus model.
//!
//! A single state variable P (phosphorus concentration) evolves as
//!
//! ```text
//! dP/dt = P^q / (1 + P^q) - b * P + l
//! ```
//!
//! where `b` is the recycling (removal) rate, `q` the steepness of the
//! sediment recycling sigmoid, and `l` the external phosphorus input.

use crate::traits::{DynamicalSystem, Scalar};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Lake parameters shared by the equilibrium sweep and the integrators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LakeParameters {
    /// Recycling rate `b`, strictly positive.
    pub recycling: f64,
    /// Nonlinearity exponent `q`, at least 1.
    pub exponent: u32,
}

impl LakeParameters {
    pub fn new(recycling: f64, exponent: u32) -> Result<Self> {
        let params = Self {
            recycling,
            exponent,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.recycling.is_finite() || self.recycling <= 0.0 {
            bail!(
                "Recycling rate b must be positive and finite (got {}).",
                self.recycling
            );
        }
        if self.exponent == 0 {
            bail!("Exponent q must be at least 1.");
        }
        Ok(())
    }

    /// Rate of change of P for a given input.
    pub fn rate(&self, p: f64, input: f64) -> f64 {
        phosphorus_rate(p, self.recycling, self.exponent, input)
    }

    /// d/dP of [`LakeParameters::rate`]. For this one-dimensional flow it is the
    /// single Jacobian eigenvalue, so its sign decides local stability.
    pub fn rate_derivative(&self, p: f64) -> f64 {
        let q = self.exponent as i32;
        let pq = p.powi(q);
        let denom = 1.0 + pq;
        q as f64 * p.powi(q - 1) / (denom * denom) - self.recycling
    }

    pub fn stability(&self, p: f64) -> Stability {
        Stability::from_eigenvalue(self.rate_derivative(p))
    }
}

/// `f(x, b, q, l) = x^q / (1 + x^q) - b x + l`, generic over the scalar type.
pub fn phosphorus_rate<T: Scalar>(x: T, b: T, q: u32, l: T) -> T {
    let xq = x.powi(q as i32);
    xq / (T::one() + xq) - b * x + l
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    Unstable,
    /// Zero eigenvalue: the point sits on a fold.
    Neutral,
}

impl Stability {
    pub fn from_eigenvalue(eigenvalue: f64) -> Self {
        if eigenvalue < 0.0 {
            Stability::Stable
        } else if eigenvalue > 0.0 {
            Stability::Unstable
        } else {
            Stability::Neutral
        }
    }
}

/// The lake as a flow with a frozen input, for use with a [`crate::traits::Steppable`].
#[derive(Debug, Clone, Copy)]
pub struct LakeSystem {
    pub params: LakeParameters,
    pub input: f64,
}

impl LakeSystem {
    pub fn new(params: LakeParameters, input: f64) -> Self {
        Self { params, input }
    }
}

impl DynamicalSystem<f64> for LakeSystem {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        out[0] = self.params.rate(x[0], self.input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        assert_err_contains(LakeParameters::new(0.0, 4), "Recycling rate");
        assert_err_contains(LakeParameters::new(-0.5, 4), "Recycling rate");
        assert_err_contains(LakeParameters::new(f64::NAN, 4), "Recycling rate");
        assert_err_contains(LakeParameters::new(0.65, 0), "Exponent q");
    }

    #[test]
    fn rate_matches_closed_form() {
        let params = LakeParameters::new(0.65, 4).expect("valid parameters");
        let p: f64 = 1.2;
        let expected = p.powi(4) / (1.0 + p.powi(4)) - 0.65 * p + 0.1;
        assert!((params.rate(p, 0.1) - expected).abs() < 1e-15);
        assert_eq!(params.rate(0.0, 0.25), 0.25);
    }

    #[test]
    fn rate_derivative_matches_finite_difference() {
        for q in 1..=5 {
            let params = LakeParameters::new(0.5, q).expect("valid parameters");
            for &p in &[0.1, 0.7, 1.3, 2.4] {
                let h = 1e-6;
                let fd = (params.rate(p + h, 0.2) - params.rate(p - h, 0.2)) / (2.0 * h);
                assert!(
                    (params.rate_derivative(p) - fd).abs() < 1e-7,
                    "q={q}, p={p}: {} vs {}",
                    params.rate_derivative(p),
                    fd
                );
            }
        }
    }

    #[test]
    fn stability_follows_eigenvalue_sign() {
        assert_eq!(Stability::from_eigenvalue(-0.3), Stability::Stable);
        assert_eq!(Stability::from_eigenvalue(0.3), Stability::Unstable);
        assert_eq!(Stability::from_eigenvalue(0.0), Stability::Neutral);

        let params = LakeParameters::new(0.65, 4).expect("valid parameters");
        assert_eq!(params.stability(0.0), Stability::Stable);
    }

    #[test]
    fn lake_system_evaluates_rate() {
        let params = LakeParameters::new(0.65, 4).expect("valid parameters");
        let system = LakeSystem::new(params, 0.2);
        let mut out = [0.0];
        system.apply(0.0, &[0.5], &mut out);
        assert_eq!(system.dimension(), 1);
        assert!((out[0] - params.rate(0.5, 0.2)).abs() < 1e-15);
    }
}
