//! Assignment of equilibria to the oligotrophic, unstable and eutrophic branches.
//!
//! The lake has one or three equilibria almost everywhere, switching through a
//! pair of fold bifurcations. A lone equilibrium is oligotrophic before the
//! first fold has been crossed and eutrophic after it, so the classifier keeps a
//! small amount of state across sweep steps instead of deriving stability at
//! every point.

use crate::error::ClassificationError;
use crate::polynomial::{is_real, roots};
use crate::sweep::AttractorSet;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Physical branch an equilibrium belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Low-phosphorus stable state.
    Oligotrophic,
    /// Saddle between the two stable states.
    Unstable,
    /// High-phosphorus stable state.
    Eutrophic,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Oligotrophic, Regime::Unstable, Regime::Eutrophic];

    /// Slot in the `first_occurrence` triple.
    pub fn index(self) -> usize {
        match self {
            Regime::Oligotrophic => 0,
            Regime::Unstable => 1,
            Regime::Eutrophic => 2,
        }
    }
}

/// How one sweep step was split across the branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepClass {
    /// Three equilibria: one per branch.
    Bistable,
    /// A single equilibrium on the given branch.
    Single(Regime),
    /// Two equilibria at a tangency; the unstable branch is skipped.
    Boundary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierState {
    pub unstable_seen: bool,
    pub eutrophic_seen: bool,
}

/// Keeps the real roots with non-negative real part, sorted ascending.
pub fn real_nonnegative_roots(found: &[Complex<f64>]) -> Vec<f64> {
    let mut kept: Vec<f64> = found
        .iter()
        .filter(|r| is_real(r))
        .map(|r| r.re)
        .filter(|re| *re >= 0.0)
        .collect();
    kept.sort_by(|a, b| a.total_cmp(b));
    kept
}

/// Real non-negative roots of `coeffs`, sorted ascending.
pub fn retained_roots(coeffs: &[f64]) -> Result<Vec<f64>, ClassificationError> {
    Ok(real_nonnegative_roots(&roots(coeffs)?))
}

/// Appends the sorted equilibria found at grid index `step_index` to `set`.
pub fn classify_step(
    set: &mut AttractorSet,
    state: &mut ClassifierState,
    step_index: usize,
    input: f64,
    equilibria: &[f64],
) -> Result<StepClass, ClassificationError> {
    match *equilibria {
        [low, middle, high] => {
            if !state.unstable_seen {
                state.unstable_seen = true;
                set.unstable.mark_onset(step_index);
                tracing::debug!(input, "unstable branch appears");
            }
            mark_eutrophic(set, state, step_index, input);
            set.oligotrophic.values.push(low);
            set.unstable.values.push(middle);
            set.eutrophic.values.push(high);
            Ok(StepClass::Bistable)
        }
        [only] => {
            if state.unstable_seen {
                set.eutrophic.values.push(only);
                Ok(StepClass::Single(Regime::Eutrophic))
            } else {
                set.oligotrophic.values.push(only);
                Ok(StepClass::Single(Regime::Oligotrophic))
            }
        }
        [low, high] => {
            mark_eutrophic(set, state, step_index, input);
            set.oligotrophic.values.push(low);
            set.eutrophic.values.push(high);
            Ok(StepClass::Boundary)
        }
        _ => {
            tracing::error!(
                input,
                count = equilibria.len(),
                "equilibrium count outside 1..=3"
            );
            Err(ClassificationError::UnexpectedRootCount {
                input,
                count: equilibria.len(),
            })
        }
    }
}

fn mark_eutrophic(
    set: &mut AttractorSet,
    state: &mut ClassifierState,
    step_index: usize,
    input: f64,
) {
    if !state.eutrophic_seen {
        state.eutrophic_seen = true;
        set.eutrophic.mark_onset(step_index);
        tracing::debug!(input, "eutrophic branch appears");
    }
}
