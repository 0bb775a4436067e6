//! Sweeps of the phosphorus input and the resulting equilibrium branches.

use crate::classifier::{classify_step, retained_roots, ClassifierState, Regime};
use crate::model::{LakeParameters, Stability};
use crate::polynomial::equilibrium_polynomial;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Guard against `l_max / step` landing a hair above an integer.
const GRID_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Exclusive upper bound of the input grid.
    pub l_max: f64,
    /// Grid spacing. Branch input axes are rebuilt from this same value.
    pub step: f64,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            l_max: 0.4,
            step: 1e-3,
        }
    }
}

impl SweepSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            bail!("Sweep step must be positive.");
        }
        if !self.l_max.is_finite() || self.l_max <= 0.0 {
            bail!("l_max must be positive.");
        }
        Ok(())
    }

    /// Number of grid points `0, step, 2 step, ...` strictly below `l_max`.
    pub fn grid_len(&self) -> usize {
        (self.l_max / self.step - GRID_EPS).ceil().max(0.0) as usize
    }

    pub fn input_at(&self, index: usize) -> f64 {
        index as f64 * self.step
    }
}

/// One equilibrium branch, in order of increasing input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub regime: Regime,
    /// Grid index of the first value, `None` while the branch is empty.
    pub onset_index: Option<usize>,
    pub values: Vec<f64>,
}

impl Branch {
    pub fn new(regime: Regime) -> Self {
        Self {
            regime,
            onset_index: None,
            values: Vec::new(),
        }
    }

    pub(crate) fn mark_onset(&mut self, index: usize) {
        if self.onset_index.is_none() {
            self.onset_index = Some(index);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Input value at which the branch starts.
    pub fn onset(&self, step: f64) -> Option<f64> {
        self.onset_index.map(|i| i as f64 * step)
    }

    /// Input value for each entry of `values`.
    ///
    /// Entries are contiguous on the grid from the onset: a branch that stops
    /// (the oligotrophic one past the upper fold) never restarts.
    pub fn inputs(&self, step: f64) -> Vec<f64> {
        let start = self.onset_index.unwrap_or(0);
        (0..self.values.len())
            .map(|i| (start + i) as f64 * step)
            .collect()
    }
}

/// An equilibrium with its linear stability, ready for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumPoint {
    pub input: f64,
    pub state: f64,
    /// f'(P): the single eigenvalue of the linearisation.
    pub eigenvalue: f64,
    pub stability: Stability,
}

/// All equilibria found by one sweep for fixed `(b, q)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorSet {
    pub parameters: LakeParameters,
    pub settings: SweepSettings,
    pub oligotrophic: Branch,
    pub unstable: Branch,
    pub eutrophic: Branch,
}

impl AttractorSet {
    pub fn new(parameters: LakeParameters, settings: SweepSettings) -> Self {
        let mut oligotrophic = Branch::new(Regime::Oligotrophic);
        // Present from the very first input: the oligotrophic onset is always 0.
        oligotrophic.onset_index = Some(0);
        Self {
            parameters,
            settings,
            oligotrophic,
            unstable: Branch::new(Regime::Unstable),
            eutrophic: Branch::new(Regime::Eutrophic),
        }
    }

    pub fn branch(&self, regime: Regime) -> &Branch {
        match regime {
            Regime::Oligotrophic => &self.oligotrophic,
            Regime::Unstable => &self.unstable,
            Regime::Eutrophic => &self.eutrophic,
        }
    }

    /// Onsets indexed by [`Regime::index`]. Branches that never appeared report 0,
    /// as does the oligotrophic branch, which exists for every input.
    pub fn first_occurrence(&self) -> [f64; 3] {
        let step = self.settings.step;
        Regime::ALL.map(|regime| self.branch(regime).onset(step).unwrap_or(0.0))
    }

    pub fn inputs(&self, regime: Regime) -> Vec<f64> {
        self.branch(regime).inputs(self.settings.step)
    }

    pub fn points(&self, regime: Regime) -> Vec<EquilibriumPoint> {
        let branch = self.branch(regime);
        branch
            .inputs(self.settings.step)
            .into_iter()
            .zip(branch.values.iter().copied())
            .map(|(input, state)| {
                let eigenvalue = self.parameters.rate_derivative(state);
                EquilibriumPoint {
                    input,
                    state,
                    eigenvalue,
                    stability: Stability::from_eigenvalue(eigenvalue),
                }
            })
            .collect()
    }

    /// Whether the input range contains a bistable window.
    pub fn is_bistable(&self) -> bool {
        !self.unstable.is_empty()
    }
}

/// Sorted real non-negative equilibria for a single input value.
pub fn equilibria_at(params: &LakeParameters, input: f64) -> Result<Vec<f64>> {
    params.validate()?;
    if !input.is_finite() || input < 0.0 {
        bail!("Input l must be non-negative (got {}).", input);
    }
    let coeffs = equilibrium_polynomial(params, input);
    Ok(retained_roots(&coeffs)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepProgress {
    pub done: bool,
    pub completed: usize,
    pub total: usize,
    pub input: f64,
}

/// An input sweep that can be advanced in batches.
#[derive(Debug, Clone)]
pub struct AttractorSweep {
    set: AttractorSet,
    state: ClassifierState,
    next_index: usize,
    total: usize,
}

impl AttractorSweep {
    pub fn new(params: &LakeParameters, settings: SweepSettings) -> Result<Self> {
        params.validate()?;
        settings.validate()?;
        Ok(Self {
            set: AttractorSet::new(*params, settings),
            state: ClassifierState::default(),
            next_index: 0,
            total: settings.grid_len(),
        })
    }

    pub fn is_done(&self) -> bool {
        self.next_index >= self.total
    }

    pub fn progress(&self) -> SweepProgress {
        SweepProgress {
            done: self.is_done(),
            completed: self.next_index,
            total: self.total,
            input: self.set.settings.input_at(self.next_index),
        }
    }

    pub fn classifier_state(&self) -> ClassifierState {
        self.state
    }

    /// Classifies up to `batch` more grid points.
    pub fn run_steps(&mut self, batch: usize) -> Result<SweepProgress> {
        let params = self.set.parameters;
        let settings = self.set.settings;
        let start = self.next_index;
        let end = (start + batch).min(self.total);

        for index in start..end {
            let input = settings.input_at(index);
            let coeffs = equilibrium_polynomial(&params, input);
            let equilibria = retained_roots(&coeffs)
                .with_context(|| format!("Root finding failed at l = {}.", input))?;
            classify_step(&mut self.set, &mut self.state, index, input, &equilibria)
                .with_context(|| {
                    format!(
                        "Sweep aborted for b = {}, q = {}.",
                        params.recycling, params.exponent
                    )
                })?;
            self.next_index = index + 1;
        }

        if start < end && self.is_done() {
            tracing::debug!(
                oligotrophic = self.set.oligotrophic.len(),
                unstable = self.set.unstable.len(),
                eutrophic = self.set.eutrophic.len(),
                "sweep complete"
            );
        }
        Ok(self.progress())
    }

    /// Runs the remaining grid points and hands over the finished set.
    pub fn finish(mut self) -> Result<AttractorSet> {
        let remaining = self.total - self.next_index;
        self.run_steps(remaining)?;
        Ok(self.set)
    }

    /// The branches accumulated so far.
    pub fn partial(&self) -> &AttractorSet {
        &self.set
    }
}

/// Sweeps `l` over `0, step, ..` below `l_max`, classifying the equilibria at each input.
pub fn lake_attractors(params: &LakeParameters, settings: SweepSettings) -> Result<AttractorSet> {
    let span = tracing::trace_span!(
        "lake_attractors",
        b = params.recycling,
        q = params.exponent,
        l_max = settings.l_max
    );
    let _guard = span.enter();

    AttractorSweep::new(params, settings)?.finish()
}

/// Independent sweeps for several parameter pairs, returned in input order.
pub fn sweep_parameter_grid(
    params: &[LakeParameters],
    settings: SweepSettings,
) -> Result<Vec<AttractorSet>> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        use rayon::prelude::*;
        params
            .par_iter()
            .map(|p| lake_attractors(p, settings))
            .collect()
    }
    #[cfg(target_arch = "wasm32")]
    {
        params.iter().map(|p| lake_attractors(p, settings)).collect()
    }
}
