//! Forward-Euler trajectories of the lake under constant or decreasing inputs.

use crate::model::{LakeParameters, LakeSystem};
use crate::solvers::ForwardEuler;
use crate::traits::Steppable;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

const STEP_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub dt: f64,
    /// Final time T.
    pub horizon: f64,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            horizon: 40.0,
        }
    }
}

impl IntegrationSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            bail!("Step size dt must be positive.");
        }
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            bail!("Horizon T must be positive.");
        }
        Ok(())
    }

    /// `ceil(T / dt)`, ignoring rounding noise in the quotient.
    pub fn steps(&self) -> usize {
        (self.horizon / self.dt - STEP_EPS).ceil().max(0.0) as usize
    }
}

/// Input that decreases linearly at `rate` per unit time until it reaches `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampSchedule {
    pub start: f64,
    pub rate: f64,
    pub floor: f64,
}

impl RampSchedule {
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.rate.is_finite() || !self.floor.is_finite() {
            bail!("Ramp schedule values must be finite.");
        }
        if self.rate < 0.0 {
            bail!("Ramp rate dl/dt must be non-negative.");
        }
        if self.floor > self.start {
            bail!(
                "Ramp floor {} lies above the starting input {}.",
                self.floor,
                self.start
            );
        }
        Ok(())
    }

    pub fn next(&self, current: f64, dt: f64) -> f64 {
        self.floor.max(current - self.rate * dt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputSchedule {
    Constant(f64),
    Ramp(RampSchedule),
}

impl InputSchedule {
    fn initial(&self) -> f64 {
        match self {
            InputSchedule::Constant(l) => *l,
            InputSchedule::Ramp(ramp) => ramp.start,
        }
    }

    fn next(&self, current: f64, dt: f64) -> f64 {
        match self {
            InputSchedule::Constant(l) => *l,
            InputSchedule::Ramp(ramp) => ramp.next(current, dt),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            InputSchedule::Constant(l) => {
                if !l.is_finite() {
                    bail!("Input l must be finite.");
                }
                Ok(())
            }
            InputSchedule::Ramp(ramp) => ramp.validate(),
        }
    }
}

/// Samples `0, dt, .., N dt` of the input and of P.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub dt: f64,
    pub inputs: Vec<f64>,
    pub states: Vec<f64>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        (0..self.states.len()).map(|i| i as f64 * self.dt).collect()
    }

    pub fn final_state(&self) -> Option<f64> {
        self.states.last().copied()
    }

    /// True when the last step moved P by less than `tolerance`.
    pub fn has_converged(&self, tolerance: f64) -> bool {
        match self.states.as_slice() {
            [.., prev, last] => (last - prev).abs() < tolerance,
            _ => false,
        }
    }
}

/// Integrates the lake from `p0` under `schedule`.
///
/// Step `i` uses the input recorded at step `i - 1`, so the input update and the
/// state update are both explicit.
pub fn integrate(
    params: &LakeParameters,
    p0: f64,
    schedule: InputSchedule,
    settings: IntegrationSettings,
) -> Result<Trajectory> {
    params.validate()?;
    settings.validate()?;
    schedule.validate()?;
    if !p0.is_finite() {
        bail!("Initial state p0 must be finite.");
    }

    let steps = settings.steps();
    let dt = settings.dt;
    let mut inputs = Vec::with_capacity(steps + 1);
    let mut states = Vec::with_capacity(steps + 1);

    let mut system = LakeSystem::new(*params, schedule.initial());
    let mut stepper: ForwardEuler<f64> = ForwardEuler::new(1);
    let mut t = 0.0;
    let mut state = [p0];
    inputs.push(system.input);
    states.push(p0);

    for _ in 0..steps {
        let next_input = schedule.next(system.input, dt);
        stepper.step(&system, &mut t, &mut state, dt);
        system.input = next_input;
        inputs.push(next_input);
        states.push(state[0]);
    }

    if !state[0].is_finite() {
        tracing::warn!(dt, p0, "trajectory diverged; dt is too large for these parameters");
    }

    Ok(Trajectory { dt, inputs, states })
}

pub fn integrate_fixed_input(
    params: &LakeParameters,
    p0: f64,
    input: f64,
    settings: IntegrationSettings,
) -> Result<Trajectory> {
    integrate(params, p0, InputSchedule::Constant(input), settings)
}

pub fn integrate_ramping_input(
    params: &LakeParameters,
    p0: f64,
    ramp: RampSchedule,
    settings: IntegrationSettings,
) -> Result<Trajectory> {
    integrate(params, p0, InputSchedule::Ramp(ramp), settings)
}

/// Fixed-input trajectories from one initial state across many inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputScan {
    pub initial_state: f64,
    pub inputs: Vec<f64>,
    pub trajectories: Vec<Trajectory>,
}

impl InputScan {
    /// State of every trajectory at sample `index`, clamped to the last sample.
    pub fn states_at(&self, index: usize) -> Vec<f64> {
        self.trajectories
            .iter()
            .map(|traj| {
                let i = index.min(traj.states.len().saturating_sub(1));
                traj.states.get(i).copied().unwrap_or(self.initial_state)
            })
            .collect()
    }

    pub fn steps(&self) -> usize {
        self.trajectories
            .first()
            .map(|traj| traj.len().saturating_sub(1))
            .unwrap_or(0)
    }
}

pub fn input_scan(
    params: &LakeParameters,
    p0: f64,
    inputs: &[f64],
    settings: IntegrationSettings,
) -> Result<InputScan> {
    let run = |&input: &f64| integrate_fixed_input(params, p0, input, settings);

    #[cfg(not(target_arch = "wasm32"))]
    let trajectories: Result<Vec<Trajectory>> = {
        use rayon::prelude::*;
        inputs.par_iter().map(run).collect()
    };
    #[cfg(target_arch = "wasm32")]
    let trajectories: Result<Vec<Trajectory>> = inputs.iter().map(run).collect();

    Ok(InputScan {
        initial_state: p0,
        inputs: inputs.to_vec(),
        trajectories: trajectories?,
    })
}
