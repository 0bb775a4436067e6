//! Plain data shapes handed to the plotting front end.

use lake_core::classifier::Regime;
use lake_core::model::Stability;
use lake_core::sweep::AttractorSet;
use lake_core::trajectory::{InputScan, Trajectory};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BranchPayload {
    pub onset: Option<f64>,
    pub inputs: Vec<f64>,
    pub values: Vec<f64>,
    /// Per-point stability, so the renderer can choose solid or dashed strokes.
    pub stable: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AttractorPayload {
    pub recycling: f64,
    pub exponent: u32,
    pub step: f64,
    pub first_occurrence: [f64; 3],
    pub oligotrophic: BranchPayload,
    pub unstable: BranchPayload,
    pub eutrophic: BranchPayload,
}

impl From<&AttractorSet> for AttractorPayload {
    fn from(set: &AttractorSet) -> Self {
        let branch = |regime: Regime| {
            let points = set.points(regime);
            BranchPayload {
                onset: set.branch(regime).onset(set.settings.step),
                inputs: points.iter().map(|p| p.input).collect(),
                values: points.iter().map(|p| p.state).collect(),
                stable: points
                    .iter()
                    .map(|p| p.stability == Stability::Stable)
                    .collect(),
            }
        };
        Self {
            recycling: set.parameters.recycling,
            exponent: set.parameters.exponent,
            step: set.settings.step,
            first_occurrence: set.first_occurrence(),
            oligotrophic: branch(Regime::Oligotrophic),
            unstable: branch(Regime::Unstable),
            eutrophic: branch(Regime::Eutrophic),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TrajectoryPayload {
    pub times: Vec<f64>,
    pub inputs: Vec<f64>,
    pub states: Vec<f64>,
}

impl From<&Trajectory> for TrajectoryPayload {
    fn from(traj: &Trajectory) -> Self {
        Self {
            times: traj.times(),
            inputs: traj.inputs.clone(),
            states: traj.states.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ScanPayload {
    pub inputs: Vec<f64>,
    pub times: Vec<f64>,
    /// `states[k]` is the trajectory for `inputs[k]`.
    pub states: Vec<Vec<f64>>,
}

impl From<&InputScan> for ScanPayload {
    fn from(scan: &InputScan) -> Self {
        Self {
            inputs: scan.inputs.clone(),
            times: scan
                .trajectories
                .first()
                .map(|traj| traj.times())
                .unwrap_or_default(),
            states: scan
                .trajectories
                .iter()
                .map(|traj| traj.states.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lake_core::model::LakeParameters;
    use lake_core::sweep::{lake_attractors, SweepSettings};
    use lake_core::trajectory::{input_scan, integrate_ramping_input, IntegrationSettings, RampSchedule};

    fn lake() -> LakeParameters {
        LakeParameters::new(0.65, 4).expect("valid parameters")
    }

    #[test]
    fn attractor_payload_mirrors_branches() {
        let set = lake_attractors(&lake(), SweepSettings::default()).expect("sweep");
        let payload = AttractorPayload::from(&set);

        assert_eq!(payload.step, 0.001);
        assert_eq!(payload.first_occurrence, set.first_occurrence());
        assert_eq!(payload.oligotrophic.values, set.oligotrophic.values);
        assert_eq!(payload.unstable.values, set.unstable.values);
        assert_eq!(payload.eutrophic.inputs.len(), set.eutrophic.len());
        assert_eq!(payload.oligotrophic.onset, Some(0.0));
        assert!(payload.unstable.stable.iter().all(|s| !s));
        assert!(payload.eutrophic.stable.iter().all(|s| *s));
    }

    #[test]
    fn trajectory_payload_carries_time_axis() {
        let ramp = RampSchedule {
            start: 0.4,
            rate: 0.01,
            floor: 0.08,
        };
        let settings = IntegrationSettings {
            dt: 0.01,
            horizon: 1.0,
        };
        let traj = integrate_ramping_input(&lake(), 0.0, ramp, settings).expect("trajectory");
        let payload = TrajectoryPayload::from(&traj);
        assert_eq!(payload.times.len(), payload.states.len());
        assert_eq!(payload.inputs.len(), payload.states.len());
        assert_eq!(payload.times[0], 0.0);
    }

    #[test]
    fn scan_payload_groups_states_by_input() {
        let settings = IntegrationSettings {
            dt: 0.01,
            horizon: 0.5,
        };
        let scan = input_scan(&lake(), 1.0, &[0.05, 0.2, 0.35], settings).expect("scan");
        let payload = ScanPayload::from(&scan);
        assert_eq!(payload.states.len(), 3);
        assert!(payload.states.iter().all(|s| s.len() == payload.times.len()));
    }
}
