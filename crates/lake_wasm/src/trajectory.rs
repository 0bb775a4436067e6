//! Trajectory bindings.

use crate::payload::{ScanPayload, TrajectoryPayload};
use crate::WasmLake;
use js_sys::Float64Array;
use lake_core::trajectory::{
    input_scan, integrate_fixed_input, integrate_ramping_input, IntegrationSettings, RampSchedule,
};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl WasmLake {
    /// P over time for a constant input.
    pub fn trajectory(
        &self,
        p0: f64,
        input: f64,
        dt: f64,
        horizon: f64,
    ) -> Result<Float64Array, JsValue> {
        let traj = integrate_fixed_input(&self.params, p0, input, IntegrationSettings { dt, horizon })
            .map_err(|e| JsValue::from_str(&format!("Trajectory failed: {}", e)))?;
        Ok(Float64Array::from(traj.states.as_slice()))
    }

    /// Like [`WasmLake::trajectory`], taking a `{ dt, horizon }` settings object.
    pub fn trajectory_with_settings(
        &self,
        p0: f64,
        input: f64,
        settings_val: JsValue,
    ) -> Result<Float64Array, JsValue> {
        let settings: IntegrationSettings = from_value(settings_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid integration settings: {}", e)))?;
        self.trajectory(p0, input, settings.dt, settings.horizon)
    }

    /// Input and P over time while the input decreases at `dldt` down to `lmin`.
    pub fn ramp_trajectory(
        &self,
        p0: f64,
        l0: f64,
        dldt: f64,
        lmin: f64,
        dt: f64,
        horizon: f64,
    ) -> Result<JsValue, JsValue> {
        let ramp = RampSchedule {
            start: l0,
            rate: dldt,
            floor: lmin,
        };
        let traj = integrate_ramping_input(&self.params, p0, ramp, IntegrationSettings { dt, horizon })
            .map_err(|e| JsValue::from_str(&format!("Trajectory failed: {}", e)))?;

        to_value(&TrajectoryPayload::from(&traj))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// One constant-input trajectory from `p0` per entry of `inputs`.
    pub fn input_scan(
        &self,
        p0: f64,
        inputs: Vec<f64>,
        dt: f64,
        horizon: f64,
    ) -> Result<JsValue, JsValue> {
        let scan = input_scan(&self.params, p0, &inputs, IntegrationSettings { dt, horizon })
            .map_err(|e| JsValue::from_str(&format!("Input scan failed: {}", e)))?;

        to_value(&ScanPayload::from(&scan))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::WasmLake;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn trajectory_returns_every_sample() {
        let lake = WasmLake::new(0.65, 4).expect("valid lake");
        let states = lake.trajectory(0.0, 0.2, 0.01, 1.0).expect("trajectory");
        assert_eq!(states.length(), 101);
        assert_eq!(states.get_index(0), 0.0);
    }

    #[wasm_bindgen_test]
    fn invalid_lake_is_rejected() {
        assert!(WasmLake::new(-1.0, 4).is_err());
        assert!(WasmLake::new(0.65, 0).is_err());
    }

    #[wasm_bindgen_test]
    fn equilibria_at_zero_input() {
        let lake = WasmLake::new(0.65, 4).expect("valid lake");
        let roots = lake.equilibria(0.0).expect("equilibria");
        assert_eq!(roots.to_vec(), vec![0.0]);
    }
}
