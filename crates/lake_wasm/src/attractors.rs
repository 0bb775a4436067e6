//! Equilibrium sweep bindings and the batched sweep runner.

use crate::payload::AttractorPayload;
use crate::WasmLake;
use js_sys::Float64Array;
use lake_core::sweep::{equilibria_at, lake_attractors, AttractorSweep, SweepSettings};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
impl WasmLake {
    /// Full sweep over `0 <= l < l_max` at spacing `step`.
    pub fn attractors(&self, l_max: f64, step: f64) -> Result<JsValue, JsValue> {
        let settings = SweepSettings { l_max, step };
        let set = lake_attractors(&self.params, settings)
            .map_err(|e| JsValue::from_str(&format!("Attractor sweep failed: {:#}", e)))?;

        to_value(&AttractorPayload::from(&set))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Like [`WasmLake::attractors`], taking a `{ l_max, step }` settings object.
    pub fn attractors_with_settings(&self, settings_val: JsValue) -> Result<JsValue, JsValue> {
        let settings: SweepSettings = from_value(settings_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid sweep settings: {}", e)))?;
        self.attractors(settings.l_max, settings.step)
    }

    /// Sorted equilibria at a single input value.
    pub fn equilibria(&self, input: f64) -> Result<Float64Array, JsValue> {
        let equilibria = equilibria_at(&self.params, input)
            .map_err(|e| JsValue::from_str(&format!("Equilibrium search failed: {:#}", e)))?;
        Ok(Float64Array::from(equilibria.as_slice()))
    }
}

/// Sweep runner that lets the UI stay responsive on fine grids.
#[wasm_bindgen]
pub struct WasmSweepRunner {
    sweep: Option<AttractorSweep>,
}

#[wasm_bindgen]
impl WasmSweepRunner {
    #[wasm_bindgen(constructor)]
    pub fn new(
        recycling: f64,
        exponent: u32,
        l_max: f64,
        step: f64,
    ) -> Result<WasmSweepRunner, JsValue> {
        console_error_panic_hook::set_once();

        let lake = WasmLake::new(recycling, exponent)?;
        let sweep = AttractorSweep::new(&lake.params, SweepSettings { l_max, step })
            .map_err(|e| JsValue::from_str(&format!("Invalid sweep: {}", e)))?;
        Ok(WasmSweepRunner { sweep: Some(sweep) })
    }

    pub fn is_done(&self) -> bool {
        self.sweep.as_ref().map_or(true, |sweep| sweep.is_done())
    }

    pub fn run_steps(&mut self, batch_size: u32) -> Result<JsValue, JsValue> {
        let sweep = self
            .sweep
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        let progress = sweep
            .run_steps(batch_size as usize)
            .map_err(|e| JsValue::from_str(&format!("Attractor sweep failed: {:#}", e)))?;

        to_value(&progress).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn get_progress(&self) -> Result<JsValue, JsValue> {
        let sweep = self
            .sweep
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        to_value(&sweep.progress())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Consumes the runner, finishing any remaining grid points.
    pub fn get_result(&mut self) -> Result<JsValue, JsValue> {
        let sweep = self
            .sweep
            .take()
            .ok_or_else(|| JsValue::from_str("Runner not initialized"))?;

        let set = sweep
            .finish()
            .map_err(|e| JsValue::from_str(&format!("Attractor sweep failed: {:#}", e)))?;

        to_value(&AttractorPayload::from(&set))
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}
