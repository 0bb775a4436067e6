use lake_core::model::LakeParameters;
use wasm_bindgen::prelude::*;

mod attractors;
mod payload;
mod trajectory;

pub use attractors::WasmSweepRunner;

/// A lake with fixed recycling rate and exponent, shared by the sweep and the integrators.
#[wasm_bindgen]
pub struct WasmLake {
    pub(crate) params: LakeParameters,
}

#[wasm_bindgen]
impl WasmLake {
    #[wasm_bindgen(constructor)]
    pub fn new(recycling: f64, exponent: u32) -> Result<WasmLake, JsValue> {
        console_error_panic_hook::set_once();

        let params = LakeParameters::new(recycling, exponent)
            .map_err(|e| JsValue::from_str(&format!("Invalid lake parameters: {}", e)))?;
        Ok(WasmLake { params })
    }

    pub fn recycling(&self) -> f64 {
        self.params.recycling
    }

    pub fn exponent(&self) -> u32 {
        self.params.exponent
    }

    /// dP/dt at the given state and input.
    pub fn rate(&self, p: f64, input: f64) -> f64 {
        self.params.rate(p, input)
    }
}
