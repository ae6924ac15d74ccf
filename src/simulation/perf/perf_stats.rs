use wasm_bindgen::prelude::*;

/// Timings of the last `fixed_step` call. All zeros while metrics are off.
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) solver_ms: f64,
    pub(super) interpolate_ms: f64,
    pub(super) steps: u32,
    pub(super) entities: u32,
    pub(super) contacts: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn solver_ms(&self) -> f64 { self.solver_ms }
    #[wasm_bindgen(getter)]
    pub fn interpolate_ms(&self) -> f64 { self.interpolate_ms }
    #[wasm_bindgen(getter)]
    pub fn steps(&self) -> u32 { self.steps }
    #[wasm_bindgen(getter)]
    pub fn entities(&self) -> u32 { self.entities }
    #[wasm_bindgen(getter)]
    pub fn contacts(&self) -> u32 { self.contacts }
}
