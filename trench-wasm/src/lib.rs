//! WASM bindings for the tapered trench generator.
//!
//! Exposes a stateful `Trench` class: configure it with the setters, call
//! `generate()`, then `save()` (or `toVtk()` where there is no filesystem).

use log::{info, error};
use trench_core::{SceneConfig, Trench, TrenchError, DEFAULT_OUTPUT};
use wasm_bindgen::prelude::*;
use wasm_bindgen_console_logger::DEFAULT_LOGGER;

/// Initializes the logging system for WASM.
///
/// Sets up console logging and panic hooks for better error reporting in the browser.
/// Should be called once at application startup.
#[wasm_bindgen]
pub fn init_logs() {
    match log::set_logger(&DEFAULT_LOGGER) {
        Ok(_) => info!("Initialized console.logger"),
        Err(e) => error!("failed to set console.logger: {}", e),
    };
    console_error_panic_hook::set_once();
}

/// Updates the log level filter.
///
/// # Arguments
/// * `level` - Log level string: "error", "warn", "info", "debug", or "trace".
///   Defaults to "info" if empty or missing.
#[wasm_bindgen]
pub fn update_log_level(level: Option<String>) -> Result<(), JsValue> {
    let level = trench_core::parse_log_level(level.as_deref()).map_err(to_js)?;
    log::set_max_level(level);
    Ok(())
}

fn to_js(e: TrenchError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Substrate with a tapered trench carved out of it.
#[wasm_bindgen(js_name = Trench)]
pub struct TrenchJs {
    inner: Trench,
}

impl Default for TrenchJs {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = Trench)]
impl TrenchJs {
    /// New generator with the default scene: grid delta 1, extent 20, a 20 wide,
    /// 50 deep trench with vertical walls centered at the origin.
    #[wasm_bindgen(constructor)]
    pub fn new() -> TrenchJs {
        TrenchJs { inner: Trench::new() }
    }

    #[wasm_bindgen(js_name = setGridDelta)]
    pub fn set_grid_delta(&mut self, delta: f64) {
        self.inner.set_grid_delta(delta);
    }

    #[wasm_bindgen(js_name = setExtent)]
    pub fn set_extent(&mut self, extent: f64) {
        self.inner.set_extent(extent);
    }

    /// Trench width at the top.
    #[wasm_bindgen(js_name = setDiameter)]
    pub fn set_diameter(&mut self, diameter: f64) {
        self.inner.set_diameter(diameter);
    }

    #[wasm_bindgen(js_name = setDepth)]
    pub fn set_depth(&mut self, depth: f64) {
        self.inner.set_depth(depth);
    }

    #[wasm_bindgen(js_name = setCenter)]
    pub fn set_center(&mut self, x: f64, y: f64) {
        self.inner.set_center(x, y);
    }

    /// Sidewall direction; `(1, 0)` gives vertical walls.
    #[wasm_bindgen(js_name = setTaperAngle)]
    pub fn set_taper_angle(&mut self, dx: f64, dy: f64) {
        self.inner.set_taper_angle(dx, dy);
    }

    /// Current scene configuration as a plain object.
    pub fn config(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.config())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize config: {}", e)))
    }

    /// Replace the whole scene configuration; missing fields take their defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: SceneConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
        self.inner.set_config(config);
        Ok(())
    }

    /// Build the geometry. Throws on an invalid profile or configuration.
    pub fn generate(&mut self) -> Result<(), JsValue> {
        self.inner.generate().map(|_| ()).map_err(to_js)
    }

    /// Area of the generated substrate.
    pub fn area(&self) -> Result<f64, JsValue> {
        self.inner.area().map_err(to_js)
    }

    /// Write the generated surface as a legacy VTK file (default "trench.vtk").
    pub fn save(&self, path: Option<String>) -> Result<(), JsValue> {
        let path = path.unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
        self.inner.save(path).map_err(to_js)
    }

    /// Generated surface as legacy VTK text.
    #[wasm_bindgen(js_name = toVtk)]
    pub fn to_vtk(&self) -> Result<String, JsValue> {
        let mesh = self.inner.surface_mesh().map_err(to_js)?;
        Ok(mesh.to_vtk("trench surface"))
    }
}
