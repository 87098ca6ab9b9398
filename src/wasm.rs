//! WASM bindings for Ohmgrid Core.
//!
//! This module exposes a board editor model to JavaScript. Every edit is
//! expected to be followed by `recalculate()`, after which the per-component
//! results can be read back.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmBoard } from 'ohmgrid_core';
//!
//! await init();
//!
//! const board = new WasmBoard();
//! const v = board.add_voltage_source("a", "b");
//! const r = board.add_resistor("a", "b");
//! board.set_value(r, "2.2k");
//!
//! if (board.recalculate() === "solved") {
//!   console.log(board.current_through(r));
//! } else {
//!   console.log(board.error_message());
//! }
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{Circuit, ComponentId, SpotId};
use crate::components::ComponentKind;
use crate::dsl;
use crate::error::OhmgridError;
use crate::solver::CalculationStatus;

fn to_js(e: OhmgridError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// WASM-compatible board wrapper.
///
/// Spots are addressed by label and created on first use. Components are
/// addressed by the numeric id returned when they are added.
#[wasm_bindgen]
pub struct WasmBoard {
    circuit: Circuit,
    status: CalculationStatus,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create an empty board.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmBoard {
        Self {
            circuit: Circuit::new(),
            status: CalculationStatus::Incomplete,
        }
    }

    /// Create a board from its text description.
    #[wasm_bindgen]
    pub fn from_text(text: &str) -> Result<WasmBoard, JsValue> {
        let ast = dsl::parse(text).map_err(to_js)?;
        let circuit = Circuit::from_ast(ast).map_err(to_js)?;
        Ok(Self {
            circuit,
            status: CalculationStatus::Incomplete,
        })
    }

    #[wasm_bindgen]
    pub fn add_wire(&mut self, a: &str, b: &str) -> Result<usize, JsValue> {
        self.place(ComponentKind::Wire, a, b)
    }

    #[wasm_bindgen]
    pub fn add_resistor(&mut self, a: &str, b: &str) -> Result<usize, JsValue> {
        self.place(ComponentKind::Resistor, a, b)
    }

    /// Add a source with its positive terminal on `positive`.
    #[wasm_bindgen]
    pub fn add_voltage_source(&mut self, positive: &str, negative: &str) -> Result<usize, JsValue> {
        self.place(ComponentKind::VoltageSource, positive, negative)
    }

    /// Remove a component.
    #[wasm_bindgen]
    pub fn remove(&mut self, id: usize) -> Result<(), JsValue> {
        self.circuit
            .remove_component(ComponentId(id))
            .map(|_| ())
            .map_err(to_js)
    }

    /// Remove every component.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.circuit.clear_components();
    }

    /// Set a value from user text such as `4.7k`.
    #[wasm_bindgen]
    pub fn set_value(&mut self, id: usize, text: &str) -> Result<(), JsValue> {
        self.circuit
            .set_value_str(ComponentId(id), text)
            .map_err(to_js)
    }

    /// Solve the board. Returns `"solved"`, `"incomplete"` or `"error"`.
    #[wasm_bindgen]
    pub fn recalculate(&mut self) -> String {
        self.status = self.circuit.recalculate();
        match self.status {
            CalculationStatus::Solved => "solved",
            CalculationStatus::Incomplete => "incomplete",
            CalculationStatus::Failed(_) => "error",
        }
        .to_string()
    }

    /// Message of the last failed calculation, if any.
    #[wasm_bindgen]
    pub fn error_message(&self) -> Option<String> {
        self.status.is_failed().then(|| self.status.to_string())
    }

    /// Solved voltage drop, or `undefined` for an unknown id.
    #[wasm_bindgen]
    pub fn voltage_drop(&self, id: usize) -> Option<f64> {
        self.circuit.component(ComponentId(id)).map(|c| c.voltage_drop)
    }

    /// Solved current, or `undefined` for an unknown id.
    #[wasm_bindgen]
    pub fn current_through(&self, id: usize) -> Option<f64> {
        self.circuit
            .component(ComponentId(id))
            .map(|c| c.current_through)
    }

    /// Number of live components.
    #[wasm_bindgen(getter)]
    pub fn component_count(&self) -> usize {
        self.circuit.components.len()
    }
}

impl WasmBoard {
    fn spot(&mut self, label: &str) -> SpotId {
        match self.circuit.find_spot(label) {
            Some(id) => id,
            None => self.circuit.add_spot(label),
        }
    }

    fn place(&mut self, kind: ComponentKind, a: &str, b: &str) -> Result<usize, JsValue> {
        let positive = self.spot(a);
        let negative = self.spot(b);
        self.circuit
            .add_component(kind, positive, negative)
            .map(|id| id.0)
            .map_err(to_js)
    }
}

impl Default for WasmBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
