//! # Ohmgrid Core
//!
//! DC solver for breadboard-style circuits built from wires, resistors and
//! ideal voltage sources.
//!
//! This library provides:
//! - A board model: a set of spots plus two-terminal components placed
//!   between them
//! - A small text format for describing boards
//! - A node-voltage solver that fills in every component's voltage drop and
//!   current
//!
//! ## Architecture
//!
//! - [`circuit`] - Spots, handles and board editing
//! - [`components`] - Component kinds, values and solved outputs
//! - [`dsl`] - Parser for the board text format
//! - [`solver`] - Node building, reduction, supernodes and the linear solve
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ohmgrid divider.board
//! ```
//!
//! ### Library
//!
//! ```
//! use ohmgrid_core::{dsl, Circuit};
//!
//! let ast = dsl::parse("V1 top gnd 9\nR1 top mid 1k\nR2 mid gnd 2k").unwrap();
//! let mut board = Circuit::from_ast(ast).unwrap();
//! assert!(board.recalculate().is_solved());
//!
//! let r2 = board.components.iter().find(|c| c.name == "R2").unwrap();
//! assert!((r2.voltage_drop - 6.0).abs() < 1e-9);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmBoard } from 'ohmgrid_core';
//!
//! const board = WasmBoard.from_text("V1 a b 9\nR1 a b 1k");
//! board.recalculate();
//! ```

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{OhmgridError, Result};
pub use solver::{CalculationStatus, Calculator, CalculatorConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmBoard;
