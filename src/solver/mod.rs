//! DC node-voltage solver.
//!
//! The board goes through a fixed pipeline:
//!
//! ```text
//! spots + components
//!   -> electrical nodes   (spots joined by wires)
//!   -> abstract nodes     (typed, polarized connections between nodes)
//!   -> reduced nodes      (parallel resistors merged, parallel sources rejected)
//!   -> supernodes         (nodes tied together by voltage sources)
//!   -> linear system      (one row per node, solved by LU)
//!   -> node voltages      (shifted so the lowest sits at 0 V)
//! ```
//!
//! and finally every component's voltage drop and current is derived from
//! the node voltages.
//!
//! Node 0 is ground. Disconnected islands are each grounded at their
//! lowest-id node.

mod calculator;
pub mod nodes;
pub mod reduce;
pub mod supernode;
pub mod system;

pub use calculator::{CalculationStatus, Calculator, CalculatorConfig};

use crate::circuit::{Components, Spot};
use crate::error::Result;

/// Default limit on voltage sources chained from a supernode's root.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 10;

/// Conductance (S) between two nodes at or below which the resistance is
/// effectively infinite and the pair is left open.
pub const MIN_CONDUCTANCE: f64 = 1e-12;

/// Relative pivot tolerance for the LU factorization.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Calculate the board with the default configuration.
///
/// Returns `Ok(true)` when results were written, `Ok(false)` when the board is
/// empty or has dangling ends.
pub fn calculate(spots: &[Spot], components: &mut Components) -> Result<bool> {
    Calculator::new().calculate(spots, components)
}
