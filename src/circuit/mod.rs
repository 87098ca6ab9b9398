//! Board graph representation and validation.
//!
//! This module holds the raw graph substrate the solver works on: spots
//! (terminals) and the components placed between them. The [`Circuit`]
//! struct owns both arenas; the solver only borrows them.

mod graph;
mod types;
mod validate;

pub use graph::{Circuit, Components, Spot};
pub use types::*;
pub use validate::{check_completeness, Completeness};
