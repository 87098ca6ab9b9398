//! Component model for the board.
//!
//! A board holds three kinds of two-terminal components:
//! - Wire: joins two spots into the same electrical node
//! - Resistor: linear resistance in ohms
//! - Voltage Source: ideal DC source in volts
//!
//! Components reference their spots by handle. The solver writes the
//! computed voltage drop and current back into each component.

mod kind;

pub use kind::{ComponentKind, DEFAULT_RESISTANCE, DEFAULT_SOURCE_VOLTAGE};

use crate::circuit::{ComponentId, SpotId};

/// A component placed on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    /// Spot on the positive terminal
    pub positive: SpotId,
    /// Spot on the negative terminal
    pub negative: SpotId,
    /// Resistance (ohms) or source voltage (volts); unused for wires
    pub value: f64,
    /// Solved voltage across the component, positive minus negative
    pub voltage_drop: f64,
    /// Solved current. For resistors it flows positive to negative through
    /// the body; for sources it is delivered out of the positive terminal.
    pub current_through: f64,
}

impl Component {
    /// Create a new component with unsolved (zero) outputs.
    pub fn new(
        id: ComponentId,
        name: String,
        kind: ComponentKind,
        positive: SpotId,
        negative: SpotId,
        value: f64,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            positive,
            negative,
            value,
            voltage_drop: 0.0,
            current_through: 0.0,
        }
    }

    /// The spot at the other end of this component, if `spot` is one of its
    /// terminals.
    pub fn other(&self, spot: SpotId) -> Option<SpotId> {
        if spot == self.positive {
            Some(self.negative)
        } else if spot == self.negative {
            Some(self.positive)
        } else {
            None
        }
    }

    /// Both terminals, positive first.
    pub fn terminals(&self) -> [SpotId; 2] {
        [self.positive, self.negative]
    }

    pub fn is_wire(&self) -> bool {
        self.kind == ComponentKind::Wire
    }

    /// Conductance (1/R) of a resistor.
    pub fn conductance(&self) -> f64 {
        1.0 / self.value
    }

    /// Reset solved outputs to zero.
    pub fn clear_results(&mut self) {
        self.voltage_drop = 0.0;
        self.current_through = 0.0;
    }

    /// Store solved outputs.
    pub fn set_results(&mut self, voltage_drop: f64, current_through: f64) {
        self.voltage_drop = voltage_drop;
        self.current_through = current_through;
    }

    /// Check that `value` is acceptable for this component's kind.
    pub fn check_value(&self, value: f64) -> Option<&'static str> {
        match self.kind {
            ComponentKind::Wire => Some("wires have no value"),
            _ if !value.is_finite() => Some("value must be finite"),
            ComponentKind::Resistor if value <= 0.0 => Some("resistance must be positive"),
            _ => None,
        }
    }
}
