//! The closed set of component kinds a board can hold.

use std::fmt;

use crate::circuit::Unit;

/// Default resistance for a freshly placed resistor (ohms).
pub const DEFAULT_RESISTANCE: f64 = 1000.0;

/// Default voltage for a freshly placed source (volts).
pub const DEFAULT_SOURCE_VOLTAGE: f64 = 5.0;

/// Component kinds supported by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Ideal zero-resistance conductor
    Wire,
    /// Linear resistor
    Resistor,
    /// Ideal DC voltage source
    VoltageSource,
}

impl ComponentKind {
    /// Parse a kind from the first letter of a component name.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'W' => Some(Self::Wire),
            'R' => Some(Self::Resistor),
            'V' => Some(Self::VoltageSource),
            _ => None,
        }
    }

    /// Parse a kind from a keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "WIRE" => Some(Self::Wire),
            "RES" | "RESISTOR" => Some(Self::Resistor),
            "VSRC" | "SOURCE" => Some(Self::VoltageSource),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wire => "Wire",
            Self::Resistor => "Resistor",
            Self::VoltageSource => "Voltage Source",
        }
    }

    /// Unit of the component's value, `None` for wires.
    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Wire => None,
            Self::Resistor => Some(Unit::Ohm),
            Self::VoltageSource => Some(Unit::Volt),
        }
    }

    /// Value a new component of this kind starts with.
    pub fn default_value(&self) -> f64 {
        match self {
            Self::Wire => 0.0,
            Self::Resistor => DEFAULT_RESISTANCE,
            Self::VoltageSource => DEFAULT_SOURCE_VOLTAGE,
        }
    }

    /// Whether this kind carries a value at all.
    pub fn has_value(&self) -> bool {
        !matches!(self, Self::Wire)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
