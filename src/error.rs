//! Error types for the Ohmgrid circuit solver.
//!
//! This module provides a unified error type [`OhmgridError`] that covers
//! board editing, board text parsing, and every way a calculation can fail.
//! An incomplete board is *not* an error: the calculator reports it through
//! its boolean result.

use thiserror::Error;

use crate::circuit::{ComponentId, NodeId, SpotId};

/// Result type alias using [`OhmgridError`].
pub type Result<T> = std::result::Result<T, OhmgridError>;

/// Unified error type for all Ohmgrid operations.
#[derive(Error, Debug)]
pub enum OhmgridError {
    // ============ Board Text Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    // ============ Board Editing Errors ============
    /// Spot handle or label does not exist on the board
    #[error("Spot '{spot}' not found on the board")]
    SpotNotFound { spot: String },

    /// Component handle does not refer to a live component
    #[error("Component {component} not found on the board")]
    ComponentNotFound { component: ComponentId },

    /// Component cannot be placed as requested
    #[error("Invalid component '{name}': {message}")]
    InvalidComponent { name: String, message: String },

    /// Rejected component value
    #[error("Invalid value for component {component}: {message}")]
    InvalidValue {
        component: ComponentId,
        message: String,
    },

    // ============ Calculation Errors ============
    /// Node graph construction produced something that cannot happen for
    /// well-formed components.
    #[error("Structural invariant violated: {message}")]
    StructuralInvariant { message: String },

    /// Two or more voltage sources directly in parallel
    #[error("Voltage sources in parallel between nodes {node_a} and {node_b}")]
    ParallelVoltageSources { node_a: NodeId, node_b: NodeId },

    /// Voltage source with both terminals in the same electrical node
    #[error("Voltage source {component} is short-circuited")]
    ShortedVoltageSource { component: ComponentId },

    /// Voltage sources closing a loop among themselves
    #[error("Voltage sources form a closed loop through node {node}")]
    VoltageSourceLoop { node: NodeId },

    /// The assembled system has no unique solution
    #[error("Singular matrix - circuit has a floating or redundant node")]
    SingularMatrix,

    /// Voltage-source chain deeper than the configured bound
    #[error("Voltage source chain exceeds depth limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    // ============ I/O Errors ============
    /// Error reading a board file
    #[error("Failed to read board file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl OhmgridError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a structural invariant error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            message: message.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(component: ComponentId, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            component,
            message: message.into(),
        }
    }

    /// Create a spot-not-found error for a raw handle
    pub fn spot_not_found(spot: SpotId) -> Self {
        Self::SpotNotFound {
            spot: spot.to_string(),
        }
    }

    /// Whether this error came out of the solver.
    ///
    /// The editor treats all of these the same way: "unable to calculate".
    pub fn is_calculation_failure(&self) -> bool {
        matches!(
            self,
            Self::StructuralInvariant { .. }
                | Self::ParallelVoltageSources { .. }
                | Self::ShortedVoltageSource { .. }
                | Self::VoltageSourceLoop { .. }
                | Self::SingularMatrix
                | Self::RecursionLimitExceeded { .. }
        )
    }
}
