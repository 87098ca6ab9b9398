//! Syntax tree for board descriptions.

use crate::components::ComponentKind;

/// A parsed board: declared spots plus component lines.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardAst {
    /// Component lines in file order
    pub components: Vec<ComponentDef>,
    /// Spots declared with `.spot`, in declaration order
    pub spots: Vec<String>,
}

impl BoardAst {
    /// Create a new empty board AST.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            spots: Vec::new(),
        }
    }

    /// Declare a spot once; later declarations of the same label are ignored.
    pub fn declare_spot(&mut self, label: String) {
        if !self.spots.contains(&label) {
            self.spots.push(label);
        }
    }
}

impl Default for BoardAst {
    fn default() -> Self {
        Self::new()
    }
}

/// One component line.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub kind: ComponentKind,
    /// Component name as written
    pub name: String,
    /// Positive then negative spot label
    pub spots: Vec<String>,
    /// Value, `None` when omitted
    pub value: Option<f64>,
    /// Source line number for error reporting
    pub line: usize,
}
