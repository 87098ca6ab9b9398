//! Text format for describing a board.
//!
//! The format is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! board       = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = ".spot" label { label }
//! component   = [keyword] name label label [value]
//!
//! keyword     = "WIRE" | "RES" | "RESISTOR" | "VSRC" | "SOURCE"
//! name        = identifier
//! label       = identifier | number
//! value       = number [unit_suffix]
//!
//! number      = ['-'|'+'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! Without a keyword the kind comes from the first letter of the name:
//!
//! | Prefix | Kind | Syntax |
//! |--------|------|--------|
//! | W | Wire | `W<name> <a> <b>` |
//! | R | Resistor | `R<name> <a> <b> [ohms]` |
//! | V | Voltage Source | `V<name> <+> <-> [volts]` |
//!
//! Omitted values take the kind's default (1 kΩ, 5 V). Spots are created on
//! first use; `.spot` only fixes their order.
//!
//! # Example
//!
//! ```text
//! # 9 V divider
//! V1 top gnd 9
//! R1 top mid 1k
//! R2 mid gnd 2k
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{is_si_prefix, parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse board text into an AST.
pub fn parse(input: &str) -> Result<BoardAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a board file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<BoardAst> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::OhmgridError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
