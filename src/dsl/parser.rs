//! Parser for board descriptions.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::components::ComponentKind;
use crate::error::{OhmgridError, Result};

/// Parser for board text.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: Token {
                kind: TokenKind::Newline,
                text: String::new(),
                line: 1,
                column: 1,
            },
        }
    }

    /// Parse the entire board description.
    pub fn parse(&mut self) -> Result<BoardAst> {
        let mut ast = BoardAst::new();
        self.advance()?;

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if ast.components.iter().any(|c| c.name == component.name) {
                        return Err(OhmgridError::parse(
                            component.line,
                            format!("duplicate component name '{}'", component.name),
                        ));
                    }
                    ast.components.push(component);
                }
                TokenKind::Number | TokenKind::Eof => {
                    return Err(OhmgridError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(OhmgridError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    /// Spot labels may be identifiers or bare numbers such as `0`.
    fn at_spot(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier | TokenKind::Number)
    }

    fn expect_spot(&mut self, line: usize) -> Result<String> {
        if !self.at_spot() {
            return Err(OhmgridError::parse(
                line,
                format!("expected spot label, got {:?}", self.current.text),
            ));
        }
        let label = self.current.text.clone();
        self.advance()?;
        Ok(label)
    }

    fn parse_directive(&mut self, ast: &mut BoardAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".spot" => {
                if !self.at_spot() {
                    return Err(OhmgridError::parse(line, ".spot needs at least one label"));
                }
                while self.at_spot() {
                    let label = self.expect_spot(line)?;
                    ast.declare_spot(label);
                }
            }
            _ => {
                return Err(OhmgridError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let first_token = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        // Keywords first so `RES R1 a b` is not read as a resistor named RES.
        let (kind, name) = if let Some(kind) = ComponentKind::from_keyword(&first_token) {
            if self.current.kind != TokenKind::Identifier {
                return Err(OhmgridError::parse(
                    line,
                    format!("expected component name after {}", first_token),
                ));
            }
            let name = self.current.text.clone();
            self.advance()?;
            (kind, name)
        } else {
            let kind = first_token
                .chars()
                .next()
                .and_then(ComponentKind::from_prefix)
                .ok_or_else(|| {
                    OhmgridError::parse(line, format!("unknown component type: {}", first_token))
                })?;
            (kind, first_token)
        };

        let positive = self.expect_spot(line)?;
        let negative = self.expect_spot(line)?;

        let value = if self.current.kind == TokenKind::Number {
            let text = self.current.text.clone();
            self.advance()?;
            let value = parse_value(&text)
                .ok_or_else(|| OhmgridError::parse(line, format!("invalid number: {}", text)))?;
            Some(value)
        } else {
            None
        };

        if !kind.has_value() && value.is_some() {
            return Err(OhmgridError::parse(
                line,
                format!("{} '{}' takes no value", kind, name),
            ));
        }

        Ok(ComponentDef {
            kind,
            name,
            spots: vec![positive, negative],
            value,
            line,
        })
    }
}
