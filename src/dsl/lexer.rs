//! Lexer (tokenizer) for board descriptions.

use crate::error::{OhmgridError, Result};

/// SI prefixes accepted after a number.
const SUFFIXES: [char; 9] = ['p', 'n', 'u', 'µ', 'm', 'k', 'K', 'M', 'G'];

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in a board description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A component name, keyword or spot label
    Identifier,
    /// A number, possibly with an SI suffix
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing board text.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind, text| Token {
            kind,
            text,
            line,
            column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(token(TokenKind::Eof, String::new())),
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '.' => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(OhmgridError::lexer(line, column, "empty directive"));
                }
                Ok(token(TokenKind::Directive, format!(".{}", name)))
            }
            '-' | '+' | '0'..='9' => {
                let mut text = self.read_number();
                // Labels such as `2a` start like a number.
                text.push_str(&self.read_identifier());
                if looks_like_number(&text) {
                    Ok(token(TokenKind::Number, text))
                } else if text.starts_with(['-', '+']) {
                    Err(OhmgridError::lexer(
                        line,
                        column,
                        format!("invalid number '{}'", text),
                    ))
                } else {
                    Ok(token(TokenKind::Identifier, text))
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                Ok(token(TokenKind::Identifier, self.read_identifier()))
            }
            _ => Err(OhmgridError::lexer(
                line,
                column,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, text: &mut String, accept: impl Fn(char) -> bool) {
        while let Some(&ch) = self.chars.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        self.read_while(&mut text, |ch| ch.is_alphanumeric() || ch == '_');
        text
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        // Optional sign
        if let Some(&sign @ ('-' | '+')) = self.chars.peek() {
            text.push(sign);
            self.advance();
        }

        // Integer part
        self.read_while(&mut text, |ch| ch.is_ascii_digit());

        // Decimal part
        if let Some(&'.') = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_while(&mut text, |ch| ch.is_ascii_digit());
        }

        // Exponent part
        if let Some(&e @ ('e' | 'E')) = self.chars.peek() {
            text.push(e);
            self.advance();
            if let Some(&sign @ ('-' | '+')) = self.chars.peek() {
                text.push(sign);
                self.advance();
            }
            self.read_while(&mut text, |ch| ch.is_ascii_digit());
        }

        text
    }
}

/// Whether `text` is a number with an optional SI suffix, like `10k` or `-1.5e3`.
fn looks_like_number(text: &str) -> bool {
    let body = text.strip_suffix(SUFFIXES).unwrap_or(text);
    !body.is_empty() && body.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Whether `text` is exactly one SI prefix character.
pub fn is_si_prefix(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if SUFFIXES.contains(&c))
}

/// Parse a number string with optional SI suffix.
///
/// ```
/// use ohmgrid_core::dsl::parse_value;
///
/// assert_eq!(parse_value("4.7k"), Some(4700.0));
/// assert_eq!(parse_value("12"), Some(12.0));
/// assert_eq!(parse_value("k"), None);
/// ```
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (num_str, multiplier) = match text.chars().last() {
        Some(last) => {
            let mult = match last {
                'p' => 1e-12,
                'n' => 1e-9,
                'u' | 'µ' => 1e-6,
                'm' => 1e-3,
                'k' | 'K' => 1e3,
                'M' => 1e6,
                'G' => 1e9,
                _ => 1.0,
            };
            if mult != 1.0 {
                (&text[..text.len() - last.len_utf8()], mult)
            } else {
                (text, 1.0)
            }
        }
        None => (text, 1.0),
    };

    num_str
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
        .filter(|v| v.is_finite())
}
