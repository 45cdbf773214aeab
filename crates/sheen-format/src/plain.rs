#![forbid(unsafe_code)]

//! Token dump, one line per token. Handy for debugging lexers.

use sheen_core::{Result, Token, TokenType};

use crate::formatter::Formatter;

/// Writes `Dotted.Name: "text"` lines with the text quoted and escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for PlainFormatter {
    fn name(&self) -> &str {
        "plain"
    }

    fn start_token(&mut self, _: TokenType) -> Result<String> {
        Ok(String::new())
    }

    fn end_token(&mut self, _: TokenType) -> Result<String> {
        Ok(String::new())
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        Ok(format!("{}: {:?}\n", token.kind.name(), token.text))
    }
}
