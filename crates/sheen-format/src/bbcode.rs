#![forbid(unsafe_code)]

//! BBCode output for forum posts.

use sheen_core::{Result, Token, TokenType};

use crate::formatter::Formatter;
use crate::style::{Style, StyleFlags};
use crate::theme::Theme;

/// Wraps styled tokens in `[b]`, `[i]`, `[u]` and `[color=#rrggbb]` tags.
///
/// Backgrounds have no BBCode form and are dropped. Token text is written
/// as is.
#[derive(Debug, Clone)]
pub struct BbcodeFormatter {
    theme: Theme,
    /// Closing tags owed by each pending `start_token`.
    open: Vec<String>,
}

impl BbcodeFormatter {
    /// Formatter using the molokai theme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: Theme::molokai(),
            open: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

impl Default for BbcodeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

const TAGS: [(StyleFlags, &str); 3] = [
    (StyleFlags::BOLD, "b"),
    (StyleFlags::ITALIC, "i"),
    (StyleFlags::UNDERLINE, "u"),
];

/// Opening and closing tags for `style`, both empty when it shows nothing.
fn tags(style: Style) -> (String, String) {
    let mut opening = String::new();
    let mut closing = String::new();
    for (flag, tag) in TAGS {
        if style.flags.contains(flag) {
            opening.push_str(&format!("[{tag}]"));
            closing.insert_str(0, &format!("[/{tag}]"));
        }
    }
    if let Some(fg) = style.fg {
        opening.push_str(&format!("[color={}]", fg.to_rgb().to_hex()));
        closing.insert_str(0, "[/color]");
    }
    (opening, closing)
}

impl Formatter for BbcodeFormatter {
    fn name(&self) -> &str {
        "bbcode"
    }

    fn start_document(&mut self) -> Result<String> {
        self.open.clear();
        Ok(String::new())
    }

    fn end_document(&mut self) -> Result<String> {
        Ok(self.open.drain(..).rev().collect())
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        let (opening, closing) = tags(self.theme.style_for(kind));
        self.open.push(closing);
        Ok(opening)
    }

    fn end_token(&mut self, _: TokenType) -> Result<String> {
        Ok(self.open.pop().unwrap_or_default())
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        Ok(token.text.to_owned())
    }
}
