#![forbid(unsafe_code)]

//! ANSI terminal output.

use sheen_core::{Result, Token, TokenType};

use crate::color::ColorProfile;
use crate::formatter::Formatter;
use crate::theme::Theme;

/// SGR sequence restoring default colors and attributes.
pub const RESET: &str = "\x1b[0m";

/// Stand-in for escape bytes found in token text.
const ESCAPE_SYMBOL: char = '\u{241b}';

/// Styles tokens with SGR escape sequences.
///
/// A token whose effective style is plain gets no escape at all, and a
/// reset follows only tokens that were given a start sequence. Escape bytes
/// inside token text (ESC and the single-byte CSI) are replaced with `␛` so
/// the highlighted source cannot drive the terminal.
#[derive(Debug, Clone)]
pub struct TerminalFormatter {
    theme: Theme,
    profile: ColorProfile,
    /// One entry per `start_token` awaiting its `end_token`: whether a
    /// start sequence was written.
    open: Vec<bool>,
}

impl TerminalFormatter {
    /// Default theme on a 16-color terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: Theme::default_ansi(),
            profile: ColorProfile::Ansi16,
            open: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ColorProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub fn profile(&self) -> ColorProfile {
        self.profile
    }
}

impl Default for TerminalFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TerminalFormatter {
    fn name(&self) -> &str {
        "terminal"
    }

    fn start_document(&mut self) -> Result<String> {
        self.open.clear();
        Ok(String::new())
    }

    fn end_document(&mut self) -> Result<String> {
        // Close anything a caller left open so the terminal is not left styled.
        let dangling = self.open.drain(..).any(|styled| styled);
        Ok(if dangling { RESET.to_owned() } else { String::new() })
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        let sgr = self.theme.style_for(kind).sgr(self.profile);
        self.open.push(sgr.is_some());
        Ok(sgr.unwrap_or_default())
    }

    fn end_token(&mut self, _: TokenType) -> Result<String> {
        Ok(if self.open.pop() == Some(true) {
            RESET.to_owned()
        } else {
            String::new()
        })
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        Ok(neutralize(token.text))
    }
}

fn neutralize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\x1b' | '\u{9b}' => ESCAPE_SYMBOL,
            other => other,
        })
        .collect()
}

/// Remove SGR sequences (`ESC [ ... m`) from formatter output.
#[must_use]
pub fn strip_sgr(styled: &str) -> String {
    let mut out = String::with_capacity(styled.len());
    let mut rest = styled;
    while let Some(start) = rest.find("\x1b[") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(|c: char| !(c.is_ascii_digit() || c == ';')) {
            Some(end) if after[end..].starts_with('m') => rest = &after[end + 1..],
            _ => {
                out.push_str("\x1b[");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::formatter::render;
    use crate::style::Style;

    fn styled(profile: ColorProfile, tokens: &[Token<'_>]) -> String {
        let mut formatter = TerminalFormatter::new().with_profile(profile);
        render(&mut formatter, tokens).unwrap()
    }

    #[test]
    fn styled_tokens_are_wrapped_and_reset() {
        let tokens = [
            Token::new(TokenType::Keyword, "echo", 0),
            Token::new(TokenType::Whitespace, " ", 4),
            Token::new(TokenType::NameVariable, "$x", 5),
        ];
        assert_eq!(
            styled(ColorProfile::Ansi16, &tokens),
            "\x1b[34mecho\x1b[0m \x1b[31m$x\x1b[0m"
        );
    }

    #[test]
    fn plain_tokens_get_no_reset() {
        let tokens = [
            Token::new(TokenType::Text, "hello ", 0),
            Token::new(TokenType::Punctuation, ";", 6),
        ];
        assert_eq!(styled(ColorProfile::TrueColor, &tokens), "hello ;");
    }

    #[test]
    fn mono_keeps_attributes_and_drops_colors() {
        let tokens = [
            Token::new(TokenType::NameTag, "a", 0),
            Token::new(TokenType::String, "'s'", 1),
        ];
        assert_eq!(styled(ColorProfile::Mono, &tokens), "\x1b[1ma\x1b[0m's'");
    }

    #[test]
    fn truecolor_theme_is_downgraded() {
        let red = Style::new().fg(Color::hex(0xFF0000));
        let theme = Theme::new("t").with(TokenType::Operator, red);
        let mut formatter = TerminalFormatter::new()
            .with_theme(theme)
            .with_profile(ColorProfile::Ansi256);
        let out = render(&mut formatter, &[Token::new(TokenType::Operator, "+", 0)]).unwrap();
        assert_eq!(out, "\x1b[38;5;196m+\x1b[0m");
    }

    #[test]
    fn escape_bytes_are_neutralized() {
        let tokens = [Token::new(TokenType::Text, "a\x1b[2Jb\u{9b}c", 0)];
        assert_eq!(styled(ColorProfile::Ansi16, &tokens), "a\u{241b}[2Jb\u{241b}c");
    }

    #[test]
    fn dangling_start_is_closed_at_document_end() {
        let mut formatter = TerminalFormatter::new();
        let mut out = formatter.start_document().unwrap();
        out.push_str(&formatter.start_token(TokenType::Keyword).unwrap());
        out.push_str(&formatter.end_document().unwrap());
        assert_eq!(out, "\x1b[34m\x1b[0m");
        // Stray end_token calls never emit a reset.
        assert_eq!(formatter.end_token(TokenType::Keyword).unwrap(), "");
    }

    #[test]
    fn strip_sgr_recovers_the_text() {
        assert_eq!(strip_sgr("\x1b[1;38;5;196mx\x1b[0m y"), "x y");
        assert_eq!(strip_sgr("no escapes"), "no escapes");
        assert_eq!(strip_sgr("\x1b[?25h"), "\x1b[?25h");
        assert_eq!(strip_sgr("cut \x1b[31"), "cut \x1b[31");
    }
}
