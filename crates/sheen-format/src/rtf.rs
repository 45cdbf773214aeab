#![forbid(unsafe_code)]

//! Rich Text Format output.
//!
//! The document declares one monospace font and a color table holding every
//! color the theme uses. Each styled token becomes a group such as
//! `{\b\cf2 echo}` whose `\cfN`/`\cbN` index that table.

use std::fmt::Write as _;

use sheen_core::{Result, Token, TokenType};

use crate::color::Rgb;
use crate::formatter::Formatter;
use crate::style::{Style, StyleFlags};
use crate::theme::Theme;

const HEADER: &str = r"{\rtf1\ansi\uc0\deff0{\fonttbl{\f0\fmodern\fprq1\fcharset0;}}";

/// Renders tokens as an RTF document.
#[derive(Debug, Clone)]
pub struct RtfFormatter {
    theme: Theme,
    /// Color table of the current document; entry `i` is `\cf(i + 1)`.
    colors: Vec<Rgb>,
    /// Whether each pending `start_token` opened a group.
    open: Vec<bool>,
}

impl RtfFormatter {
    /// Formatter using the molokai theme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: Theme::molokai(),
            colors: Vec::new(),
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

    fn color_index(&self, rgb: Rgb) -> Option<usize> {
        self.colors.iter().position(|&c| c == rgb).map(|i| i + 1)
    }

    fn group(&self, style: Style) -> Option<String> {
        if style.is_plain() {
            return None;
        }
        let mut out = String::from("{");
        for (flag, word) in [
            (StyleFlags::BOLD, r"\b"),
            (StyleFlags::ITALIC, r"\i"),
            (StyleFlags::UNDERLINE, r"\ul"),
        ] {
            if style.flags.contains(flag) {
                out.push_str(word);
            }
        }
        if let Some(index) = style.bg.and_then(|c| self.color_index(c.to_rgb())) {
            let _ = write!(out, r"\cb{index}");
        }
        if let Some(index) = style.fg.and_then(|c| self.color_index(c.to_rgb())) {
            let _ = write!(out, r"\cf{index}");
        }
        if out.len() == 1 {
            // Only flags RTF has no word for, such as dim.
            return None;
        }
        out.push(' ');
        Some(out)
    }
}

impl Default for RtfFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for RtfFormatter {
    fn name(&self) -> &str {
        "rtf"
    }

    fn start_document(&mut self) -> Result<String> {
        self.open.clear();
        self.colors.clear();
        for (_, style) in self.theme.rules() {
            for color in [style.fg, style.bg].into_iter().flatten() {
                let rgb = color.to_rgb();
                if !self.colors.contains(&rgb) {
                    self.colors.push(rgb);
                }
            }
        }

        let mut out = String::from(HEADER);
        out.push_str(r"{\colortbl;");
        for Rgb { r, g, b } in &self.colors {
            let _ = write!(out, r"\red{r}\green{g}\blue{b};");
        }
        out.push_str(r"}\f0 ");
        Ok(out)
    }

    fn end_document(&mut self) -> Result<String> {
        let mut out: String = self.open.drain(..).filter(|&o| o).map(|_| '}').collect();
        out.push('}');
        Ok(out)
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        let group = self.group(self.theme.style_for(kind));
        self.open.push(group.is_some());
        Ok(group.unwrap_or_default())
    }

    fn end_token(&mut self, _: TokenType) -> Result<String> {
        Ok(if self.open.pop() == Some(true) {
            "}".to_owned()
        } else {
            String::new()
        })
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        let mut out = String::with_capacity(token.len() + 8);
        rtf_escape_into(&mut out, token.text);
        Ok(out)
    }
}

/// Escape text for an RTF body.
///
/// Group and escape characters get a backslash, each line break (`\r\n`,
/// `\n` or `\r`) becomes `\par`, tabs become `\tab`, and characters outside
/// ASCII become `\uN` with `N` the signed 16-bit UTF-16 unit.
pub fn rtf_escape_into(out: &mut String, s: &str) {
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\par\n");
            }
            '\n' => out.push_str("\\par\n"),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0_u16; 2];
                for &unit in c.encode_utf16(&mut units).iter() {
                    let _ = write!(out, "\\u{} ", unit as i16);
                }
            }
        }
    }
}
