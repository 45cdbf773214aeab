#![forbid(unsafe_code)]

//! Text styles: colors plus attribute flags.

use crate::color::{Color, ColorProfile};

bitflags::bitflags! {
    /// Text attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM       = 0b0000_0010;
        /// Italic text.
        const ITALIC    = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE = 0b0000_1000;
    }
}

/// Foreground, background and attributes applied to one token type.
///
/// Built with `const` chaining so themes can be declared statically:
///
/// ```
/// use sheen_format::{Ansi16, Color, Style};
///
/// let keyword = Style::new().fg(Color::Ansi16(Ansi16::Blue)).bold();
/// assert!(!keyword.is_plain());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub flags: StyleFlags,
}

impl Style {
    /// A style that changes nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn bold(self) -> Self {
        self.with_flags(StyleFlags::BOLD)
    }

    #[must_use]
    pub const fn dim(self) -> Self {
        self.with_flags(StyleFlags::DIM)
    }

    #[must_use]
    pub const fn italic(self) -> Self {
        self.with_flags(StyleFlags::ITALIC)
    }

    #[must_use]
    pub const fn underline(self) -> Self {
        self.with_flags(StyleFlags::UNDERLINE)
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: StyleFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    /// True when the style sets no color and no attribute.
    #[must_use]
    pub const fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.flags.is_empty()
    }

    /// SGR start sequence for this style under `profile`.
    ///
    /// `None` when nothing would be emitted (plain style, or colors only
    /// under [`ColorProfile::Mono`]).
    #[must_use]
    pub fn sgr(&self, profile: ColorProfile) -> Option<String> {
        let mut params: Vec<String> = Vec::with_capacity(6);
        for (flag, code) in [
            (StyleFlags::BOLD, "1"),
            (StyleFlags::DIM, "2"),
            (StyleFlags::ITALIC, "3"),
            (StyleFlags::UNDERLINE, "4"),
        ] {
            if self.flags.contains(flag) {
                params.push(code.to_owned());
            }
        }
        if let Some(fg) = self.fg.and_then(|c| c.downgrade(profile)) {
            params.push(fg.sgr_params(false));
        }
        if let Some(bg) = self.bg.and_then(|c| c.downgrade(profile)) {
            params.push(bg.sgr_params(true));
        }
        if params.is_empty() {
            None
        } else {
            Some(format!("\x1b[{}m", params.join(";")))
        }
    }

    /// CSS declarations for this style, e.g. `color:#f92672;font-weight:bold;`.
    #[must_use]
    pub fn css(&self) -> String {
        let mut out = String::new();
        if let Some(fg) = self.fg {
            out.push_str("color:");
            out.push_str(&fg.to_rgb().to_hex());
            out.push(';');
        }
        if let Some(bg) = self.bg {
            out.push_str("background-color:");
            out.push_str(&bg.to_rgb().to_hex());
            out.push(';');
        }
        if self.flags.contains(StyleFlags::BOLD) {
            out.push_str("font-weight:bold;");
        }
        if self.flags.contains(StyleFlags::DIM) {
            out.push_str("opacity:0.5;");
        }
        if self.flags.contains(StyleFlags::ITALIC) {
            out.push_str("font-style:italic;");
        }
        if self.flags.contains(StyleFlags::UNDERLINE) {
            out.push_str("text-decoration:underline;");
        }
        out
    }
}
