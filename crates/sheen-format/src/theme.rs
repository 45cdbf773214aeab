#![forbid(unsafe_code)]

//! Themes: token type to style maps with ancestor fallback.
//!
//! A theme only lists the types it cares about. [`Theme::style_for`] walks
//! from the requested type toward its root and returns the first rule it
//! finds, so a rule on `Keyword` also colors `Keyword.Reserved` unless that
//! subtype has a rule of its own (an explicit plain rule included).
//!
//! # Example
//! ```
//! use sheen_core::TokenType;
//! use sheen_format::Theme;
//!
//! let theme = Theme::by_name("monokai").unwrap();
//! assert_eq!(
//!     theme.style_for(TokenType::KeywordReserved),
//!     theme.style_for(TokenType::Keyword),
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sheen_core::{Error, Result, TokenType};

use crate::color::{Ansi16, Color};
use crate::style::Style;

/// Names accepted by [`Theme::by_name`], default first.
pub const BUILTIN_THEMES: [&str; 3] = ["default", "monokai", "molokai"];

/// A named set of token styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: String,
    /// Page colors used for the stylesheet's container rule.
    background: Option<Color>,
    foreground: Option<Color>,
    rules: BTreeMap<TokenType, Style>,
}

impl Theme {
    /// An empty theme: every token renders plain.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            background: None,
            foreground: None,
            rules: BTreeMap::new(),
        }
    }

    /// Look up a built-in theme, case-insensitively.
    pub fn by_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default_ansi()),
            "monokai" => Ok(Self::monokai()),
            "molokai" => Ok(Self::molokai()),
            _ => Err(Error::UnknownTheme {
                name: name.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    #[must_use]
    pub fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    /// Set the page colors.
    #[must_use]
    pub fn with_page(mut self, foreground: Option<Color>, background: Option<Color>) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    /// Add or replace the rule for `kind`.
    #[must_use]
    pub fn with(mut self, kind: TokenType, style: Style) -> Self {
        self.rules.insert(kind, style);
        self
    }

    /// Apply one style to several types.
    #[must_use]
    pub fn with_all(mut self, kinds: &[TokenType], style: Style) -> Self {
        for &kind in kinds {
            self.rules.insert(kind, style);
        }
        self
    }

    /// Add or replace the rule for `kind` in place.
    pub fn set(&mut self, kind: TokenType, style: Style) -> Option<Style> {
        self.rules.insert(kind, style)
    }

    /// Rule registered for exactly `kind`, ignoring ancestors.
    #[must_use]
    pub fn rule(&self, kind: TokenType) -> Option<Style> {
        self.rules.get(&kind).copied()
    }

    /// Effective style of `kind`: its own rule or its nearest ancestor's.
    #[must_use]
    pub fn style_for(&self, kind: TokenType) -> Style {
        kind.ancestors()
            .find_map(|t| self.rules.get(&t).copied())
            .unwrap_or_default()
    }

    /// Explicit rules in taxonomy order.
    pub fn rules(&self) -> impl Iterator<Item = (TokenType, Style)> + '_ {
        self.rules.iter().map(|(&kind, &style)| (kind, style))
    }

    /// CSS stylesheet for the HTML formatter's class output.
    ///
    /// Emits one rule per token type whose effective style is not plain, so
    /// subtypes that only inherit a style still get a selector of their own.
    /// `scope` prefixes every selector (e.g. `".highlight"`); when it is
    /// non-empty and the theme has page colors, a container rule comes first.
    #[must_use]
    pub fn to_css(&self, scope: &str, class_prefix: &str) -> String {
        let mut css = String::new();
        let _ = writeln!(css, "/* sheen theme: {} */", self.name);
        if !scope.is_empty() {
            let page = Style {
                fg: self.foreground,
                bg: self.background,
                ..Style::new()
            };
            if !page.is_plain() {
                let _ = writeln!(css, "{scope} {{ {} }}", page.css());
            }
        }
        for &kind in TokenType::ALL {
            let class = kind.css_class();
            if class.is_empty() {
                continue;
            }
            let style = self.style_for(kind);
            if style.is_plain() {
                continue;
            }
            if scope.is_empty() {
                let _ = write!(css, ".{class_prefix}{class}");
            } else {
                let _ = write!(css, "{scope} .{class_prefix}{class}");
            }
            let _ = writeln!(css, " {{ {} }} /* {} */", style.css(), kind.name());
        }
        css
    }

    // -----------------------------------------------------------------------
    // Built-in themes
    // -----------------------------------------------------------------------

    /// The 16-color palette every terminal understands.
    #[must_use]
    pub fn default_ansi() -> Self {
        use TokenType as T;

        let teal = Style::new().fg(Color::Ansi16(Ansi16::Cyan));
        let dark_red = Style::new().fg(Color::Ansi16(Ansi16::Red));
        let dark_green = Style::new().fg(Color::Ansi16(Ansi16::Green));
        let dark_blue = Style::new().fg(Color::Ansi16(Ansi16::Blue));
        let dark_gray = Style::new().fg(Color::Ansi16(Ansi16::Black)).bold();
        let light_gray = Style::new().fg(Color::Ansi16(Ansi16::White));

        Self::new("default")
            .with_all(&[T::NameBuiltin, T::NameAttribute, T::KeywordType], teal)
            .with(T::NameTag, teal.bold())
            .with(T::NameVariable, dark_red)
            .with(T::NameFunction, dark_green)
            .with_all(&[T::NameClass, T::NameNamespace], dark_green.underline())
            .with_all(&[T::Keyword, T::Number, T::Literal], dark_blue)
            .with(T::Operator, Style::new().fg(Color::Ansi16(Ansi16::Magenta)))
            .with(T::Comment, light_gray)
            .with(T::String, Style::new().fg(Color::Ansi16(Ansi16::Yellow)))
            .with_all(&[T::StringEscaped, T::StringInterpolated], dark_gray)
            .with_all(&[T::GenericHeading, T::GenericSubheading], light_gray.bold())
            .with(T::GenericInserted, dark_blue)
            .with(T::GenericDeleted, dark_red)
            .with(T::GenericStrong, Style::new().bold())
            .with(T::Error, Style::new().fg(Color::Ansi16(Ansi16::BrightRed)))
    }

    #[must_use]
    pub fn monokai() -> Self {
        use TokenType as T;

        let white = Color::hex(0xFFFFFF);
        let whitish = Color::hex(0xF8F8F2);
        let dim_grey = Color::hex(0x75715E);
        let soft_cyan = Color::hex(0x66D9EF);
        let soft_yellow = Color::hex(0xE6DB74);
        let bright_pink = Color::hex(0xF92672);
        let bright_green = Color::hex(0xA6E22E);
        let light_violet = Color::hex(0xAE81FF);

        let comment = Style::new().fg(dim_grey).italic();

        Self::new("monokai")
            .with_page(Some(whitish), Some(Color::hex(0x272822)))
            .with(T::Comment, comment)
            .with(T::CommentDocumentation, comment.bold())
            .with(T::GenericInserted, Style::new().fg(white).bg(Color::hex(0x324932)))
            .with(T::GenericDeleted, Style::new().fg(white).bg(Color::hex(0x493131)))
            .with(T::GenericHeading, Style::new().fg(Color::hex(0x999999)))
            .with(T::GenericStrong, Style::new().bold())
            .with(T::GenericSubheading, Style::new().fg(Color::hex(0xAAAAAA)))
            .with(T::Keyword, Style::new().fg(soft_cyan).bold())
            .with_all(
                &[T::KeywordNamespace, T::Operator],
                Style::new().fg(bright_pink).bold(),
            )
            .with_all(&[T::Number, T::StringSingle], Style::new().fg(light_violet))
            .with_all(
                &[T::StringDouble, T::StringBacktick, T::StringInterned],
                Style::new().fg(soft_yellow),
            )
            .with_all(
                &[T::NameClass, T::NameFunction],
                Style::new().fg(bright_green).bold(),
            )
            .with_all(
                &[T::NameBuiltin, T::NameEntity, T::NameNamespace, T::NameVariable],
                Style::new().fg(whitish),
            )
            .with(T::NameTag, Style::new().fg(bright_pink))
    }

    #[must_use]
    pub fn molokai() -> Self {
        use TokenType as T;

        let red = Color::hex(0xF92672);
        let blue = Color::hex(0x66D9EF);
        let white = Color::hex(0xF8F8F2);
        let green = Color::hex(0xA6E22E);
        let violet = Color::hex(0xAF87FF);
        let yellow = Color::hex(0xD7D787);
        let light_grey = Color::hex(0x465457);

        Self::new("molokai")
            .with_page(Some(white), Some(Color::hex(0x1B1D1E)))
            .with(T::Comment, Style::new().fg(Color::hex(0x5E5D83)).italic())
            .with(T::CommentDocumentation, Style::new().fg(light_grey).italic())
            .with(T::GenericInserted, Style::new().fg(green))
            .with(T::GenericDeleted, Style::new().fg(red))
            .with(T::GenericHeading, Style::new().fg(Color::hex(0x403D3D)))
            .with(T::GenericStrong, Style::new().bold())
            .with(T::GenericSubheading, Style::new().fg(light_grey))
            .with(T::Keyword, Style::new().fg(blue).bold())
            .with_all(&[T::KeywordNamespace, T::Operator], Style::new().fg(red).bold())
            .with_all(&[T::Number, T::StringEscaped], Style::new().fg(violet))
            .with_all(
                &[
                    T::StringRegex,
                    T::StringSingle,
                    T::StringDouble,
                    T::StringBacktick,
                    T::StringInterned,
                ],
                Style::new().fg(yellow),
            )
            .with_all(&[T::NameClass, T::NameFunction], Style::new().fg(green).bold())
            .with_all(
                &[T::NameBuiltin, T::NameEntity, T::NameNamespace, T::NameVariable],
                Style::new().fg(white),
            )
            .with(T::NameTag, Style::new().fg(red))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_ansi()
    }
}
