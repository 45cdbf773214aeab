#![forbid(unsafe_code)]

//! Sheen public facade crate.
//!
//! Highlight source text in one call, picking the lexer by name or letting
//! sheen guess it, and render through any [`Formatter`].
//!
//! ```
//! use sheen::{TerminalFormatter, highlight, lexer_guess, strip_sgr};
//!
//! let source = "#!/usr/bin/env php54\n\necho 'Hello world';\n?><html>";
//! let php = lexer_guess(source, [("start_inline", true)]).unwrap();
//! assert_eq!(php.name(), "PHP");
//!
//! let out = highlight(source, &[php], &mut TerminalFormatter::new()).unwrap();
//! assert_eq!(strip_sgr(&out), source);
//! ```

pub mod highlight;

// --- Core re-exports -------------------------------------------------------

pub use sheen_core::{
    Claim, Error, Event, Events, Lexer, LexerDescriptor, LexerOptions, Machine, OptionDefault,
    OptionDescriptor, OptionKind, OptionValue, Registry, Result, Scanner, Step, Token, TokenType,
    Tokens, covers_exactly,
};

// --- Format re-exports -----------------------------------------------------

pub use sheen_format::{
    Ansi16, BbcodeFormatter, Color, ColorProfile, Formatter, HtmlFormatter, PlainFormatter, Rgb,
    RtfFormatter, Style, StyleFlags, TerminalFormatter, Theme, formatter_by_name, render,
    render_events, strip_sgr,
};

pub use highlight::{
    events, events_with_registry, highlight, highlight_with_registry, tokenize,
    tokenize_with_registry,
};

/// Lexer for a name, alias or MIME type in the global registry.
pub fn lexer_by_name(name: &str) -> Result<Lexer> {
    let registry = Registry::global();
    registry
        .by_name(name)
        .or_else(|_| registry.by_mimetype(name))
}

/// Guess a lexer for `source` and apply the hint options it declares.
pub fn lexer_guess<I, K, V>(source: &str, hints: I) -> Result<Lexer>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<OptionValue>,
{
    sheen_core::guess(source, hints)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Formatter, HtmlFormatter, Lexer, PlainFormatter, Registry, Result,
        TerminalFormatter, Theme, TokenType, highlight, lexer_by_name, lexer_guess,
    };
}

pub use sheen_core as core;
pub use sheen_format as format;
