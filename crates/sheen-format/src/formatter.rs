#![forbid(unsafe_code)]

//! The formatter contract and lookup of built-in formatters by name.
//!
//! A formatter renders a token stream through calls made in a fixed order:
//! `start_document`, then `start_token`/`write_token`/`end_token` for each
//! token, then `end_document`. The output is the concatenation of every
//! returned fragment. [`render`] drives that sequence.
//!
//! [`render_events`] also reports which lexer produced the tokens:
//! `start_lexing` and `end_lexing` bracket each lexer's output, nested ones
//! included. Both hooks default to emitting nothing.
//!
//! Extension is by implementing [`Formatter`], or by composition: wrap a
//! built-in, forward the calls you want unchanged, and rewrite the rest.
//!
//! ```
//! use sheen_core::{Result, Token, TokenType};
//! use sheen_format::{Formatter, HtmlFormatter};
//!
//! /// HTML with keywords upper-cased.
//! struct Shouting(HtmlFormatter);
//!
//! impl Formatter for Shouting {
//!     fn name(&self) -> &str { "shouting" }
//!     fn start_document(&mut self) -> Result<String> { self.0.start_document() }
//!     fn end_document(&mut self) -> Result<String> { self.0.end_document() }
//!     fn start_token(&mut self, kind: TokenType) -> Result<String> { self.0.start_token(kind) }
//!     fn end_token(&mut self, kind: TokenType) -> Result<String> { self.0.end_token(kind) }
//!     fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
//!         let html = self.0.write_token(token)?;
//!         Ok(if token.kind.is_a(TokenType::Keyword) { html.to_uppercase() } else { html })
//!     }
//! }
//! ```

use sheen_core::options::parse_bool;
use sheen_core::{Error, Event, Result, Token, TokenType};

use crate::bbcode::BbcodeFormatter;
use crate::color::ColorProfile;
use crate::html::HtmlFormatter;
use crate::plain::PlainFormatter;
use crate::rtf::RtfFormatter;
use crate::terminal::TerminalFormatter;
use crate::theme::Theme;

/// Renders tokens into output text.
///
/// Instances may keep per-document state between calls, so one instance
/// must not serve two documents at the same time.
pub trait Formatter {
    /// Short identifier, e.g. `"html"`.
    fn name(&self) -> &str;

    /// Text emitted once before the first token.
    fn start_document(&mut self) -> Result<String> {
        Ok(String::new())
    }

    /// Text emitted once after the last token.
    fn end_document(&mut self) -> Result<String> {
        Ok(String::new())
    }

    /// Text emitted before the tokens of the lexer named `lexer`.
    fn start_lexing(&mut self, lexer: &str) -> Result<String> {
        let _ = lexer;
        Ok(String::new())
    }

    /// Text emitted after the tokens of the lexer named `lexer`.
    fn end_lexing(&mut self, lexer: &str) -> Result<String> {
        let _ = lexer;
        Ok(String::new())
    }

    /// Opening wrapper for a token of type `kind`.
    fn start_token(&mut self, kind: TokenType) -> Result<String>;

    /// Closing wrapper matching the previous `start_token`.
    fn end_token(&mut self, kind: TokenType) -> Result<String>;

    /// The token's text, escaped for the target format.
    fn write_token(&mut self, token: &Token<'_>) -> Result<String>;
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start_document(&mut self) -> Result<String> {
        (**self).start_document()
    }

    fn end_document(&mut self) -> Result<String> {
        (**self).end_document()
    }

    fn start_lexing(&mut self, lexer: &str) -> Result<String> {
        (**self).start_lexing(lexer)
    }

    fn end_lexing(&mut self, lexer: &str) -> Result<String> {
        (**self).end_lexing(lexer)
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        (**self).start_token(kind)
    }

    fn end_token(&mut self, kind: TokenType) -> Result<String> {
        (**self).end_token(kind)
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        (**self).write_token(token)
    }
}

/// Run the formatting protocol over `tokens` and concatenate the fragments.
///
/// The first error from the formatter is returned unchanged.
pub fn render<F>(formatter: &mut F, tokens: &[Token<'_>]) -> Result<String>
where
    F: Formatter + ?Sized,
{
    let body: usize = tokens.iter().map(Token::len).sum();
    let mut out = String::with_capacity(body + body / 2 + 64);
    out.push_str(&formatter.start_document()?);
    for token in tokens {
        out.push_str(&formatter.start_token(token.kind)?);
        out.push_str(&formatter.write_token(token)?);
        out.push_str(&formatter.end_token(token.kind)?);
    }
    out.push_str(&formatter.end_document()?);
    Ok(out)
}

/// [`render`] over an event stream, calling the lexer hooks at each
/// [`Event::Enter`] and [`Event::Leave`].
pub fn render_events<F>(formatter: &mut F, events: &[Event<'_>]) -> Result<String>
where
    F: Formatter + ?Sized,
{
    let body: usize = events.iter().filter_map(Event::token).map(Token::len).sum();
    let mut out = String::with_capacity(body + body / 2 + 64);
    out.push_str(&formatter.start_document()?);
    for event in events {
        match event {
            Event::Enter(lexer) => out.push_str(&formatter.start_lexing(lexer)?),
            Event::Token(token) => {
                out.push_str(&formatter.start_token(token.kind)?);
                out.push_str(&formatter.write_token(token)?);
                out.push_str(&formatter.end_token(token.kind)?);
            }
            Event::Leave(lexer) => out.push_str(&formatter.end_lexing(lexer)?),
        }
    }
    out.push_str(&formatter.end_document()?);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Lookup by name
// ---------------------------------------------------------------------------

/// Built-in formatter names with a one-line description.
pub const BUILTIN_FORMATTERS: [(&str, &str); 5] = [
    ("terminal", "ANSI SGR escape sequences for terminals"),
    ("html", "<span> elements inside a <pre> block"),
    ("bbcode", "[color], [b], [i] and [u] forum tags"),
    ("rtf", "Rich Text Format document"),
    ("plain", "one line per token: type name and quoted text"),
];

/// Create a built-in formatter from its name and string options.
///
/// Names are case-insensitive (`term` and `ansi` alias `terminal`).
/// Recognized options:
///
/// | formatter | option | value |
/// |---|---|---|
/// | terminal | `theme` | built-in theme name |
/// | terminal | `colors` | `none`, `16`, `256` or `truecolor` |
/// | html | `theme` | theme used for `inline_styles` |
/// | html | `cssclass` | class of the `<pre>` wrapper |
/// | html | `class_prefix` | prefix added to every token class |
/// | html | `inline_styles` | boolean, emit `style=` instead of classes |
/// | html | `lexer_spans` | boolean, wrap each lexer's output in a span |
/// | html | `linenos` | boolean, number every line |
/// | html | `linestart` | integer, number of the first line |
/// | bbcode | `theme` | built-in theme name |
/// | rtf | `theme` | built-in theme name |
pub fn formatter_by_name(
    name: &str,
    options: &[(&str, &str)],
) -> Result<Box<dyn Formatter + Send>> {
    match name.to_ascii_lowercase().as_str() {
        "terminal" | "term" | "ansi" => {
            let mut formatter = TerminalFormatter::new();
            for &(key, value) in options {
                formatter = match key {
                    "theme" => formatter.with_theme(Theme::by_name(value)?),
                    "colors" => {
                        let profile = value.parse::<ColorProfile>().map_err(|e| {
                            Error::InvalidOptionValue {
                                option: key.to_owned(),
                                value: format!("{value:?}"),
                                reason: e.to_string(),
                            }
                        })?;
                        formatter.with_profile(profile)
                    }
                    _ => return Err(unknown_option("terminal", key)),
                };
            }
            Ok(Box::new(formatter))
        }
        "html" => {
            let mut formatter = HtmlFormatter::new();
            for &(key, value) in options {
                formatter = match key {
                    "theme" => formatter.with_theme(Theme::by_name(value)?),
                    "cssclass" => formatter.with_css_class(value),
                    "class_prefix" => formatter.with_class_prefix(value),
                    "inline_styles" => formatter.with_inline_styles(bool_option(key, value)?),
                    "lexer_spans" => formatter.with_lexer_spans(bool_option(key, value)?),
                    "linenos" => formatter.with_line_numbers(bool_option(key, value)?),
                    "linestart" => {
                        let first = value.trim().parse::<u64>().map_err(|e| {
                            Error::InvalidOptionValue {
                                option: key.to_owned(),
                                value: format!("{value:?}"),
                                reason: e.to_string(),
                            }
                        })?;
                        formatter.with_line_start(first)
                    }
                    _ => return Err(unknown_option("html", key)),
                };
            }
            Ok(Box::new(formatter))
        }
        "bbcode" | "bb" => {
            let mut formatter = BbcodeFormatter::new();
            for &(key, value) in options {
                formatter = match key {
                    "theme" => formatter.with_theme(Theme::by_name(value)?),
                    _ => return Err(unknown_option("bbcode", key)),
                };
            }
            Ok(Box::new(formatter))
        }
        "rtf" => {
            let mut formatter = RtfFormatter::new();
            for &(key, value) in options {
                formatter = match key {
                    "theme" => formatter.with_theme(Theme::by_name(value)?),
                    _ => return Err(unknown_option("rtf", key)),
                };
            }
            Ok(Box::new(formatter))
        }
        "plain" | "text" | "raw" => match options.first() {
            Some(&(key, _)) => Err(unknown_option("plain", key)),
            None => Ok(Box::new(PlainFormatter::new())),
        },
        _ => Err(Error::UnknownFormatter {
            name: name.to_owned(),
        }),
    }
}

fn bool_option(key: &str, value: &str) -> Result<bool> {
    parse_bool(value).ok_or_else(|| Error::InvalidOptionValue {
        option: key.to_owned(),
        value: format!("{value:?}"),
        reason: "expected a boolean".to_owned(),
    })
}

fn unknown_option(formatter: &str, option: &str) -> Error {
    Error::UnknownOption {
        owner: format!("formatter {formatter}"),
        option: option.to_owned(),
    }
}
