#![forbid(unsafe_code)]

//! Formatters: turn token streams into terminal escapes, HTML, BBCode, RTF or
//! a token dump.
//!
//! # Example
//!
//! ```
//! use sheen_core::Registry;
//! use sheen_format::{HtmlFormatter, render};
//!
//! let xml = Registry::global().by_name("xml").unwrap();
//! let tokens = xml.tokens("<a>&amp;</a>").unwrap();
//! let html = render(&mut HtmlFormatter::new(), &tokens).unwrap();
//! assert!(html.starts_with("<pre><span class=\"p\">&lt;</span><span class=\"nt\">a</span>"));
//! ```

pub mod bbcode;
pub mod color;
pub mod formatter;
pub mod html;
pub mod plain;
pub mod rtf;
pub mod style;
pub mod terminal;
pub mod theme;

pub use bbcode::BbcodeFormatter;
pub use color::{Ansi16, Color, ColorProfile, ParseColorError, Rgb};
pub use formatter::{BUILTIN_FORMATTERS, Formatter, formatter_by_name, render, render_events};
pub use html::HtmlFormatter;
pub use plain::PlainFormatter;
pub use rtf::{RtfFormatter, rtf_escape_into};
pub use style::{Style, StyleFlags};
pub use terminal::{TerminalFormatter, strip_sgr};
pub use theme::{BUILTIN_THEMES, Theme};
