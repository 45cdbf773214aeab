#![forbid(unsafe_code)]

//! Core: token taxonomy, lexer framework, lexer registry and language guessing.
//!
//! # Example
//!
//! ```
//! use sheen_core::{Registry, TokenType};
//!
//! let mut php = Registry::global().by_name("php").unwrap();
//! php.set_option("start_inline", true).unwrap();
//! let tokens = php.tokens("echo $name;").unwrap();
//! assert_eq!(tokens[0].kind, TokenType::Keyword);
//! assert_eq!(tokens.iter().map(|t| t.text).collect::<String>(), "echo $name;");
//! ```

pub mod error;
pub mod guess;
pub mod lexer;
pub mod lexers;
pub mod logging;
pub mod options;
pub mod registry;
pub mod scan;
pub mod token;

pub use error::{Claim, Error, Result};
pub use guess::guess;
pub use lexer::{
    Analyse, Event, Events, Lexer, LexerDescriptor, Machine, MachineFactory, Step, Tokens,
};
pub use options::{
    LexerOptions, OptionDefault, OptionDescriptor, OptionKind, OptionValue, Validator,
};
pub use registry::Registry;
pub use scan::Scanner;
pub use token::{Token, TokenType, covers_exactly};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
