#![forbid(unsafe_code)]

//! Built-in lexer classes.

pub mod diff;
pub mod php;
pub mod text;
pub mod xml;

use crate::lexer::LexerDescriptor;

/// Built-ins in registration order. Plain text comes first so it wins any
/// guess where nothing else scores.
pub static BUILTINS: [&LexerDescriptor; 4] = [&text::TEXT, &php::PHP, &xml::XML, &diff::DIFF];
