#![forbid(unsafe_code)]

//! Error type shared by every sheen crate.
//!
//! Configuration mistakes (unknown names, bad option values, registration
//! collisions) surface here synchronously. Unclassifiable input never does:
//! lexers absorb it into `Error`-tagged tokens instead.

use std::fmt;

/// Which lookup table a registration collided in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Canonical lexer name.
    Name,
    /// Alternative name.
    Alias,
    /// MIME type.
    Mimetype,
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Alias => "alias",
            Self::Mimetype => "mimetype",
        })
    }
}

/// Errors raised while configuring lexers and formatters or rendering.
#[derive(Debug)]
pub enum Error {
    /// No lexer matches the given name, alias or MIME type.
    UnknownLexer { name: String },
    /// A registration claims a key another lexer already owns.
    DuplicateLexer {
        key: String,
        claim: Claim,
        owner: &'static str,
    },
    /// A lexer class declares two options with the same name.
    DuplicateOption {
        lexer: &'static str,
        option: &'static str,
    },
    /// The lexer or formatter declares no option with that name.
    UnknownOption { owner: String, option: String },
    /// The value does not fit the option's kind or validator.
    InvalidOptionValue {
        option: String,
        value: String,
        reason: String,
    },
    /// No formatter matches the given name.
    UnknownFormatter { name: String },
    /// No theme matches the given name.
    UnknownTheme { name: String },
    /// A lexer declared it cannot tokenize the input at all.
    Lexing { lexer: String, message: String },
    /// A filename or interpreter glob failed to compile.
    InvalidPattern { pattern: String, message: String },
    /// A failure raised by user-supplied lexer or formatter code.
    Extension(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a failure from user-supplied code without altering it.
    pub fn extension<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Extension(err.into())
    }

    pub(crate) fn invalid_value(
        option: &str,
        value: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOptionValue {
            option: option.to_owned(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_lexer(name: &str) -> Self {
        Self::UnknownLexer {
            name: name.to_owned(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLexer { name } => write!(f, "unknown lexer '{name}'"),
            Self::DuplicateLexer { key, claim, owner } => {
                write!(f, "{claim} '{key}' is already claimed by lexer {owner}")
            }
            Self::DuplicateOption { lexer, option } => {
                write!(f, "lexer {lexer} declares option '{option}' more than once")
            }
            Self::UnknownOption { owner, option } => {
                write!(f, "{owner} has no option '{option}'")
            }
            Self::InvalidOptionValue {
                option,
                value,
                reason,
            } => write!(f, "invalid value {value} for option '{option}': {reason}"),
            Self::UnknownFormatter { name } => write!(f, "unknown formatter '{name}'"),
            Self::UnknownTheme { name } => write!(f, "unknown theme '{name}'"),
            Self::Lexing { lexer, message } => write!(f, "lexer {lexer} failed: {message}"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{pattern}': {message}")
            }
            Self::Extension(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Extension(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result alias used throughout sheen.
pub type Result<T> = std::result::Result<T, Error>;
