#![forbid(unsafe_code)]

//! Typed per-lexer option schema and values.
//!
//! Each lexer class declares its options once in a static
//! [`OptionDescriptor`] table. A [`LexerOptions`] instance holds one value per
//! declared option and only changes through [`LexerOptions::set`], which
//! validates before it mutates.

use std::fmt;

use crate::error::{Error, Result};
use crate::lexer::{Lexer, LexerDescriptor};
use crate::registry::Registry;

/// Declared kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    String,
    /// Reference to a nested lexer, owned by the option.
    Lexer,
    /// A string restricted to the listed choices.
    Enum(&'static [&'static str]),
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::String => f.write_str("string"),
            Self::Lexer => f.write_str("lexer"),
            Self::Enum(choices) => write!(f, "one of {}", choices.join("|")),
        }
    }
}

/// Default value of an option, expressible in a `static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDefault {
    Bool(bool),
    Int(i64),
    Str(&'static str),
    /// Lexer options start out unset.
    NoLexer,
}

impl OptionDefault {
    fn to_value(self) -> OptionValue {
        match self {
            Self::Bool(b) => OptionValue::Bool(b),
            Self::Int(i) => OptionValue::Int(i),
            Self::Str(s) => OptionValue::Str(s.to_owned()),
            Self::NoLexer => OptionValue::Lexer(None),
        }
    }
}

impl fmt::Display for OptionDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}

/// Extra acceptance check run after the kind check.
pub type Validator = fn(&OptionValue) -> bool;

/// One declared option of a lexer class.
#[derive(Debug, Clone, Copy)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub kind: OptionKind,
    pub default: OptionDefault,
    pub doc: &'static str,
    pub validator: Option<Validator>,
}

impl OptionDescriptor {
    /// Boolean option.
    pub const fn bool(name: &'static str, default: bool, doc: &'static str) -> Self {
        Self {
            name,
            kind: OptionKind::Bool,
            default: OptionDefault::Bool(default),
            doc,
            validator: None,
        }
    }

    /// Integer option.
    pub const fn int(name: &'static str, default: i64, doc: &'static str) -> Self {
        Self {
            name,
            kind: OptionKind::Int,
            default: OptionDefault::Int(default),
            doc,
            validator: None,
        }
    }

    /// Free-form string option.
    pub const fn string(name: &'static str, default: &'static str, doc: &'static str) -> Self {
        Self {
            name,
            kind: OptionKind::String,
            default: OptionDefault::Str(default),
            doc,
            validator: None,
        }
    }

    /// Enumerated string option.
    pub const fn choice(
        name: &'static str,
        choices: &'static [&'static str],
        default: &'static str,
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            kind: OptionKind::Enum(choices),
            default: OptionDefault::Str(default),
            doc,
            validator: None,
        }
    }

    /// Nested lexer option, unset by default.
    pub const fn lexer(name: &'static str, doc: &'static str) -> Self {
        Self {
            name,
            kind: OptionKind::Lexer,
            default: OptionDefault::NoLexer,
            doc,
            validator: None,
        }
    }

    /// Attach a custom validator.
    #[must_use]
    pub const fn validated(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Check `value` against this descriptor, resolving lexer names.
    ///
    /// Returns the value that would be stored.
    pub fn accept(&self, value: OptionValue) -> Result<OptionValue> {
        let value = match (self.kind, value) {
            (OptionKind::Bool, v @ OptionValue::Bool(_))
            | (OptionKind::Int, v @ OptionValue::Int(_))
            | (OptionKind::String, v @ OptionValue::Str(_))
            | (OptionKind::Lexer, v @ OptionValue::Lexer(_)) => v,
            (OptionKind::Enum(choices), OptionValue::Str(s)) => {
                match choices.iter().find(|c| c.eq_ignore_ascii_case(&s)) {
                    Some(choice) => OptionValue::Str((*choice).to_owned()),
                    None => {
                        return Err(Error::invalid_value(
                            self.name,
                            OptionValue::Str(s),
                            format!("expected {}", self.kind),
                        ));
                    }
                }
            }
            (OptionKind::Lexer, OptionValue::Str(name)) => {
                let lexer = Registry::global().by_name(&name)?;
                OptionValue::Lexer(Some(Box::new(lexer)))
            }
            (kind, other) => {
                return Err(Error::invalid_value(
                    self.name,
                    other,
                    format!("expected {kind}"),
                ));
            }
        };
        if let Some(validator) = self.validator
            && !validator(&value)
        {
            return Err(Error::invalid_value(self.name, value, "rejected by validator"));
        }
        Ok(value)
    }

    /// Parse a textual value according to the declared kind.
    pub fn parse(&self, raw: &str) -> Result<OptionValue> {
        let parsed = match self.kind {
            OptionKind::Bool => match parse_bool(raw) {
                Some(b) => OptionValue::Bool(b),
                None => {
                    return Err(Error::invalid_value(
                        self.name,
                        format_args!("{raw:?}"),
                        "expected on/off, true/false, yes/no or 1/0",
                    ));
                }
            },
            OptionKind::Int => match raw.trim().parse::<i64>() {
                Ok(i) => OptionValue::Int(i),
                Err(e) => {
                    return Err(Error::invalid_value(
                        self.name,
                        format_args!("{raw:?}"),
                        e.to_string(),
                    ));
                }
            },
            OptionKind::Lexer if raw.is_empty() || raw.eq_ignore_ascii_case("none") => {
                OptionValue::Lexer(None)
            }
            OptionKind::String | OptionKind::Enum(_) | OptionKind::Lexer => {
                OptionValue::Str(raw.to_owned())
            }
        };
        self.accept(parsed)
    }
}

/// Boolean spelling accepted in textual option values. Empty means on, so a
/// bare `key` in a query string enables the option.
pub fn parse_bool(raw: &str) -> Option<bool> {
    const TRUE: [&str; 5] = ["", "on", "true", "yes", "1"];
    const FALSE: [&str; 4] = ["off", "false", "no", "0"];
    let raw = raw.trim();
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(raw)) {
        Some(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(raw)) {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Current value of one option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Nested lexer, exclusively owned by the option.
    Lexer(Option<Box<Lexer>>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The nested lexer, when this is a set lexer reference.
    pub fn as_lexer(&self) -> Option<&Lexer> {
        match self {
            Self::Lexer(Some(lexer)) => Some(lexer),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Lexer(Some(lexer)) => f.write_str(lexer.name()),
            Self::Lexer(None) => f.write_str("none"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Lexer> for OptionValue {
    fn from(lexer: Lexer) -> Self {
        Self::Lexer(Some(Box::new(lexer)))
    }
}

impl From<Box<Lexer>> for OptionValue {
    fn from(lexer: Box<Lexer>) -> Self {
        Self::Lexer(Some(lexer))
    }
}

impl From<&'static LexerDescriptor> for OptionValue {
    fn from(descriptor: &'static LexerDescriptor) -> Self {
        Self::from(descriptor.create())
    }
}

// ---------------------------------------------------------------------------
// LexerOptions
// ---------------------------------------------------------------------------

/// Resolved option values of one lexer instance.
#[derive(Debug, Clone)]
pub struct LexerOptions {
    schema: &'static [OptionDescriptor],
    values: Vec<OptionValue>,
}

/// Equal when both follow the same declared schema and hold equal values.
impl PartialEq for LexerOptions {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl LexerOptions {
    /// Every option at its declared default.
    pub fn defaults(schema: &'static [OptionDescriptor]) -> Self {
        Self {
            schema,
            values: schema.iter().map(|d| d.default.to_value()).collect(),
        }
    }

    /// Declared schema.
    pub fn schema(&self) -> &'static [OptionDescriptor] {
        self.schema
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|d| d.name == name)
    }

    /// Descriptor of `name`, if declared.
    pub fn descriptor(&self, name: &str) -> Option<&'static OptionDescriptor> {
        self.index(name).map(|i| &self.schema[i])
    }

    /// Current value of `name`, if declared.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.index(name).map(|i| &self.values[i])
    }

    /// Validate and store. On error the previous value is kept and `None`
    /// is returned in place of the index of an undeclared option.
    pub(crate) fn set(&mut self, name: &str, value: OptionValue) -> Option<Result<()>> {
        let index = self.index(name)?;
        Some(self.schema[index].accept(value).map(|accepted| {
            self.values[index] = accepted;
        }))
    }

    pub(crate) fn set_str(&mut self, name: &str, raw: &str) -> Option<Result<()>> {
        let index = self.index(name)?;
        Some(self.schema[index].parse(raw).map(|accepted| {
            self.values[index] = accepted;
        }))
    }

    /// Boolean value of `name`; false when undeclared or not a bool.
    pub fn bool(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    /// Integer value of `name`; zero when undeclared or not an int.
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(OptionValue::as_int).unwrap_or(0)
    }

    /// String value of `name`; empty when undeclared or not a string.
    pub fn str(&self, name: &str) -> &str {
        self.get(name).and_then(OptionValue::as_str).unwrap_or("")
    }

    /// Nested lexer in `name`, when set.
    pub fn lexer(&self, name: &str) -> Option<&Lexer> {
        self.get(name).and_then(OptionValue::as_lexer)
    }

    /// Iterate `(descriptor, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static OptionDescriptor, &OptionValue)> + '_ {
        self.schema.iter().zip(self.values.iter())
    }
}
