#![forbid(unsafe_code)]

//! Lexer classes, instances and the state-machine driver.
//!
//! A lexer class is a static [`LexerDescriptor`]. Its grammar is a
//! [`Machine`]: a small state enum whose [`Machine::step`] consumes input
//! through a [`Scanner`] and says what the consumed span is. The driver,
//! [`Tokens`], turns steps into tokens and owns the two guarantees every
//! lexer must give:
//!
//! - **Coverage**: emitted texts concatenate to the input, in order.
//! - **Progress**: every token is at least one character long. A step that
//!   consumes nothing is answered with a one-character `Error` token.
//!
//! # Delegation
//!
//! A step may hand the span up to an offset to the lexer held in one of the
//! instance's lexer options ([`Step::Delegate`]). The outer machine keeps
//! owning the markers around that span; the nested lexer sees only the
//! interior and its tokens are rebased to absolute offsets.
//!
//! [`Lexer::events`] reports those hand-overs as [`Event::Enter`] and
//! [`Event::Leave`] around the nested lexer's tokens, so a formatter can
//! mark where one language is embedded in another.

use std::fmt;

use crate::error::{Error, Result};
use crate::options::{LexerOptions, OptionDescriptor, OptionValue};
use crate::scan::Scanner;
use crate::token::{Token, TokenType};

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Outcome of one state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Emit the text consumed during this step.
    Emit(TokenType),
    /// Hand the text from the step start up to `until` (absolute, exclusive)
    /// to the lexer stored in `option`. When the option is unset the span is
    /// emitted as a single `fallback` token.
    Delegate {
        option: &'static str,
        until: usize,
        fallback: TokenType,
    },
    /// Stop. Any text left is emitted as one `Error` token.
    Done,
}

/// A lexer grammar as a state machine.
///
/// Implementations are constructed fresh for every scan, so they may keep
/// any mutable state they like.
pub trait Machine {
    /// Consume input for the next token and classify it.
    ///
    /// Returning `Err` aborts the scan. Reserve that for input the grammar
    /// cannot handle at all; unrecognized characters should be emitted as
    /// [`TokenType::Error`] instead.
    fn step(&mut self, scanner: &mut Scanner<'_>, options: &LexerOptions) -> Result<Step>;
}

/// Marker score function used by the guesser.
pub type Analyse = fn(&str) -> u32;

/// Builds a fresh machine for one scan.
pub type MachineFactory = fn(&LexerOptions) -> Box<dyn Machine>;

// ---------------------------------------------------------------------------
// LexerDescriptor
// ---------------------------------------------------------------------------

/// Immutable metadata and factory of one lexer class.
pub struct LexerDescriptor {
    /// Canonical display name, unique in a registry.
    pub name: &'static str,
    /// Lowercase lookup names.
    pub aliases: &'static [&'static str],
    pub mimetypes: &'static [&'static str],
    /// Glob patterns matched against file basenames.
    pub filenames: &'static [&'static str],
    /// Glob patterns matched against the shebang interpreter basename.
    pub interpreters: &'static [&'static str],
    pub description: &'static str,
    pub options: &'static [OptionDescriptor],
    /// Words whose density in a sample hints at this language.
    pub keywords: &'static [&'static str],
    pub analyse: Option<Analyse>,
    pub machine: MachineFactory,
}

impl LexerDescriptor {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    #[inline]
    pub fn mimetypes(&self) -> &'static [&'static str] {
        self.mimetypes
    }

    /// Declared option schema.
    #[inline]
    pub fn options(&self) -> &'static [OptionDescriptor] {
        self.options
    }

    /// Declared option called `name`.
    pub fn option(&self, name: &str) -> Option<&'static OptionDescriptor> {
        self.options.iter().find(|o| o.name == name)
    }

    /// New instance with default options.
    pub fn create(&'static self) -> Lexer {
        Lexer::new(self)
    }
}

impl fmt::Debug for LexerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexerDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("mimetypes", &self.mimetypes)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// A lexer instance: a class plus its option values.
#[derive(Debug, Clone)]
pub struct Lexer {
    descriptor: &'static LexerDescriptor,
    options: LexerOptions,
}

impl PartialEq for Lexer {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.descriptor, other.descriptor) && self.options == other.options
    }
}

impl Lexer {
    /// Instance of `descriptor` with default options.
    pub fn new(descriptor: &'static LexerDescriptor) -> Self {
        Self {
            descriptor,
            options: LexerOptions::defaults(descriptor.options),
        }
    }

    /// Instance with `options` applied in order. Stops at the first rejection.
    pub fn with_options<I, K, V>(descriptor: &'static LexerDescriptor, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OptionValue>,
    {
        let mut lexer = Self::new(descriptor);
        for (name, value) in options {
            lexer.set_option(name.as_ref(), value)?;
        }
        Ok(lexer)
    }

    #[inline]
    pub fn descriptor(&self) -> &'static LexerDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    #[inline]
    pub fn aliases(&self) -> &'static [&'static str] {
        self.descriptor.aliases
    }

    #[inline]
    pub fn mimetypes(&self) -> &'static [&'static str] {
        self.descriptor.mimetypes
    }

    #[inline]
    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    fn unknown_option(&self, name: &str) -> Error {
        Error::UnknownOption {
            owner: self.name().to_owned(),
            option: name.to_owned(),
        }
    }

    /// Validate and store an option value.
    ///
    /// A string given to a lexer option is resolved through the global
    /// registry. On any error the previous value is kept.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        match self.options.set(name, value) {
            Some(result) => result,
            None => Err(self.unknown_option(name)),
        }
    }

    /// Parse `raw` according to the option's kind, then store it.
    pub fn set_option_str(&mut self, name: &str, raw: &str) -> Result<()> {
        match self.options.set_str(name, raw) {
            Some(result) => result,
            None => Err(self.unknown_option(name)),
        }
    }

    /// Current value of an option. Lexer options return the stored instance
    /// itself, not a copy.
    pub fn get_option(&self, name: &str) -> Result<&OptionValue> {
        self.options.get(name).ok_or_else(|| self.unknown_option(name))
    }

    /// Lazily tokenize `source`.
    ///
    /// Each call starts a fresh scan; the same source and options always
    /// produce the same tokens.
    pub fn tokenize<'l, 's>(&'l self, source: &'s str) -> Tokens<'l, 's> {
        Tokens::new(self, source, 0)
    }

    /// Tokenize all of `source`, failing on the first fatal lexer error.
    pub fn tokens<'s>(&self, source: &'s str) -> Result<Vec<Token<'s>>> {
        self.tokenize(source).collect()
    }

    /// Lazily tokenize `source`, bracketing the output of this lexer and of
    /// every nested one with [`Event::Enter`] and [`Event::Leave`].
    pub fn events<'l, 's>(&'l self, source: &'s str) -> Events<'l, 's> {
        Events {
            tokens: Tokens::new(self, source, 0),
            entered: false,
            left: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One item of a token stream that also reports lexer boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'s> {
    /// The named lexer starts on its span.
    Enter(&'static str),
    Token(Token<'s>),
    /// The lexer entered last is done.
    Leave(&'static str),
}

impl<'s> Event<'s> {
    #[must_use]
    pub fn token(&self) -> Option<&Token<'s>> {
        match self {
            Self::Token(token) => Some(token),
            Self::Enter(_) | Self::Leave(_) => None,
        }
    }

    /// Shift a carried token's offset by `by` bytes.
    #[must_use]
    pub fn rebased(self, by: usize) -> Self {
        match self {
            Self::Token(token) => Self::Token(token.rebased(by)),
            other => other,
        }
    }
}

/// Lazy event stream produced by [`Lexer::events`].
///
/// Yields `Err` at most once and stops there without a closing `Leave`.
pub struct Events<'l, 's> {
    tokens: Tokens<'l, 's>,
    entered: bool,
    left: bool,
}

impl<'l, 's> Iterator for Events<'l, 's> {
    type Item = Result<Event<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.entered {
            self.entered = true;
            return Some(Ok(Event::Enter(self.tokens.lexer_name())));
        }
        if self.left {
            return None;
        }
        match self.tokens.next_event() {
            Some(Ok(event)) => Some(Ok(event)),
            Some(Err(err)) => {
                self.left = true;
                Some(Err(err))
            }
            None => {
                self.left = true;
                Some(Ok(Event::Leave(self.tokens.lexer_name())))
            }
        }
    }
}

impl std::iter::FusedIterator for Events<'_, '_> {}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Lazy token stream produced by [`Lexer::tokenize`].
///
/// Yields `Err` at most once; the stream is fused afterwards.
pub struct Tokens<'l, 's> {
    lexer: &'l Lexer,
    machine: Box<dyn Machine>,
    scanner: Scanner<'s>,
    base: usize,
    child: Option<Box<Tokens<'l, 's>>>,
    done: bool,
}

impl<'l, 's> Tokens<'l, 's> {
    fn new(lexer: &'l Lexer, source: &'s str, base: usize) -> Self {
        Self {
            lexer,
            machine: (lexer.descriptor.machine)(&lexer.options),
            scanner: Scanner::new(source),
            base,
            child: None,
            done: false,
        }
    }

    /// Name of the lexer driving this stream.
    pub fn lexer_name(&self) -> &'static str {
        self.lexer.name()
    }

    fn token(&self, kind: TokenType, start: usize, end: usize) -> Token<'s> {
        let text = &self.scanner.source()[start..end];
        Token::new(kind, text, self.base + start)
    }

    /// One-character `Error` token at `start`, used when a step made no progress.
    fn stall(&mut self, start: usize) -> Token<'s> {
        self.scanner.bump();
        crate::trace!(
            lexer = self.lexer.name(),
            offset = self.base + start,
            "no progress; emitting error"
        );
        self.token(TokenType::Error, start, self.scanner.cursor())
    }

    fn fail(&mut self, err: Error) -> Option<Result<Event<'s>>> {
        self.done = true;
        self.child = None;
        Some(Err(err))
    }

    fn drain_child(&mut self) -> Option<Result<Event<'s>>> {
        let child = self.child.as_mut()?;
        match child.next_event() {
            Some(Ok(event)) => Some(Ok(event)),
            Some(Err(err)) => self.fail(err),
            None => {
                let nested = child.lexer_name();
                self.child = None;
                Some(Ok(Event::Leave(nested)))
            }
        }
    }

    /// Next token or nested-lexer boundary.
    fn next_event(&mut self) -> Option<Result<Event<'s>>> {
        loop {
            if let Some(item) = self.drain_child() {
                return Some(item);
            }
            if self.done || self.scanner.is_eof() {
                self.done = true;
                return None;
            }

            let start = self.scanner.cursor();
            let step = match self.machine.step(&mut self.scanner, &self.lexer.options) {
                Ok(step) => step,
                Err(err) => return self.fail(err),
            };
            match step {
                Step::Emit(kind) => {
                    let end = self.scanner.cursor();
                    if end > start {
                        return Some(Ok(Event::Token(self.token(kind, start, end))));
                    }
                    return Some(Ok(Event::Token(self.stall(start))));
                }
                Step::Delegate {
                    option,
                    until,
                    fallback,
                } => {
                    // The span runs from the step start; anything the machine
                    // consumed before returning belongs to it.
                    self.scanner.advance_to(until);
                    let end = self.scanner.cursor();
                    if end == start {
                        return Some(Ok(Event::Token(self.stall(start))));
                    }

                    let lexer: &'l Lexer = self.lexer;
                    let nested = match lexer.options.get(option) {
                        Some(OptionValue::Lexer(nested)) => nested.as_deref(),
                        _ => {
                            return self.fail(Error::UnknownOption {
                                owner: self.lexer.name().to_owned(),
                                option: option.to_owned(),
                            });
                        }
                    };
                    match nested {
                        Some(nested) => {
                            crate::trace!(
                                lexer = self.lexer.name(),
                                nested = nested.name(),
                                start = self.base + start,
                                end = self.base + end,
                                "delegating span"
                            );
                            let interior = &self.scanner.source()[start..end];
                            self.child =
                                Some(Box::new(Tokens::new(nested, interior, self.base + start)));
                            return Some(Ok(Event::Enter(nested.name())));
                        }
                        None => return Some(Ok(Event::Token(self.token(fallback, start, end)))),
                    }
                }
                Step::Done => {
                    self.done = true;
                    let end = self.scanner.source().len();
                    if end > start {
                        self.scanner.advance_to(end);
                        return Some(Ok(Event::Token(self.token(TokenType::Error, start, end))));
                    }
                    return None;
                }
            }
        }
    }
}

impl<'l, 's> Iterator for Tokens<'l, 's> {
    type Item = Result<Token<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_event()? {
                Ok(Event::Token(token)) => return Some(Ok(token)),
                Ok(Event::Enter(_) | Event::Leave(_)) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_, '_> {}
