#![forbid(unsafe_code)]

//! Language guessing.
//!
//! Every registered class gets a score made of independent signals:
//!
//! | signal | score |
//! |---|---|
//! | shebang interpreter matches one of the class's interpreter globs | 1000 |
//! | the class's `analyse` marker function | as returned |
//! | keyword density in the first [`DENSITY_WINDOW`] bytes | 0..=100 |
//!
//! The strictly highest score wins. Ties go to the class registered first, so
//! the outcome depends only on the sample and the registration order. When
//! nothing scores, the plain-text class is chosen.

use crate::error::Result;
use crate::lexer::{Lexer, LexerDescriptor};
use crate::options::OptionValue;
use crate::registry::Registry;

/// Score awarded to a shebang interpreter match.
pub const SHEBANG_SCORE: u32 = 1000;

/// Upper bound of the keyword-density signal.
pub const KEYWORD_SCORE_MAX: u32 = 100;

/// Bytes of the sample inspected for keyword density.
pub const DENSITY_WINDOW: usize = 4096;

const BOM: char = '\u{feff}';

/// Interpreter basename from a leading `#!` line.
///
/// A UTF-8 BOM before the `#!` is skipped. `/usr/bin/env` is followed to the
/// first argument that is not a `-flag`.
pub fn shebang_interpreter(sample: &str) -> Option<&str> {
    let line = sample.strip_prefix(BOM).unwrap_or(sample).strip_prefix("#!")?;
    let line = line.split(['\n', '\r']).next().unwrap_or("");
    let mut words = line.split_whitespace();
    let program = basename(words.next()?);
    if program != "env" {
        return Some(program);
    }
    words.find(|w| !w.starts_with('-')).map(basename)
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Percentage of words in the first [`DENSITY_WINDOW`] bytes that are listed in
/// `keywords`, capped at [`KEYWORD_SCORE_MAX`].
pub fn keyword_density(sample: &str, keywords: &[&str]) -> u32 {
    if keywords.is_empty() {
        return 0;
    }
    let mut end = sample.len().min(DENSITY_WINDOW);
    while !sample.is_char_boundary(end) {
        end -= 1;
    }
    let (mut words, mut hits) = (0u64, 0u64);
    for word in sample[..end]
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
    {
        words += 1;
        if keywords.contains(&word) {
            hits += 1;
        }
    }
    if words == 0 {
        return 0;
    }
    let density = hits * u64::from(KEYWORD_SCORE_MAX) / words;
    u32::try_from(density).map_or(KEYWORD_SCORE_MAX, |d| d.min(KEYWORD_SCORE_MAX))
}

/// Combined score of one class for `sample`.
pub fn score(descriptor: &LexerDescriptor, claims_interpreter: bool, sample: &str) -> u32 {
    let mut total = 0u32;
    if claims_interpreter {
        total = total.saturating_add(SHEBANG_SCORE);
    }
    if let Some(analyse) = descriptor.analyse {
        total = total.saturating_add(analyse(sample));
    }
    total.saturating_add(keyword_density(sample, descriptor.keywords))
}

impl Registry {
    /// Per-class scores for `sample`, in registration order.
    pub fn scores(&self, sample: &str) -> Vec<(&'static LexerDescriptor, u32)> {
        let interpreter = shebang_interpreter(sample);
        self.list()
            .iter()
            .enumerate()
            .map(|(index, &descriptor)| {
                let claims = interpreter.is_some_and(|i| self.claims_interpreter(index, i));
                let total = score(descriptor, claims, sample);
                crate::trace!(lexer = descriptor.name, score = total, "guess candidate");
                (descriptor, total)
            })
            .collect()
    }

    /// Best-scoring class for `sample`.
    pub fn guess_descriptor(&self, sample: &str) -> &'static LexerDescriptor {
        let mut best: Option<(&'static LexerDescriptor, u32)> = None;
        for (descriptor, total) in self.scores(sample) {
            if total > best.map_or(0, |(_, s)| s) {
                best = Some((descriptor, total));
            }
        }
        let chosen = best.map_or_else(|| self.text_descriptor(), |(d, _)| d);
        crate::debug!(
            lexer = chosen.name,
            score = best.map_or(0, |(_, s)| s),
            "guessed lexer"
        );
        chosen
    }

    /// Guess a lexer for `sample` and apply `hints`.
    ///
    /// Hints name options the chosen class may or may not declare; undeclared
    /// ones are skipped, invalid values are errors.
    pub fn guess<I, K, V>(&self, sample: &str, hints: I) -> Result<Lexer>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<OptionValue>,
    {
        let descriptor = self.guess_descriptor(sample);
        let mut lexer = Lexer::new(descriptor);
        for (name, value) in hints {
            let name = name.as_ref();
            if descriptor.option(name).is_none() {
                crate::debug!(lexer = descriptor.name, option = name, "hint not declared; skipped");
                continue;
            }
            lexer.set_option(name, value)?;
        }
        Ok(lexer)
    }
}

/// Guess with the global registry.
pub fn guess<I, K, V>(sample: &str, hints: I) -> Result<Lexer>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<OptionValue>,
{
    Registry::global().guess(sample, hints)
}
