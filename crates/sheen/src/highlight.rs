#![forbid(unsafe_code)]

//! The highlight pipeline: pick a lexer, tokenize, format.

use sheen_core::{Error, Event, Lexer, Registry, Result, Token, TokenType};
use sheen_format::{Formatter, render_events};

const BOM: &str = "\u{feff}";

/// Highlight `source` and return the formatter's output.
///
/// `lexers` is a fallback chain: the first lexer that tokenizes without
/// signalling [`Error::Lexing`] is used and later ones are never consulted.
/// `Error`-tagged tokens do not count as failure. With an empty chain the
/// lexer is guessed from `source` using the global registry.
///
/// A leading UTF-8 byte order mark is emitted as a `Whitespace` token and a
/// leading `#!` line, with its `\n`, `\r` or `\r\n` break, as a
/// `Comment.Hashbang` token; the lexer sees only what follows. Token offsets
/// always refer to `source`. The formatter's lexer hooks bracket the chosen
/// lexer's output and every nested lexer's, but not the preamble.
///
/// ```
/// use sheen::{HtmlFormatter, highlight, lexer_by_name};
///
/// let mut html = HtmlFormatter::new();
/// let out = highlight("<b>hi</b>", &[lexer_by_name("xml").unwrap()], &mut html).unwrap();
/// assert!(out.starts_with("<pre><span class=\"p\">&lt;</span>"));
/// ```
pub fn highlight(source: &str, lexers: &[Lexer], formatter: &mut dyn Formatter) -> Result<String> {
    highlight_with_registry(Registry::global(), source, lexers, formatter)
}

/// [`highlight`] with a caller-supplied registry for the guess path.
pub fn highlight_with_registry(
    registry: &Registry,
    source: &str,
    lexers: &[Lexer],
    formatter: &mut dyn Formatter,
) -> Result<String> {
    let events = events_with_registry(registry, source, lexers)?;
    render_events(formatter, &events)
}

/// The token stream [`highlight`] would format.
pub fn tokenize<'s>(source: &'s str, lexers: &[Lexer]) -> Result<Vec<Token<'s>>> {
    tokenize_with_registry(Registry::global(), source, lexers)
}

/// [`tokenize`] with a caller-supplied registry for the guess path.
pub fn tokenize_with_registry<'s>(
    registry: &Registry,
    source: &'s str,
    lexers: &[Lexer],
) -> Result<Vec<Token<'s>>> {
    let events = events_with_registry(registry, source, lexers)?;
    Ok(events.into_iter().filter_map(|e| e.token().copied()).collect())
}

/// Tokens and lexer boundaries, in the order [`highlight`] hands them to
/// the formatter.
pub fn events<'s>(source: &'s str, lexers: &[Lexer]) -> Result<Vec<Event<'s>>> {
    events_with_registry(Registry::global(), source, lexers)
}

/// [`events`] with a caller-supplied registry for the guess path.
pub fn events_with_registry<'s>(
    registry: &Registry,
    source: &'s str,
    lexers: &[Lexer],
) -> Result<Vec<Event<'s>>> {
    let (preamble, body_start) = preamble(source);
    let mut events: Vec<_> = preamble.into_iter().map(Event::Token).collect();
    let body = &source[body_start..];

    let guessed;
    let chain = if lexers.is_empty() {
        guessed = [Lexer::new(registry.guess_descriptor(source))];
        &guessed[..]
    } else {
        lexers
    };

    let span = sheen_core::debug_span!("highlight", len = source.len(), candidates = chain.len());
    let _guard = span.enter();

    let mut last_failure = None;
    for lexer in chain {
        match lexer.events(body).collect::<Result<Vec<_>>>() {
            Ok(body_events) => {
                sheen_core::debug!(lexer = lexer.name(), events = body_events.len(), "tokenized");
                events.extend(body_events.into_iter().map(|e| e.rebased(body_start)));
                return Ok(events);
            }
            Err(err @ Error::Lexing { .. }) => {
                sheen_core::warn!(lexer = lexer.name(), error = %err, "lexer gave up; trying next");
                last_failure = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    // The chain is never empty here, so a failure was recorded.
    Err(last_failure.unwrap_or_else(|| Error::Lexing {
        lexer: String::new(),
        message: "no lexer available".to_owned(),
    }))
}

/// Tokens for a leading BOM and `#!` line, plus the byte offset where the
/// lexer's input starts.
fn preamble(source: &str) -> (Vec<Token<'_>>, usize) {
    let mut tokens = Vec::new();
    let mut start = 0;
    if source.starts_with(BOM) {
        tokens.push(Token::new(TokenType::Whitespace, BOM, 0));
        start = BOM.len();
    }
    let rest = &source[start..];
    if rest.len() > 2
        && rest.starts_with("#!")
        && let Some(eol) = rest.find(['\n', '\r'])
    {
        let end = if rest[eol..].starts_with("\r\n") { eol + 2 } else { eol + 1 };
        let line = &rest[..end];
        tokens.push(Token::new(TokenType::CommentHashbang, line, start));
        start += line.len();
    }
    (tokens, start)
}
