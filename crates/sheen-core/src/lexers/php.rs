#![forbid(unsafe_code)]

//! PHP, including the markup around `<?php ... ?>` blocks.
//!
//! Outside PHP tags the text is handed to the `secondary` lexer (plain
//! `Text` when unset). Inside, strings with interpolation and heredocs are
//! split into literal, escape and interpolated pieces.

use crate::error::Result;
use crate::lexer::{LexerDescriptor, Machine, Step};
use crate::options::{LexerOptions, OptionDescriptor};
use crate::scan::Scanner;
use crate::token::TokenType;

const CONSTANTS: &[&str] = &["true", "false", "null"];

const TYPES: &[&str] = &[
    "array", "bool", "callable", "float", "int", "iterable", "mixed", "never", "object", "string",
    "void",
];

const DECLARATIONS: &[&str] = &[
    "abstract",
    "class",
    "const",
    "enum",
    "extends",
    "final",
    "fn",
    "function",
    "implements",
    "interface",
    "private",
    "protected",
    "public",
    "readonly",
    "static",
    "trait",
    "var",
];

const OPERATOR_WORDS: &[&str] = &["and", "clone", "instanceof", "new", "or", "xor"];

const RESERVED: &[&str] = &[
    "as",
    "break",
    "case",
    "catch",
    "continue",
    "declare",
    "default",
    "die",
    "do",
    "echo",
    "else",
    "elseif",
    "empty",
    "enddeclare",
    "endfor",
    "endforeach",
    "endif",
    "endswitch",
    "endwhile",
    "eval",
    "exit",
    "finally",
    "for",
    "foreach",
    "global",
    "goto",
    "if",
    "include",
    "include_once",
    "insteadof",
    "isset",
    "list",
    "match",
    "print",
    "require",
    "require_once",
    "return",
    "switch",
    "throw",
    "try",
    "unset",
    "while",
    "yield",
];

const MAGIC_CONSTANTS: &[&str] = &[
    "__CLASS__",
    "__DIR__",
    "__FILE__",
    "__FUNCTION__",
    "__LINE__",
    "__METHOD__",
    "__NAMESPACE__",
    "__TRAIT__",
];

/// Longest first.
const OPERATORS: &[&str] = &[
    "<=>", "**=", "...", "??=", "<<=", ">>=", "!==", "===", "?->", "->", "=>", "::", "++", "--",
    "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "+=", "-=", "*=", "/=", ".=", "%=", "&=", "|=",
    "^=", "<<", ">>", "**", "+", "-", "*", "/", "%", "=", "<", ">", "!", "&", "|", "^", "~", "?",
    ".", "@",
];

static OPTIONS: [OptionDescriptor; 4] = [
    OptionDescriptor::bool(
        "start_inline",
        false,
        "treat the input as PHP code from the start, without an opening tag",
    ),
    OptionDescriptor::bool("short_tags", true, "recognize the short opening tag <?"),
    OptionDescriptor::bool("asp_tags", false, "recognize ASP-style <% and %> tags"),
    OptionDescriptor::lexer("secondary", "lexer for the text outside PHP tags"),
];

fn analyse(src: &str) -> u32 {
    if src.contains("<?php") { 500 } else { 0 }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn contains_ignore_case(words: &[&str], word: &str) -> bool {
    words.iter().any(|w| w.eq_ignore_ascii_case(word))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    /// Markup between PHP blocks.
    Html,
    /// Code inside a PHP block.
    Code,
    /// Body of a `"..."` or backtick string.
    Quoted { close: char, kind: TokenType },
    /// Body of a heredoc (`interpolate`) or nowdoc.
    Heredoc { label: String, interpolate: bool },
}

struct Php {
    state: State,
    /// Class the next identifier gets after a declaring keyword or `->`.
    expect: Option<TokenType>,
}

impl Php {
    fn html(&mut self, s: &mut Scanner<'_>, opts: &LexerOptions) -> Step {
        let short_tags = opts.bool("short_tags");
        let asp_tags = opts.bool("asp_tags");
        if s.eat_str_ignore_case("<?php") || s.eat_str("<?=") {
            self.enter_code();
            return Step::Emit(TokenType::NameTagPreproc);
        }
        if short_tags && s.starts_with("<?") && !s.starts_with_ignore_case("<?xml") {
            s.eat_str("<?");
            self.enter_code();
            return Step::Emit(TokenType::NameTagPreproc);
        }
        if asp_tags && s.starts_with("<%") {
            if !s.eat_str("<%=") {
                s.eat_str("<%");
            }
            self.enter_code();
            return Step::Emit(TokenType::NameTagPreproc);
        }

        let until = next_open_tag(s.rest(), short_tags, asp_tags)
            .map_or(s.source().len(), |at| s.cursor() + at);
        Step::Delegate {
            option: "secondary",
            until,
            fallback: TokenType::Text,
        }
    }

    fn enter_code(&mut self) {
        self.state = State::Code;
        self.expect = None;
    }

    fn code(&mut self, s: &mut Scanner<'_>, opts: &LexerOptions) -> Step {
        if s.eat_str("?>") || (opts.bool("asp_tags") && s.eat_str("%>")) {
            s.eat_newline();
            self.state = State::Html;
            return Step::Emit(TokenType::NameTagPreproc);
        }
        if s.eat_while(char::is_whitespace) > 0 {
            return Step::Emit(TokenType::Whitespace);
        }
        if let Some(kind) = comment(s) {
            return Step::Emit(kind);
        }

        let expect = self.expect.take();
        let kind = self.code_token(s, expect);
        Step::Emit(kind)
    }

    fn code_token(&mut self, s: &mut Scanner<'_>, expect: Option<TokenType>) -> TokenType {
        let Some(c) = s.peek() else {
            return TokenType::Error;
        };
        match c {
            '$' => {
                s.bump();
                if s.eat_if(is_ident_start).is_some() {
                    s.eat_while(is_ident);
                    TokenType::NameVariable
                } else if matches!(s.peek(), Some('$' | '{')) {
                    TokenType::Operator
                } else {
                    TokenType::Error
                }
            }
            '\'' => {
                s.bump();
                single_quoted(s);
                TokenType::StringSingle
            }
            '"' | '`' => {
                s.bump();
                let kind = if c == '"' {
                    TokenType::StringDouble
                } else {
                    TokenType::StringBacktick
                };
                self.state = State::Quoted { close: c, kind };
                kind
            }
            '<' if s.starts_with("<<<") => match heredoc_opener(s) {
                Some((label, interpolate)) => {
                    self.state = State::Heredoc { label, interpolate };
                    TokenType::StringHeredoc
                }
                None => self.operator(s),
            },
            '0'..='9' => number(s),
            '.' if s.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => number(s),
            c if is_ident_start(c) => {
                let start = s.cursor();
                s.eat_while(is_ident);
                self.word(s.since(start), expect)
            }
            '\\' => {
                s.bump();
                // Namespace separators keep a pending name class alive.
                self.expect = expect;
                TokenType::Punctuation
            }
            '#' if s.starts_with("#[") => {
                s.eat_str("#[");
                TokenType::Punctuation
            }
            ';' | ',' | '(' | ')' | '[' | ']' | '{' | '}' | ':' if !s.starts_with("::") => {
                s.bump();
                TokenType::Punctuation
            }
            _ => self.operator(s),
        }
    }

    fn word(&mut self, word: &str, expect: Option<TokenType>) -> TokenType {
        if contains_ignore_case(CONSTANTS, word) {
            TokenType::KeywordConstant
        } else if MAGIC_CONSTANTS.contains(&word) {
            TokenType::NameBuiltinPseudo
        } else if let Some(kind) = expect {
            kind
        } else if contains_ignore_case(TYPES, word) {
            TokenType::KeywordType
        } else if word.eq_ignore_ascii_case("namespace") || word.eq_ignore_ascii_case("use") {
            self.expect = Some(TokenType::NameNamespace);
            TokenType::KeywordNamespace
        } else if contains_ignore_case(DECLARATIONS, word) {
            self.expect = match word.to_ascii_lowercase().as_str() {
                "function" | "fn" => Some(TokenType::NameFunction),
                "class" | "interface" | "trait" | "enum" | "extends" | "implements" => {
                    Some(TokenType::NameClass)
                }
                _ => None,
            };
            TokenType::KeywordDeclaration
        } else if contains_ignore_case(OPERATOR_WORDS, word) {
            if word.eq_ignore_ascii_case("new") || word.eq_ignore_ascii_case("instanceof") {
                self.expect = Some(TokenType::NameClass);
            }
            TokenType::OperatorWord
        } else if contains_ignore_case(RESERVED, word) {
            TokenType::Keyword
        } else {
            TokenType::Name
        }
    }

    fn operator(&mut self, s: &mut Scanner<'_>) -> TokenType {
        match OPERATORS.iter().find(|op| s.starts_with(op)) {
            Some(op) => {
                s.eat_str(op);
                if matches!(*op, "->" | "?->") {
                    self.expect = Some(TokenType::NameAttribute);
                }
                TokenType::Operator
            }
            None => {
                s.bump();
                TokenType::Error
            }
        }
    }

    fn quoted(&mut self, s: &mut Scanner<'_>, close: char, kind: TokenType) -> Step {
        if s.eat(close) {
            self.state = State::Code;
            return Step::Emit(kind);
        }
        if let Some(piece) = interpolation(s) {
            return Step::Emit(piece);
        }
        let eaten = s.eat_while(|c| c != close && c != '\\' && c != '$' && c != '{');
        if eaten == 0 {
            // A `$` or `{` that does not start an interpolation.
            s.bump();
        }
        Step::Emit(kind)
    }

    fn heredoc(&mut self, s: &mut Scanner<'_>, label: &str, interpolate: bool) -> Step {
        let at_line_start = matches!(s.prev(), None | Some('\n' | '\r'));
        if at_line_start {
            let rest = s.rest();
            let indented = rest.trim_start_matches([' ', '\t']);
            if let Some(after) = indented.strip_prefix(label)
                && !after.starts_with(is_ident)
            {
                s.advance_to(s.cursor() + (rest.len() - indented.len()) + label.len());
                self.state = State::Code;
                return Step::Emit(TokenType::StringHeredoc);
            }
        }
        if interpolate && let Some(piece) = interpolation(s) {
            return Step::Emit(piece);
        }
        if interpolate {
            let eaten = s.eat_while(|c| !matches!(c, '\\' | '$' | '{' | '\n' | '\r'));
            if !s.eat_newline() && eaten == 0 {
                s.bump();
            }
        } else {
            s.eat_line();
            s.eat_newline();
        }
        Step::Emit(TokenType::StringHeredoc)
    }
}

/// Byte offset in `rest` of the next PHP opening tag.
fn next_open_tag(rest: &str, short_tags: bool, asp_tags: bool) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(i) = rest[from..].find('<').map(|i| from + i) {
        let tail = &bytes[i..];
        let opens = match tail.get(1) {
            Some(b'?') => {
                let php = tail.len() >= 5 && tail[..5].eq_ignore_ascii_case(b"<?php");
                let echo = tail.starts_with(b"<?=");
                let xml = tail.len() >= 5 && tail[..5].eq_ignore_ascii_case(b"<?xml");
                php || echo || (short_tags && !xml)
            }
            Some(b'%') => asp_tags,
            _ => false,
        };
        if opens {
            return Some(i);
        }
        from = i + 1;
    }
    None
}

/// One-line and block comments.
fn comment(s: &mut Scanner<'_>) -> Option<TokenType> {
    if (s.starts_with("#") && !s.starts_with("#[")) || s.starts_with("//") {
        // `?>` ends a one-line comment as well as the block.
        while let Some(c) = s.peek() {
            if c == '\n' || c == '\r' || s.starts_with("?>") {
                break;
            }
            s.bump();
        }
        return Some(TokenType::CommentSingle);
    }
    if s.starts_with("/**") && s.peek_at(3).is_some_and(char::is_whitespace) {
        s.eat_through("*/");
        return Some(TokenType::CommentDocumentation);
    }
    if s.eat_str("/*") {
        s.eat_through("*/");
        return Some(TokenType::CommentMultiline);
    }
    None
}

/// Rest of a single-quoted string after the opening quote.
fn single_quoted(s: &mut Scanner<'_>) {
    while let Some(c) = s.bump() {
        match c {
            '\\' => {
                s.bump();
            }
            '\'' => return,
            _ => {}
        }
    }
}

/// Escape sequence or interpolated expression inside a string body.
fn interpolation(s: &mut Scanner<'_>) -> Option<TokenType> {
    if s.eat('\\') {
        match s.bump() {
            Some('x') => {
                for _ in 0..2 {
                    s.eat_if(|c| c.is_ascii_hexdigit());
                }
            }
            Some('u') if s.starts_with("{") => {
                s.eat_through("}");
            }
            Some('0'..='7') => {
                for _ in 0..2 {
                    s.eat_if(|c| matches!(c, '0'..='7'));
                }
            }
            _ => {}
        }
        return Some(TokenType::StringEscaped);
    }
    if s.starts_with("{$") || s.starts_with("${") {
        s.bump();
        s.bump();
        let mut depth = 1usize;
        while let Some(c) = s.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        return Some(TokenType::StringInterpolated);
    }
    if s.starts_with("$") && s.peek_at(1).is_some_and(is_ident_start) {
        s.bump();
        s.eat_while(is_ident);
        if s.starts_with("->") && s.peek_at(2).is_some_and(is_ident_start) {
            s.eat_str("->");
            s.eat_while(is_ident);
        } else if s.starts_with("[") {
            let end = s.find("]");
            let stops_early = s.rest().find(['"', '\n']).map(|i| s.cursor() + i);
            if let Some(end) = end
                && stops_early.is_none_or(|stop| end < stop)
            {
                s.advance_to(end + 1);
            }
        }
        return Some(TokenType::StringInterpolated);
    }
    None
}

/// `<<<LABEL`, `<<<"LABEL"` or `<<<'LABEL'` followed by a line break.
fn heredoc_opener(s: &mut Scanner<'_>) -> Option<(String, bool)> {
    let rest = s.rest();
    let after = rest.strip_prefix("<<<")?.trim_start_matches([' ', '\t']);
    let (quote, body) = match after.chars().next() {
        Some(q @ ('"' | '\'')) => (Some(q), &after[1..]),
        _ => (None, after),
    };
    let len = body
        .char_indices()
        .find(|&(i, c)| if i == 0 { !is_ident_start(c) } else { !is_ident(c) })
        .map_or(body.len(), |(i, _)| i);
    if len == 0 {
        return None;
    }
    let label = &body[..len];
    let mut tail = &body[len..];
    if let Some(q) = quote {
        tail = tail.strip_prefix(q)?;
    }
    let newline = if tail.starts_with("\r\n") {
        2
    } else if tail.starts_with(['\n', '\r']) {
        1
    } else {
        return None;
    };
    let consumed = rest.len() - tail.len() + newline;
    s.advance_to(s.cursor() + consumed);
    Some((label.to_owned(), quote != Some('\'')))
}

fn digits(s: &mut Scanner<'_>, radix: u32) -> usize {
    s.eat_while(|c| c.is_digit(radix) || c == '_')
}

fn number(s: &mut Scanner<'_>) -> TokenType {
    if s.eat_str_ignore_case("0x") {
        digits(s, 16);
        return TokenType::NumberHexadecimal;
    }
    if s.eat_str_ignore_case("0b") {
        digits(s, 2);
        return TokenType::NumberBinary;
    }
    if s.eat_str_ignore_case("0o") {
        digits(s, 8);
        return TokenType::NumberOctal;
    }
    let start = s.cursor();
    digits(s, 10);
    let mut float = false;
    // `1.` and `1.5` are floats; `1..2` and `1.foo` are not.
    if s.peek() == Some('.')
        && s.peek_at(1)
            .is_none_or(|c| c.is_ascii_digit() || (c != '.' && !is_ident(c)))
    {
        s.bump();
        digits(s, 10);
        float = true;
    }
    if matches!(s.peek(), Some('e' | 'E')) {
        let signed = matches!(s.peek_at(1), Some('+' | '-'));
        let digit_at = if signed { 2 } else { 1 };
        if s.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
            s.bump();
            if signed {
                s.bump();
            }
            digits(s, 10);
            float = true;
        }
    }
    let text = s.since(start);
    if float {
        TokenType::NumberFloat
    } else if text.len() > 1
        && text.starts_with('0')
        && text.chars().all(|c| c.is_digit(8) || c == '_')
    {
        TokenType::NumberOctal
    } else {
        TokenType::NumberDecimal
    }
}

impl Machine for Php {
    fn step(&mut self, s: &mut Scanner<'_>, opts: &LexerOptions) -> Result<Step> {
        let step = match &self.state {
            State::Html => self.html(s, opts),
            State::Code => self.code(s, opts),
            State::Quoted { close, kind } => {
                let (close, kind) = (*close, *kind);
                self.quoted(s, close, kind)
            }
            State::Heredoc { label, interpolate } => {
                let (label, interpolate) = (label.clone(), *interpolate);
                self.heredoc(s, &label, interpolate)
            }
        };
        Ok(step)
    }
}

fn machine(opts: &LexerOptions) -> Box<dyn Machine> {
    let state = if opts.bool("start_inline") {
        State::Code
    } else {
        State::Html
    };
    Box::new(Php {
        state,
        expect: None,
    })
}

pub static PHP: LexerDescriptor = LexerDescriptor {
    name: "PHP",
    aliases: &["php", "php3", "php4", "php5"],
    mimetypes: &["text/x-php", "application/x-php", "application/x-httpd-php"],
    filenames: &["*.php", "*.php[345]", "*.phtml", "*.inc"],
    interpreters: &["php", "php-*", "php[0-9]*"],
    description: "For PHP source code, embedded in markup or not",
    options: &OPTIONS,
    keywords: &[
        "echo",
        "elseif",
        "endforeach",
        "endif",
        "extends",
        "foreach",
        "function",
        "implements",
        "include_once",
        "isset",
        "namespace",
        "null",
        "private",
        "protected",
        "public",
        "require_once",
        "unset",
        "var_dump",
    ],
    analyse: Some(analyse),
    machine,
};
