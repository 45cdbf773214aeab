#![forbid(unsafe_code)]

//! Unified and context diffs, classified a line at a time.

use crate::error::Result;
use crate::lexer::{LexerDescriptor, Machine, Step};
use crate::options::LexerOptions;
use crate::scan::Scanner;
use crate::token::TokenType;

fn analyse(src: &str) -> u32 {
    if src.starts_with("Index: ") || src.starts_with("diff ") {
        999
    } else if src.starts_with("--- ") {
        600
    } else {
        0
    }
}

fn classify(line: &str) -> TokenType {
    match line.as_bytes().first() {
        Some(b'+') => TokenType::GenericInserted,
        Some(b'-') => TokenType::GenericDeleted,
        Some(b'!') => TokenType::GenericStrong,
        Some(b'@') => TokenType::GenericSubheading,
        Some(b'=') => TokenType::GenericHeading,
        _ if line.starts_with("Index") || line.starts_with("index") => TokenType::GenericHeading,
        _ if line.starts_with("diff") => TokenType::GenericHeading,
        _ => TokenType::Text,
    }
}

struct Lines;

impl Machine for Lines {
    fn step(&mut self, scanner: &mut Scanner<'_>, _: &LexerOptions) -> Result<Step> {
        let start = scanner.cursor();
        scanner.eat_line();
        let kind = classify(scanner.since(start));
        scanner.eat_newline();
        Ok(Step::Emit(kind))
    }
}

fn machine(_: &LexerOptions) -> Box<dyn Machine> {
    Box::new(Lines)
}

pub static DIFF: LexerDescriptor = LexerDescriptor {
    name: "Diff",
    aliases: &["udiff"],
    mimetypes: &["text/x-diff", "text/x-patch"],
    filenames: &["*.diff", "*.patch"],
    interpreters: &[],
    description: "Lexer for unified or context-style diffs or patches",
    options: &[],
    keywords: &[],
    analyse: Some(analyse),
    machine,
};
