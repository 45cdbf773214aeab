#![forbid(unsafe_code)]

//! Plain text: the whole input is one `Text` token.

use crate::error::Result;
use crate::lexer::{LexerDescriptor, Machine, Step};
use crate::options::LexerOptions;
use crate::scan::Scanner;
use crate::token::TokenType;

struct Plain;

impl Machine for Plain {
    fn step(&mut self, scanner: &mut Scanner<'_>, _: &LexerOptions) -> Result<Step> {
        scanner.advance_to(scanner.source().len());
        Ok(Step::Emit(TokenType::Text))
    }
}

fn machine(_: &LexerOptions) -> Box<dyn Machine> {
    Box::new(Plain)
}

pub static TEXT: LexerDescriptor = LexerDescriptor {
    name: "Text",
    aliases: &["txt"],
    mimetypes: &["text/plain"],
    filenames: &["*.txt"],
    interpreters: &[],
    description: "A \"dummy\" lexer that doesn't highlight anything",
    options: &[],
    keywords: &[],
    analyse: None,
    machine,
};
