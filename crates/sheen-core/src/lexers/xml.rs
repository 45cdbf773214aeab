#![forbid(unsafe_code)]

//! XML and HTML markup.

use crate::error::Result;
use crate::lexer::{LexerDescriptor, Machine, Step};
use crate::options::LexerOptions;
use crate::scan::Scanner;
use crate::token::TokenType;

fn analyse(src: &str) -> u32 {
    let head = src.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with("<?xml") {
        450
    } else if head
        .get(..9)
        .is_some_and(|h| h.eq_ignore_ascii_case("<!doctype"))
    {
        250
    } else {
        0
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Content,
    /// Right after `<` or `</`.
    TagName,
    /// Between the tag name and `>`.
    Attributes,
    /// Inside `<![CDATA[ ... ]]>`.
    Cdata,
}

struct Markup {
    state: State,
}

impl Markup {
    fn content(&mut self, s: &mut Scanner<'_>) -> TokenType {
        if s.eat_str("<!--") {
            s.eat_through("-->");
            return TokenType::CommentMultiline;
        }
        if s.eat_str("<![CDATA[") {
            self.state = State::Cdata;
            return TokenType::NameTagPreproc;
        }
        if s.eat_str("<?") {
            s.eat_through("?>");
            return TokenType::NameTagPreproc;
        }
        if s.eat_str("<!") {
            s.eat_through(">");
            return TokenType::KeywordDeclaration;
        }
        if s.starts_with("</") && s.peek_at(2).is_some_and(is_name_start) {
            s.eat_str("</");
            self.state = State::TagName;
            return TokenType::Punctuation;
        }
        if s.starts_with("<") && s.peek_at(1).is_some_and(is_name_start) {
            s.bump();
            self.state = State::TagName;
            return TokenType::Punctuation;
        }
        if s.eat('&') {
            return entity(s);
        }
        if s.eat('<') {
            return TokenType::Error;
        }
        s.eat_while(|c| c != '<' && c != '&');
        TokenType::Text
    }

    fn attributes(&mut self, s: &mut Scanner<'_>) -> TokenType {
        if s.eat_while(char::is_whitespace) > 0 {
            return TokenType::Whitespace;
        }
        if s.eat_str("/>") || s.eat('>') {
            self.state = State::Content;
            return TokenType::Punctuation;
        }
        if s.eat_if(is_name_start).is_some() {
            s.eat_while(is_name);
            return TokenType::NameAttribute;
        }
        if s.eat('=') {
            return TokenType::Operator;
        }
        for (quote, kind) in [('"', TokenType::StringDouble), ('\'', TokenType::StringSingle)] {
            if s.eat(quote) {
                s.eat_while(|c| c != quote && c != '<');
                s.eat(quote);
                return kind;
            }
        }
        if s.starts_with("<") {
            // Unclosed tag: resume as content.
            self.state = State::Content;
            return self.content(s);
        }
        s.bump();
        TokenType::Error
    }
}

/// `&name;`, `&#123;` or `&#x7B;` after the `&`.
fn entity(s: &mut Scanner<'_>) -> TokenType {
    let body = if s.eat('#') {
        if s.eat('x') || s.eat('X') {
            s.eat_while(|c| c.is_ascii_hexdigit())
        } else {
            s.eat_while(|c| c.is_ascii_digit())
        }
    } else {
        s.eat_while(is_name)
    };
    if body > 0 && s.eat(';') {
        TokenType::NameEntity
    } else {
        TokenType::Error
    }
}

impl Machine for Markup {
    fn step(&mut self, s: &mut Scanner<'_>, _: &LexerOptions) -> Result<Step> {
        let kind = match self.state {
            State::Content => self.content(s),
            State::TagName => {
                s.eat_while(is_name);
                self.state = State::Attributes;
                TokenType::NameTag
            }
            State::Attributes => self.attributes(s),
            State::Cdata => {
                if s.eat_str("]]>") {
                    self.state = State::Content;
                    TokenType::NameTagPreproc
                } else {
                    s.eat_until("]]>");
                    TokenType::Text
                }
            }
        };
        Ok(Step::Emit(kind))
    }
}

fn machine(_: &LexerOptions) -> Box<dyn Machine> {
    Box::new(Markup {
        state: State::Content,
    })
}

pub static XML: LexerDescriptor = LexerDescriptor {
    name: "XML",
    aliases: &["xml", "html", "xhtml"],
    mimetypes: &[
        "text/xml",
        "application/xml",
        "image/svg+xml",
        "application/rss+xml",
        "application/atom+xml",
        "text/html",
        "application/xhtml+xml",
    ],
    filenames: &[
        "*.xml", "*.xsl", "*.xslt", "*.xsd", "*.rss", "*.svg", "*.wsdl", "*.html", "*.htm",
        "*.xhtml",
    ],
    interpreters: &[],
    description: "Generic XML and HTML markup",
    options: &[],
    keywords: &[],
    analyse: Some(analyse),
    machine,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, covers_exactly};

    fn lex(src: &str) -> Vec<(TokenType, &str)> {
        let lexer = XML.create();
        let tokens: Vec<Token<'_>> = lexer.tokenize(src).collect::<Result<_>>().unwrap();
        assert!(covers_exactly(src, &tokens));
        tokens.iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn tags_and_attributes() {
        let tokens = lex(r#"<a href="x" id='y' hidden>t&amp;u</a>"#);
        assert_eq!(
            tokens,
            vec![
                (TokenType::Punctuation, "<"),
                (TokenType::NameTag, "a"),
                (TokenType::Whitespace, " "),
                (TokenType::NameAttribute, "href"),
                (TokenType::Operator, "="),
                (TokenType::StringDouble, "\"x\""),
                (TokenType::Whitespace, " "),
                (TokenType::NameAttribute, "id"),
                (TokenType::Operator, "="),
                (TokenType::StringSingle, "'y'"),
                (TokenType::Whitespace, " "),
                (TokenType::NameAttribute, "hidden"),
                (TokenType::Punctuation, ">"),
                (TokenType::Text, "t"),
                (TokenType::NameEntity, "&amp;"),
                (TokenType::Text, "u"),
                (TokenType::Punctuation, "</"),
                (TokenType::NameTag, "a"),
                (TokenType::Punctuation, ">"),
            ]
        );
    }

    #[test]
    fn prolog_comments_and_cdata() {
        let tokens = lex("<?xml version=\"1.0\"?><!DOCTYPE x><!-- c --><![CDATA[<raw>]]><br/>");
        assert_eq!(tokens[0], (TokenType::NameTagPreproc, "<?xml version=\"1.0\"?>"));
        assert_eq!(tokens[1], (TokenType::KeywordDeclaration, "<!DOCTYPE x>"));
        assert_eq!(tokens[2], (TokenType::CommentMultiline, "<!-- c -->"));
        assert_eq!(tokens[3], (TokenType::NameTagPreproc, "<![CDATA["));
        assert_eq!(tokens[4], (TokenType::Text, "<raw>"));
        assert_eq!(tokens[5], (TokenType::NameTagPreproc, "]]>"));
        assert_eq!(tokens.last(), Some(&(TokenType::Punctuation, "/>")));
    }

    #[test]
    fn malformed_markup_yields_errors() {
        let tokens = lex("a < b & c &#; <p <q>");
        assert!(tokens.contains(&(TokenType::Error, "<")));
        assert!(tokens.contains(&(TokenType::Error, "&")));
        assert!(tokens.contains(&(TokenType::Error, "&#")));
        assert!(tokens.contains(&(TokenType::NameTag, "q")));
    }

    #[test]
    fn numeric_entities() {
        let tokens = lex("&#65;&#x41;");
        assert_eq!(
            tokens,
            vec![
                (TokenType::NameEntity, "&#65;"),
                (TokenType::NameEntity, "&#x41;"),
            ]
        );
    }

    #[test]
    fn markers() {
        assert_eq!(analyse("  <?xml version='1.0'?>"), 450);
        assert_eq!(analyse("<!DOCTYPE html>"), 250);
        assert_eq!(analyse("plain"), 0);
    }
}
