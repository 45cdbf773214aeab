//! End-to-end tests of the highlight pipeline.

use std::thread;

use sheen::{
    Error, Event, Formatter, HtmlFormatter, Lexer, LexerDescriptor, LexerOptions, Machine,
    OptionValue, PlainFormatter, Registry, Result, Scanner, Step, TerminalFormatter, Token,
    TokenType, covers_exactly, events, highlight, highlight_with_registry, lexer_by_name,
    lexer_guess, strip_sgr, tokenize,
};

const SAMPLE: &str =
    "#!/usr/bin/env php54\n\necho 'Hello world';\n?><html><style>background: <?= $foo ?>;";

// ── Helpers ─────────────────────────────────────────────────────────────

/// Gives up on any input containing a NUL byte, like a binary-file sniffer.
struct RefusesBinary;

impl Machine for RefusesBinary {
    fn step(&mut self, s: &mut Scanner<'_>, _: &LexerOptions) -> Result<Step> {
        if s.source().contains('\0') {
            return Err(Error::Lexing {
                lexer: "Strict".into(),
                message: "binary input".into(),
            });
        }
        s.eat_while(|_| true);
        Ok(Step::Emit(TokenType::Keyword))
    }
}

fn refuses_binary(_: &LexerOptions) -> Box<dyn Machine> {
    Box::new(RefusesBinary)
}

static STRICT: LexerDescriptor = LexerDescriptor {
    name: "Strict",
    aliases: &["strict"],
    mimetypes: &[],
    filenames: &[],
    interpreters: &[],
    description: "refuses binary input",
    options: &[],
    keywords: &[],
    analyse: None,
    machine: refuses_binary,
};

#[derive(Debug)]
struct Broken;

impl std::fmt::Display for Broken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("broken grammar")
    }
}

impl std::error::Error for Broken {}

struct Crashes;

impl Machine for Crashes {
    fn step(&mut self, _: &mut Scanner<'_>, _: &LexerOptions) -> Result<Step> {
        Err(Error::extension(Broken))
    }
}

fn crashes(_: &LexerOptions) -> Box<dyn Machine> {
    Box::new(Crashes)
}

static CRASHES: LexerDescriptor = LexerDescriptor {
    name: "Crashes",
    aliases: &[],
    mimetypes: &[],
    filenames: &[],
    interpreters: &[],
    description: "fails with a user error",
    options: &[],
    keywords: &[],
    analyse: None,
    machine: crashes,
};

fn plain(source: &str, lexers: &[Lexer]) -> String {
    highlight(source, lexers, &mut PlainFormatter::new()).unwrap()
}

// ═════════════════════════════════════════════════════════════════════════
// End-to-end sample
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn sample_is_guessed_as_php_and_round_trips_through_the_terminal() {
    let php = lexer_guess(SAMPLE, [("start_inline", true)]).unwrap();
    assert_eq!(php.name(), "PHP");
    assert_eq!(php.get_option("start_inline").unwrap(), &OptionValue::Bool(true));

    let out = highlight(SAMPLE, &[php.clone()], &mut TerminalFormatter::new()).unwrap();
    assert!(!out.is_empty());
    assert!(out.contains('\x1b'));
    assert_eq!(strip_sgr(&out), SAMPLE);

    let tokens = tokenize(SAMPLE, &[php]).unwrap();
    assert!(covers_exactly(SAMPLE, &tokens));
    assert_eq!(
        tokens[0],
        Token::new(TokenType::CommentHashbang, "#!/usr/bin/env php54\n", 0)
    );
    assert!(tokens.contains(&Token::new(TokenType::Keyword, "echo", 22)));
    assert!(
        tokens
            .iter()
            .any(|t| t.kind == TokenType::StringSingle && t.text == "'Hello world'")
    );
    assert!(tokens.iter().any(|t| t.kind == TokenType::NameVariable && t.text == "$foo"));
}

#[test]
fn html_output_is_escaped_and_keeps_the_text() {
    let php = lexer_guess(SAMPLE, [("start_inline", true)]).unwrap();
    let out = highlight(SAMPLE, &[php], &mut HtmlFormatter::new()).unwrap();
    assert!(out.starts_with("<pre><span class=\"ch\">#!/usr/bin/env php54\n</span>"));
    assert!(out.ends_with("</pre>"));
    assert!(out.contains("&lt;html&gt;"));
    assert!(out.contains("<span class=\"k\">echo</span>"));
}

// ═════════════════════════════════════════════════════════════════════════
// Fallback chain
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn failing_lexer_falls_back_to_the_next() {
    let source = "bin\0ary";
    let text = lexer_by_name("text").unwrap();
    let chained = plain(source, &[STRICT.create(), text.clone()]);
    assert_eq!(chained, plain(source, &[text]));
    assert_eq!(chained, "Text: \"bin\\0ary\"\n");
}

#[test]
fn first_success_wins_and_later_lexers_are_ignored() {
    let source = "fine";
    let out = plain(source, &[STRICT.create(), CRASHES.create()]);
    assert_eq!(out, "Keyword: \"fine\"\n");
}

#[test]
fn error_tokens_are_not_failure() {
    let source = "a < b";
    let xml = lexer_by_name("xml").unwrap();
    let out = plain(source, &[xml, lexer_by_name("text").unwrap()]);
    assert!(out.contains("Error: \"<\""));
}

#[test]
fn exhausted_chain_reports_the_last_failure() {
    let err = highlight(
        "\0",
        &[STRICT.create(), STRICT.create()],
        &mut PlainFormatter::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Lexing { ref message, .. } if message == "binary input"));
}

#[test]
fn extension_errors_propagate_without_fallback() {
    let err = highlight(
        "x",
        &[CRASHES.create(), lexer_by_name("text").unwrap()],
        &mut PlainFormatter::new(),
    )
    .unwrap_err();
    let Error::Extension(inner) = err else {
        panic!("expected the user error");
    };
    assert!(inner.downcast_ref::<Broken>().is_some());
}

// ═════════════════════════════════════════════════════════════════════════
// Guessing
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn empty_chain_guesses_from_the_source() {
    let source = "<?xml version=\"1.0\"?>\n<root a='1'/>";
    let guessed = plain(source, &[]);
    assert_eq!(guessed, plain(source, &[lexer_by_name("xml").unwrap()]));

    let diff = "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n";
    assert!(plain(diff, &[]).contains("Generic.Inserted: \"+y\\n\""));
}

#[test]
fn custom_registry_drives_the_guess() {
    static MARKED: LexerDescriptor = LexerDescriptor {
        name: "Marked",
        aliases: &["marked"],
        mimetypes: &[],
        filenames: &[],
        interpreters: &["marked"],
        description: "claims #!marked scripts",
        options: &[],
        keywords: &[],
        analyse: None,
        machine: refuses_binary,
    };
    let mut registry = Registry::with_builtins();
    registry.register(&MARKED).unwrap();

    let source = "#!/usr/bin/marked\nbody";
    let out = highlight_with_registry(&registry, source, &[], &mut PlainFormatter::new()).unwrap();
    assert_eq!(
        out,
        "Comment.Hashbang: \"#!/usr/bin/marked\\n\"\nKeyword: \"body\"\n"
    );
    // The global registry does not know the class.
    assert!(plain(source, &[]).ends_with("Text: \"body\"\n"));
}

// ═════════════════════════════════════════════════════════════════════════
// Formatter composition
// ═════════════════════════════════════════════════════════════════════════

/// HTML that hides comment text, delegating everything else.
struct Redacting {
    inner: HtmlFormatter,
    redacted: usize,
}

impl Formatter for Redacting {
    fn name(&self) -> &str {
        "redacting"
    }

    fn start_document(&mut self) -> Result<String> {
        self.inner.start_document()
    }

    fn end_document(&mut self) -> Result<String> {
        let body = self.inner.end_document()?;
        Ok(format!("{body}<!-- {} redacted -->", self.redacted))
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        self.inner.start_token(kind)
    }

    fn end_token(&mut self, kind: TokenType) -> Result<String> {
        self.inner.end_token(kind)
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        if token.kind.is_a(TokenType::Comment) {
            self.redacted += 1;
            return Ok("…".to_owned());
        }
        self.inner.write_token(token)
    }
}

#[test]
fn composed_formatter_overrides_one_step() {
    let mut php = lexer_by_name("php").unwrap();
    php.set_option("start_inline", true).unwrap();
    let mut formatter = Redacting {
        inner: HtmlFormatter::new().with_css_class("code"),
        redacted: 0,
    };
    let out = highlight("$a = 1; // secret\n", &[php], &mut formatter).unwrap();
    assert!(out.starts_with("<pre class=\"code\">"));
    assert!(out.contains("<span class=\"c1\">…</span>"));
    assert!(!out.contains("secret"));
    assert!(out.ends_with("</pre><!-- 1 redacted -->"));
}

// ═════════════════════════════════════════════════════════════════════════
// Options, determinism and threads
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn nested_lexer_option_returns_the_stored_instance() {
    let xml = lexer_by_name("xml").unwrap();
    let mut php = lexer_by_name("php").unwrap();
    php.set_option("secondary", xml.clone()).unwrap();

    let Ok(OptionValue::Lexer(Some(stored))) = php.get_option("secondary") else {
        panic!("secondary should hold a lexer");
    };
    assert_eq!(**stored, xml);
    assert!(std::ptr::eq(stored.descriptor(), xml.descriptor()));

    let out = plain("<?php $a ?><b>", &[php]);
    assert!(out.contains("Name.Tag: \"b\""));
}

#[test]
fn repeated_calls_are_byte_identical() {
    let php = lexer_guess(SAMPLE, [("start_inline", true)]).unwrap();
    let mut formatter = HtmlFormatter::new();
    let first = highlight(SAMPLE, std::slice::from_ref(&php), &mut formatter).unwrap();
    for _ in 0..3 {
        assert_eq!(highlight(SAMPLE, std::slice::from_ref(&php), &mut formatter).unwrap(), first);
    }
}

#[test]
fn independent_instances_run_in_parallel() {
    let expected = {
        let php = lexer_guess(SAMPLE, [("start_inline", true)]).unwrap();
        highlight(SAMPLE, &[php], &mut TerminalFormatter::new()).unwrap()
    };
    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let php = lexer_guess(SAMPLE, [("start_inline", true)]).unwrap();
                    highlight(SAMPLE, &[php], &mut TerminalFormatter::new()).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn empty_source_renders_only_the_document_frame() {
    assert_eq!(
        highlight("", &[], &mut HtmlFormatter::new()).unwrap(),
        "<pre></pre>"
    );
    assert_eq!(plain("", &[]), "");
}

#[test]
fn nested_lexers_are_bracketed_by_events() {
    let mut php = lexer_by_name("php").unwrap();
    php.set_option("secondary", lexer_by_name("xml").unwrap()).unwrap();
    let source = "<a/><?php echo 1; ?>";

    let events = events(source, std::slice::from_ref(&php)).unwrap();
    let marks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::Enter(name) => Some(format!("+{name}")),
            Event::Leave(name) => Some(format!("-{name}")),
            Event::Token(_) => None,
        })
        .collect();
    assert_eq!(marks, ["+PHP", "+XML", "-XML", "-PHP"]);
    let tokens: Vec<_> = events.iter().filter_map(|e| e.token().copied()).collect();
    assert_eq!(tokens, tokenize(source, &[php.clone()]).unwrap());

    let mut html = HtmlFormatter::new().with_lexer_spans(true);
    let out = highlight(source, &[php], &mut html).unwrap();
    assert!(out.starts_with("<pre><span class=\"PHP\"><span class=\"XML\">"), "{out}");
    assert!(out.ends_with("</span></pre>"));
}
