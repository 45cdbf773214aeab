//! Property-based tests of the whole pipeline.
//!
//! 1. Guessed or explicit, the token stream covers the source, preamble included.
//! 2. Terminal output minus SGR sequences is the source.
//! 3. The guess and the output are pure functions of the source.

use proptest::prelude::*;
use sheen::{
    ColorProfile, HtmlFormatter, Registry, TerminalFormatter, covers_exactly, highlight,
    lexer_by_name, strip_sgr, tokenize,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn source_strategy() -> impl Strategy<Value = String> {
    let preamble = prop_oneof![
        Just(String::new()),
        Just("\u{feff}".to_owned()),
        Just("#!/usr/bin/env php\n".to_owned()),
        Just("\u{feff}#!/bin/sh -e\r\n".to_owned()),
        Just("#!".to_owned()),
    ];
    let body = prop::collection::vec(
        prop_oneof![
            3 => "[a-z0-9 \n;=$'\"]{1,6}",
            2 => prop::sample::select(vec![
                "<?php ", "?>", "<?xml ?>", "<a>", "</a>", "&amp;", "--- a\n", "+x\n", "@@",
                "/* c */", "// c\n", "<<<EOT\nx\nEOT;\n", "<![CDATA[", "]]>",
            ])
            .prop_map(str::to_owned),
            1 => any::<char>()
                .prop_filter("no escape bytes", |c| *c != '\x1b' && *c != '\u{9b}')
                .prop_map(String::from),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat());
    (preamble, body).prop_map(|(head, body)| head + &body)
}

fn profile_strategy() -> impl Strategy<Value = ColorProfile> {
    prop::sample::select(vec![
        ColorProfile::Mono,
        ColorProfile::Ansi16,
        ColorProfile::Ansi256,
        ColorProfile::TrueColor,
    ])
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Coverage
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pipeline_tokens_cover_the_source(
        src in source_strategy(),
        forced in prop::option::of(prop::sample::select(vec!["php", "xml", "diff", "text"])),
    ) {
        let lexers: Vec<_> = forced.map(|name| lexer_by_name(name).unwrap()).into_iter().collect();
        let tokens = tokenize(&src, &lexers).unwrap();
        prop_assert!(covers_exactly(&src, &tokens), "coverage broken on {:?}", src);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Terminal round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn terminal_output_strips_back_to_the_source(
        src in source_strategy(),
        profile in profile_strategy(),
    ) {
        let mut formatter = TerminalFormatter::new().with_profile(profile);
        let out = highlight(&src, &[], &mut formatter).unwrap();
        prop_assert_eq!(strip_sgr(&out), src);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Purity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn guess_and_output_are_pure(src in source_strategy()) {
        let registry = Registry::global();
        let chosen = registry.guess_descriptor(&src).name;
        let mut html = HtmlFormatter::new();
        let first = highlight(&src, &[], &mut html).unwrap();
        for _ in 0..2 {
            prop_assert_eq!(registry.guess_descriptor(&src).name, chosen);
            prop_assert_eq!(&highlight(&src, &[], &mut html).unwrap(), &first);
        }
    }
}
