//! Property-based invariant tests for the built-in lexers and the guesser.
//!
//! 1. Every built-in lexer covers its input exactly, with non-empty tokens.
//! 2. Coverage holds for every PHP option combination and with a nested lexer.
//! 3. Tokenizing twice yields identical token sequences.
//! 4. Guessing is a pure function of the sample.
//! 5. Option set/get round-trips; rejected values leave the option unchanged.

use proptest::prelude::*;
use sheen_core::{Error, Lexer, OptionValue, Registry, covers_exactly};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Source text biased toward the characters the grammars care about.
fn source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-zA-Z0-9_ \n\t]{1,6}",
            3 => prop::sample::select(vec![
                "<?php", "<?=", "<?", "?>", "<%", "%>", "<", ">", "</", "/>", "&", ";", "&amp;",
                "<!--", "-->", "<![CDATA[", "]]>", "\"", "'", "`", "$", "{$", "${", "\\", "#",
                "//", "/*", "*/", "/**", "<<<EOT\n", "EOT", "<<<'X'\n", "0x", ".5", "1e", "->",
                "+", "-", "@@", "diff ", "\r\n", "=",
            ])
            .prop_map(str::to_owned),
            1 => any::<char>().prop_map(String::from),
        ],
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

fn builtin_lexers() -> Vec<Lexer> {
    Registry::global()
        .list()
        .iter()
        .map(|descriptor| descriptor.create())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Coverage for every built-in
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn builtins_cover_input_exactly(src in source_strategy()) {
        for lexer in builtin_lexers() {
            let tokens = lexer.tokens(&src).expect("built-in lexers never fail");
            prop_assert!(
                covers_exactly(&src, &tokens),
                "{} broke coverage on {:?}",
                lexer.name(),
                src
            );
            prop_assert!(tokens.iter().all(|t| !t.is_empty()));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. PHP option combinations, with and without delegation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn php_covers_input_under_any_options(
        src in source_strategy(),
        start_inline in any::<bool>(),
        short_tags in any::<bool>(),
        asp_tags in any::<bool>(),
        nested in prop::option::of(prop::sample::select(vec!["xml", "diff", "text", "php"]))
    ) {
        let mut lexer = Registry::global().by_name("php").unwrap();
        lexer.set_option("start_inline", start_inline).unwrap();
        lexer.set_option("short_tags", short_tags).unwrap();
        lexer.set_option("asp_tags", asp_tags).unwrap();
        if let Some(name) = nested {
            lexer.set_option("secondary", name).unwrap();
        }
        let tokens = lexer.tokens(&src).unwrap();
        prop_assert!(covers_exactly(&src, &tokens), "coverage broken on {:?}", src);
        let mut last = 0;
        for token in &tokens {
            prop_assert!(token.offset >= last);
            last = token.offset;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tokenize_is_deterministic(src in source_strategy()) {
        for lexer in builtin_lexers() {
            let first = lexer.tokens(&src).unwrap();
            let second = lexer.tokens(&src).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Guessing is pure
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn guess_is_deterministic(src in source_strategy()) {
        let registry = Registry::global();
        let first = registry.guess_descriptor(&src).name;
        for _ in 0..3 {
            prop_assert_eq!(registry.guess_descriptor(&src).name, first);
        }
        let fresh = Registry::with_builtins();
        prop_assert_eq!(fresh.guess_descriptor(&src).name, first);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Option round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bool_options_round_trip(value in any::<bool>(), bogus in any::<i64>()) {
        let mut lexer = Registry::global().by_name("php").unwrap();
        for name in ["start_inline", "short_tags", "asp_tags"] {
            lexer.set_option(name, value).unwrap();
            prop_assert_eq!(lexer.get_option(name).unwrap(), &OptionValue::Bool(value));
            let rejected = lexer.set_option(name, bogus);
            let is_invalid = matches!(rejected, Err(Error::InvalidOptionValue { .. }));
            prop_assert!(is_invalid);
            prop_assert_eq!(lexer.get_option(name).unwrap(), &OptionValue::Bool(value));
        }
    }
}
