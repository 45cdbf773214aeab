#![forbid(unsafe_code)]

//! Catalog of lexer classes keyed by name, alias, MIME type and file glob.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Claim, Error, Result};
use crate::lexer::{Lexer, LexerDescriptor};
use crate::lexers;

/// Lexer catalog.
///
/// Names, aliases and MIME types are matched ASCII case-insensitively and
/// each resolves to exactly one lexer: a registration that claims a key
/// someone else owns is rejected, never shadowed.
#[derive(Default)]
pub struct Registry {
    lexers: Vec<&'static LexerDescriptor>,
    by_key: HashMap<String, usize>,
    by_mimetype: HashMap<String, usize>,
    filenames: Vec<GlobSet>,
    interpreters: Vec<GlobSet>,
}

fn compile(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: (*pattern).to_owned(),
            message: e.kind().to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::InvalidPattern {
        pattern: patterns.join(","),
        message: e.to_string(),
    })
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in lexers, plain text first.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in lexers::BUILTINS {
            if let Err(_err) = registry.register(descriptor) {
                crate::error!(lexer = descriptor.name, err = %_err, "built-in lexer rejected");
            }
        }
        registry
    }

    /// Process-wide registry of built-ins, built on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::with_builtins)
    }

    /// Add a lexer class.
    ///
    /// Either every key of `descriptor` is claimed or, on error, none is.
    pub fn register(&mut self, descriptor: &'static LexerDescriptor) -> Result<()> {
        let mut option_names = HashSet::new();
        if let Some(repeated) = descriptor
            .options
            .iter()
            .find(|option| !option_names.insert(option.name))
        {
            return Err(Error::DuplicateOption {
                lexer: descriptor.name,
                option: repeated.name,
            });
        }

        let index = self.lexers.len();
        let mut keys: Vec<(String, Claim)> = Vec::with_capacity(descriptor.aliases.len() + 1);
        keys.push((descriptor.name.to_ascii_lowercase(), Claim::Name));
        keys.extend(
            descriptor
                .aliases
                .iter()
                .map(|a| (a.to_ascii_lowercase(), Claim::Alias)),
        );
        let mut seen = HashSet::new();
        keys.retain(|(key, _)| seen.insert(key.clone()));
        let mut mimetypes: Vec<String> = descriptor
            .mimetypes
            .iter()
            .map(|m| m.to_ascii_lowercase())
            .collect();
        mimetypes.sort_unstable();
        mimetypes.dedup();

        for (key, claim) in &keys {
            if let Some(&owner) = self.by_key.get(key) {
                return Err(Error::DuplicateLexer {
                    key: key.clone(),
                    claim: *claim,
                    owner: self.lexers[owner].name,
                });
            }
        }
        for mimetype in &mimetypes {
            if let Some(&owner) = self.by_mimetype.get(mimetype) {
                return Err(Error::DuplicateLexer {
                    key: mimetype.clone(),
                    claim: Claim::Mimetype,
                    owner: self.lexers[owner].name,
                });
            }
        }
        let filenames = compile(descriptor.filenames)?;
        let interpreters = compile(descriptor.interpreters)?;

        for (key, _) in keys {
            self.by_key.insert(key, index);
        }
        for mimetype in mimetypes {
            self.by_mimetype.insert(mimetype, index);
        }
        self.filenames.push(filenames);
        self.interpreters.push(interpreters);
        self.lexers.push(descriptor);
        crate::debug!(lexer = descriptor.name, index, "registered lexer");
        Ok(())
    }

    /// Registered classes in registration order.
    pub fn list(&self) -> &[&'static LexerDescriptor] {
        &self.lexers
    }

    pub fn len(&self) -> usize {
        self.lexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexers.is_empty()
    }

    /// Position of `descriptor` in registration order.
    pub fn position(&self, descriptor: &LexerDescriptor) -> Option<usize> {
        self.lexers.iter().position(|d| std::ptr::eq(*d, descriptor))
    }

    /// Class registered under a name or alias.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&'static LexerDescriptor> {
        let index = self.by_key.get(&name.trim().to_ascii_lowercase())?;
        self.lexers.get(*index).copied()
    }

    /// Class registered for a MIME type.
    pub fn descriptor_by_mimetype(&self, mimetype: &str) -> Option<&'static LexerDescriptor> {
        let index = self.by_mimetype.get(&mimetype.trim().to_ascii_lowercase())?;
        self.lexers.get(*index).copied()
    }

    /// New instance of the lexer registered under a name or alias.
    pub fn by_name(&self, name: &str) -> Result<Lexer> {
        let found = self.descriptor_by_name(name);
        crate::debug!(name, found = found.map(|d| d.name), "lexer lookup by name");
        found.map(Lexer::new).ok_or_else(|| Error::unknown_lexer(name))
    }

    /// New instance of the lexer registered for a MIME type.
    pub fn by_mimetype(&self, mimetype: &str) -> Result<Lexer> {
        self.descriptor_by_mimetype(mimetype)
            .map(Lexer::new)
            .ok_or_else(|| Error::unknown_lexer(mimetype))
    }

    /// First class whose filename globs match the basename of `path`.
    pub fn for_filename(&self, path: impl AsRef<Path>) -> Option<&'static LexerDescriptor> {
        let name = path.as_ref().file_name()?;
        self.filenames
            .iter()
            .position(|set| set.is_match(name))
            .map(|i| self.lexers[i])
    }

    /// First class whose interpreter globs match `interpreter` (a basename).
    pub fn for_interpreter(&self, interpreter: &str) -> Option<&'static LexerDescriptor> {
        self.interpreters
            .iter()
            .position(|set| set.is_match(interpreter))
            .map(|i| self.lexers[i])
    }

    /// Whether the class at `index` claims `interpreter`.
    pub(crate) fn claims_interpreter(&self, index: usize, interpreter: &str) -> bool {
        self.interpreters
            .get(index)
            .is_some_and(|set| set.is_match(interpreter))
    }

    /// The plain-text fallback class, registered or not.
    pub fn text_descriptor(&self) -> &'static LexerDescriptor {
        &lexers::text::TEXT
    }

    /// Build a lexer from `name?key=value&key2=value2`.
    ///
    /// Pairs may also be separated by `;`. A bare `key` sets the option from
    /// an empty string, which turns boolean options on.
    pub fn lexer_from_query(&self, query: &str) -> Result<Lexer> {
        let (name, params) = query.split_once('?').unwrap_or((query, ""));
        let mut lexer = self.by_name(name)?;
        for pair in params.split(['&', ';']).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            lexer.set_option_str(key.trim(), value)?;
        }
        Ok(lexer)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.lexers.iter().map(|d| d.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexers::text::TEXT;
    use crate::options::{OptionDescriptor, OptionValue};

    fn text_machine(options: &crate::options::LexerOptions) -> Box<dyn crate::lexer::Machine> {
        (TEXT.machine)(options)
    }

    static SHADOW: LexerDescriptor = LexerDescriptor {
        name: "Shadow",
        aliases: &["shadow", "PHP"],
        mimetypes: &[],
        filenames: &[],
        interpreters: &[],
        description: "claims an alias owned by PHP",
        options: &[],
        keywords: &[],
        analyse: None,
        machine: text_machine,
    };

    static MIME_THIEF: LexerDescriptor = LexerDescriptor {
        name: "MimeThief",
        aliases: &[],
        mimetypes: &["Text/X-PHP"],
        filenames: &[],
        interpreters: &[],
        description: "claims a mimetype owned by PHP",
        options: &[],
        keywords: &[],
        analyse: None,
        machine: text_machine,
    };

    static BAD_GLOB: LexerDescriptor = LexerDescriptor {
        name: "BadGlob",
        aliases: &[],
        mimetypes: &[],
        filenames: &["*.{a"],
        interpreters: &[],
        description: "unparseable filename pattern",
        options: &[],
        keywords: &[],
        analyse: None,
        machine: text_machine,
    };

    static TWICE_WIDTH: LexerDescriptor = LexerDescriptor {
        name: "TwiceWidth",
        aliases: &[],
        mimetypes: &[],
        filenames: &[],
        interpreters: &[],
        description: "declares one option name twice",
        options: &[
            OptionDescriptor::bool("width", false, "as a flag"),
            OptionDescriptor::int("width", 8, "as a count"),
        ],
        keywords: &[],
        analyse: None,
        machine: text_machine,
    };

    #[test]
    fn builtins_register_without_collisions() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.len(), lexers::BUILTINS.len());
        assert_eq!(registry.list()[0].name, "Text");
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.by_name("PHP").unwrap().name(), "PHP");
        assert_eq!(registry.by_name("php5").unwrap().name(), "PHP");
        assert_eq!(registry.by_name("Html").unwrap().name(), "XML");
        assert_eq!(registry.by_mimetype("TEXT/X-PHP").unwrap().name(), "PHP");
        assert_eq!(registry.by_mimetype("text/x-diff").unwrap().name(), "Diff");
        assert!(matches!(
            registry.by_name("cobol"),
            Err(Error::UnknownLexer { .. })
        ));
        assert!(matches!(
            registry.by_mimetype("image/png"),
            Err(Error::UnknownLexer { .. })
        ));
    }

    #[test]
    fn colliding_alias_is_rejected_and_nothing_is_claimed() {
        let mut registry = Registry::with_builtins();
        let before = registry.len();
        let err = registry.register(&SHADOW).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateLexer {
                claim: Claim::Alias,
                owner: "PHP",
                ..
            }
        ));
        assert_eq!(registry.len(), before);
        assert!(registry.descriptor_by_name("shadow").is_none());
    }

    #[test]
    fn colliding_mimetype_is_rejected() {
        let mut registry = Registry::with_builtins();
        let err = registry.register(&MIME_THIEF).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateLexer {
                claim: Claim::Mimetype,
                ..
            }
        ));
    }

    #[test]
    fn registering_twice_collides_on_the_name() {
        let mut registry = Registry::new();
        registry.register(&TEXT).unwrap();
        assert!(matches!(
            registry.register(&TEXT),
            Err(Error::DuplicateLexer {
                claim: Claim::Name,
                ..
            })
        ));
    }

    #[test]
    fn repeated_option_names_are_rejected() {
        let mut registry = Registry::with_builtins();
        let before = registry.len();
        let err = registry.register(&TWICE_WIDTH).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateOption {
                lexer: "TwiceWidth",
                option: "width",
            }
        ));
        assert!(err.to_string().contains("more than once"));
        assert_eq!(registry.len(), before);
        assert!(registry.descriptor_by_name("twicewidth").is_none());
    }

    #[test]
    fn every_builtin_registers() {
        let registry = Registry::with_builtins();
        let names: Vec<_> = registry.list().iter().map(|d| d.name).collect();
        let expected: Vec<_> = lexers::BUILTINS.iter().map(|d| d.name).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn builtin_option_names_are_unique() {
        for descriptor in lexers::BUILTINS {
            let mut names: Vec<_> = descriptor.options.iter().map(|o| o.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), descriptor.options.len(), "{}", descriptor.name);
        }
    }

    #[test]
    fn invalid_globs_are_reported() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register(&BAD_GLOB),
            Err(Error::InvalidPattern { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn filename_and_interpreter_globs() {
        let registry = Registry::with_builtins();
        let name = |d: Option<&'static LexerDescriptor>| d.map(|d| d.name);
        assert_eq!(name(registry.for_filename("src/index.php")), Some("PHP"));
        assert_eq!(name(registry.for_filename("page.php5")), Some("PHP"));
        assert_eq!(name(registry.for_filename("feed.xml")), Some("XML"));
        assert_eq!(name(registry.for_filename("fix.patch")), Some("Diff"));
        assert_eq!(name(registry.for_filename("notes.txt")), Some("Text"));
        assert_eq!(name(registry.for_filename("main.rs")), None);
        assert_eq!(name(registry.for_interpreter("php54")), Some("PHP"));
        assert_eq!(name(registry.for_interpreter("php-cgi")), Some("PHP"));
        assert_eq!(name(registry.for_interpreter("python3")), None);
    }

    #[test]
    fn query_strings_apply_options() {
        let registry = Registry::with_builtins();
        let lexer = registry
            .lexer_from_query("php?start_inline=on;asp_tags&secondary=xml")
            .unwrap();
        assert_eq!(lexer.get_option("start_inline").unwrap(), &OptionValue::Bool(true));
        assert_eq!(lexer.get_option("asp_tags").unwrap(), &OptionValue::Bool(true));
        assert_eq!(lexer.options().lexer("secondary").map(Lexer::name), Some("XML"));

        assert!(matches!(
            registry.lexer_from_query("php?colour=red"),
            Err(Error::UnknownOption { .. })
        ));
        assert_eq!(registry.lexer_from_query("diff").unwrap().name(), "Diff");
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(Registry::global(), Registry::global()));
        assert!(!Registry::global().is_empty());
    }
}
