#![forbid(unsafe_code)]

//! Token taxonomy and the token span type.
//!
//! The taxonomy is a closed tree: every [`TokenType`] either is one of the
//! twelve root categories or names a parent one level up. Formatters rely on
//! the tree being closed so that a style lookup can fall back to the nearest
//! ancestor that has a rule.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

macro_rules! parent_of {
    () => {
        None
    };
    ($parent:ident) => {
        Some(TokenType::$parent)
    };
}

macro_rules! token_types {
    ($( $variant:ident $(< $parent:ident)? => $name:literal, $css:literal, $doc:literal; )*) => {
        /// Lexical category attached to every emitted span.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenType {
            $(
                #[doc = $doc]
                $variant,
            )*
        }

        impl TokenType {
            /// Every token type, roots first within each family.
            pub const ALL: &'static [TokenType] = &[$(TokenType::$variant,)*];

            /// Direct parent, or `None` for a root category.
            #[must_use]
            pub const fn parent(self) -> Option<TokenType> {
                match self {
                    $(TokenType::$variant => parent_of!($($parent)?),)*
                }
            }

            /// Dotted path such as `"Keyword.Reserved"`.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(TokenType::$variant => $name,)*
                }
            }

            /// Short CSS class (empty for plain text).
            #[must_use]
            pub const fn css_class(self) -> &'static str {
                match self {
                    $(TokenType::$variant => $css,)*
                }
            }

            /// Human-readable description.
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(TokenType::$variant => $doc,)*
                }
            }
        }
    };
}

token_types! {
    Text => "Text", "", "regular text";
    Whitespace => "Whitespace", "w", "spaces, tabs and line breaks";
    Error => "Error", "err", "input the lexer could not classify";

    Keyword => "Keyword", "k", "keyword";
    KeywordBuiltin < Keyword => "Keyword.Builtin", "kb", "builtin keyword";
    KeywordConstant < Keyword => "Keyword.Constant", "kc", "keyword for constants";
    KeywordDeclaration < Keyword => "Keyword.Declaration", "kd", "declaration keyword";
    KeywordNamespace < Keyword => "Keyword.Namespace", "kn", "namespace keyword";
    KeywordPseudo < Keyword => "Keyword.Pseudo", "kp", "pseudo keyword";
    KeywordReserved < Keyword => "Keyword.Reserved", "kr", "reserved keyword";
    KeywordType < Keyword => "Keyword.Type", "kt", "builtin type";

    Name => "Name", "n", "identifier";
    NameAttribute < Name => "Name.Attribute", "na", "tag attribute name";
    NameBuiltin < Name => "Name.Builtin", "nb", "name available in the global namespace";
    NameBuiltinPseudo < NameBuiltin => "Name.Builtin.Pseudo", "bp", "implicit builtin name";
    NameClass < Name => "Name.Class", "nc", "class name";
    NameEntity < Name => "Name.Entity", "ne", "HTML/XML entity";
    NameFunction < Name => "Name.Function", "nf", "function name";
    NameNamespace < Name => "Name.Namespace", "nn", "namespace name";
    NameTag < Name => "Name.Tag", "nt", "tag name";
    NameTagPreproc < NameTag => "Name.Tag.Preproc", "tp", "processing instruction tag";
    NameVariable < Name => "Name.Variable", "nv", "variable name";
    NameVariableClass < NameVariable => "Name.Variable.Class", "vc", "class variable";
    NameVariableGlobal < NameVariable => "Name.Variable.Global", "vg", "global variable";
    NameVariableInstance < NameVariable => "Name.Variable.Instance", "vi", "instance variable";

    Literal => "Literal", "l", "literal";
    LiteralSize < Literal => "Literal.Size", "ls", "size literal (eg: 3ko)";
    LiteralDuration < Literal => "Literal.Duration", "ld", "duration literal (eg: 23s)";

    String => "String", "s", "string literal";
    StringSingle < String => "String.Single", "s1", "single quoted string";
    StringDouble < String => "String.Double", "s2", "double quoted string";
    StringBacktick < String => "String.Backtick", "sb", "string enclosed in backticks";
    StringRegex < String => "String.Regex", "sr", "regular expression";
    StringInterned < String => "String.Interned", "si", "interned string";
    StringEscaped < String => "String.Escaped", "se", "escape sequence like \\n or \\x32";
    StringInterpolated < String => "String.Interpolated", "is", "interpolated variable in a string";
    StringHeredoc < String => "String.Heredoc", "sh", "heredoc or nowdoc body";

    Number => "Number", "m", "numeric literal";
    NumberFloat < Number => "Number.Float", "mf", "float number";
    NumberDecimal < Number => "Number.Decimal", "md", "decimal number";
    NumberBinary < Number => "Number.Binary", "mb", "binary number";
    NumberOctal < Number => "Number.Octal", "mo", "octal number";
    NumberHexadecimal < Number => "Number.Hexadecimal", "mh", "hexadecimal number";

    Operator => "Operator", "o", "operator";
    OperatorWord < Operator => "Operator.Word", "ow", "operator spelled as a word";

    Punctuation => "Punctuation", "p", "syntax element like ';' in C";

    Comment => "Comment", "c", "comment";
    CommentSingle < Comment => "Comment.Single", "c1", "comment ending at the end of the line";
    CommentMultiline < Comment => "Comment.Multiline", "cm", "multiline comment";
    CommentDocumentation < Comment => "Comment.Documentation", "cd", "comment with documentation value";
    CommentHashbang < Comment => "Comment.Hashbang", "ch", "interpreter line";

    Generic => "Generic", "g", "generic markup";
    GenericDeleted < Generic => "Generic.Deleted", "gd", "deleted line";
    GenericHeading < Generic => "Generic.Heading", "gh", "headline";
    GenericInserted < Generic => "Generic.Inserted", "gi", "inserted line";
    GenericStrong < Generic => "Generic.Strong", "gb", "strong emphasis";
    GenericSubheading < Generic => "Generic.Subheading", "gu", "subheadline";
}

impl TokenType {
    /// The twelve root categories.
    pub const ROOTS: [TokenType; 12] = [
        Self::Text,
        Self::Keyword,
        Self::Name,
        Self::Literal,
        Self::String,
        Self::Number,
        Self::Operator,
        Self::Punctuation,
        Self::Comment,
        Self::Generic,
        Self::Error,
        Self::Whitespace,
    ];

    /// Whether this type is a root category.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.parent().is_none()
    }

    /// Root category reached by following parent links.
    #[must_use]
    pub fn root(self) -> TokenType {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Reflexive-transitive ancestry check.
    #[must_use]
    pub fn is_a(self, ancestor: TokenType) -> bool {
        self.ancestors().any(|t| t == ancestor)
    }

    /// Iterate from `self` up to its root (inclusive on both ends).
    pub fn ancestors(self) -> Ancestors {
        Ancestors { next: Some(self) }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over a token type and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<TokenType>,
}

impl Iterator for Ancestors {
    type Item = TokenType;

    fn next(&mut self) -> Option<TokenType> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Error returned when parsing an unknown dotted token type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTokenTypeError(pub String);

impl fmt::Display for ParseTokenTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token type '{}'", self.0)
    }
}

impl std::error::Error for ParseTokenTypeError {}

impl FromStr for TokenType {
    type Err = ParseTokenTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseTokenTypeError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A classified, contiguous span of source text.
///
/// `offset` is the byte offset of `text` in the source handed to the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenType,
    pub text: &'src str,
    pub offset: usize,
}

impl<'src> Token<'src> {
    /// Create a token.
    pub const fn new(kind: TokenType, text: &'src str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    /// Byte range of the token in its source.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Byte offset one past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Token length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Same token with its offset shifted by `base`.
    #[must_use]
    pub fn rebased(self, base: usize) -> Self {
        Self {
            offset: self.offset + base,
            ..self
        }
    }
}

/// Check the coverage invariant: tokens are non-empty, contiguous from
/// offset zero, and their texts concatenate to exactly `source`.
pub fn covers_exactly(source: &str, tokens: &[Token<'_>]) -> bool {
    let mut expected = 0usize;
    for token in tokens {
        if token.is_empty() || token.offset != expected {
            return false;
        }
        if source.get(token.range()) != Some(token.text) {
            return false;
        }
        expected = token.end();
    }
    expected == source.len()
}
