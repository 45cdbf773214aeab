#![forbid(unsafe_code)]

//! HTML output: `<span>` elements inside a `<pre>` block.

use sheen_core::{Result, Token, TokenType};

use crate::formatter::Formatter;
use crate::theme::Theme;

/// Wraps tokens in `<span class="..">` elements.
///
/// Class names are the short token classes (`k`, `nv`, `s2`, ...) behind an
/// optional prefix; pair the output with [`Theme::to_css`]. With
/// `inline_styles` the theme is applied directly through `style=`
/// attributes instead. Plain text gets no span either way.
///
/// With `lexer_spans` the output of each lexer, nested ones included, sits
/// in a `<span>` classed with the lexer's name. With line numbers every
/// line starts with a `lineno` span holding its number.
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
    css_class: String,
    class_prefix: String,
    inline_styles: bool,
    lexer_spans: bool,
    line_numbers: bool,
    line_start: u64,
    theme: Theme,
    /// Whether each pending `start_token` or `start_lexing` opened a span.
    open: Vec<bool>,
    /// Number of the line being written.
    line: u64,
    /// The next character written starts a numbered line.
    at_line_start: bool,
}

impl HtmlFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            css_class: String::new(),
            class_prefix: String::new(),
            inline_styles: false,
            lexer_spans: false,
            line_numbers: false,
            line_start: 1,
            theme: Theme::default_ansi(),
            open: Vec::new(),
            line: 1,
            at_line_start: false,
        }
    }

    /// Class of the `<pre>` wrapper; empty for none.
    #[must_use]
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = class.into();
        self
    }

    #[must_use]
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_inline_styles(mut self, inline: bool) -> Self {
        self.inline_styles = inline;
        self
    }

    #[must_use]
    pub fn with_lexer_spans(mut self, enabled: bool) -> Self {
        self.lexer_spans = enabled;
        self
    }

    #[must_use]
    pub fn with_line_numbers(mut self, enabled: bool) -> Self {
        self.line_numbers = enabled;
        self
    }

    /// Number of the first line when line numbers are on. Defaults to 1.
    #[must_use]
    pub fn with_line_start(mut self, first: u64) -> Self {
        self.line_start = first;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Stylesheet matching this formatter's class names.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let scope = if self.css_class.is_empty() {
            "pre".to_owned()
        } else {
            format!("pre.{}", self.css_class)
        };
        let mut css = self.theme.to_css(&scope, &self.class_prefix);
        if self.line_numbers {
            css.push_str(&format!(
                "{scope} .{}lineno {{ {LINENO_CSS} }}\n",
                self.class_prefix
            ));
        }
        css
    }

    fn line_number(&self, out: &mut String, number: u64) {
        if self.inline_styles {
            out.push_str("<span style=\"");
            out.push_str(LINENO_CSS);
        } else {
            out.push_str("<span class=\"");
            html_escape_into(out, &self.class_prefix);
            out.push_str("lineno");
        }
        out.push_str(&format!("\">{number} </span>"));
    }

    fn open_tag(&self, kind: TokenType) -> Option<String> {
        if self.inline_styles {
            let css = self.theme.style_for(kind).css();
            if css.is_empty() {
                return None;
            }
            let mut tag = String::from("<span style=\"");
            html_escape_into(&mut tag, &css);
            tag.push_str("\">");
            Some(tag)
        } else {
            let class = kind.css_class();
            if class.is_empty() {
                return None;
            }
            let mut tag = String::from("<span class=\"");
            html_escape_into(&mut tag, &self.class_prefix);
            tag.push_str(class);
            tag.push_str("\">");
            Some(tag)
        }
    }
}

/// Declarations for line-number spans.
const LINENO_CSS: &str = "user-select:none;opacity:0.6;";

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for HtmlFormatter {
    fn name(&self) -> &str {
        "html"
    }

    fn start_document(&mut self) -> Result<String> {
        self.open.clear();
        self.line = self.line_start;
        self.at_line_start = self.line_numbers;
        if self.css_class.is_empty() {
            return Ok("<pre>".to_owned());
        }
        let mut out = String::from("<pre class=\"");
        html_escape_into(&mut out, &self.css_class);
        out.push_str("\">");
        Ok(out)
    }

    fn end_document(&mut self) -> Result<String> {
        let mut out = String::new();
        for opened in self.open.drain(..).rev() {
            if opened {
                out.push_str("</span>");
            }
        }
        out.push_str("</pre>");
        Ok(out)
    }

    fn start_lexing(&mut self, lexer: &str) -> Result<String> {
        if !self.lexer_spans {
            return Ok(String::new());
        }
        self.open.push(true);
        let mut tag = String::from("<span class=\"");
        html_escape_into(&mut tag, &self.class_prefix);
        html_escape_into(&mut tag, lexer);
        tag.push_str("\">");
        Ok(tag)
    }

    fn end_lexing(&mut self, _: &str) -> Result<String> {
        if self.lexer_spans && self.open.pop() == Some(true) {
            return Ok("</span>".to_owned());
        }
        Ok(String::new())
    }

    fn start_token(&mut self, kind: TokenType) -> Result<String> {
        let tag = self.open_tag(kind);
        self.open.push(tag.is_some());
        Ok(tag.unwrap_or_default())
    }

    fn end_token(&mut self, _: TokenType) -> Result<String> {
        Ok(if self.open.pop() == Some(true) {
            "</span>".to_owned()
        } else {
            String::new()
        })
    }

    fn write_token(&mut self, token: &Token<'_>) -> Result<String> {
        let mut out = String::with_capacity(token.len() + 8);
        if !self.line_numbers {
            html_escape_into(&mut out, token.text);
            return Ok(out);
        }
        for piece in token.text.split_inclusive('\n') {
            if self.at_line_start {
                self.line_number(&mut out, self.line);
                self.at_line_start = false;
            }
            html_escape_into(&mut out, piece);
            if piece.ends_with('\n') {
                self.line = self.line.saturating_add(1);
                self.at_line_start = true;
            }
        }
        Ok(out)
    }
}

/// HTML-escape a string into the output buffer.
pub fn html_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// Reverse of [`html_escape_into`] for the five entities it produces.
#[must_use]
pub fn html_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let entity = [
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&amp;", '&'),
            ("&quot;", '"'),
            ("&#39;", '\''),
        ]
        .into_iter()
        .find(|(name, _)| rest.starts_with(name));
        match entity {
            Some((name, c)) => {
                out.push(c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::render;

    fn html(formatter: &mut HtmlFormatter, tokens: &[Token<'_>]) -> String {
        render(formatter, tokens).unwrap()
    }

    #[test]
    fn spans_use_short_classes() {
        let tokens = [
            Token::new(TokenType::KeywordReserved, "if", 0),
            Token::new(TokenType::Text, " ", 2),
            Token::new(TokenType::NameVariable, "$a", 3),
        ];
        assert_eq!(
            html(&mut HtmlFormatter::new(), &tokens),
            "<pre><span class=\"kr\">if</span> <span class=\"nv\">$a</span></pre>"
        );
    }

    #[test]
    fn css_class_and_prefix() {
        let mut formatter = HtmlFormatter::new()
            .with_css_class("highlight")
            .with_class_prefix("sh-");
        let out = html(&mut formatter, &[Token::new(TokenType::Number, "1", 0)]);
        assert_eq!(out, "<pre class=\"highlight\"><span class=\"sh-m\">1</span></pre>");
    }

    #[test]
    fn text_is_fully_escaped() {
        let tokens = [Token::new(TokenType::StringDouble, "\"<a & 'b'>\"", 0)];
        assert_eq!(
            html(&mut HtmlFormatter::new(), &tokens),
            "<pre><span class=\"s2\">&quot;&lt;a &amp; &#39;b&#39;&gt;&quot;</span></pre>"
        );
    }

    #[test]
    fn inline_styles_follow_the_theme() {
        let mut formatter = HtmlFormatter::new()
            .with_theme(Theme::monokai())
            .with_inline_styles(true);
        let tokens = [
            Token::new(TokenType::Keyword, "echo", 0),
            Token::new(TokenType::Punctuation, ";", 4),
        ];
        assert_eq!(
            html(&mut formatter, &tokens),
            "<pre><span style=\"color:#66d9ef;font-weight:bold;\">echo</span>;</pre>"
        );
    }

    #[test]
    fn unbalanced_calls_stay_well_formed() {
        let mut formatter = HtmlFormatter::new();
        let mut out = formatter.start_document().unwrap();
        out.push_str(&formatter.start_token(TokenType::Comment).unwrap());
        out.push_str(&formatter.start_token(TokenType::Keyword).unwrap());
        out.push_str(&formatter.end_document().unwrap());
        assert_eq!(
            out,
            "<pre><span class=\"c\"><span class=\"k\"></span></span></pre>"
        );
        assert_eq!(formatter.end_token(TokenType::Comment).unwrap(), "");
    }

    #[test]
    fn stylesheet_is_scoped_to_the_wrapper() {
        let formatter = HtmlFormatter::new()
            .with_theme(Theme::monokai())
            .with_css_class("code");
        let css = formatter.stylesheet();
        assert!(css.contains("pre.code { color:#f8f8f2;background-color:#272822; }"));
        assert!(css.contains("pre.code .nf { color:#a6e22e;font-weight:bold; }"));
    }

    #[test]
    fn lexer_spans_wrap_each_lexer() {
        use crate::formatter::render_events;
        use sheen_core::Event;

        let events = [
            Event::Enter("PHP"),
            Event::Token(Token::new(TokenType::Keyword, "echo", 0)),
            Event::Enter("XML"),
            Event::Token(Token::new(TokenType::Text, "<", 4)),
            Event::Leave("XML"),
            Event::Leave("PHP"),
        ];
        let mut formatter = HtmlFormatter::new().with_class_prefix("x-");
        assert_eq!(
            render_events(&mut formatter, &events).unwrap(),
            "<pre><span class=\"x-k\">echo</span>&lt;</pre>"
        );

        let mut formatter = formatter.with_lexer_spans(true);
        assert_eq!(
            render_events(&mut formatter, &events).unwrap(),
            "<pre><span class=\"x-PHP\"><span class=\"x-k\">echo</span>\
             <span class=\"x-XML\">&lt;</span></span></pre>"
        );
    }

    #[test]
    fn line_numbers_start_each_line() {
        let tokens = [
            Token::new(TokenType::Comment, "# a\n# b\n", 0),
            Token::new(TokenType::Text, "\n", 8),
            Token::new(TokenType::Keyword, "end", 9),
        ];
        let mut formatter = HtmlFormatter::new()
            .with_line_numbers(true)
            .with_line_start(9);
        assert_eq!(
            html(&mut formatter, &tokens),
            "<pre><span class=\"c\"><span class=\"lineno\">9 </span># a\n\
             <span class=\"lineno\">10 </span># b\n</span>\
             <span class=\"lineno\">11 </span>\n\
             <span class=\"k\"><span class=\"lineno\">12 </span>end</span></pre>"
        );
        // Numbering restarts with each document.
        let again = html(&mut formatter, &tokens[2..]);
        assert!(again.contains("<span class=\"lineno\">9 </span>end"));
        assert!(formatter.stylesheet().contains("pre .lineno { user-select:none;"));
    }

    #[test]
    fn no_number_after_a_final_newline() {
        let mut formatter = HtmlFormatter::new().with_line_numbers(true);
        let out = html(&mut formatter, &[Token::new(TokenType::Text, "a\n", 0)]);
        assert_eq!(out, "<pre><span class=\"lineno\">1 </span>a\n</pre>");
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "a<b>&\"c\"'d' &copy;";
        let mut escaped = String::new();
        html_escape_into(&mut escaped, raw);
        assert_eq!(html_unescape(&escaped), raw);
    }
}
