#![forbid(unsafe_code)]

//! Forward-only cursor over the text handed to a lexer state machine.

/// Character cursor used by [`Machine`](crate::lexer::Machine) steps.
///
/// All positions are byte offsets into [`Scanner::source`] and always sit on
/// a char boundary. Nothing here moves backwards.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Whole text under scan.
    #[inline]
    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Current byte offset.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Unconsumed remainder.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Text between `start` and the cursor.
    pub fn since(&self, start: usize) -> &'a str {
        self.src.get(start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character `n` positions ahead (0 is the same as [`peek`](Self::peek)).
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Last consumed character.
    pub fn prev(&self) -> Option<char> {
        self.src[..self.pos].chars().next_back()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn starts_with_ignore_case(&self, s: &str) -> bool {
        self.rest()
            .as_bytes()
            .get(..s.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(s.as_bytes()))
    }

    /// Absolute offset of the next occurrence of `needle` at or after the cursor.
    pub fn find(&self, needle: &str) -> Option<usize> {
        self.rest().find(needle).map(|i| self.pos + i)
    }

    /// Consume one character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume the next character if it satisfies `pred`.
    pub fn eat_if(&mut self, pred: impl FnOnce(char) -> bool) -> Option<char> {
        let c = self.peek().filter(|&c| pred(c))?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `s` if the remainder starts with it.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// ASCII case-insensitive [`eat_str`](Self::eat_str).
    pub fn eat_str_ignore_case(&mut self, s: &str) -> bool {
        if self.starts_with_ignore_case(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds. Returns the number of bytes eaten.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest().len(), |(i, _)| i);
        self.pos += len;
        self.pos - start
    }

    /// Advance to just before `needle`, or to the end when absent.
    /// Returns whether `needle` was found.
    pub fn eat_until(&mut self, needle: &str) -> bool {
        match self.find(needle) {
            Some(at) => {
                self.pos = at;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }

    /// Advance past `needle`, or to the end when absent.
    pub fn eat_through(&mut self, needle: &str) -> bool {
        let found = self.eat_until(needle);
        if found {
            self.pos += needle.len();
        }
        found
    }

    /// Consume up to (not including) the next line break.
    pub fn eat_line(&mut self) -> usize {
        self.eat_while(|c| c != '\n' && c != '\r')
    }

    /// Consume one line break (`\r\n`, `\n` or `\r`).
    pub fn eat_newline(&mut self) -> bool {
        self.eat_str("\r\n") || self.eat('\n') || self.eat('\r')
    }

    /// Move forward to `to`, clamped to the end and rounded up to a char
    /// boundary. Never moves backwards.
    pub fn advance_to(&mut self, to: usize) {
        let mut to = to.min(self.src.len()).max(self.pos);
        while !self.src.is_char_boundary(to) {
            to += 1;
        }
        self.pos = to;
    }
}
