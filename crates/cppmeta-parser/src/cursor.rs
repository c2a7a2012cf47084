//! Character scanner shared by the type-expression tokenizer and the
//! constant evaluator.

/// Scans a short piece of C++ text: a type spelling or a constant
/// expression. Offsets are in bytes.
pub struct Cursor<'src> {
    source: &'src str,
    rest: &'src str,
    offset: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Text not yet consumed.
    #[inline]
    pub fn rest(&self) -> &'src str {
        self.rest
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// `n` characters ahead; `peek_nth(0)` is `peek()`.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.bump(ch.len_utf8());
        Some(ch)
    }

    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        let matched = self.peek() == Some(ch);
        if matched {
            self.bump(ch.len_utf8());
        }
        matched
    }

    pub fn eat_str(&mut self, s: &str) -> bool {
        let matched = self.check_str(s);
        if matched {
            self.bump(s.len());
        }
        matched
    }

    /// Consume the run of characters matching `f` and return it.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset;
        let len = self
            .rest
            .find(|c: char| !f(c))
            .unwrap_or(self.rest.len());
        self.bump(len);
        &self.source[start..self.offset]
    }

    pub fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// Text consumed since `start`.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }

    fn bump(&mut self, len: usize) {
        self.rest = &self.rest[len..];
        self.offset += len;
    }
}

#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
