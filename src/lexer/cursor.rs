use super::token::Span;

/// Two-position cursor over the source text.
///
/// `start` marks the first byte of the token being built and `current` is
/// the lookahead position. Everything in `start..current` is the lexeme.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    start: usize,
    current: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
        }
    }

    pub fn mark_start(&mut self) {
        self.start = self.current;
    }

    pub fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    pub fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next()?;
        chars.next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += c.len_utf8();
        Some(c)
    }

    /// Consumes the next character only if it is `expected`.
    pub fn eat_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.current += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn lexeme(&self) -> &'src str {
        &self.source[self.start..self.current]
    }

    pub fn span(&self) -> Span {
        Span::from_range(self.start..self.current)
    }
}
