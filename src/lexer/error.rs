use super::token::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexicalErrorKind {
    #[error("Unexpected character '{0}'.")]
    Unrecognized(char),
    #[error("Unterminated string.")]
    UnterminatedString,
}

/// A region of source the lexer could not turn into a token.
///
/// The offending text is skipped: no token is produced for it and scanning
/// continues with the next character.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct LexicalError {
    #[source]
    pub kind: LexicalErrorKind,
    pub span: Span,
    pub line: u32,
}

impl LexicalError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            LexicalErrorKind::Unrecognized(_) => "LX001",
            LexicalErrorKind::UnterminatedString => "LX002",
        }
    }
}
