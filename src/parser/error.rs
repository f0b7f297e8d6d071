use crate::lexer::{Span, Token, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expect '{}' {}.", .expected.symbol().unwrap_or_default(), .context)]
    MissingToken {
        expected: TokenKind,
        context: &'static str,
    },
    #[error("Expect variable name.")]
    ExpectedVariableName,
    #[error("Expect expression.")]
    ExpectedExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Too much nesting.")]
    TooDeeplyNested,
}

/// The token a parse error was detected at.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    End,
    Token(CompactString),
}

impl std::fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLocation::End => write!(f, "at end"),
            ErrorLocation::Token(lexeme) => write!(f, "at '{lexeme}'"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("Error {location}: {kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub location: ErrorLocation,
    pub line: u32,
    pub span: Span,
}

impl ParserError {
    pub fn at_token(token: &Token, kind: ParserErrorKind) -> Self {
        let location = match token.kind {
            TokenKind::Eof => ErrorLocation::End,
            _ => ErrorLocation::Token(token.lexeme.clone()),
        };
        Self {
            kind,
            location,
            line: token.line,
            span: token.span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::MissingToken { .. } => "PA001",
            ParserErrorKind::ExpectedVariableName => "PA002",
            ParserErrorKind::ExpectedExpression => "PA003",
            ParserErrorKind::InvalidAssignmentTarget => "PA004",
            ParserErrorKind::TooDeeplyNested => "PA005",
        }
    }
}
