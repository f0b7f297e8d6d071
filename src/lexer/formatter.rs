use super::token::Token;
use crate::lexer::{Lexer, LexicalError};
use crate::value::LoxValue;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

fn format_literal(token: &Token) -> String {
    match token.literal {
        Some(LoxValue::Number(value)) => format!("{value:?}"),
        Some(ref value) => format!("{value}"),
        None => "null".into(),
    }
}

/// `KIND lexeme literal`, one token per line.
pub struct BasicFormatter;

impl<'src> ToFormatter<BasicFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter {
        BasicFormatter
    }
}

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{} {} {}", token.kind, token.lexeme, format_literal(token))
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("[line {}] Error: {}", error.line, error)
    }
}

/// Same as [`BasicFormatter`] but prefixed with the token's line.
pub struct LineFormatter;

impl<'src> ToFormatter<LineFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> LineFormatter {
        LineFormatter
    }
}

impl TokenFormatter for LineFormatter {
    fn format(&self, token: &Token) -> String {
        format!(
            "({}) {} {} {}",
            token.line,
            token.kind,
            token.lexeme,
            format_literal(token)
        )
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("({}) ERROR {}", error.line, error)
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}
