mod span;

use crate::value::LoxValue;
use compact_str::CompactString;
pub use span::Span;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("and", TokenKind::KeywordAnd);
    map.insert("class", TokenKind::KeywordClass);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("for", TokenKind::KeywordFor);
    map.insert("fun", TokenKind::KeywordFun);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("nil", TokenKind::KeywordNil);
    map.insert("or", TokenKind::KeywordOr);
    map.insert("print", TokenKind::KeywordPrint);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("super", TokenKind::KeywordSuper);
    map.insert("this", TokenKind::KeywordThis);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("var", TokenKind::KeywordVar);
    map.insert("while", TokenKind::KeywordWhile);
    map
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Miscellaneous
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,
    // Operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Slash,

    // Literals
    NumericLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordAnd,
    KeywordClass,
    KeywordElse,
    KeywordFalse,
    KeywordFor,
    KeywordFun,
    KeywordIf,
    KeywordNil,
    KeywordOr,
    KeywordPrint,
    KeywordReturn,
    KeywordSuper,
    KeywordThis,
    KeywordTrue,
    KeywordVar,
    KeywordWhile,

    // End of file.
    Eof,
}

impl TokenKind {
    /// The fixed source text of punctuation and keyword tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::LeftParenthesis => "(",
            TokenKind::RightParenthesis => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Semicolon => ";",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::Slash => "/",
            TokenKind::KeywordAnd => "and",
            TokenKind::KeywordClass => "class",
            TokenKind::KeywordElse => "else",
            TokenKind::KeywordFalse => "false",
            TokenKind::KeywordFor => "for",
            TokenKind::KeywordFun => "fun",
            TokenKind::KeywordIf => "if",
            TokenKind::KeywordNil => "nil",
            TokenKind::KeywordOr => "or",
            TokenKind::KeywordPrint => "print",
            TokenKind::KeywordReturn => "return",
            TokenKind::KeywordSuper => "super",
            TokenKind::KeywordThis => "this",
            TokenKind::KeywordTrue => "true",
            TokenKind::KeywordVar => "var",
            TokenKind::KeywordWhile => "while",
            TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::Ident
            | TokenKind::Eof => return None,
        };
        Some(symbol)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "LEFT_PAREN"),
            TokenKind::RightParenthesis => write!(f, "RIGHT_PAREN"),
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::LeftBrace => write!(f, "LEFT_BRACE"),
            TokenKind::RightBrace => write!(f, "RIGHT_BRACE"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Dot => write!(f, "DOT"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Bang => write!(f, "BANG"),
            TokenKind::BangEqual => write!(f, "BANG_EQUAL"),
            TokenKind::Equal => write!(f, "EQUAL"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL"),
            TokenKind::LessThan => write!(f, "LESS"),
            TokenKind::LessThanEqual => write!(f, "LESS_EQUAL"),
            TokenKind::GreaterThan => write!(f, "GREATER"),
            TokenKind::GreaterThanEqual => write!(f, "GREATER_EQUAL"),
            TokenKind::Slash => write!(f, "SLASH"),
            TokenKind::StringLiteral => write!(f, "STRING"),
            TokenKind::NumericLiteral => write!(f, "NUMBER"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordAnd => write!(f, "AND"),
            TokenKind::KeywordClass => write!(f, "CLASS"),
            TokenKind::KeywordElse => write!(f, "ELSE"),
            TokenKind::KeywordFalse => write!(f, "FALSE"),
            TokenKind::KeywordFor => write!(f, "FOR"),
            TokenKind::KeywordFun => write!(f, "FUN"),
            TokenKind::KeywordIf => write!(f, "IF"),
            TokenKind::KeywordNil => write!(f, "NIL"),
            TokenKind::KeywordOr => write!(f, "OR"),
            TokenKind::KeywordPrint => write!(f, "PRINT"),
            TokenKind::KeywordReturn => write!(f, "RETURN"),
            TokenKind::KeywordSuper => write!(f, "SUPER"),
            TokenKind::KeywordThis => write!(f, "THIS"),
            TokenKind::KeywordTrue => write!(f, "TRUE"),
            TokenKind::KeywordVar => write!(f, "VAR"),
            TokenKind::KeywordWhile => write!(f, "WHILE"),
        }
    }
}

/// A lexical unit. Tokens are never mutated once the lexer hands them out.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token. Empty for `Eof`.
    pub lexeme: CompactString,
    /// The decoded value of number and string literals.
    pub literal: Option<LoxValue>,
    /// The 1-based line the token starts on.
    pub line: u32,
    pub span: Span,
}
