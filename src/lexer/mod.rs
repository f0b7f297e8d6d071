mod cursor;
mod error;
pub mod formatter;
mod token;

use crate::value::LoxValue;
use cursor::Cursor;
pub use error::{LexicalError, LexicalErrorKind};
use std::{ops::Range, rc::Rc};
pub use token::{Span, Token, TokenKind, KEYWORD_HASHMAP};
use tracing::{debug, trace};

/// Maps byte offsets back to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<u32>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0u32;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = (offset + 1) as u32;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            // The final line also owns the end-of-input offset.
            line_breaks.push(cursor..(text.len() + 1) as u32);
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        self.line_breaks.len() as u32
    }

    pub fn get_line(&self, offset: u32) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start)
    }
}

/// The full output of scanning a source text.
#[derive(Debug, Clone)]
pub struct Scan {
    /// Every recognised token in source order, terminated by a single `Eof`.
    pub tokens: Vec<Token>,
    /// Regions that were skipped because they could not be tokenized.
    pub errors: Vec<LexicalError>,
}

/// Scans the whole source. Never fails: unscannable regions are skipped and
/// recorded in [`Scan::errors`].
pub fn scan(source: &str) -> Scan {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(token) => {
                let is_eof = matches!(token.kind, TokenKind::Eof);
                tokens.push(token);
                if is_eof {
                    break;
                }
            }
            Err(error) => errors.push(error),
        }
    }
    Scan { tokens, errors }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    line: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            line: 1,
        }
    }

    /// Produces the next token. Once the input is exhausted every call
    /// returns an `Eof` token.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            self.cursor.mark_start();
            let line = self.line;
            let Some(c) = self.cursor.advance() else {
                return Ok(self.make_token(TokenKind::Eof, None, line));
            };

            let kind = match c {
                // Single character tokens
                '(' => TokenKind::LeftParenthesis,
                ')' => TokenKind::RightParenthesis,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                ';' => TokenKind::Semicolon,
                '*' => TokenKind::Star,
                // One or two character tokens
                '!' => self.one_or_two(TokenKind::Bang, TokenKind::BangEqual),
                '=' => self.one_or_two(TokenKind::Equal, TokenKind::EqualEqual),
                '<' => self.one_or_two(TokenKind::LessThan, TokenKind::LessThanEqual),
                '>' => self.one_or_two(TokenKind::GreaterThan, TokenKind::GreaterThanEqual),
                '/' => {
                    if self.cursor.eat_if('/') {
                        self.skip_comment();
                        continue;
                    }
                    TokenKind::Slash
                }
                ' ' | '\r' | '\t' => continue,
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '"' => return self.lex_string(line),
                '0'..='9' => return Ok(self.lex_number(line)),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.lex_ident_or_keyword(line)),
                c => {
                    let error = LexicalError {
                        kind: LexicalErrorKind::Unrecognized(c),
                        span: self.cursor.span(),
                        line,
                    };
                    debug!(line, character = %c, "skipping unrecognized character");
                    return Err(error);
                }
            };
            return Ok(self.make_token(kind, None, line));
        }
    }
}

impl<'src> Lexer<'src> {
    fn make_token(&self, kind: TokenKind, literal: Option<LoxValue>, line: u32) -> Token {
        let token = Token {
            kind,
            lexeme: self.cursor.lexeme().into(),
            literal,
            line,
            span: self.cursor.span(),
        };
        trace!(kind = %token.kind, lexeme = %token.lexeme, line, "token");
        token
    }

    fn one_or_two(&mut self, single: TokenKind, double: TokenKind) -> TokenKind {
        if self.cursor.eat_if('=') {
            double
        } else {
            single
        }
    }

    fn skip_comment(&mut self) {
        while !matches!(self.cursor.peek(), Some('\n') | None) {
            self.cursor.advance();
        }
    }

    fn lex_string(&mut self, line: u32) -> Result<Token, LexicalError> {
        loop {
            match self.cursor.advance() {
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => {}
                None => {
                    debug!(line, "unterminated string literal");
                    return Err(LexicalError {
                        kind: LexicalErrorKind::UnterminatedString,
                        span: self.cursor.span(),
                        line,
                    });
                }
            }
        }
        let lexeme = self.cursor.lexeme();
        let value = &lexeme[1..lexeme.len() - 1];
        Ok(self.make_token(
            TokenKind::StringLiteral,
            Some(LoxValue::String(value.into())),
            line,
        ))
    }

    fn lex_number(&mut self, line: u32) -> Token {
        self.eat_digits();
        // Only take the dot when a digit follows so `1.` leaves the dot alone.
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance();
            self.eat_digits();
        }
        let value: f64 = self
            .cursor
            .lexeme()
            .parse()
            .expect("Numeric literals are guaranteed to be parseable into f64.");
        self.make_token(TokenKind::NumericLiteral, Some(LoxValue::Number(value)), line)
    }

    fn eat_digits(&mut self) {
        while self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
        }
    }

    fn lex_ident_or_keyword(&mut self, line: u32) -> Token {
        while self
            .cursor
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.cursor.advance();
        }
        let kind = KEYWORD_HASHMAP
            .get(self.cursor.lexeme())
            .cloned()
            .unwrap_or(TokenKind::Ident);
        self.make_token(kind, None, line)
    }
}
