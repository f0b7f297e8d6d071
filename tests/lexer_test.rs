use color_eyre::eyre::{Context, Result};
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use arbor::lexer::{
    formatter::{BasicFormatter, LineFormatter, ToFormatter, TokenFormatter},
    scan, Lexer, LexicalErrorKind, Token, TokenKind,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let mut scanner = Lexer::new(input);
    let formatter: BasicFormatter = scanner.create_formatter();
    let mut buffer = String::new();
    loop {
        match scanner.next_token() {
            Ok(token) => {
                buffer.push_str(&formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    break;
                }
            }
            Err(error) => {
                buffer.push_str(&formatter.format_lexical_error(&error));
            }
        }
        buffer.push('\n');
    }

    assert_eq!(buffer, expected, "Failed the test {test_name}");
}

fn kinds(source: &str) -> Vec<TokenKind> {
    scan(source).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn smoke_test() {
    check("", "EOF  null", "smoke");
}

#[test]
fn maximal_munch() {
    assert_eq!(
        kinds("!= == <= >= ! = < >"),
        vec![
            TokenKind::BangEqual,
            TokenKind::EqualEqual,
            TokenKind::LessThanEqual,
            TokenKind::GreaterThanEqual,
            TokenKind::Bang,
            TokenKind::Equal,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn trailing_dot_is_not_part_of_number() {
    let scan = scan("12.");
    assert_eq!(scan.tokens[0].lexeme, "12");
    assert_eq!(scan.tokens[1].kind, TokenKind::Dot);
}

#[test]
fn keywords_need_a_word_boundary() {
    assert_eq!(
        kinds("or orchid"),
        vec![TokenKind::KeywordOr, TokenKind::Ident, TokenKind::Eof]
    );
}

#[test]
fn multi_line_string_keeps_starting_line() {
    let scan = scan("\"a\nb\" x");
    assert_eq!(scan.tokens[0].line, 1);
    assert_eq!(scan.tokens[1].line, 2);
}

#[test]
fn skipped_regions_are_reported_and_scanning_continues() {
    let scan = scan("1 @ 2\n\"never closed");
    assert_eq!(
        scan.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::NumericLiteral,
            TokenKind::NumericLiteral,
            TokenKind::Eof
        ]
    );
    assert_eq!(scan.errors.len(), 2);
    assert_eq!(scan.errors[0].kind, LexicalErrorKind::Unrecognized('@'));
    assert_eq!(scan.errors[0].line, 1);
    assert_eq!(scan.errors[1].kind, LexicalErrorKind::UnterminatedString);
    assert_eq!(scan.errors[1].line, 2);
}

#[test]
fn eof_repeats_once_exhausted() {
    let mut scanner = Lexer::new("x");
    assert!(matches!(
        scanner.next_token(),
        Ok(Token {
            kind: TokenKind::Ident,
            ..
        })
    ));
    for _ in 0..3 {
        assert!(matches!(
            scanner.next_token(),
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            })
        ));
    }
}

#[test]
fn line_formatter_prefixes_line() {
    let mut scanner = Lexer::new("\n\nvar");
    let formatter: LineFormatter = scanner.create_formatter();
    let token = scanner.next_token().expect("Valid token");
    assert_eq!(formatter.format(&token), "(3) VAR var null");
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/lexer/in");
    let output_dir = Path::new("./test_data/lexer/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "lox" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded);

    Ok(())
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just(",".to_string()),
        Just(".".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just(";".to_string()),
        Just("*".to_string()),
        Just("!".to_string()),
        Just("!=".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
        Just("/".to_string()),
    ]
}

fn numeric_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]+".prop_map(|s| s),          // Integer literals
        "[0-9]+\\.[0-9]+".prop_map(|s| s)  // Decimal literals
    ]
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    "[^\"]*".prop_map(|s: String| format!("\"{}\"", s))
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]*".prop_map(|s: String| s)
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(
        arbor::lexer::KEYWORD_HASHMAP
            .keys()
            .map(|k| k.to_string())
            .collect::<Vec<_>>(),
    )
}

fn comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{}\n", s))
}

fn token_sequence_with_comments_strategy() -> impl Strategy<Value = String> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
            comment_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
    .prop_map(|tokens| tokens.join(" "))
}

fn token_sequence_without_comments_strategy() -> impl Strategy<Value = Vec<String>> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            string_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(input in token_sequence_without_comments_strategy()) {
        // Add 1 to include EOF token
        let expected_num_tokens = input.len() + 1;
        let input = input.join(" ");
        let mut scanner = Lexer::new(&input);
        let mut num_tokens = 0;
        loop {
            num_tokens += 1;
            match scanner.next_token() {
                Ok(Token {kind: TokenKind::Eof, ..}) => {
                    break;
                },
                token => {
                    prop_assert!(token.is_ok());
                }
            }
        }
        prop_assert_eq!(num_tokens, expected_num_tokens);
    }

    #[test]
    fn lexer_handles_valid_tokens_with_comments(input in token_sequence_with_comments_strategy()) {
        let scan = scan(&input);
        prop_assert!(scan.errors.is_empty());
        prop_assert_eq!(scan.tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn rescanning_lexemes_reproduces_kinds(input in token_sequence_with_comments_strategy()) {
        let first = scan(&input);
        let lexemes = first
            .tokens
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let second = scan(&lexemes);
        prop_assert_eq!(
            first.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            second.tokens.iter().map(|t| t.kind).collect::<Vec<_>>()
        );
    }
}
