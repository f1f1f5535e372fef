//! Lexer tests for the expression language.
//!
//! Covers: keywords, operators, number and string literals, escapes,
//! whitespace handling, error recovery, spans and determinism.

use dtpl_lexer::{Lexer, TokenKind, ALL_KEYWORDS};
use dtpl_types::{ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new(source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_count(source: &str) -> usize {
    let sf = SourceFile::new(source);
    Lexer::new(&sf).lex().errors.total_errors
}

fn first_error_code(source: &str) -> Option<ErrorCode> {
    let sf = SourceFile::new(source);
    Lexer::new(&sf).lex().errors.first().map(|e| e.code)
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_every_keyword_lexes_to_one_token() {
    for kw in ALL_KEYWORDS {
        let k = kinds(kw);
        assert_eq!(k.len(), 1, "keyword '{kw}' should lex to exactly 1 token");
        assert!(k[0].is_keyword(), "'{kw}' should be recognised as a keyword");
    }
}

#[test]
fn test_identifiers() {
    assert_eq!(kinds("name"), vec![ident("name")]);
    assert_eq!(kinds("_private"), vec![ident("_private")]);
    assert_eq!(kinds("item2"), vec![ident("item2")]);
    // Keyword prefixes are still identifiers
    assert_eq!(kinds("index"), vec![ident("index")]);
    assert_eq!(kinds("nothing"), vec![ident("nothing")]);
    assert_eq!(kinds("order"), vec![ident("order")]);
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_single_char_operators() {
    assert_eq!(
        kinds("+ - * / % < > ! ? . , : ( ) [ ] { }"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Bang,
            TokenKind::Question,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::LBrace,
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn test_two_char_operators() {
    assert_eq!(
        kinds("== != <= >= && || ??"),
        vec![
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::QuestionQuestion,
        ]
    );
}

#[test]
fn test_operators_without_spaces() {
    assert_eq!(
        kinds("a+1"),
        vec![ident("a"), TokenKind::Plus, TokenKind::IntLit(1)]
    );
    assert_eq!(
        kinds("a>=b??c"),
        vec![
            ident("a"),
            TokenKind::GreaterEq,
            ident("b"),
            TokenKind::QuestionQuestion,
            ident("c"),
        ]
    );
}

#[test]
fn test_single_equals_is_an_error() {
    assert_eq!(first_error_code("a = 1"), Some(ErrorCode::UNEXPECTED_CHARACTER));
    let sf = SourceFile::new("a = 1");
    let result = Lexer::new(&sf).lex();
    let err = result.errors.first().unwrap();
    assert!(err.suggestion.as_deref().unwrap_or("").contains("=="));
}

#[test]
fn test_lone_ampersand_and_pipe_are_errors() {
    assert_eq!(first_error_code("a & b"), Some(ErrorCode::UNEXPECTED_CHARACTER));
    assert_eq!(first_error_code("a | b"), Some(ErrorCode::UNEXPECTED_CHARACTER));
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_literals() {
    assert_eq!(kinds("0"), vec![TokenKind::IntLit(0)]);
    assert_eq!(kinds("42"), vec![TokenKind::IntLit(42)]);
    assert_eq!(kinds("1_000"), vec![TokenKind::IntLit(1000)]);
}

#[test]
fn test_float_literals() {
    assert_eq!(kinds("3.25"), vec![TokenKind::FloatLit(3.25)]);
    assert_eq!(kinds("2.0"), vec![TokenKind::FloatLit(2.0)]);
    assert_eq!(kinds("1e3"), vec![TokenKind::FloatLit(1000.0)]);
    assert_eq!(kinds("2.5E-1"), vec![TokenKind::FloatLit(0.25)]);
}

#[test]
fn test_dot_after_integer_is_member_access() {
    assert_eq!(
        kinds("1.abs"),
        vec![TokenKind::IntLit(1), TokenKind::Dot, ident("abs")]
    );
}

#[test]
fn test_negative_number_is_two_tokens() {
    assert_eq!(kinds("-5"), vec![TokenKind::Minus, TokenKind::IntLit(5)]);
}

#[test]
fn test_integer_overflow_is_an_error() {
    assert_eq!(
        first_error_code("99999999999999999999"),
        Some(ErrorCode::INVALID_NUMBER)
    );
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_single_and_double_quoted_strings() {
    assert_eq!(kinds("'tony'"), vec![TokenKind::StringLit("tony".into())]);
    assert_eq!(kinds("\"tony\""), vec![TokenKind::StringLit("tony".into())]);
    assert_eq!(kinds("''"), vec![TokenKind::StringLit(String::new())]);
}

#[test]
fn test_other_quote_inside_string() {
    assert_eq!(
        kinds(r#"'say "hi"'"#),
        vec![TokenKind::StringLit("say \"hi\"".into())]
    );
    assert_eq!(
        kinds(r#""it's""#),
        vec![TokenKind::StringLit("it's".into())]
    );
}

#[test]
fn test_escape_sequences() {
    assert_eq!(
        kinds(r"'a\nb\tc\\d\'e'"),
        vec![TokenKind::StringLit("a\nb\tc\\d'e".into())]
    );
}

#[test]
fn test_invalid_escape() {
    assert_eq!(first_error_code(r"'\q'"), Some(ErrorCode::INVALID_ESCAPE));
}

#[test]
fn test_unicode_string_contents() {
    assert_eq!(
        kinds("'héllo wörld'"),
        vec![TokenKind::StringLit("héllo wörld".into())]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(first_error_code("'abc"), Some(ErrorCode::UNTERMINATED_STRING));
    assert_eq!(first_error_code("\"abc"), Some(ErrorCode::UNTERMINATED_STRING));
}

// ─────────────────────────────────────────────────────────────────────
// Whitespace & error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_whitespace_and_newlines_are_ignored() {
    assert_eq!(
        kinds("  a\n\t+\r\n b  "),
        vec![ident("a"), TokenKind::Plus, ident("b")]
    );
}

#[test]
fn test_empty_input_is_just_eof() {
    let sf = SourceFile::new("   ");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].kind, TokenKind::Eof);
    assert!(!result.errors.has_errors());
}

#[test]
fn test_error_recovery_continues_after_bad_character() {
    assert_eq!(error_count("a # b @ c"), 2);
    assert_eq!(kinds("a # b"), vec![ident("a"), ident("b")]);
}

#[test]
fn test_error_cap() {
    let source = "#".repeat(50);
    let sf = SourceFile::new(source.as_str());
    let result = Lexer::new(&sf).lex();
    assert!(result.errors.is_full());
    assert_eq!(result.errors.errors.len(), dtpl_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Realistic expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_member_and_index_access() {
    assert_eq!(
        kinds("person[0].name"),
        vec![
            ident("person"),
            TokenKind::LBracket,
            TokenKind::IntLit(0),
            TokenKind::RBracket,
            TokenKind::Dot,
            ident("name"),
        ]
    );
}

#[test]
fn test_ternary_with_word_operators() {
    assert_eq!(
        kinds("age > 18 and not minor ? 'adult' : 'kid'"),
        vec![
            ident("age"),
            TokenKind::Greater,
            TokenKind::IntLit(18),
            TokenKind::And,
            TokenKind::Not,
            ident("minor"),
            TokenKind::Question,
            TokenKind::StringLit("adult".into()),
            TokenKind::Colon,
            TokenKind::StringLit("kid".into()),
        ]
    );
}

#[test]
fn test_function_call() {
    assert_eq!(
        kinds("join(names, ', ')"),
        vec![
            ident("join"),
            TokenKind::LParen,
            ident("names"),
            TokenKind::Comma,
            TokenKind::StringLit(", ".into()),
            TokenKind::RParen,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Span correctness
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_span_positions() {
    let sf = SourceFile::new("age >= 42");
    let result = Lexer::new(&sf).lex();
    let tokens = &result.tokens;

    assert_eq!((tokens[0].span.start_col, tokens[0].span.end_col), (1, 3));
    assert_eq!((tokens[1].span.start_col, tokens[1].span.end_col), (5, 6));
    assert_eq!((tokens[2].span.start_col, tokens[2].span.end_col), (8, 9));
    assert_eq!(tokens[3].kind, TokenKind::Eof);
}

#[test]
fn test_span_multiline() {
    let sf = SourceFile::new("a\n  + b");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens[0].span.start_line, 1);
    assert_eq!(result.tokens[1].span.start_line, 2);
    assert_eq!(result.tokens[1].span.start_col, 3);
    assert_eq!(result.tokens[2].span.start_col, 5);
}

#[test]
fn test_columns_count_characters_not_bytes() {
    let sf = SourceFile::new("'é' + x");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.tokens[1].kind, TokenKind::Plus);
    assert_eq!(result.tokens[1].span.start_col, 5);
}

// ─────────────────────────────────────────────────────────────────────
// 100-iteration determinism test
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_lexer_determinism_100_iterations() {
    let source = "len(person) > 0 ? join(keys(person[0]), ', ') : name ?? 'nobody'";
    let first = kinds(source);
    for i in 0..100 {
        assert_eq!(kinds(source), first, "iteration {i} diverged");
    }
}
