//! Token types for the expression lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the expression language and
//! [`Token`], which pairs a kind with a source [`Span`].

use dtpl_types::Span;
use std::fmt;

/// Reserved words. They cannot be used as variable names.
pub const ALL_KEYWORDS: &[&str] = &["true", "false", "nil", "null", "not", "and", "or", "in"];

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`
    IntLit(i64),
    /// `3.14`
    FloatLit(f64),
    /// `'hello'` or `"hello"`
    StringLit(String),
    True,
    False,
    /// `nil` or `null`
    Nil,

    /// `my_var`, `item`
    Identifier(String),

    // ── Word operators ───────────────────────────────────────
    Not,
    And,
    Or,
    In,

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    BangEq,
    Bang,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    AmpAmp,
    PipePipe,
    Question,
    QuestionQuestion,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,

    Eof,
}

impl TokenKind {
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" | "null" => TokenKind::Nil,
            "not" => TokenKind::Not,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "in" => TokenKind::In,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
                | TokenKind::Not
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::In
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::FloatLit(n) => write!(f, "{n}"),
            TokenKind::StringLit(s) => write!(f, "'{s}'"),
            TokenKind::Identifier(name) => write!(f, "{name}"),
            TokenKind::Eof => write!(f, "end of expression"),
            other => f.write_str(match other {
                TokenKind::True => "true",
                TokenKind::False => "false",
                TokenKind::Nil => "nil",
                TokenKind::Not => "not",
                TokenKind::And => "and",
                TokenKind::Or => "or",
                TokenKind::In => "in",
                TokenKind::Plus => "+",
                TokenKind::Minus => "-",
                TokenKind::Star => "*",
                TokenKind::Slash => "/",
                TokenKind::Percent => "%",
                TokenKind::EqEq => "==",
                TokenKind::BangEq => "!=",
                TokenKind::Bang => "!",
                TokenKind::Less => "<",
                TokenKind::Greater => ">",
                TokenKind::LessEq => "<=",
                TokenKind::GreaterEq => ">=",
                TokenKind::AmpAmp => "&&",
                TokenKind::PipePipe => "||",
                TokenKind::Question => "?",
                TokenKind::QuestionQuestion => "??",
                TokenKind::LParen => "(",
                TokenKind::RParen => ")",
                TokenKind::LBracket => "[",
                TokenKind::RBracket => "]",
                TokenKind::LBrace => "{",
                TokenKind::RBrace => "}",
                TokenKind::Comma => ",",
                TokenKind::Colon => ":",
                TokenKind::Dot => ".",
                _ => unreachable!("handled above"),
            }),
        }
    }
}
