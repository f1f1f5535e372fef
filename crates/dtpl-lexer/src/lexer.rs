//! Core expression lexer — converts expression text to a token stream.
//!
//! Features:
//! - Integer, decimal and exponent number literals
//! - Single- and double-quoted strings with backslash escapes
//! - Symbolic (`&&`, `||`, `!`) and word (`and`, `or`, `not`) logic operators
//! - Whitespace, including newlines, is insignificant
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use dtpl_types::{CompileErrors, ErrorCode, ExprError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The expression lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`dtpl_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    text: &'src str,
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, counted in characters).
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            text: &source_file.source,
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire expression into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.is_full() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    /// Consume one full character, keeping line/column in sync.
    fn advance(&mut self) -> Option<char> {
        let ch = self.text[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = ExprError::new(code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = ExprError::new(code, message, span, source_line).with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            if self.at_end() || self.errors.is_full() {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start_pos = self.pos;
            let start_line = self.line;
            let start_col = self.col;
            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                '\'' | '"' => self.scan_string(ch, start_line, start_col),
                '0'..='9' => self.scan_number(start_pos, start_line, start_col),
                'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(start_pos),

                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                '.' => TokenKind::Dot,

                '=' if self.peek() == Some(b'=') => {
                    self.advance();
                    TokenKind::EqEq
                }
                '!' if self.peek() == Some(b'=') => {
                    self.advance();
                    TokenKind::BangEq
                }
                '!' => TokenKind::Bang,
                '<' if self.peek() == Some(b'=') => {
                    self.advance();
                    TokenKind::LessEq
                }
                '<' => TokenKind::Less,
                '>' if self.peek() == Some(b'=') => {
                    self.advance();
                    TokenKind::GreaterEq
                }
                '>' => TokenKind::Greater,
                '&' if self.peek() == Some(b'&') => {
                    self.advance();
                    TokenKind::AmpAmp
                }
                '|' if self.peek() == Some(b'|') => {
                    self.advance();
                    TokenKind::PipePipe
                }
                '?' if self.peek() == Some(b'?') => {
                    self.advance();
                    TokenKind::QuestionQuestion
                }
                '?' => TokenKind::Question,

                '=' => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        "Unexpected character '='",
                        span,
                        "Use '==' for comparison; assignments are only valid in `$with`",
                    );
                    continue;
                }
                other => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("Unexpected character '{other}'"),
                        span,
                    );
                    // Error recovery: skip the character and try again
                    continue;
                }
            };

            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    fn scan_number(&mut self, start_pos: usize, start_line: u32, start_col: u32) -> TokenKind {
        while let Some(b'0'..=b'9' | b'_') = self.peek() {
            self.advance();
        }

        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance();
            while let Some(b'0'..=b'9' | b'_') = self.peek() {
                self.advance();
            }
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digits_at = match self.peek_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digits_at), Some(b'0'..=b'9')) {
                is_float = true;
                for _ in 0..digits_at {
                    self.advance();
                }
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
        }

        let text = self.text[start_pos..self.pos].replace('_', "");
        if is_float {
            match text.parse::<f64>() {
                Ok(value) => TokenKind::FloatLit(value),
                Err(_) => self.invalid_number(&text, start_line, start_col),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::IntLit(value),
                Err(_) => self.invalid_number(&text, start_line, start_col),
            }
        }
    }

    fn invalid_number(&mut self, text: &str, start_line: u32, start_col: u32) -> TokenKind {
        let span = self.span_from(start_line, start_col);
        self.emit_error(
            ErrorCode::INVALID_NUMBER,
            format!("Invalid number literal '{text}'"),
            span,
        );
        TokenKind::IntLit(0)
    }

    fn scan_identifier(&mut self, start_pos: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.text[start_pos..self.pos];
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    /// Scan a string literal after its opening quote.
    fn scan_string(&mut self, quote: char, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_STRING,
                        "Unterminated string literal",
                        span,
                        format!("Close the string with {quote}"),
                    );
                    return TokenKind::StringLit(buf);
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(_) => {
                    let Some(ch) = self.advance() else { continue };
                    if ch == quote {
                        return TokenKind::StringLit(buf);
                    }
                    buf.push(ch);
                }
            }
        }
    }

    /// Scan an escape sequence starting at the `\`.
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();

        match self.advance() {
            Some('"') => Some('"'),
            Some('\'') => Some('\''),
            Some('\\') => Some('\\'),
            Some('n') => Some('\n'),
            Some('t') => Some('\t'),
            Some('r') => Some('\r'),
            Some(ch) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("Invalid escape sequence '\\{ch}'"),
                    span,
                );
                Some(ch)
            }
            None => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNTERMINATED_STRING,
                    "Unexpected end of expression in escape sequence",
                    span,
                );
                None
            }
        }
    }
}
