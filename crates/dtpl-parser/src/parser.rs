//! Core parser infrastructure: token cursor, error reporting, helpers.

use dtpl_lexer::token::{Token, TokenKind};
use dtpl_types::ast::{Expr, Ident};
use dtpl_types::{CompileErrors, ErrorCode, ExprError, SourceFile, Span};

/// Maximum nesting of sub-expressions, unary operators, collection literals
/// and operator chains.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// The expression parser.
///
/// Consumes a token stream produced by the lexer and builds an AST for a
/// single expression. Collects errors instead of panicking.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: CompileErrors,
    /// Current nesting depth.
    pub(crate) depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// The parsed expression, absent when parsing could not produce one.
    pub expr: Option<Expr>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token's span.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        span
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(1, 1))
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns its span if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Span> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect a name after `.`; keywords are accepted as field names.
    pub(crate) fn expect_field_name(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match kind {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(Ident::new(name, span))
            }
            other if other.is_keyword() => {
                let span = self.advance();
                Some(Ident::new(other.to_string(), span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected field name, got '{other}'"),
                );
                None
            }
        }
    }

    /// Eat an optional trailing comma.
    pub(crate) fn eat_comma(&mut self) -> bool {
        self.eat(&TokenKind::Comma)
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Enter one nesting level. Returns `false` (and reports) past the limit.
    pub(crate) fn enter_nested(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum expression nesting depth is {MAX_NESTING_DEPTH}"),
            );
            self.depth -= 1;
            return false;
        }
        true
    }

    pub(crate) fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Parse a left-associative chain. Every node the chain wraps around its
    /// left operand costs one nesting level until the chain ends, so a long
    /// flat chain is bounded like deep parentheses.
    pub(crate) fn chain(&mut self, parse: impl FnOnce(&mut Self) -> Option<Expr>) -> Option<Expr> {
        let base = self.depth;
        let result = parse(self);
        self.depth = base;
        result
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = ExprError::new(code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Report an error carrying a fix suggestion.
    pub(crate) fn error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = ExprError::new(code, message, span, source_line).with_suggestion(suggestion);
        self.errors.push_error(error);
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a single expression.
    ///
    /// The whole stream must be consumed: leftover tokens are reported as
    /// trailing input.
    pub fn parse(mut self) -> ParseResult {
        if self.at_end() {
            self.error_at_current(ErrorCode::EMPTY_EXPRESSION, "empty expression");
            return ParseResult {
                expr: None,
                errors: self.errors,
            };
        }

        let expr = self.parse_expression();
        if expr.is_some() && !self.at_end() {
            let found = self.peek_kind().to_string();
            self.error_at_current(
                ErrorCode::TRAILING_INPUT,
                format!("unexpected '{found}' after end of expression"),
            );
        }

        ParseResult {
            expr,
            errors: self.errors,
        }
    }
}
