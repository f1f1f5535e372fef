//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 8. `cond ? a : b` (right-associative)
//! 7. `??` (nil-coalescing)
//! 6. `||`, `or`
//! 5. `&&`, `and`
//! 4. `==`, `!=`, `<`, `>`, `<=`, `>=`, `in` (no chaining)
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `!`, `not`
//! 0. `.` (field access), `[]` (index), `()` (call)

use dtpl_lexer::token::TokenKind;
use dtpl_types::ast::*;
use dtpl_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        if !self.enter_nested() {
            return None;
        }
        let result = self.parse_ternary();
        self.leave_nested();
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Ternary = NilCoalesce [ "?" Expression ":" Expression ]`
    fn parse_ternary(&mut self) -> Option<Expr> {
        let condition = self.parse_nil_coalesce()?;
        if !self.eat(&TokenKind::Question) {
            return Some(condition);
        }
        let then_branch = self.parse_expression()?;
        self.expect(&TokenKind::Colon)?;
        let else_branch = self.parse_expression()?;
        let span = condition.span.merge(else_branch.span);
        Some(Expr::new(
            ExprKind::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    /// `NilCoalesce = Or { "??" Or }`
    fn parse_nil_coalesce(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_or()?;
            while p.eat(&TokenKind::QuestionQuestion) {
                if !p.enter_nested() {
                    return None;
                }
                let right = p.parse_or()?;
                let span = left.span.merge(right.span);
                left = Expr::new(
                    ExprKind::NilCoalesce {
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                );
            }
            Some(left)
        })
    }

    /// `Or = And { ("||" | "or") And }`
    fn parse_or(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_and()?;
            while p.eat(&TokenKind::PipePipe) || p.eat(&TokenKind::Or) {
                if !p.enter_nested() {
                    return None;
                }
                let right = p.parse_and()?;
                left = binary(left, BinOp::Or, right);
            }
            Some(left)
        })
    }

    /// `And = Comparison { ("&&" | "and") Comparison }`
    fn parse_and(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_comparison()?;
            while p.eat(&TokenKind::AmpAmp) || p.eat(&TokenKind::And) {
                if !p.enter_nested() {
                    return None;
                }
                let right = p.parse_comparison()?;
                left = binary(left, BinOp::And, right);
            }
            Some(left)
        })
    }

    /// `Comparison = Add [ CompOp Add ]`
    ///
    /// Comparison operators do NOT chain: `a < b < c` is a parse error.
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_add()?;
        if let Some(op) = self.match_comparison_op() {
            self.advance();
            let right = self.parse_add()?;
            left = binary(left, op, right);
            if self.match_comparison_op().is_some() {
                let span = self.current_span();
                self.error_with_suggestion(
                    ErrorCode::CHAINED_COMPARISON,
                    "comparison operators cannot be chained",
                    span,
                    "combine comparisons with '&&': a < b && b < c",
                );
                return None;
            }
        }
        Some(left)
    }

    /// Check if current token is a comparison operator, return corresponding BinOp.
    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            TokenKind::In => Some(BinOp::In),
            _ => None,
        }
    }

    /// `Add = Mul { ("+" | "-") Mul }`
    fn parse_add(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_mul()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Plus => BinOp::Add,
                    TokenKind::Minus => BinOp::Sub,
                    _ => break,
                };
                p.advance();
                if !p.enter_nested() {
                    return None;
                }
                let right = p.parse_mul()?;
                left = binary(left, op, right);
            }
            Some(left)
        })
    }

    /// `Mul = Unary { ("*" | "/" | "%") Unary }`
    fn parse_mul(&mut self) -> Option<Expr> {
        self.chain(|p| {
            let mut left = p.parse_unary()?;
            loop {
                let op = match p.peek_kind() {
                    TokenKind::Star => BinOp::Mul,
                    TokenKind::Slash => BinOp::Div,
                    TokenKind::Percent => BinOp::Mod,
                    _ => break,
                };
                p.advance();
                if !p.enter_nested() {
                    return None;
                }
                let right = p.parse_unary()?;
                left = binary(left, op, right);
            }
            Some(left)
        })
    }

    /// `Unary = ( "-" | "!" | "not" ) Unary | Postfix`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang | TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.advance();
        if !self.enter_nested() {
            return None;
        }
        let operand = self.parse_unary();
        self.leave_nested();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `Postfix = Primary { "." Name | "[" Expression "]" }`
    fn parse_postfix(&mut self) -> Option<Expr> {
        self.chain(Self::parse_postfix_chain)
    }

    fn parse_postfix_chain(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let is_access = matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LBracket);
            if is_access && !self.enter_nested() {
                return None;
            }
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.expect_field_name()?;
                    let span = expr.span.merge(field.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            field,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::IntLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::IntLit(n), start))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::FloatLit(n), start))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Some(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(false), start))
            }
            TokenKind::Nil => {
                self.advance();
                Some(Expr::new(ExprKind::NilLit, start))
            }

            // ── Collections ─────────────────────────────────────────────
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_map_literal(),

            // ── Grouping ────────────────────────────────────────────────
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }

            // ── Names ───────────────────────────────────────────────────
            TokenKind::Identifier(name) => {
                if matches!(self.look_ahead(1), TokenKind::LParen) {
                    return self.parse_call(name);
                }
                self.advance();
                Some(Expr::new(ExprKind::Identifier(name), start))
            }

            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                None
            }
        }
    }

    /// Parse `name(args...)`.
    fn parse_call(&mut self, name: String) -> Option<Expr> {
        let name = Ident::new(name, self.advance());
        self.expect(&TokenKind::LParen)?;
        let args = self.parse_comma_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        let span = name.span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Call { name, args }, span))
    }

    /// Parse comma-separated expressions up to (not including) `close`.
    /// A trailing comma is allowed.
    fn parse_comma_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check_exact(close) {
            items.push(self.parse_expression()?);
            if !self.eat_comma() {
                break;
            }
        }
        Some(items)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Literals
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `[expr, ...]`
    fn parse_array_literal(&mut self) -> Option<Expr> {
        let start = self.advance();
        let elements = self.parse_comma_list(&TokenKind::RBracket)?;
        self.expect(&TokenKind::RBracket)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::ArrayLit(elements), span))
    }

    /// Parse `{ key: expr, 'quoted key': expr }` or `{}`
    fn parse_map_literal(&mut self) -> Option<Expr> {
        let start = self.advance();
        let mut entries = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) {
            let key = self.parse_map_key()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push(MapEntry { key, value });
            if !self.eat_comma() {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::MapLit(entries), span))
    }

    /// Map keys are bare names, keywords, quoted strings or integers.
    fn parse_map_key(&mut self) -> Option<String> {
        let key = match self.peek_kind().clone() {
            TokenKind::Identifier(name) => name,
            TokenKind::StringLit(s) => s,
            TokenKind::IntLit(n) => n.to_string(),
            kind if kind.is_keyword() => kind.to_string(),
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected map key, got '{other}'"),
                );
                return None;
            }
        };
        self.advance();
        Some(key)
    }
}

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
