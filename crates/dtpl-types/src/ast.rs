//! AST node types for the expression language.
//!
//! Every node carries a [`Span`] for error reporting.
//! Recursive variants are boxed to keep enum sizes reasonable.

use crate::Span;
use std::fmt;

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`
    IntLit(i64),
    /// `3.14`
    FloatLit(f64),
    /// `'hello'` or `"hello"`
    StringLit(String),
    /// `true` / `false`
    BoolLit(bool),
    /// `nil` / `null`
    NilLit,
    /// `[expr, ...]`
    ArrayLit(Vec<Expr>),
    /// `{ key: expr, 'quoted key': expr }`
    MapLit(Vec<MapEntry>),

    // ── Names & access ──
    /// A variable looked up in the evaluation environment.
    Identifier(String),
    /// `object.field`
    Member { object: Box<Expr>, field: Ident },
    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `name(args...)`
    Call { name: Ident, args: Vec<Expr> },

    // ── Operators ──
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `left ?? right`
    NilCoalesce { left: Box<Expr>, right: Box<Expr> },
    /// `condition ? then_branch : else_branch`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `( expr )`
    Paren(Box<Expr>),
}

/// One `key: value` entry of a map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    In,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::In => "in",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x` / `not x`
    Not,
}

impl Expr {
    /// Visit this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::IntLit(_)
            | ExprKind::FloatLit(_)
            | ExprKind::StringLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::NilLit
            | ExprKind::Identifier(_) => {}
            ExprKind::ArrayLit(items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            ExprKind::MapLit(entries) => {
                for entry in entries {
                    entry.value.walk(visit);
                }
            }
            ExprKind::Member { object, .. } => object.walk(visit),
            ExprKind::Index { object, index } => {
                object.walk(visit);
                index.walk(visit);
            }
            ExprKind::Call { args, .. } => {
                for arg in args {
                    arg.walk(visit);
                }
            }
            ExprKind::Unary { operand, .. } => operand.walk(visit),
            ExprKind::Binary { left, right, .. } | ExprKind::NilCoalesce { left, right } => {
                left.walk(visit);
                right.walk(visit);
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.walk(visit);
                then_branch.walk(visit);
                else_branch.walk(visit);
            }
            ExprKind::Paren(inner) => inner.walk(visit),
        }
    }
}
