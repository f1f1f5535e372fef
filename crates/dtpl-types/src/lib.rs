//! Shared types for the datatemplate expression language.
//!
//! This crate defines the expression AST, source spans and the diagnostic
//! types used by the lexer, the parser and the evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, ExprError, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used throughout the expression front-end.
pub type Result<T> = std::result::Result<T, ExprError>;
