//! Expression parser: converts a token stream into an AST.

mod parse_expr;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING_DEPTH};
