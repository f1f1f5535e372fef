//! Compile pipeline and compiled programs.
//!
//! ```text
//! Expression text → Lexer → Parser → Call resolution → Program
//! ```

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use dtpl_lexer::Lexer;
use dtpl_parser::Parser;
use dtpl_types::ast::{Expr, ExprKind};
use dtpl_types::{CompileErrors, ErrorCode, ExprError, SourceFile};

use crate::error::EvalResult;
use crate::evaluator::Evaluator;
use crate::functions;
use crate::options::ExprOptions;

/// Compiles expression text into [`Program`]s.
///
/// Cheap to clone; the options are shared with every program it compiles.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: Arc<ExprOptions>,
}

impl Engine {
    /// An engine with builtins only and no globals.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExprOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &ExprOptions {
        &self.options
    }

    /// Compile `source` into a program.
    ///
    /// Lex and parse errors are reported together; call resolution only runs
    /// on a syntactically valid expression.
    pub fn compile(&self, source: &str) -> Result<Program, CompileErrors> {
        let source_file = SourceFile::new(source);
        let lex = Lexer::new(&source_file).lex();
        let mut errors = lex.errors;

        let parsed = Parser::new(lex.tokens, &source_file).parse();
        errors.extend(parsed.errors);

        let expr = match parsed.expr {
            Some(expr) if !errors.has_errors() => expr,
            _ => return Err(errors),
        };

        self.resolve_calls(&expr, &source_file, &mut errors);
        if errors.has_errors() {
            return Err(errors);
        }

        Ok(Program {
            source: Arc::from(source),
            expr: Arc::new(expr),
            options: Arc::clone(&self.options),
        })
    }

    /// Check every call against registered and builtin functions.
    fn resolve_calls(&self, expr: &Expr, source_file: &SourceFile, errors: &mut CompileErrors) {
        expr.walk(&mut |node| {
            let ExprKind::Call { name, args } = &node.kind else {
                return;
            };
            if self.options.has_function(&name.name) {
                return;
            }
            let source_line = source_file.line(name.span.start_line).unwrap_or("");
            match functions::lookup(&name.name) {
                Some(builtin) if !builtin.accepts(args.len()) => {
                    errors.push_error(ExprError::new(
                        ErrorCode::WRONG_ARG_COUNT,
                        format!(
                            "'{}' expects {}, got {}",
                            builtin.name,
                            builtin.arity(),
                            args.len()
                        ),
                        node.span,
                        source_line,
                    ));
                }
                Some(_) => {}
                None => {
                    let known: Vec<&str> = functions::names().collect();
                    errors.push_error(
                        ExprError::new(
                            ErrorCode::UNKNOWN_FUNCTION,
                            format!("unknown function '{}'", name.name),
                            name.span,
                            source_line,
                        )
                        .with_suggestion(format!("available functions: {}", known.join(", "))),
                    );
                }
            }
        });
    }
}

/// A compiled expression, ready to run against any context.
///
/// Immutable and cheap to clone; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Program {
    source: Arc<str>,
    expr: Arc<Expr>,
    options: Arc<ExprOptions>,
}

impl Program {
    /// The expression text this program was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against `env`; names missing from `env` fall back to the
    /// engine globals, then to nil.
    pub fn run(&self, env: &Map<String, Value>) -> EvalResult<Value> {
        Evaluator::new(env, &self.options).eval_expr(&self.expr)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
