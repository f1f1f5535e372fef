//! Runtime error types for the expression evaluator.

/// Evaluation error: runtime traps and type errors raised while running a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Division or modulo by zero, non-finite results.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),
    /// Member or index access on nil: `nil.field`, `nil[i]`.
    #[error("nil access: {0}")]
    NilAccess(String),
    /// Array or string index outside the value's bounds.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    /// Operand or argument of the wrong type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A builtin or registered function reported a failure.
    #[error("{name}(): {message}")]
    FunctionError { name: String, message: String },
    /// Function name not registered when the program runs.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// Generic runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl EvalError {
    pub(crate) fn function(name: &str, message: impl Into<String>) -> Self {
        Self::FunctionError {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
