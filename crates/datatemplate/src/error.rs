//! Template error types.

use dtpl_eval::EvalError;
use dtpl_types::CompileErrors;

/// Errors raised while building or processing a template.
///
/// Construction errors ([`TemplateError::is_construction`]) abort template
/// building; the rest abort only the current `process` call.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Expression text failed to lex, parse or resolve.
    #[error("failed to compile expression `{expression}`: {errors}")]
    Compile {
        expression: String,
        #[source]
        errors: CompileErrors,
    },
    /// A control construct is malformed.
    #[error("invalid {marker} block: {reason}")]
    Structural { marker: &'static str, reason: String },
    /// An iteration source evaluated to something other than an array or object.
    #[error("cannot iterate over `{expression}`: expected array or object, got {found}")]
    InvalidIterator {
        expression: String,
        found: &'static str,
    },
    /// A compiled expression failed at run time.
    #[error("failed to evaluate `{expression}`: {source}")]
    Expression {
        expression: String,
        source: EvalError,
    },
    /// A context was built from a value that is not an object.
    #[error("context must be an object, got {found}")]
    InvalidContext { found: &'static str },
    /// Input data could not be converted into a template value.
    #[error("failed to serialize template input: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Template output could not be converted into the requested type.
    #[error("failed to deserialize template output: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl TemplateError {
    pub(crate) fn structural(marker: &'static str, reason: impl Into<String>) -> Self {
        Self::Structural {
            marker,
            reason: reason.into(),
        }
    }

    /// True for errors raised while building a template.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::Compile { .. } | Self::Structural { .. } | Self::Serialize(_)
        )
    }
}

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
