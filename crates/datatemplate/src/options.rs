//! Template build options.

use serde_json::Value;

use dtpl_eval::{Engine, ExprOptions};

/// Options applied when building a template.
///
/// Wraps the expression engine options; every expression in the template is
/// compiled with them.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    expr: ExprOptions,
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expr_options(mut self, expr: ExprOptions) -> Self {
        self.expr = expr;
        self
    }

    /// See [`ExprOptions::with_global`].
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.expr = self.expr.with_global(name, value);
        self
    }

    /// See [`ExprOptions::with_function`].
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.expr = self.expr.with_function(name, function);
        self
    }

    pub fn expr_options(&self) -> &ExprOptions {
        &self.expr
    }

    /// An engine compiling with these options.
    pub fn engine(&self) -> Engine {
        Engine::with_options(self.expr.clone())
    }
}
