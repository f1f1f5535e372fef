//! Engine configuration: global variables and custom functions.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A registered function callable from expressions.
///
/// Receives the evaluated arguments; an `Err` message surfaces as
/// [`crate::EvalError::FunctionError`].
pub type CustomFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Options shared by every program an [`crate::Engine`] compiles.
#[derive(Clone, Default)]
pub struct ExprOptions {
    globals: Map<String, Value>,
    functions: BTreeMap<String, CustomFn>,
}

impl ExprOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `value` visible to every program under `name`, unless the
    /// evaluation context defines the same name.
    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Register a custom function. Custom functions shadow builtins of the
    /// same name.
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &Map<String, Value> {
        &self.globals
    }

    pub fn function(&self, name: &str) -> Option<&CustomFn> {
        self.functions.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl fmt::Debug for ExprOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprOptions")
            .field("globals", &self.globals)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}
