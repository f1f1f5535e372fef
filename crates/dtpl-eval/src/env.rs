//! Layered variable lookup for the evaluator.

use serde_json::{Map, Value};

/// Variable environment for one program run.
///
/// Names are looked up in the evaluation context first, then in the engine
/// globals. Unknown names resolve to nil.
#[derive(Debug, Clone, Copy)]
pub struct Environment<'a> {
    context: &'a Map<String, Value>,
    globals: &'a Map<String, Value>,
}

impl<'a> Environment<'a> {
    pub fn new(context: &'a Map<String, Value>, globals: &'a Map<String, Value>) -> Self {
        Self { context, globals }
    }

    /// Look up a variable, searching the context before the globals.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.context.get(name).or_else(|| self.globals.get(name))
    }
}
