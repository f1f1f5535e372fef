use serde_json::Value;
use std::fmt;

use dtpl_eval::to_display_string;

/// A static value, emitted unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralBlock {
    value: Value,
}

impl LiteralBlock {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The block a statically false condition without `$else` collapses to.
    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn emit(&self) -> Value {
        self.value.clone()
    }
}

impl fmt::Display for LiteralBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_display_string(&self.value))
    }
}
