use serde_json::Value;
use std::fmt;

use super::Node;
use crate::context::Context;
use crate::error::TemplateResult;

/// An array with at least one dynamic element.
#[derive(Debug, Clone)]
pub struct SequenceBlock {
    items: Vec<Node>,
}

impl SequenceBlock {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let mut values = Vec::with_capacity(self.items.len());
        for item in &self.items {
            values.push(item.emit(ctx)?);
        }
        Ok(Value::Array(values))
    }
}

impl fmt::Display for SequenceBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}
