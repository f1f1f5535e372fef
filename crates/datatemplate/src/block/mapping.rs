use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use super::Node;
use crate::context::Context;
use crate::error::TemplateResult;

/// An object with at least one dynamic field.
#[derive(Debug, Clone)]
pub struct MappingBlock {
    fields: BTreeMap<String, Node>,
}

impl MappingBlock {
    pub fn new(fields: BTreeMap<String, Node>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, Node> {
        &self.fields
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let mut object = Map::new();
        for (key, node) in &self.fields {
            object.insert(key.clone(), node.emit(ctx)?);
        }
        Ok(Value::Object(object))
    }
}

impl fmt::Display for MappingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, node)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {node}")?;
        }
        f.write_str("}")
    }
}
