use serde_json::Value;
use std::fmt;

use dtpl_eval::{type_name, Engine, Program};

use super::Block;
use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};
use crate::markers;

/// Names the loop variables are bound to inside an iteration body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopNames {
    pub index: String,
    pub key: String,
    pub value: String,
}

impl Default for LoopNames {
    fn default() -> Self {
        Self {
            index: markers::DEFAULT_INDEX.to_string(),
            key: markers::DEFAULT_KEY.to_string(),
            value: markers::DEFAULT_VALUE.to_string(),
        }
    }
}

/// `$iterate`: emits the body once per element of an array or entry of an
/// object, collecting the results into an array.
///
/// Array iterations drop nil results; object iterations keep them.
#[derive(Debug, Clone)]
pub struct IterationBlock {
    source: Program,
    names: LoopNames,
    body: Box<Block>,
}

impl IterationBlock {
    pub fn new(source: Program, names: LoopNames, body: Block) -> Self {
        Self {
            source,
            names,
            body: Box::new(body),
        }
    }

    pub fn compile(
        engine: &Engine,
        source: &str,
        names: LoopNames,
        body: Block,
    ) -> TemplateResult<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(TemplateError::structural(
                markers::ITERATE,
                "empty iteration expression",
            ));
        }
        Ok(Self::new(super::compile(engine, source)?, names, body))
    }

    pub fn source(&self) -> &Program {
        &self.source
    }

    pub fn names(&self) -> &LoopNames {
        &self.names
    }

    pub fn body(&self) -> &Block {
        &self.body
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let collection = super::run(&self.source, ctx)?;
        // One scope per call, overwritten on every pass.
        let mut scope = ctx.clone();
        match collection {
            Value::Array(items) => {
                let mut results = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    scope.insert(&self.names.index, index);
                    scope.insert(&self.names.value, item);
                    let result = self.body.emit(&scope)?;
                    if !result.is_null() {
                        results.push(result);
                    }
                }
                Ok(Value::Array(results))
            }
            Value::Object(fields) => {
                let mut results = Vec::with_capacity(fields.len());
                for (index, (key, item)) in fields.into_iter().enumerate() {
                    scope.insert(&self.names.key, key);
                    scope.insert(&self.names.value, item);
                    scope.insert(&self.names.index, index);
                    results.push(self.body.emit(&scope)?);
                }
                Ok(Value::Array(results))
            }
            other => Err(TemplateError::InvalidIterator {
                expression: self.source.source().to_string(),
                found: type_name(&other),
            }),
        }
    }
}

impl fmt::Display for IterationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "$iterate: {{`$expr`: `{}`, $index: `{}`, $key: `{}`, $value: `{}`, $body: {}}}",
            self.source.source(),
            self.names.index,
            self.names.key,
            self.names.value,
            self.body
        )
    }
}
