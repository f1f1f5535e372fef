use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

use dtpl_eval::{Engine, Program};

use super::Block;
use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};
use crate::markers;

static BOUND_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_]+)\s*:=\s*").expect("binding name pattern is valid")
});

/// `$with`: binds the result of an expression to a name for the body.
#[derive(Debug, Clone)]
pub struct BindingBlock {
    name: String,
    value: Program,
    body: Box<Block>,
}

impl BindingBlock {
    pub fn new(name: impl Into<String>, value: Program, body: Block) -> Self {
        Self {
            name: name.into(),
            value,
            body: Box::new(body),
        }
    }

    /// Compile a `name := expression` binding.
    pub fn compile(engine: &Engine, binding: &str, body: Block) -> TemplateResult<Self> {
        let Some(caps) = BOUND_NAME.captures(binding) else {
            return Err(TemplateError::structural(
                markers::WITH,
                format!("expected `name := expression`, got `{binding}`"),
            ));
        };
        let name = &caps[1];
        let source = binding[caps[0].len()..].trim();
        if source.is_empty() {
            return Err(TemplateError::structural(
                markers::WITH,
                format!("missing expression for `{name}`"),
            ));
        }
        Ok(Self::new(name, super::compile(engine, source)?, body))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Program {
        &self.value
    }

    pub fn body(&self) -> &Block {
        &self.body
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let value = super::run(&self.value, ctx)?;
        self.body.emit(&ctx.with_binding(&self.name, value))
    }
}

impl fmt::Display for BindingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "$with: {{`$expr`: `{} := {}`, $body: {}}}",
            self.name,
            self.value.source(),
            self.body
        )
    }
}
