use serde_json::Value;
use std::fmt;

use dtpl_eval::{is_truthy, Engine, Program};

use super::{Block, LiteralBlock};
use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};
use crate::markers;

/// `$if` / `$else`: emits the then-branch when the condition is truthy,
/// the else-branch (or nil) otherwise.
#[derive(Debug, Clone)]
pub struct ConditionalBlock {
    condition: Program,
    then_block: Box<Block>,
    else_block: Option<Box<Block>>,
}

impl ConditionalBlock {
    pub fn new(condition: Program, then_block: Block, else_block: Option<Block>) -> Self {
        Self {
            condition,
            then_block: Box::new(then_block),
            else_block: else_block.map(Box::new),
        }
    }

    /// Build a conditional from condition text.
    ///
    /// Constant conditions collapse at build time: `true` and `1` yield the
    /// then-branch, `false`, `0`, `nil` and `null` yield the else-branch
    /// (or a nil literal). Comparison is case-insensitive.
    pub fn with_condition(
        engine: &Engine,
        condition: &str,
        then_block: Block,
        else_block: Option<Block>,
    ) -> TemplateResult<Block> {
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(TemplateError::structural(markers::IF, "empty condition"));
        }
        match constant_truth(condition) {
            Some(true) => {
                tracing::trace!(condition, "constant condition, keeping then-branch");
                Ok(then_block)
            }
            Some(false) => {
                tracing::trace!(condition, "constant condition, keeping else-branch");
                Ok(else_block.unwrap_or_else(|| LiteralBlock::null().into()))
            }
            None => {
                let program = super::compile(engine, condition)?;
                Ok(Block::Conditional(Self::new(program, then_block, else_block)))
            }
        }
    }

    pub fn condition(&self) -> &Program {
        &self.condition
    }

    pub fn then_block(&self) -> &Block {
        &self.then_block
    }

    pub fn else_block(&self) -> Option<&Block> {
        self.else_block.as_deref()
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let value = super::run(&self.condition, ctx)?;
        if is_truthy(&value) {
            return self.then_block.emit(ctx);
        }
        match &self.else_block {
            Some(block) => block.emit(ctx),
            None => Ok(Value::Null),
        }
    }
}

fn constant_truth(condition: &str) -> Option<bool> {
    match condition.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" | "nil" | "null" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ConditionalBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "$if: {{`$cond`: `{}`, $then: {}",
            self.condition.source(),
            self.then_block
        )?;
        if let Some(block) = &self.else_block {
            write!(f, ", $else: {block}")?;
        }
        f.write_str("}")
    }
}
