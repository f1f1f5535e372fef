//! Block tree: parsed template fragments and their emit semantics.
//!
//! Every block emits a fresh [`Value`] for a [`Context`]; none of them hold
//! per-call state, so one tree can be processed from many threads at once.

mod binding;
mod conditional;
mod expression;
mod iteration;
mod literal;
mod mapping;
mod sequence;
pub mod string_template;

pub use binding::BindingBlock;
pub use conditional::ConditionalBlock;
pub use expression::ExpressionBlock;
pub use iteration::{IterationBlock, LoopNames};
pub use literal::LiteralBlock;
pub use mapping::MappingBlock;
pub use sequence::SequenceBlock;
pub use string_template::StringTemplateBlock;

use serde_json::Value;
use std::fmt;

use dtpl_eval::{to_display_string, Engine, Program};

use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};

/// Result of parsing one value: either static data or a block that must be
/// emitted per context.
#[derive(Debug, Clone)]
pub enum Node {
    Literal(Value),
    Block(Block),
}

impl Node {
    pub fn is_block(&self) -> bool {
        matches!(self, Node::Block(_))
    }

    /// Wrap a literal so it can stand where a block is required.
    pub fn into_block(self) -> Block {
        match self {
            Node::Literal(value) => Block::Literal(LiteralBlock::new(value)),
            Node::Block(block) => block,
        }
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        match self {
            Node::Literal(value) => Ok(value.clone()),
            Node::Block(block) => block.emit(ctx),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => f.write_str(&to_display_string(value)),
            Node::Block(block) => fmt::Display::fmt(block, f),
        }
    }
}

/// A compiled template fragment.
#[derive(Debug, Clone)]
pub enum Block {
    Literal(LiteralBlock),
    Expression(ExpressionBlock),
    StringTemplate(StringTemplateBlock),
    Sequence(SequenceBlock),
    Mapping(MappingBlock),
    Conditional(ConditionalBlock),
    Iteration(IterationBlock),
    Binding(BindingBlock),
}

impl Block {
    /// Resolve this block against `ctx`.
    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        match self {
            Block::Literal(b) => Ok(b.emit()),
            Block::Expression(b) => b.emit(ctx),
            Block::StringTemplate(b) => b.emit(ctx),
            Block::Sequence(b) => b.emit(ctx),
            Block::Mapping(b) => b.emit(ctx),
            Block::Conditional(b) => b.emit(ctx),
            Block::Iteration(b) => b.emit(ctx),
            Block::Binding(b) => b.emit(ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Block::Literal(_) => "literal",
            Block::Expression(_) => "expression",
            Block::StringTemplate(_) => "string template",
            Block::Sequence(_) => "sequence",
            Block::Mapping(_) => "mapping",
            Block::Conditional(_) => "conditional",
            Block::Iteration(_) => "iteration",
            Block::Binding(_) => "binding",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Literal(b) => fmt::Display::fmt(b, f),
            Block::Expression(b) => fmt::Display::fmt(b, f),
            Block::StringTemplate(b) => fmt::Display::fmt(b, f),
            Block::Sequence(b) => fmt::Display::fmt(b, f),
            Block::Mapping(b) => fmt::Display::fmt(b, f),
            Block::Conditional(b) => fmt::Display::fmt(b, f),
            Block::Iteration(b) => fmt::Display::fmt(b, f),
            Block::Binding(b) => fmt::Display::fmt(b, f),
        }
    }
}

macro_rules! impl_from_block {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Block {
                fn from(block: $ty) -> Self {
                    Block::$variant(block)
                }
            }
        )*
    };
}

impl_from_block!(
    Literal(LiteralBlock),
    Expression(ExpressionBlock),
    StringTemplate(StringTemplateBlock),
    Sequence(SequenceBlock),
    Mapping(MappingBlock),
    Conditional(ConditionalBlock),
    Iteration(IterationBlock),
    Binding(BindingBlock),
);

// ── Gateway helpers ──────────────────────────────────────────────────────────

pub(crate) fn compile(engine: &Engine, source: &str) -> TemplateResult<Program> {
    engine
        .compile(source)
        .map_err(|errors| TemplateError::Compile {
            expression: source.to_string(),
            errors,
        })
}

pub(crate) fn run(program: &Program, ctx: &Context) -> TemplateResult<Value> {
    program
        .run(ctx.vars())
        .map_err(|source| TemplateError::Expression {
            expression: program.source().to_string(),
            source,
        })
}
