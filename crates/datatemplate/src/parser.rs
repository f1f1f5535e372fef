//! Template parser: turns raw nested data into a block tree.
//!
//! Only values with something dynamic below them become blocks; every other
//! value is kept as a literal so it can be returned as-is.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use dtpl_eval::{type_name, Engine};

use crate::block::{
    string_template, BindingBlock, Block, ConditionalBlock, IterationBlock, LoopNames,
    MappingBlock, Node, SequenceBlock,
};
use crate::error::{TemplateError, TemplateResult};
use crate::markers;

/// Parse `value` into a [`Node`], compiling every expression with `engine`.
///
/// The first compile or structural error aborts the whole parse.
pub fn parse_blocks(engine: &Engine, value: &Value) -> TemplateResult<Node> {
    TemplateParser::new(engine).parse(value)
}

/// Recursive block parser over one engine.
pub struct TemplateParser<'e> {
    engine: &'e Engine,
}

impl<'e> TemplateParser<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    pub fn parse(&self, value: &Value) -> TemplateResult<Node> {
        match value {
            Value::Array(items) => self.parse_sequence(value, items),
            Value::Object(fields) => {
                // Marker priority: $if, then $iterate, then $with.
                if let Some(marker) = fields.get(markers::IF) {
                    return self.parse_conditional(marker, fields).map(Node::Block);
                }
                if let Some(marker) = fields.get(markers::ITERATE) {
                    return self.parse_iteration(marker, fields).map(Node::Block);
                }
                if let Some(marker) = fields.get(markers::WITH) {
                    return self.parse_binding(marker, fields).map(Node::Block);
                }
                self.parse_mapping(value, fields)
            }
            Value::String(text) => string_template::parse(self.engine, text),
            _ => Ok(Node::Literal(value.clone())),
        }
    }

    fn parse_block(&self, value: &Value) -> TemplateResult<Block> {
        Ok(self.parse(value)?.into_block())
    }

    // ── Containers ───────────────────────────────────────────────────────

    fn parse_sequence(&self, value: &Value, items: &[Value]) -> TemplateResult<Node> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            nodes.push(self.parse(item)?);
        }
        if nodes.iter().any(Node::is_block) {
            Ok(Node::Block(Block::Sequence(SequenceBlock::new(nodes))))
        } else {
            Ok(Node::Literal(value.clone()))
        }
    }

    fn parse_mapping(&self, value: &Value, fields: &Map<String, Value>) -> TemplateResult<Node> {
        let mut nodes = BTreeMap::new();
        for (key, field) in fields {
            nodes.insert(key.clone(), self.parse(field)?);
        }
        if nodes.values().any(Node::is_block) {
            Ok(Node::Block(Block::Mapping(MappingBlock::new(nodes))))
        } else {
            Ok(Node::Literal(value.clone()))
        }
    }

    // ── $if ──────────────────────────────────────────────────────────────

    /// `{"$if": "cond", ...then, "$else": ...}` or
    /// `{"$if": {"$cond": "cond", ...then}, "$else": ...}`.
    fn parse_conditional(
        &self,
        marker: &Value,
        fields: &Map<String, Value>,
    ) -> TemplateResult<Block> {
        let (condition, then_fields) = match marker {
            Value::Object(inner) => {
                reject_extra_keys(markers::IF, fields, &[markers::IF, markers::ELSE])?;
                let condition = [markers::COND, markers::CONDITION]
                    .into_iter()
                    .filter_map(|key| inner.get(key).and_then(scalar_text))
                    .find(|text| !text.trim().is_empty())
                    .ok_or_else(|| {
                        TemplateError::structural(
                            markers::IF,
                            format!("missing `{}` condition", markers::COND),
                        )
                    })?;
                (condition, without(inner, &[markers::COND, markers::CONDITION]))
            }
            other => {
                let condition = scalar_text(other).ok_or_else(|| {
                    TemplateError::structural(
                        markers::IF,
                        format!("condition must be a string or object, got {}", type_name(other)),
                    )
                })?;
                (condition, without(fields, &[markers::IF, markers::ELSE]))
            }
        };

        let then_block = self.parse_block(&Value::Object(then_fields))?;
        let else_block = match fields.get(markers::ELSE) {
            Some(value) => Some(self.parse_block(value)?),
            None => None,
        };
        tracing::trace!(condition = condition.as_str(), "parsed conditional");
        ConditionalBlock::with_condition(self.engine, &condition, then_block, else_block)
    }

    // ── $iterate ─────────────────────────────────────────────────────────

    /// `{"$iterate": "expr", ...body}`, `{"$iterate": "expr", "$body": ...}`
    /// or `{"$iterate": {"$expr": "expr", ...}}`.
    fn parse_iteration(
        &self,
        marker: &Value,
        fields: &Map<String, Value>,
    ) -> TemplateResult<Block> {
        let (source, names, rest) = match marker {
            Value::String(source) => (
                source.clone(),
                LoopNames::default(),
                without(fields, &[markers::ITERATE]),
            ),
            Value::Object(inner) => {
                reject_extra_keys(markers::ITERATE, fields, &[markers::ITERATE])?;
                let source = required_string(markers::ITERATE, inner, markers::EXPR)?;
                let names = LoopNames {
                    index: loop_name(inner, markers::INDEX, markers::DEFAULT_INDEX)?,
                    key: loop_name(inner, markers::KEY, markers::DEFAULT_KEY)?,
                    value: loop_name(inner, markers::VALUE, markers::DEFAULT_VALUE)?,
                };
                let rest = without(
                    inner,
                    &[markers::EXPR, markers::INDEX, markers::KEY, markers::VALUE],
                );
                (source, names, rest)
            }
            other => {
                return Err(TemplateError::structural(
                    markers::ITERATE,
                    format!("expected a string or object, got {}", type_name(other)),
                ))
            }
        };

        let body = self.parse_body(markers::ITERATE, rest)?;
        tracing::trace!(source = source.as_str(), "parsed iteration");
        IterationBlock::compile(self.engine, &source, names, body).map(Block::Iteration)
    }

    // ── $with ────────────────────────────────────────────────────────────

    /// `{"$with": "name := expr", ...body}`, `{"$with": "...", "$body": ...}`
    /// or `{"$with": {"$expr": "name := expr", ...}}`.
    fn parse_binding(
        &self,
        marker: &Value,
        fields: &Map<String, Value>,
    ) -> TemplateResult<Block> {
        let (binding, rest) = match marker {
            Value::String(binding) => (binding.clone(), without(fields, &[markers::WITH])),
            Value::Object(inner) => {
                reject_extra_keys(markers::WITH, fields, &[markers::WITH])?;
                let binding = required_string(markers::WITH, inner, markers::EXPR)?;
                (binding, without(inner, &[markers::EXPR]))
            }
            other => {
                return Err(TemplateError::structural(
                    markers::WITH,
                    format!("expected a string or object, got {}", type_name(other)),
                ))
            }
        };

        let body = self.parse_body(markers::WITH, rest)?;
        tracing::trace!(binding = binding.as_str(), "parsed binding");
        BindingBlock::compile(self.engine, &binding, body).map(Block::Binding)
    }

    /// An explicit `$body`, or the remaining fields as an implicit body.
    fn parse_body(&self, marker: &'static str, rest: Map<String, Value>) -> TemplateResult<Block> {
        match rest.get(markers::BODY) {
            Some(_) if rest.len() > 1 => Err(TemplateError::structural(
                marker,
                format!("fields are not allowed next to `{}`", markers::BODY),
            )),
            Some(body) => self.parse_block(body),
            None => self.parse_block(&Value::Object(rest)),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Copy of `fields` without `keys`.
fn without(fields: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn reject_extra_keys(
    marker: &'static str,
    fields: &Map<String, Value>,
    allowed: &[&str],
) -> TemplateResult<()> {
    match fields.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(TemplateError::structural(
            marker,
            format!("unexpected key `{key}` next to a structured `{marker}`"),
        )),
        None => Ok(()),
    }
}

/// Text of a scalar marker value; decoders produce bools and numbers for
/// conditions such as `true` or `1`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_string(
    marker: &'static str,
    inner: &Map<String, Value>,
    key: &str,
) -> TemplateResult<String> {
    match inner.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None => Err(TemplateError::structural(
            marker,
            format!("missing `{key}`"),
        )),
        Some(other) => Err(TemplateError::structural(
            marker,
            format!("`{key}` must be a string, got {}", type_name(other)),
        )),
    }
}

fn loop_name(inner: &Map<String, Value>, key: &str, default: &str) -> TemplateResult<String> {
    match inner.get(key) {
        None => Ok(default.to_string()),
        Some(Value::String(name)) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        Some(other) => Err(TemplateError::structural(
            markers::ITERATE,
            format!("`{key}` must be a non-empty string, got {}", type_name(other)),
        )),
    }
}
