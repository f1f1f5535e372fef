//! String template sub-parser.
//!
//! `{{ expr }}` embeds an expression with its native result type and
//! `{{s= expr }}` embeds its text form. A string that is exactly one marker
//! becomes an [`ExpressionBlock`]; a string with markers mixed into other
//! text becomes a [`StringTemplateBlock`].

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use dtpl_eval::{to_display_string, Engine, Program};

use super::{Block, ExpressionBlock, Node};
use crate::context::Context;
use crate::error::TemplateResult;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(s=)?\s*(.+?)\s*\}\}").expect("expression marker pattern is valid")
});

/// Parse `text` for expression markers.
pub fn parse(engine: &Engine, text: &str) -> TemplateResult<Node> {
    let markers: Vec<Captures<'_>> = MARKER.captures_iter(text).collect();
    match markers.as_slice() {
        [] => Ok(Node::Literal(Value::String(text.to_string()))),
        [only] if &only[0] == text => {
            let stringify = only.get(1).is_some();
            let block = ExpressionBlock::compile(engine, &only[2], stringify)?;
            Ok(Node::Block(Block::Expression(block)))
        }
        _ => {
            let mut programs = BTreeMap::new();
            for caps in &markers {
                if programs.contains_key(&caps[0]) {
                    continue;
                }
                programs.insert(caps[0].to_string(), super::compile(engine, &caps[2])?);
            }
            tracing::trace!(markers = programs.len(), "compiled string template");
            Ok(Node::Block(Block::StringTemplate(StringTemplateBlock {
                text: text.to_string(),
                programs,
            })))
        }
    }
}

/// Text with embedded markers; each marker is replaced by the text form of
/// its program's result.
#[derive(Debug, Clone)]
pub struct StringTemplateBlock {
    text: String,
    /// Keyed by the exact marker text, so repeated markers compile once.
    programs: BTreeMap<String, Program>,
}

impl StringTemplateBlock {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn programs(&self) -> &BTreeMap<String, Program> {
        &self.programs
    }

    /// Every program runs before any substitution, and substitution is a
    /// single pass over the original text: marker-like text inside a
    /// result is never expanded.
    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let mut rendered: BTreeMap<&str, String> = BTreeMap::new();
        for (marker, program) in &self.programs {
            let value = super::run(program, ctx)?;
            rendered.insert(marker.as_str(), to_display_string(&value));
        }
        let text = MARKER.replace_all(&self.text, |caps: &Captures<'_>| {
            rendered
                .get(&caps[0])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });
        Ok(Value::String(text.into_owned()))
    }
}

impl fmt::Display for StringTemplateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
