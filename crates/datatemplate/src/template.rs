//! Compiled templates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::block::Block;
use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};
use crate::options::TemplateOptions;
use crate::parser::parse_blocks;

/// A compiled template: one root block, immutable after construction.
///
/// Build once, then [`process`](Template::process) any number of contexts,
/// from any number of threads.
#[derive(Debug, Clone)]
pub struct Template {
    root: Block,
}

impl Template {
    /// Compile `value` with default options.
    pub fn build(value: &Value) -> TemplateResult<Self> {
        Self::with_options(value, &TemplateOptions::default())
    }

    pub fn with_options(value: &Value, options: &TemplateOptions) -> TemplateResult<Self> {
        let engine = options.engine();
        let root = parse_blocks(&engine, value)?.into_block();
        tracing::debug!(root = root.kind(), "built template");
        Ok(Self { root })
    }

    /// Compile any serializable value with default options.
    pub fn from_serializable<T: Serialize + ?Sized>(data: &T) -> TemplateResult<Self> {
        let value = serde_json::to_value(data).map_err(TemplateError::Serialize)?;
        Self::build(&value)
    }

    /// Wrap a hand-assembled block tree.
    pub fn from_root(root: Block) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Block {
        &self.root
    }

    /// Evaluate the template against `ctx`.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn process(&self, ctx: &Context) -> TemplateResult<Value> {
        let result = self.root.emit(ctx);
        match &result {
            Ok(_) => tracing::debug!("processed template"),
            Err(err) => tracing::debug!(error = %err, "template processing failed"),
        }
        result
    }

    /// Evaluate the template and deserialize the result into `T`.
    pub fn process_into<T: DeserializeOwned>(&self, ctx: &Context) -> TemplateResult<T> {
        serde_json::from_value(self.process(ctx)?).map_err(TemplateError::Deserialize)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BindingBlock, ExpressionBlock};
    use dtpl_eval::Engine;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_template_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
    }

    #[test]
    fn test_static_root_is_literal() {
        let tpl = Template::build(&json!({"a": 1})).unwrap();
        assert_eq!(tpl.root().kind(), "literal");
        assert_eq!(tpl.process(&Context::new()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_from_root() {
        let engine = Engine::new();
        let body = ExpressionBlock::compile(&engine, "np.name", true).unwrap();
        let root = BindingBlock::compile(&engine, "np := person[0]", body.into()).unwrap();
        let tpl = Template::from_root(root.into());
        let ctx = Context::new().with("person", json!([{"name": "tony"}]));
        assert_eq!(tpl.process(&ctx).unwrap(), json!("tony"));
        assert_eq!(tpl.to_string(), "$with: {`$expr`: `np := person[0]`, $body: `np.name`}");
    }

    #[test]
    fn test_process_into() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Greeting {
            text: String,
            count: u32,
        }
        let tpl = Template::build(&json!({"text": "hi {{name}}", "count": "{{n + 1}}"})).unwrap();
        let ctx = Context::new().with("name", "tony").with("n", 1);
        let greeting: Greeting = tpl.process_into(&ctx).unwrap();
        assert_eq!(
            greeting,
            Greeting {
                text: "hi tony".into(),
                count: 2,
            }
        );
        let err = tpl.process_into::<Vec<u32>>(&ctx).unwrap_err();
        assert!(matches!(err, TemplateError::Deserialize(_)));
    }

    #[test]
    fn test_from_serializable() {
        #[derive(Serialize)]
        struct Doc {
            greeting: &'static str,
        }
        let tpl = Template::from_serializable(&Doc {
            greeting: "{{s= 6 * 7}}",
        })
        .unwrap();
        assert_eq!(tpl.process(&Context::new()).unwrap(), json!({"greeting": "42"}));
    }
}
