use serde_json::Value;
use std::fmt;

use dtpl_eval::{to_display_string, Engine, Program};

use crate::context::Context;
use crate::error::TemplateResult;

/// A single compiled expression.
///
/// Emits the native result of the program, or its text form when
/// `stringify` is set (the `{{s= ... }}` marker).
#[derive(Debug, Clone)]
pub struct ExpressionBlock {
    program: Program,
    stringify: bool,
}

impl ExpressionBlock {
    pub fn new(program: Program, stringify: bool) -> Self {
        Self { program, stringify }
    }

    pub fn compile(engine: &Engine, source: &str, stringify: bool) -> TemplateResult<Self> {
        Ok(Self::new(super::compile(engine, source)?, stringify))
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn stringify(&self) -> bool {
        self.stringify
    }

    pub fn emit(&self, ctx: &Context) -> TemplateResult<Value> {
        let value = super::run(&self.program, ctx)?;
        if self.stringify {
            Ok(Value::String(to_display_string(&value)))
        } else {
            Ok(value)
        }
    }
}

impl fmt::Display for ExpressionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.program.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        Context::new().with("a", 1).with("ratio", 0.5)
    }

    #[test]
    fn test_native_result() {
        let block = ExpressionBlock::compile(&Engine::new(), "a * 3 - 1", false).unwrap();
        assert_eq!(block.emit(&ctx()).unwrap(), json!(2));
    }

    #[test]
    fn test_stringified_result() {
        let block = ExpressionBlock::compile(&Engine::new(), "100 * 200", true).unwrap();
        assert_eq!(block.emit(&ctx()).unwrap(), json!("20000"));
        let block = ExpressionBlock::compile(&Engine::new(), "ratio", true).unwrap();
        assert_eq!(block.emit(&ctx()).unwrap(), json!("0.5"));
        let block = ExpressionBlock::compile(&Engine::new(), "missing", true).unwrap();
        assert_eq!(block.emit(&ctx()).unwrap(), json!(""));
    }

    #[test]
    fn test_display() {
        let block = ExpressionBlock::compile(&Engine::new(), "np.name", true).unwrap();
        assert_eq!(block.to_string(), "`np.name`");
    }
}
