//! Evaluation context: the variables visible to expressions.

use serde::Serialize;
use serde_json::{Map, Value};

use dtpl_eval::type_name;

use crate::error::{TemplateError, TemplateResult};

/// Variables visible to a template while it is processed.
///
/// Control blocks never mutate a caller's context; they derive a new one
/// with [`Context::with_binding`] for their body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert any serializable value; it must serialize to an object.
    pub fn from_serializable<T: Serialize + ?Sized>(data: &T) -> TemplateResult<Self> {
        let value = serde_json::to_value(data).map_err(TemplateError::Serialize)?;
        Self::try_from(value)
    }

    /// Builder form of [`Context::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name`, returning the value it replaces.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// A copy of this context with `name` bound to `value`.
    pub fn with_binding(&self, name: &str, value: Value) -> Self {
        let mut derived = self.clone();
        derived.vars.insert(name.to_string(), value);
        derived
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.vars
    }
}

impl From<Map<String, Value>> for Context {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

impl TryFrom<Value> for Context {
    type Error = TemplateError;

    fn try_from(value: Value) -> TemplateResult<Self> {
        match value {
            Value::Object(vars) => Ok(Self { vars }),
            other => Err(TemplateError::InvalidContext {
                found: type_name(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
