//! Builtin function registry.
//!
//! Every builtin has a fixed arity range, checked when a program is compiled.

use serde_json::Value;
use std::fmt;

use crate::error::{EvalError, EvalResult};
use crate::value::{float_value, to_display_string, type_name, Num};

/// A builtin function signature and implementation.
pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    call: fn(&[Value]) -> EvalResult<Value>,
}

impl Builtin {
    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        (self.call)(args)
    }

    pub fn accepts(&self, count: usize) -> bool {
        (self.min_args..=self.max_args).contains(&count)
    }

    /// "1 argument", "1 to 2 arguments"
    pub fn arity(&self) -> String {
        let plural = if self.max_args == 1 { "" } else { "s" };
        if self.min_args == self.max_args {
            format!("{} argument{plural}", self.min_args)
        } else {
            format!("{} to {} argument{plural}", self.min_args, self.max_args)
        }
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity())
    }
}

const fn builtin(
    name: &'static str,
    min_args: usize,
    max_args: usize,
    call: fn(&[Value]) -> EvalResult<Value>,
) -> Builtin {
    Builtin {
        name,
        min_args,
        max_args,
        call,
    }
}

static BUILTINS: &[Builtin] = &[
    builtin("len", 1, 1, len),
    builtin("upper", 1, 1, upper),
    builtin("lower", 1, 1, lower),
    builtin("trim", 1, 1, trim),
    builtin("string", 1, 1, string),
    builtin("int", 1, 1, int),
    builtin("float", 1, 1, float),
    builtin("abs", 1, 1, abs),
    builtin("keys", 1, 1, keys),
    builtin("values", 1, 1, values),
    builtin("join", 1, 2, join),
    builtin("split", 2, 2, split),
];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// All builtin names, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}

// ── Implementations ──────────────────────────────────────────────────────────

fn expect_str<'v>(name: &str, value: &'v Value) -> EvalResult<&'v str> {
    value.as_str().ok_or_else(|| {
        EvalError::TypeMismatch(format!("{name}() expects a string, got {}", type_name(value)))
    })
}

fn len(args: &[Value]) -> EvalResult<Value> {
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(fields) => fields.len(),
        Value::Null => 0,
        other => {
            return Err(EvalError::TypeMismatch(format!(
                "len() expects a string, array or object, got {}",
                type_name(other)
            )))
        }
    };
    Ok(Value::from(n))
}

fn upper(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(expect_str("upper", &args[0])?.to_uppercase()))
}

fn lower(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(expect_str("lower", &args[0])?.to_lowercase()))
}

fn trim(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(expect_str("trim", &args[0])?.trim()))
}

fn string(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(to_display_string(&args[0])))
}

fn int(args: &[Value]) -> EvalResult<Value> {
    match &args[0] {
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
            match text.parse::<f64>() {
                Ok(f) => float_to_int(f),
                Err(_) => Err(EvalError::function("int", format!("cannot parse '{s}'"))),
            }
        }
        value => match Num::from_value(value) {
            Some(Num::Int(i)) => Ok(Value::from(i)),
            Some(Num::Float(f)) => float_to_int(f),
            None => Err(EvalError::TypeMismatch(format!(
                "int() cannot convert {}",
                type_name(value)
            ))),
        },
    }
}

fn float_to_int(f: f64) -> EvalResult<Value> {
    let truncated = f.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Ok(Value::from(truncated as i64))
    } else {
        Err(EvalError::function("int", format!("{f} is out of integer range")))
    }
}

fn float(args: &[Value]) -> EvalResult<Value> {
    match &args[0] {
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => float_value(f),
            Err(_) => Err(EvalError::function("float", format!("cannot parse '{s}'"))),
        },
        value => match Num::from_value(value) {
            Some(n) => float_value(n.as_f64()),
            None => Err(EvalError::TypeMismatch(format!(
                "float() cannot convert {}",
                type_name(value)
            ))),
        },
    }
}

fn abs(args: &[Value]) -> EvalResult<Value> {
    match Num::from_value(&args[0]) {
        Some(Num::Int(i)) => match i.checked_abs() {
            Some(a) => Ok(Value::from(a)),
            None => float_value((i as f64).abs()),
        },
        Some(Num::Float(f)) => float_value(f.abs()),
        None => Err(EvalError::TypeMismatch(format!(
            "abs() expects a number, got {}",
            type_name(&args[0])
        ))),
    }
}

fn keys(args: &[Value]) -> EvalResult<Value> {
    match &args[0] {
        Value::Object(fields) => Ok(Value::Array(
            fields.keys().map(|k| Value::from(k.as_str())).collect(),
        )),
        other => Err(EvalError::TypeMismatch(format!(
            "keys() expects an object, got {}",
            type_name(other)
        ))),
    }
}

fn values(args: &[Value]) -> EvalResult<Value> {
    match &args[0] {
        Value::Object(fields) => Ok(Value::Array(fields.values().cloned().collect())),
        other => Err(EvalError::TypeMismatch(format!(
            "values() expects an object, got {}",
            type_name(other)
        ))),
    }
}

fn join(args: &[Value]) -> EvalResult<Value> {
    let Value::Array(items) = &args[0] else {
        return Err(EvalError::TypeMismatch(format!(
            "join() expects an array, got {}",
            type_name(&args[0])
        )));
    };
    let separator = match args.get(1) {
        Some(sep) => expect_str("join", sep)?,
        None => ",",
    };
    let parts: Vec<String> = items.iter().map(to_display_string).collect();
    Ok(Value::from(parts.join(separator)))
}

fn split(args: &[Value]) -> EvalResult<Value> {
    let text = expect_str("split", &args[0])?;
    let separator = expect_str("split", &args[1])?;
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        text.split(separator).map(Value::from).collect()
    };
    Ok(Value::Array(parts))
}
