//! Core expression evaluator.

use serde_json::{Map, Value};

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::functions;
use crate::options::ExprOptions;
use crate::value::{compare, float_value, is_truthy, type_name, values_equal, Num};
use dtpl_types::ast::*;

/// The core evaluator: walks AST nodes and produces values.
///
/// Borrowing only, so one compiled program can be evaluated from many
/// threads at once.
pub struct Evaluator<'a> {
    env: Environment<'a>,
    options: &'a ExprOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Map<String, Value>, options: &'a ExprOptions) -> Self {
        Self {
            env: Environment::new(context, options.globals()),
            options,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::from(*n)),
            ExprKind::FloatLit(n) => float_value(*n),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NilLit => Ok(Value::Null),

            ExprKind::ArrayLit(elems) => self.eval_array_literal(elems),
            ExprKind::MapLit(entries) => self.eval_map_literal(entries),

            ExprKind::Identifier(name) => Ok(self.eval_identifier(name)),
            ExprKind::Member { object, field } => self.eval_member(object, &field.name),
            ExprKind::Index { object, index } => self.eval_index(object, index),
            ExprKind::Call { name, args } => self.eval_call(&name.name, args),

            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::NilCoalesce { left, right } => self.eval_nil_coalesce(left, right),
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.eval_expr(condition)?) {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }
            ExprKind::Paren(inner) => self.eval_expr(inner),
        }
    }

    // ── Literals ──────────────────────────────────────────────────────────

    fn eval_array_literal(&self, elems: &[Expr]) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(elems.len());
        for elem in elems {
            values.push(self.eval_expr(elem)?);
        }
        Ok(Value::Array(values))
    }

    fn eval_map_literal(&self, entries: &[MapEntry]) -> EvalResult<Value> {
        let mut fields = Map::new();
        for entry in entries {
            fields.insert(entry.key.clone(), self.eval_expr(&entry.value)?);
        }
        Ok(Value::Object(fields))
    }

    // ── Names & access ───────────────────────────────────────────────────

    /// Unknown names are nil rather than an error.
    fn eval_identifier(&self, name: &str) -> Value {
        self.env.get(name).cloned().unwrap_or(Value::Null)
    }

    fn eval_member(&self, object: &Expr, field: &str) -> EvalResult<Value> {
        let obj = self.eval_expr(object)?;
        match &obj {
            Value::Object(fields) => Ok(fields.get(field).cloned().unwrap_or(Value::Null)),
            Value::Null => Err(EvalError::NilAccess(format!(
                "cannot access field '{field}' on nil"
            ))),
            _ => Err(EvalError::TypeMismatch(format!(
                "cannot access field '{field}' on {}",
                type_name(&obj)
            ))),
        }
    }

    fn eval_index(&self, object: &Expr, index: &Expr) -> EvalResult<Value> {
        let obj = self.eval_expr(object)?;
        let idx = self.eval_expr(index)?;
        match (&obj, &idx) {
            (Value::Object(fields), Value::String(key)) => {
                Ok(fields.get(key).cloned().unwrap_or(Value::Null))
            }
            (Value::Array(items), _) => {
                let i = resolve_index(&idx, items.len())?;
                Ok(items[i].clone())
            }
            (Value::String(s), _) => {
                let chars: Vec<char> = s.chars().collect();
                let i = resolve_index(&idx, chars.len())?;
                Ok(Value::String(chars[i].to_string()))
            }
            (Value::Null, _) => Err(EvalError::NilAccess(format!(
                "cannot index nil with {}",
                type_name(&idx)
            ))),
            _ => Err(EvalError::TypeMismatch(format!(
                "cannot index {} with {}",
                type_name(&obj),
                type_name(&idx)
            ))),
        }
    }

    /// Custom functions first, then builtins.
    fn eval_call(&self, name: &str, args: &[Expr]) -> EvalResult<Value> {
        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(self.eval_expr(arg)?);
        }
        if let Some(function) = self.options.function(name) {
            return function(&arg_vals).map_err(|message| EvalError::FunctionError {
                name: name.to_string(),
                message,
            });
        }
        match functions::lookup(name) {
            Some(builtin) => builtin.call(&arg_vals),
            None => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_unary(&self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        let val = self.eval_expr(operand)?;
        match op {
            UnaryOp::Neg => match Num::from_value(&val) {
                Some(Num::Int(i)) => match i.checked_neg() {
                    Some(n) => Ok(Value::from(n)),
                    None => float_value(-(i as f64)),
                },
                Some(Num::Float(f)) => float_value(-f),
                None => Err(EvalError::TypeMismatch(format!(
                    "cannot negate {}",
                    type_name(&val)
                ))),
            },
            UnaryOp::Not => Ok(Value::Bool(!is_truthy(&val))),
        }
    }

    fn eval_binary(&self, left: &Expr, op: BinOp, right: &Expr) -> EvalResult<Value> {
        // Short-circuit for logical operators
        if op == BinOp::And {
            let lv = self.eval_expr(left)?;
            return if !is_truthy(&lv) {
                Ok(Value::Bool(false))
            } else {
                let rv = self.eval_expr(right)?;
                Ok(Value::Bool(is_truthy(&rv)))
            };
        }
        if op == BinOp::Or {
            let lv = self.eval_expr(left)?;
            return if is_truthy(&lv) {
                Ok(Value::Bool(true))
            } else {
                let rv = self.eval_expr(right)?;
                Ok(Value::Bool(is_truthy(&rv)))
            };
        }

        let lv = self.eval_expr(left)?;
        let rv = self.eval_expr(right)?;

        match op {
            BinOp::Add => self.eval_add(lv, rv),
            BinOp::Sub => eval_arith(&lv, &rv, op, i64::checked_sub, |a, b| a - b),
            BinOp::Mul => eval_arith(&lv, &rv, op, i64::checked_mul, |a, b| a * b),
            BinOp::Div => match (Num::from_value(&lv), Num::from_value(&rv)) {
                (Some(a), Some(b)) => {
                    if b.as_f64() == 0.0 {
                        return Err(EvalError::ArithmeticTrap("division by zero".into()));
                    }
                    float_value(a.as_f64() / b.as_f64())
                }
                _ => Err(mismatch(&lv, op, &rv)),
            },
            BinOp::Mod => match (Num::from_value(&lv), Num::from_value(&rv)) {
                (Some(a), Some(b)) => {
                    if b.as_f64() == 0.0 {
                        return Err(EvalError::ArithmeticTrap("modulo by zero".into()));
                    }
                    match (a, b) {
                        (Num::Int(x), Num::Int(y)) => match x.checked_rem(y) {
                            Some(r) => Ok(Value::from(r)),
                            None => Ok(Value::from(0)),
                        },
                        _ => float_value(a.as_f64() % b.as_f64()),
                    }
                }
                _ => Err(mismatch(&lv, op, &rv)),
            },
            BinOp::Eq => Ok(Value::Bool(values_equal(&lv, &rv))),
            BinOp::NotEq => Ok(Value::Bool(!values_equal(&lv, &rv))),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
                let ordering = compare(&lv, &rv).ok_or_else(|| mismatch(&lv, op, &rv))?;
                Ok(Value::Bool(match op {
                    BinOp::Less => ordering.is_lt(),
                    BinOp::Greater => ordering.is_gt(),
                    BinOp::LessEq => ordering.is_le(),
                    _ => ordering.is_ge(),
                }))
            }
            BinOp::In => self.eval_in(&lv, &rv),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_add(&self, lv: Value, rv: Value) -> EvalResult<Value> {
        match (lv, rv) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::Array(mut a), Value::Array(b)) => {
                a.extend(b);
                Ok(Value::Array(a))
            }
            (lv, rv) => eval_arith(&lv, &rv, BinOp::Add, i64::checked_add, |a, b| a + b),
        }
    }

    /// `needle in haystack`: array membership, object key or substring.
    fn eval_in(&self, needle: &Value, haystack: &Value) -> EvalResult<Value> {
        let found = match (needle, haystack) {
            (_, Value::Array(items)) => items.iter().any(|item| values_equal(needle, item)),
            (Value::String(key), Value::Object(fields)) => fields.contains_key(key),
            (Value::String(part), Value::String(text)) => text.contains(part.as_str()),
            (_, Value::Null) => false,
            _ => return Err(mismatch(needle, BinOp::In, haystack)),
        };
        Ok(Value::Bool(found))
    }

    fn eval_nil_coalesce(&self, left: &Expr, right: &Expr) -> EvalResult<Value> {
        let lv = self.eval_expr(left)?;
        if lv.is_null() {
            self.eval_expr(right)
        } else {
            Ok(lv)
        }
    }
}

/// Integer arithmetic when both sides are integers and the result fits,
/// float arithmetic otherwise.
fn eval_arith(
    lv: &Value,
    rv: &Value,
    op: BinOp,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (Num::from_value(lv), Num::from_value(rv)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => match int_op(a, b) {
            Some(n) => Ok(Value::from(n)),
            None => float_value(float_op(a as f64, b as f64)),
        },
        (Some(a), Some(b)) => Num::Float(float_op(a.as_f64(), b.as_f64())).into_value(),
        _ => Err(mismatch(lv, op, rv)),
    }
}

fn mismatch(lv: &Value, op: BinOp, rv: &Value) -> EvalError {
    EvalError::TypeMismatch(format!(
        "cannot apply '{op}' to {} and {}",
        type_name(lv),
        type_name(rv)
    ))
}

/// Resolve an index against a length; negative indexes count from the end.
fn resolve_index(index: &Value, len: usize) -> EvalResult<usize> {
    let i = match Num::from_value(index) {
        Some(Num::Int(i)) => i,
        Some(Num::Float(f)) if f.fract() == 0.0 => f as i64,
        _ => {
            return Err(EvalError::TypeMismatch(format!(
                "index must be an integer, got {}",
                type_name(index)
            )))
        }
    };
    let resolved = if i < 0 { i + len as i64 } else { i };
    if resolved < 0 || resolved >= len as i64 {
        return Err(EvalError::IndexOutOfRange { index: i, len });
    }
    Ok(resolved as usize)
}
