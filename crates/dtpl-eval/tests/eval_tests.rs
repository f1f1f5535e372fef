//! Evaluator tests: compile + run expressions end-to-end.
//!
//! Covers: literals, context lookup, globals, member/index access, arithmetic,
//! comparisons, logic, nil handling, builtins, custom functions, runtime
//! errors, compile errors, and determinism.

use dtpl_eval::{Engine, ErrorCode, EvalError, ExprOptions};
use serde_json::{json, Map, Value};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn context() -> Map<String, Value> {
    match json!({
        "name": "tony",
        "surname": "stark",
        "age": 42,
        "ratio": 0.5,
        "active": true,
        "empty": "",
        "tags": ["a", "b", "c"],
        "person": [
            {"name": "tony", "age": 42},
            {"name": "rony", "age": 14}
        ],
        "nothing": null
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Compile and run against the shared context, panicking on any error.
fn eval(source: &str) -> Value {
    let program = Engine::new()
        .compile(source)
        .unwrap_or_else(|e| panic!("compile {source:?}: {e}"));
    program
        .run(&context())
        .unwrap_or_else(|e| panic!("run {source:?}: {e}"))
}

fn eval_err(source: &str) -> EvalError {
    let program = Engine::new()
        .compile(source)
        .unwrap_or_else(|e| panic!("compile {source:?}: {e}"));
    match program.run(&context()) {
        Ok(v) => panic!("expected runtime error for {source:?}, got {v}"),
        Err(e) => e,
    }
}

fn compile_codes(source: &str) -> Vec<ErrorCode> {
    match Engine::new().compile(source) {
        Ok(_) => panic!("expected compile error for {source:?}"),
        Err(errors) => errors.errors.iter().map(|e| e.code).collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Literals & names
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_literals() {
    assert_eq!(eval("42"), json!(42));
    assert_eq!(eval("2.5"), json!(2.5));
    assert_eq!(eval("'tony'"), json!("tony"));
    assert_eq!(eval("true"), json!(true));
    assert_eq!(eval("nil"), json!(null));
    assert_eq!(eval("null"), json!(null));
    assert_eq!(eval("[1, 'a', [true]]"), json!([1, "a", [true]]));
    assert_eq!(eval("{a: 1, 'b c': name}"), json!({"a": 1, "b c": "tony"}));
}

#[test]
fn test_context_lookup() {
    assert_eq!(eval("name"), json!("tony"));
    assert_eq!(eval("person"), context()["person"]);
}

#[test]
fn test_unknown_identifier_is_nil() {
    assert_eq!(eval("missing"), json!(null));
    assert_eq!(eval("missing ?? 'fallback'"), json!("fallback"));
}

#[test]
fn test_globals_and_context_shadowing() {
    let engine = Engine::with_options(
        ExprOptions::new()
            .with_global("env", "prod")
            .with_global("name", "global"),
    );
    let env = engine.compile("env").unwrap().run(&context()).unwrap();
    assert_eq!(env, json!("prod"));
    let name = engine.compile("name").unwrap().run(&context()).unwrap();
    assert_eq!(name, json!("tony"));
    let alone = engine.compile("name").unwrap().run(&Map::new()).unwrap();
    assert_eq!(alone, json!("global"));
}

// ─────────────────────────────────────────────────────────────────────
// Member & index access
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_member_and_index_access() {
    assert_eq!(eval("person[0].name"), json!("tony"));
    assert_eq!(eval("person[1]['age']"), json!(14));
    assert_eq!(eval("person[-1].name"), json!("rony"));
    assert_eq!(eval("tags[1]"), json!("b"));
    assert_eq!(eval("name[0]"), json!("t"));
    assert_eq!(eval("name[-1]"), json!("y"));
}

#[test]
fn test_missing_field_is_nil() {
    assert_eq!(eval("person[0].email"), json!(null));
    assert_eq!(eval("person[0]['email'] ?? 'none'"), json!("none"));
}

#[test]
fn test_access_on_nil_is_an_error() {
    assert!(matches!(eval_err("nothing.name"), EvalError::NilAccess(_)));
    assert!(matches!(eval_err("missing[0]"), EvalError::NilAccess(_)));
    assert!(matches!(eval_err("person[0].email.domain"), EvalError::NilAccess(_)));
}

#[test]
fn test_index_out_of_range() {
    assert_eq!(
        eval_err("tags[3]"),
        EvalError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert_eq!(
        eval_err("tags[-4]"),
        EvalError::IndexOutOfRange { index: -4, len: 3 }
    );
}

#[test]
fn test_access_type_mismatch() {
    assert!(matches!(eval_err("age.value"), EvalError::TypeMismatch(_)));
    assert!(matches!(eval_err("tags['x']"), EvalError::TypeMismatch(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Arithmetic
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_arithmetic_stays_integral() {
    assert_eq!(eval("age + 1"), json!(43));
    assert_eq!(eval("age - 50"), json!(-8));
    assert_eq!(eval("age * 2"), json!(84));
    assert_eq!(eval("age % 5"), json!(2));
    assert_eq!(eval("-age"), json!(-42));
    assert!(eval("1 + 1").is_i64());
}

#[test]
fn test_division_is_float() {
    assert_eq!(eval("4 / 2"), json!(2.0));
    assert_eq!(eval("1 / 4"), json!(0.25));
    assert!(eval("4 / 2").is_f64());
}

#[test]
fn test_mixed_arithmetic() {
    assert_eq!(eval("age + ratio"), json!(42.5));
    assert_eq!(eval("ratio * 4"), json!(2.0));
    assert_eq!(eval("7.5 % 2"), json!(1.5));
}

#[test]
fn test_integer_overflow_falls_back_to_float() {
    assert_eq!(eval("9223372036854775807 + 1"), json!(9_223_372_036_854_775_808.0));
}

#[test]
fn test_division_by_zero() {
    assert!(matches!(eval_err("age / 0"), EvalError::ArithmeticTrap(_)));
    assert!(matches!(eval_err("age % 0"), EvalError::ArithmeticTrap(_)));
    assert!(matches!(eval_err("1.5 / 0.0"), EvalError::ArithmeticTrap(_)));
}

#[test]
fn test_concatenation() {
    assert_eq!(eval("name + ' ' + surname"), json!("tony stark"));
    assert_eq!(eval("tags + ['d']"), json!(["a", "b", "c", "d"]));
}

#[test]
fn test_arithmetic_type_mismatch() {
    assert!(matches!(eval_err("name + 1"), EvalError::TypeMismatch(_)));
    assert!(matches!(eval_err("name * 2"), EvalError::TypeMismatch(_)));
    assert!(matches!(eval_err("-name"), EvalError::TypeMismatch(_)));
    assert!(matches!(eval_err("missing + 1"), EvalError::TypeMismatch(_)));
}

// ─────────────────────────────────────────────────────────────────────
// Comparison & logic
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comparisons() {
    assert_eq!(eval("age > 18"), json!(true));
    assert_eq!(eval("age <= 41"), json!(false));
    assert_eq!(eval("ratio < 1"), json!(true));
    assert_eq!(eval("'abc' < 'abd'"), json!(true));
    assert!(matches!(eval_err("name > 1"), EvalError::TypeMismatch(_)));
}

#[test]
fn test_equality() {
    assert_eq!(eval("age == 42"), json!(true));
    assert_eq!(eval("age == 42.0"), json!(true));
    assert_eq!(eval("name != 'rony'"), json!(true));
    assert_eq!(eval("nothing == nil"), json!(true));
    assert_eq!(eval("missing == nil"), json!(true));
    assert_eq!(eval("tags == ['a', 'b', 'c']"), json!(true));
    assert_eq!(eval("'42' == 42"), json!(false));
}

#[test]
fn test_in_operator() {
    assert_eq!(eval("'b' in tags"), json!(true));
    assert_eq!(eval("'z' in tags"), json!(false));
    assert_eq!(eval("'name' in person[0]"), json!(true));
    assert_eq!(eval("'on' in name"), json!(true));
    assert_eq!(eval("42 in [42.0]"), json!(true));
    assert!(matches!(eval_err("1 in name"), EvalError::TypeMismatch(_)));
}

#[test]
fn test_logic_and_truthiness() {
    assert_eq!(eval("active && age > 18"), json!(true));
    assert_eq!(eval("empty || 'default'"), json!(true));
    assert_eq!(eval("!empty"), json!(true));
    assert_eq!(eval("not tags"), json!(false));
    assert_eq!(eval("nothing and 1"), json!(false));
    assert_eq!(eval("0 or []"), json!(false));
}

#[test]
fn test_short_circuit_skips_errors() {
    assert_eq!(eval("false && nothing.name"), json!(false));
    assert_eq!(eval("true || nothing.name"), json!(true));
    assert_eq!(eval("name ?? nothing.name"), json!("tony"));
}

#[test]
fn test_ternary() {
    assert_eq!(eval("age > 18 ? 'adult' : 'kid'"), json!("adult"));
    assert_eq!(eval("person[1].age > 18 ? 'adult' : 'kid'"), json!("kid"));
    assert_eq!(eval("empty ? 1 : nothing ? 2 : 3"), json!(3));
}

// ─────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_builtins() {
    assert_eq!(eval("len(person)"), json!(2));
    assert_eq!(eval("upper(name)"), json!("TONY"));
    assert_eq!(eval("keys(person[0])"), json!(["age", "name"]));
    assert_eq!(eval("join(tags, '-')"), json!("a-b-c"));
    assert_eq!(eval("split('x.y', '.')"), json!(["x", "y"]));
    assert_eq!(eval("string(age) + '!'"), json!("42!"));
    assert_eq!(eval("int('7') + 1"), json!(8));
    assert_eq!(eval("abs(-ratio)"), json!(0.5));
}

#[test]
fn test_builtin_runtime_failure() {
    assert!(matches!(
        eval_err("int(name)"),
        EvalError::FunctionError { .. }
    ));
}

#[test]
fn test_custom_function() {
    let engine = Engine::with_options(ExprOptions::new().with_function("greet", |args| {
        match args.first() {
            Some(Value::String(name)) => Ok(json!(format!("hello {name}"))),
            _ => Err("greet expects a name".to_string()),
        }
    }));
    let program = engine.compile("greet(name)").unwrap();
    assert_eq!(program.run(&context()).unwrap(), json!("hello tony"));

    let failing = engine.compile("greet(age)").unwrap();
    assert_eq!(
        failing.run(&context()).unwrap_err(),
        EvalError::FunctionError {
            name: "greet".into(),
            message: "greet expects a name".into(),
        }
    );
}

#[test]
fn test_custom_function_shadows_builtin() {
    let engine = Engine::with_options(
        ExprOptions::new().with_function("upper", |_| Ok(json!("shadowed"))),
    );
    let program = engine.compile("upper(name)").unwrap();
    assert_eq!(program.run(&context()).unwrap(), json!("shadowed"));
}

// ─────────────────────────────────────────────────────────────────────
// Compile errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_compile_errors() {
    assert_eq!(compile_codes(""), vec![ErrorCode::EMPTY_EXPRESSION]);
    assert_eq!(compile_codes("a +"), vec![ErrorCode::UNEXPECTED_TOKEN]);
    assert_eq!(compile_codes("'open"), vec![ErrorCode::UNTERMINATED_STRING]);
    assert_eq!(compile_codes("a b"), vec![ErrorCode::TRAILING_INPUT]);
    assert_eq!(compile_codes("shout(name)"), vec![ErrorCode::UNKNOWN_FUNCTION]);
    assert_eq!(compile_codes("len(a, b)"), vec![ErrorCode::WRONG_ARG_COUNT]);
    assert_eq!(compile_codes("split('a')"), vec![ErrorCode::WRONG_ARG_COUNT]);
}

#[test]
fn test_nested_unknown_functions_are_all_reported() {
    assert_eq!(
        compile_codes("foo(bar(1))"),
        vec![ErrorCode::UNKNOWN_FUNCTION, ErrorCode::UNKNOWN_FUNCTION]
    );
}

#[test]
fn test_compile_error_serializes() {
    let errors = Engine::new().compile("len()").unwrap_err();
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json["total_errors"], json!(1));
    assert_eq!(json["errors"][0]["code"], json!(201));
    assert_eq!(json["errors"][0]["category"], json!("name"));
    assert_eq!(
        json["errors"][0]["message"],
        json!("'len' expects 1 argument, got 0")
    );
}

// ─────────────────────────────────────────────────────────────────────
// Reuse & determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_program_reuse_across_contexts() {
    let program = Engine::new().compile("a + 1").unwrap();
    for i in 0..10 {
        let mut env = Map::new();
        env.insert("a".into(), json!(i));
        assert_eq!(program.run(&env).unwrap(), json!(i + 1));
    }
}

#[test]
fn test_concurrent_runs() {
    let program = Engine::new().compile("upper(name) + string(n)").unwrap();
    std::thread::scope(|scope| {
        for i in 0..8 {
            let program = &program;
            scope.spawn(move || {
                let mut env = Map::new();
                env.insert("name".into(), json!("t"));
                env.insert("n".into(), json!(i));
                assert_eq!(program.run(&env).unwrap(), json!(format!("T{i}")));
            });
        }
    });
}

#[test]
fn test_eval_determinism_100_iterations() {
    let source = "join(keys(person[0]), ',') + ':' + string(len(person) * age / 4)";
    let first = eval(source);
    assert_eq!(first, json!("age,name:21"));
    for i in 0..100 {
        assert_eq!(eval(source), first, "iteration {i} diverged");
    }
}
