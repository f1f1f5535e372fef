//! Expression engine: compiles expression text and evaluates it against a
//! JSON context.
//!
//! ```
//! use dtpl_eval::Engine;
//! use serde_json::{json, Map};
//!
//! let program = Engine::new().compile("a + 1").unwrap();
//! let mut env = Map::new();
//! env.insert("a".into(), json!(1));
//! assert_eq!(program.run(&env).unwrap(), json!(2));
//! ```

mod engine;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod options;
pub mod value;

pub use engine::{Engine, Program};
pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use options::{CustomFn, ExprOptions};
pub use value::{is_truthy, to_display_string, type_name};

pub use dtpl_types::{CompileErrors, ErrorCode, ExprError};
