//! datatemplate: data-driven templates over JSON-like values.
//!
//! ```text
//! Value → Parser → Block tree → process(Context) → Value
//! ```
//!
//! Strings may embed expressions with `{{ expr }}` (native result) or
//! `{{s= expr }}` (text result); mappings may carry the `$if`, `$iterate`
//! and `$with` control markers.
//!
//! ```
//! use datatemplate::{Context, Template};
//! use serde_json::json;
//!
//! let tpl = Template::build(&json!({
//!     "$iterate": "people",
//!     "label": "{{index + 1}}. {{item.name}}",
//! }))
//! .unwrap();
//! let ctx = Context::new().with("people", json!([{"name": "tony"}, {"name": "rony"}]));
//! assert_eq!(
//!     tpl.process(&ctx).unwrap(),
//!     json!([{"label": "1. tony"}, {"label": "2. rony"}])
//! );
//! ```

pub mod block;
pub mod context;
pub mod error;
pub mod markers;
pub mod options;
pub mod parser;
mod template;

pub use block::{Block, Node};
pub use context::Context;
pub use error::{TemplateError, TemplateResult};
pub use options::TemplateOptions;
pub use parser::{parse_blocks, TemplateParser};
pub use template::Template;

pub use dtpl_eval::{Engine, ExprOptions, Program};
