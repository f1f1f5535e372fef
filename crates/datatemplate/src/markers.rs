//! Control marker keys recognised in mappings.

pub const IF: &str = "$if";
pub const ELSE: &str = "$else";
pub const ITERATE: &str = "$iterate";
pub const WITH: &str = "$with";

/// Condition key of the structured `$if` form.
pub const COND: &str = "$cond";
/// Alias of [`COND`].
pub const CONDITION: &str = "$condition";

pub const EXPR: &str = "$expr";
pub const BODY: &str = "$body";

/// Loop variable renames, structured `$iterate` form only.
pub const INDEX: &str = "$index";
pub const KEY: &str = "$key";
pub const VALUE: &str = "$value";

pub const DEFAULT_INDEX: &str = "index";
pub const DEFAULT_KEY: &str = "key";
pub const DEFAULT_VALUE: &str = "item";
