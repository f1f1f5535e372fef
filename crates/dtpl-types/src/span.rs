use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a token or node sits in its expression text, as 1-based
/// line and column pairs. A multi-line `{{ }}` body keeps the real line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Empty span at `line:col`.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Smallest span enclosing both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let start = (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let end = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start.0, start.1, end.0, end.1)
    }
}

/// Diagnostics print only the start position.
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Expression text shared by the lexer and the diagnostics it emits.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub source: String,
}

impl SourceFile {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Text of line `line_number` without its terminator, or `None` past the end.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = usize::try_from(line_number.checked_sub(1)?).ok()?;
        self.source
            .split('\n')
            .nth(idx)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}
