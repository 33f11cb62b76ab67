//! Evaluation result types.

use std::time::Duration;

use crate::value::Value;

/// Result of evaluating one line of S-FEEL.
///
/// # Example
///
/// ```rust
/// use sfeel_eval::{Session, Value};
///
/// let mut session = Session::new();
/// let evaluation = session.evaluate("decimal(1 / 3, 2)");
/// assert!(evaluation.is_ok());
/// assert_eq!(evaluation.value, Some(Value::Number(0.33)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The statement's value; `None` when nothing parsed.
    pub value: Option<Value>,
    /// Lexical, syntax and evaluation diagnostics, in the order raised.
    pub diagnostics: Vec<String>,
    /// Execution statistics.
    pub stats: EvaluationStats,
}

impl Evaluation {
    /// Returns true if no diagnostics were raised.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The value, with an unparsed line read as `null`.
    pub fn value_or_null(&self) -> Value {
        self.value.clone().unwrap_or(Value::Null)
    }

    /// Splits into the `(diagnostics, value)` pair returned by `parse`.
    pub fn into_parts(self) -> (Vec<String>, Option<Value>) {
        (self.diagnostics, self.value)
    }
}

/// Statistics from one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationStats {
    /// Total time spent lexing, parsing and evaluating.
    pub duration: Duration,
    /// Number of tokens in the input.
    pub tokens: usize,
    /// Whether the parse was served from the cache.
    pub cache_hit: bool,
}

impl EvaluationStats {
    /// Creates new evaluation stats.
    pub fn new(duration: Duration, tokens: usize, cache_hit: bool) -> Self {
        Self {
            duration,
            tokens,
            cache_hit,
        }
    }
}
