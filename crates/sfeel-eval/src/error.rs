//! Error types for S-FEEL evaluation.
//!
//! Evaluation never aborts: these errors are turned into diagnostics and the
//! offending node evaluates to `null`. The `Display` text is the diagnostic.

use sfeel::SFeelError;
use thiserror::Error;

/// Errors reported while evaluating an S-FEEL statement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// Lexing or parsing failed.
    #[error("{0}")]
    Parse(#[from] SFeelError),

    /// A name with no binding in the session or any enclosing scope.
    #[error("Undefined name '{0}'")]
    UndefinedName(String),

    /// A keyword argument that the function does not declare.
    #[error("Unknown parameter '{name}' for function '{function}'")]
    UnknownParameter {
        /// The keyword as written.
        name: String,
        /// Function name.
        function: String,
    },

    /// A parameter bound twice, by position and by name or by name twice.
    #[error("Duplicate parameter '{name}' for function '{function}'")]
    DuplicateParameter {
        /// Parameter name.
        name: String,
        /// Function name.
        function: String,
    },

    /// Too few or too many arguments.
    #[error("Wrong number of arguments for function '{0}'")]
    Arity(String),

    /// The same key written twice in one context literal.
    #[error("Duplicate context key '{0}'")]
    DuplicateKey(String),

    /// A pattern the regex engine rejected.
    #[error("Invalid regular expression '{pattern}'")]
    InvalidRegex {
        /// The pattern after translation.
        pattern: String,
    },
}

/// Result type for evaluation steps that can report an [`EvalError`].
pub type EvalResult<T> = std::result::Result<T, EvalError>;
