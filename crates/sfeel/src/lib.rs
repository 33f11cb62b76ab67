//! # sfeel
//!
//! Lexer and parser for S-FEEL, the simple expression language of the
//! Decision Model and Notation (DMN) standard.
//!
//! This crate turns one line of S-FEEL into a [`Statement`]. Evaluation
//! lives in the `sfeel-eval` crate.
//!
//! ## Usage
//!
//! ```rust
//! use sfeel::{parse, Expr, Statement};
//!
//! let (diagnostics, statement) = parse("[1, 2, 3, 4][item > 2]");
//! assert!(diagnostics.is_empty());
//! assert!(matches!(
//!     statement,
//!     Some(Statement::Expression(Expr::Filter { .. }))
//! ));
//! ```
//!
//! ## Syntax Quick Reference
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Assignment | `x <- 5` |
//! | Range | `[1..5)`, `]1..5]`, `< 10` |
//! | List and filter | `[1, 2, 3][item > 1]`, `l[-1]` |
//! | Context and path | `{a: {b: 1}}.a.b` |
//! | Membership | `3 in [2, 3, 4]`, `2 in(<1, !=2, >3)` |
//! | Logic | `a and b`, `not(x)`, `v between 1 and 10` |
//! | Quantifiers | `some x in l satisfies x > 3` |
//! | Type test | `x instance of date and time` |
//! | Calls | `substring("foobar", start position: 3)` |
//! | Temporal literals | `2021-03-05`, `13:15:17Z`, `P1DT2H`, `@"P2Y"` |
//!
//! ## Diagnostics
//!
//! [`parse`] never fails. Illegal characters and syntax errors are reported
//! as messages (`Syntax error at token '+'`, `Syntax error at EOF`,
//! `Illegal character '$'`); the offending token is dropped and parsing
//! continues, so one call can surface several problems.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
mod diagnostics;
mod error;
mod functions;
pub mod lexer;
mod parser;
mod token;

pub use ast::{
    format_number, Argument, ArithmeticOperator, ComparisonOperator, ContextEntry, Expr,
    Iteration, Literal, Quantifier, RangeBound, Statement, TypeName,
};
pub use diagnostics::Diagnostics;
pub use error::{SFeelError, SFeelResult};
pub use functions::BuiltinFunction;
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, parse_strict, parse_tokens};
pub use token::{Selector, Token, TokenKind};
