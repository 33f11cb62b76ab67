//! # sfeel-eval
//!
//! Evaluator for S-FEEL, the simple expression language of the Decision
//! Model and Notation (DMN) standard.
//!
//! This crate takes the statements produced by the [`sfeel`] parser and
//! evaluates them to a [`Value`]: numbers, strings, booleans, dates, times,
//! durations, lists, contexts and ranges. Evaluation never panics and never
//! returns an error. Problems surface as diagnostic messages next to the
//! value, and operations on values they cannot handle produce `null`.
//!
//! ## Quick Start
//!
//! ```rust
//! use sfeel_eval::{parse, Value};
//!
//! let (diagnostics, value) = parse("[1, 2, 3, 4][item > 2]");
//! assert!(diagnostics.is_empty());
//! assert_eq!(value.unwrap().to_string(), "[3, 4]");
//!
//! let (diagnostics, value) = parse("undefinedName");
//! assert_eq!(diagnostics, vec!["Undefined name 'undefinedName'"]);
//! assert_eq!(value, Some(Value::Null));
//! ```
//!
//! ## Sessions
//!
//! A [`Session`] keeps the bindings made with `name <- expr` between calls:
//!
//! ```rust
//! use sfeel_eval::{Session, Value};
//!
//! let mut session = Session::new();
//! session.parse("rate <- 0.2");
//! assert_eq!(session.parse("100 * rate").1, Some(Value::Number(20.0)));
//! ```
//!
//! ## With Configuration
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use chrono::NaiveDate;
//! use sfeel_eval::{CacheConfig, FixedClock, Session, SessionConfig, Value};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 2, 29)
//!     .and_then(|d| d.and_hms_opt(9, 30, 0))
//!     .unwrap();
//! let config = SessionConfig::builder()
//!     .with_cache(CacheConfig {
//!         max_entries: 256,
//!         ttl: Duration::from_secs(60),
//!     })
//!     .with_clock(Arc::new(FixedClock::new(now)))
//!     .build();
//!
//! let mut session = Session::with_config(config);
//! assert_eq!(session.parse("day of week(today())").1, Some(Value::string("Thursday")));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        sfeel-eval                         │
//! │                                                           │
//! │  Session                                                  │
//! │  ├── parse text → Statement (sfeel, optionally cached)    │
//! │  ├── evaluate the AST (evaluator, builtins)               │
//! │  ├── bind assignments in the Environment                  │
//! │  └── return (diagnostics, value)                          │
//! │                                                           │
//! │  Value model: value, coerce, arithmetic, temporal, range  │
//! │  Collaborators: Clock, ZoneResolver (traits)              │
//! └───────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod arithmetic;
mod builtins;
pub mod cache;
pub mod coerce;
mod config;
mod environment;
mod error;
mod evaluator;
pub mod range;
pub mod regex_adapter;
mod result;
mod session;
pub mod temporal;
mod traits;
pub mod value;

// Public re-exports
pub use cache::{normalize_cache_key, CacheStats, ParseCache, ParsedStatement};
pub use config::{CacheConfig, SessionConfig, SessionConfigBuilder, DEFAULT_REGEX_SIZE_LIMIT};
pub use environment::Environment;
pub use error::{EvalError, EvalResult};
pub use result::{Evaluation, EvaluationStats};
pub use session::{parse, Session};
pub use traits::{Clock, FixedClock, SystemClock, TzDatabase, ZoneResolver};
pub use value::{Context, Domain, FeelDateTime, FeelTime, Range, Value, Zone};
