//! Evaluation sessions.

use std::sync::Arc;
use std::time::Instant;

use sfeel::Statement;
use tracing::debug;

use crate::cache::{normalize_cache_key, ParseCache, ParsedStatement};
use crate::config::SessionConfig;
use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::result::{Evaluation, EvaluationStats};
use crate::value::Value;

/// An S-FEEL interpreter session.
///
/// A session owns the name bindings made with `name <- expr`; later lines in
/// the same session see them, other sessions do not. Each call to
/// [`Session::parse`] or [`Session::evaluate`] returns only the diagnostics
/// raised by that call.
///
/// Sessions take `&mut self` to evaluate and are not meant to be shared
/// between threads. A [`ParseCache`] can be shared through `Arc`.
///
/// # Example
///
/// ```rust
/// use sfeel_eval::{Session, Value};
///
/// let mut session = Session::new();
/// assert_eq!(session.parse("x <- 5"), (vec![], Some(Value::Number(5.0))));
/// assert_eq!(session.parse("x + 1"), (vec![], Some(Value::Number(6.0))));
///
/// let (diagnostics, value) = Session::new().parse("x + 1");
/// assert_eq!(diagnostics, vec!["Undefined name 'x'"]);
/// assert_eq!(value, Some(Value::Null));
/// ```
#[derive(Debug)]
pub struct Session {
    environment: Environment,
    config: SessionConfig,
    cache: Option<Arc<ParseCache>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Creates a session with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sfeel_eval::{CacheConfig, Session, SessionConfig};
    ///
    /// let config = SessionConfig::builder()
    ///     .with_cache(CacheConfig::default())
    ///     .build();
    /// let session = Session::with_config(config);
    /// assert!(session.cache().is_some());
    /// ```
    pub fn with_config(config: SessionConfig) -> Self {
        let cache = config
            .cache
            .as_ref()
            .map(|c| Arc::new(ParseCache::new(c.clone())));
        Self {
            environment: Environment::new(),
            config,
            cache,
        }
    }

    /// Uses `cache` for parsed statements, replacing any configured one.
    pub fn with_shared_cache(mut self, cache: Arc<ParseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the parse cache if enabled.
    pub fn cache(&self) -> Option<&ParseCache> {
        self.cache.as_deref()
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the name bindings.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns the name bindings for modification.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Evaluates one line and returns its diagnostics and value.
    ///
    /// Empty or whitespace-only input yields no diagnostics and no value.
    /// A line that fails to parse entirely yields its diagnostics and no
    /// value. Otherwise the value is always present, `null` included.
    pub fn parse(&mut self, text: &str) -> (Vec<String>, Option<Value>) {
        self.evaluate(text).into_parts()
    }

    /// Evaluates one line, with statistics.
    pub fn evaluate(&mut self, text: &str) -> Evaluation {
        let start = Instant::now();
        let (parsed, cache_hit) = self.parse_statement(text);
        let ParsedStatement {
            statement,
            mut diagnostics,
            tokens,
        } = parsed;

        let value = statement.map(|statement| {
            let mut evaluator = Evaluator::new(&self.environment, &self.config);
            let value = evaluator.evaluate(statement.expr());
            diagnostics.extend(evaluator.into_diagnostics().into_vec());
            if let Statement::Assignment { name, .. } = statement {
                self.environment.bind(name, value.clone());
            }
            value
        });

        let duration = start.elapsed();
        debug!(
            input_len = text.len(),
            tokens,
            cache_hit,
            diagnostics = diagnostics.len(),
            elapsed_us = duration.as_micros() as u64,
            "evaluated statement"
        );

        Evaluation {
            value,
            diagnostics,
            stats: EvaluationStats::new(duration, tokens, cache_hit),
        }
    }

    /// Lexes and parses `text`, consulting the cache when one is enabled.
    fn parse_statement(&self, text: &str) -> (ParsedStatement, bool) {
        let key = normalize_cache_key(text);
        if let Some(cache) = &self.cache {
            if let Some(parsed) = cache.get(&key) {
                return (parsed, true);
            }
        }

        let tokens = sfeel::tokenize(text);
        let count = tokens.len();
        let (diagnostics, statement) = sfeel::parse_tokens(tokens);
        let parsed = ParsedStatement {
            statement,
            diagnostics: diagnostics.into_vec(),
            tokens: count,
        };

        if let Some(cache) = &self.cache {
            cache.set(key, parsed.clone());
        }
        (parsed, false)
    }
}

/// Evaluates one line in a fresh session.
///
/// # Example
///
/// ```rust
/// use sfeel_eval::{parse, Value};
///
/// assert_eq!(parse("3 in [2, 3, 4]"), (vec![], Some(Value::Boolean(true))));
/// assert_eq!(parse("   "), (vec![], None));
/// ```
pub fn parse(text: &str) -> (Vec<String>, Option<Value>) {
    Session::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    mod bindings {
        use super::*;

        #[test]
        fn test_assignment_is_visible_later() {
            let mut session = Session::new();
            assert_eq!(session.parse("x <- 5"), (vec![], Some(Value::Number(5.0))));
            assert_eq!(session.parse("x + 1"), (vec![], Some(Value::Number(6.0))));
            assert_eq!(session.environment().lookup("x"), Some(&Value::Number(5.0)));
        }

        #[test]
        fn test_sessions_are_isolated() {
            let mut first = Session::new();
            first.parse("x <- 5");
            let (diagnostics, value) = Session::new().parse("x");
            assert_eq!(diagnostics, vec!["Undefined name 'x'"]);
            assert_eq!(value, Some(Value::Null));
        }

        #[test]
        fn test_reassignment_replaces() {
            let mut session = Session::new();
            session.parse("x <- 1");
            session.parse("x <- x + 1");
            assert_eq!(session.parse("x").1, Some(Value::Number(2.0)));
        }

        #[test]
        fn test_environment_mut() {
            let mut session = Session::new();
            session.environment_mut().bind("limit", Value::Number(10.0));
            assert_eq!(session.parse("5 < limit").1, Some(Value::Boolean(true)));
        }
    }

    mod diagnostics {
        use super::*;

        #[test]
        fn test_empty_input() {
            assert_eq!(parse(""), (vec![], None));
            assert_eq!(parse(" \t "), (vec![], None));
        }

        #[test]
        fn test_diagnostics_are_per_call() {
            let mut session = Session::new();
            let (diagnostics, _) = session.parse("missing");
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(session.parse("1").0, Vec::<String>::new());
        }

        #[test]
        fn test_syntax_and_evaluation_diagnostics_combine() {
            let (diagnostics, value) = parse("1 + + y");
            assert_eq!(
                diagnostics,
                vec!["Syntax error at token '+'", "Undefined name 'y'"]
            );
            assert_eq!(value, Some(Value::Null));
        }
    }

    mod caching {
        use super::*;

        fn cached_session() -> Session {
            Session::with_config(SessionConfig::builder().with_cache(CacheConfig::default()).build())
        }

        #[test]
        fn test_second_parse_hits_cache() {
            let mut session = cached_session();
            let first = session.evaluate("1 + 2");
            let second = session.evaluate("1  +  2");
            assert!(!first.stats.cache_hit);
            assert!(second.stats.cache_hit);
            assert_eq!(second.value, Some(Value::Number(3.0)));
            assert_eq!(second.stats.tokens, 3);
        }

        #[test]
        fn test_cached_statement_sees_new_bindings() {
            let mut session = cached_session();
            session.parse("x <- 1");
            assert_eq!(session.parse("x * 10").1, Some(Value::Number(10.0)));
            session.parse("x <- 2");
            assert_eq!(session.parse("x * 10").1, Some(Value::Number(20.0)));
        }

        #[test]
        fn test_shared_cache() {
            let cache = Arc::new(ParseCache::new(CacheConfig::default()));
            let mut a = Session::new().with_shared_cache(Arc::clone(&cache));
            let mut b = Session::new().with_shared_cache(Arc::clone(&cache));
            a.parse("[1, 2, 3]");
            assert!(b.evaluate("[1, 2, 3]").stats.cache_hit);
            assert_eq!(cache.len(), 1);
        }
    }
}
