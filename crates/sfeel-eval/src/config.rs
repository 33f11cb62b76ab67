//! Configuration types for evaluation sessions.

use std::sync::Arc;
use std::time::Duration;

use crate::traits::{Clock, SystemClock, TzDatabase, ZoneResolver};

/// Default upper bound on the compiled size of one regular expression.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Configuration for a [`Session`](crate::Session).
///
/// # Example
///
/// ```rust
/// use sfeel_eval::{CacheConfig, SessionConfig};
///
/// let config = SessionConfig::builder()
///     .with_cache(CacheConfig::default())
///     .with_regex_size_limit(64 * 1024)
///     .build();
/// assert!(config.cache.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Parse cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
    /// Compiled size bound for patterns in `matches`, `replace` and `split`.
    pub regex_size_limit: usize,
    /// Source of `now()` and `today()`.
    pub clock: Arc<dyn Clock>,
    /// Resolver for `@Region/City` zone suffixes.
    pub zone_resolver: Arc<dyn ZoneResolver>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache: None,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            clock: Arc::new(SystemClock),
            zone_resolver: Arc::new(TzDatabase),
        }
    }
}

impl SessionConfig {
    /// Creates a new builder for SessionConfig.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for SessionConfig.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    cache: Option<CacheConfig>,
    regex_size_limit: Option<usize>,
    clock: Option<Arc<dyn Clock>>,
    zone_resolver: Option<Arc<dyn ZoneResolver>>,
}

impl SessionConfigBuilder {
    /// Enables the parse cache with the given configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the compiled size bound for regular expressions.
    pub fn with_regex_size_limit(mut self, limit: usize) -> Self {
        self.regex_size_limit = Some(limit);
        self
    }

    /// Replaces the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the IANA zone resolver.
    pub fn with_zone_resolver(mut self, resolver: Arc<dyn ZoneResolver>) -> Self {
        self.zone_resolver = Some(resolver);
        self
    }

    /// Builds the SessionConfig.
    pub fn build(self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            cache: self.cache,
            regex_size_limit: self.regex_size_limit.unwrap_or(defaults.regex_size_limit),
            clock: self.clock.unwrap_or(defaults.clock),
            zone_resolver: self.zone_resolver.unwrap_or(defaults.zone_resolver),
        }
    }
}

/// Configuration for the parse cache.
///
/// # Example
///
/// ```rust
/// use sfeel_eval::CacheConfig;
/// use std::time::Duration;
///
/// let cache = CacheConfig {
///     max_entries: 512,
///     ttl: Duration::from_secs(60),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached parse results.
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_024,
            ttl: Duration::from_secs(300),
        }
    }
}
