//! Parse result caching.
//!
//! Provides an LRU cache with TTL expiration for parsed statements, keyed by
//! normalized source text. Evaluation is never cached: a statement's value
//! depends on the session environment and the clock.
//! Thread-safe using `Mutex` for LRU operations, so one cache can be shared
//! between sessions through `Arc`.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use sfeel::Statement;
use tracing::trace;

use crate::config::CacheConfig;

/// The outcome of lexing and parsing one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    /// The recovered statement, if any.
    pub statement: Option<Statement>,
    /// Lexical and syntax diagnostics.
    pub diagnostics: Vec<String>,
    /// Number of tokens the lexer produced.
    pub tokens: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    parsed: ParsedStatement,
    created_at: Instant,
}

impl CacheEntry {
    fn new(parsed: ParsedStatement) -> Self {
        Self {
            parsed,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Thread-safe LRU cache with TTL expiration for parsed statements.
///
/// # Example
///
/// ```rust
/// use sfeel_eval::cache::{ParseCache, ParsedStatement};
/// use std::time::Duration;
///
/// let cache = ParseCache::with_capacity(16, Duration::from_secs(60));
/// let (diagnostics, statement) = sfeel::parse("1 + 2");
/// cache.set(
///     "1 + 2".to_string(),
///     ParsedStatement { statement, diagnostics: diagnostics.into_vec(), tokens: 3 },
/// );
/// assert!(cache.get("1 + 2").is_some());
/// ```
pub struct ParseCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ParseCache {
    /// Creates a cache from configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_capacity(config.max_entries, config.ttl)
    }

    /// Creates a cache with custom capacity and TTL.
    pub fn with_capacity(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Gets a cached parse by key.
    ///
    /// Expired entries are dropped and reported as a miss. A hit is promoted
    /// to most-recently-used.
    pub fn get(&self, key: &str) -> Option<ParsedStatement> {
        let mut cache = self.inner.lock().ok()?;

        if let Some(entry) = cache.get(key) {
            if entry.is_expired(self.ttl) {
                cache.pop(key);
                trace!(key, "parse cache entry expired");
                return None;
            }
            return Some(entry.parsed.clone());
        }

        None
    }

    /// Stores a parse, evicting the least recently used entry when full.
    pub fn set(&self, key: String, parsed: ParsedStatement) {
        if let Ok(mut cache) = self.inner.lock() {
            trace!(key = key.as_str(), "parse cache insert");
            if let Some((evicted, _)) = cache.push(key.clone(), CacheEntry::new(parsed)) {
                if evicted != key {
                    trace!(key = evicted.as_str(), "parse cache eviction");
                }
            }
        }
    }

    /// Checks if a key exists (without affecting LRU order or checking expiry).
    pub fn contains(&self, key: &str) -> bool {
        match self.inner.lock() {
            Ok(cache) => cache.contains(key),
            _ => false,
        }
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    /// Removes expired entries.
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            let ttl = self.ttl;
            let expired: Vec<String> = cache
                .iter()
                .filter(|(_, entry)| entry.is_expired(ttl))
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                cache.pop(&key);
            }
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        match self.inner.lock() {
            Ok(cache) => {
                let total = cache.len();
                let expired = cache
                    .iter()
                    .filter(|(_, entry)| entry.is_expired(self.ttl))
                    .count();
                CacheStats {
                    total_entries: total,
                    expired_entries: expired,
                    valid_entries: total.saturating_sub(expired),
                }
            }
            _ => CacheStats::default(),
        }
    }
}

impl std::fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries.
    pub total_entries: usize,
    /// Entries past their TTL, not yet cleaned up.
    pub expired_entries: usize,
    /// Entries still valid.
    pub valid_entries: usize,
}

/// Collapses whitespace runs outside string literals to one space and trims
/// the ends, so `x  +1` and `x +1` share a key while `"a  b"` keeps its text.
///
/// ```rust
/// use sfeel_eval::cache::normalize_cache_key;
///
/// assert_eq!(normalize_cache_key("  1  +\t2 "), "1 + 2");
/// assert_eq!(normalize_cache_key("\"a  b\"  + x"), "\"a  b\" + x");
/// ```
pub fn normalize_cache_key(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut prev_was_space = true;
    let mut in_string = false;
    let mut escaped = false;

    for ch in source.chars() {
        if in_string {
            result.push(ch);
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            in_string = ch == '"';
            result.push(ch);
            prev_was_space = false;
        }
    }

    if result.ends_with(' ') && !in_string {
        result.pop();
    }
    result
}
