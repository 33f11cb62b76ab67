//! Translation of XPath-style patterns, flags and replacements for the
//! `regex` crate.
//!
//! `matches`, `replace` and `split` all compile their pattern here, so the
//! flag table and the size bound live in one place.

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::error::{EvalError, EvalResult};

/// Compiles `pattern` with XPath flags.
///
/// Returns `Ok(None)` when `flags` contains a letter other than `s`, `m`,
/// `i` or `x`; the caller turns that into `null`. A pattern the engine
/// rejects, or one over `size_limit`, is an [`EvalError::InvalidRegex`].
///
/// ```rust
/// use sfeel_eval::regex_adapter::compile;
///
/// let re = compile("^fo*", Some("i"), 1 << 20).unwrap().unwrap();
/// assert!(re.is_match("FOObar"));
/// assert!(compile("a", Some("q"), 1 << 20).unwrap().is_none());
/// ```
pub fn compile(pattern: &str, flags: Option<&str>, size_limit: usize) -> EvalResult<Option<Regex>> {
    let mut builder = RegexBuilder::new(pattern);
    builder.size_limit(size_limit);
    for flag in flags.unwrap_or_default().chars() {
        match flag {
            's' => builder.dot_matches_new_line(true),
            'm' => builder.multi_line(true),
            'i' => builder.case_insensitive(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                trace!(flag = %other, "unsupported regex flag");
                return Ok(None);
            }
        };
    }
    match builder.build() {
        Ok(regex) => Ok(Some(regex)),
        Err(error) => {
            trace!(pattern, %error, "regex compilation failed");
            Err(EvalError::InvalidRegex {
                pattern: pattern.to_string(),
            })
        }
    }
}

/// Rewrites `$N` group references as `${N}`, so a reference followed by a
/// letter or digit is not read as a longer group name.
///
/// ```rust
/// use sfeel_eval::regex_adapter::translate_replacement;
///
/// assert_eq!(translate_replacement("[$1]$2x"), "[${1}]${2}x");
/// ```
pub fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' && chars.peek().is_some_and(|d| d.is_ascii_digit()) {
            out.push_str("${");
            while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                out.push(d);
            }
            out.push('}');
        } else {
            out.push(c);
        }
    }
    out
}
