//! String functions.
//!
//! Positions are 1-based and count characters, not bytes. A negative start
//! position counts back from the end (`-1` is the last character).

use sfeel::BuiltinFunction;

use super::Args;
use crate::config::SessionConfig;
use crate::error::EvalResult;
use crate::regex_adapter::{compile, translate_replacement};
use crate::value::Value;

pub(super) fn apply(function: BuiltinFunction, args: Args, config: &SessionConfig) -> EvalResult<Value> {
    let Value::String(text) = args.scalar(0) else {
        return Ok(Value::Null);
    };
    let text = text.as_str();
    Ok(match function {
        BuiltinFunction::Substring => substring(text, args.scalar(1), args.scalar(2)),
        BuiltinFunction::StringLength => Value::Number(text.chars().count() as f64),
        BuiltinFunction::UpperCase => Value::string(text.to_uppercase()),
        BuiltinFunction::LowerCase => Value::string(text.to_lowercase()),
        BuiltinFunction::SubstringBefore => match args.scalar(1) {
            Value::String(needle) => {
                Value::string(text.find(needle.as_str()).map_or("", |at| &text[..at]))
            }
            _ => Value::Null,
        },
        BuiltinFunction::SubstringAfter => match args.scalar(1) {
            Value::String(needle) => Value::string(
                text.find(needle.as_str())
                    .map_or("", |at| &text[at + needle.len()..]),
            ),
            _ => Value::Null,
        },
        BuiltinFunction::Contains => test(args.scalar(1), |needle| text.contains(needle)),
        BuiltinFunction::StartsWith => test(args.scalar(1), |needle| text.starts_with(needle)),
        BuiltinFunction::EndsWith => test(args.scalar(1), |needle| text.ends_with(needle)),
        BuiltinFunction::Matches => {
            let (Value::String(pattern), Some(flags)) = (args.scalar(1), flags(args.scalar(2))) else {
                return Ok(Value::Null);
            };
            match compile(pattern, flags, config.regex_size_limit)? {
                Some(regex) => Value::Boolean(regex.is_match(text)),
                None => Value::Null,
            }
        }
        BuiltinFunction::Replace => {
            let (Value::String(pattern), Value::String(replacement), Some(flags)) =
                (args.scalar(1), args.scalar(2), flags(args.scalar(3)))
            else {
                return Ok(Value::Null);
            };
            match compile(pattern, flags, config.regex_size_limit)? {
                Some(regex) => {
                    let replacement = translate_replacement(replacement);
                    Value::string(regex.replace_all(text, replacement.as_str()))
                }
                None => Value::Null,
            }
        }
        BuiltinFunction::Split => {
            let Value::String(delimiter) = args.scalar(1) else {
                return Ok(Value::Null);
            };
            match compile(delimiter, None, config.regex_size_limit)? {
                Some(regex) => Value::List(regex.split(text).map(Value::string).collect()),
                None => Value::Null,
            }
        }
        _ => Value::Null,
    })
}

/// An optional flags argument: `Some(None)` when absent, `None` when it is
/// not a string.
fn flags(value: &Value) -> Option<Option<&str>> {
    match value {
        Value::Null => Some(None),
        Value::String(flags) => Some(Some(flags.as_str())),
        _ => None,
    }
}

fn test(needle: &Value, predicate: impl FnOnce(&str) -> bool) -> Value {
    match needle {
        Value::String(needle) => Value::Boolean(predicate(needle)),
        _ => Value::Null,
    }
}

fn substring(text: &str, start: &Value, length: &Value) -> Value {
    let Some(start) = start.as_integer() else {
        return Value::Null;
    };
    let chars: Vec<char> = text.chars().collect();
    let count = chars.len() as i64;
    let begin = match start {
        0 => return Value::Null,
        s if s > 0 => s - 1,
        s => count + s,
    }
    .clamp(0, count);
    let end = match length {
        Value::Null => count,
        other => match other.as_integer() {
            Some(n) if n >= 0 => begin.saturating_add(n).min(count),
            _ => return Value::Null,
        },
    };
    Value::string(chars[begin as usize..end as usize].iter().collect::<String>())
}
