//! `not`, `all`, `any` and `is`.

use sfeel::BuiltinFunction;

use super::Args;
use crate::value::Value;

pub(super) fn apply(function: BuiltinFunction, args: Args) -> Value {
    match function {
        BuiltinFunction::Not => match args.scalar(0) {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Null,
        },
        BuiltinFunction::All => scan(args.items(), false),
        BuiltinFunction::Any => scan(args.items(), true),
        BuiltinFunction::Is => Value::Boolean(same_kind(args.get(0), args.get(1))),
        _ => Value::Null,
    }
}

/// Scans for `decisive` (`false` for `all`, `true` for `any`). The first
/// element that is not a boolean makes the whole result `null`.
fn scan(items: Vec<Value>, decisive: bool) -> Value {
    for item in &items {
        match item {
            Value::Boolean(b) if *b == decisive => return Value::Boolean(decisive),
            Value::Boolean(_) => {}
            _ => return Value::Null,
        }
    }
    Value::Boolean(!decisive)
}

/// Same semantic domain; times and date-times must also agree on zone
/// presence and offset.
fn same_kind(a: &Value, b: &Value) -> bool {
    if a.domain() != b.domain() {
        return false;
    }
    let offsets = match (a, b) {
        (Value::Time(x), Value::Time(y)) => (x.zone.as_ref(), y.zone.as_ref()),
        (Value::DateTime(x), Value::DateTime(y)) => (x.zone.as_ref(), y.zone.as_ref()),
        _ => return true,
    };
    match offsets {
        (None, None) => true,
        (Some(x), Some(y)) => x.offset == y.offset,
        _ => false,
    }
}
