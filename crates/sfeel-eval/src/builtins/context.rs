//! `get value` and `get entries`.

use sfeel::{BuiltinFunction, Expr};

use super::{Args, Bound};
use crate::evaluator::Evaluator;
use crate::value::{Context, Value};

pub(super) fn apply(function: BuiltinFunction, args: Args) -> Value {
    match (function, args.get(0)) {
        (BuiltinFunction::GetEntries, Value::Context(context)) => Value::List(
            context
                .iter()
                .map(|(key, value)| {
                    let mut entry = Context::new();
                    entry.insert("key", Value::string(key));
                    entry.insert("value", value.clone());
                    Value::Context(entry)
                })
                .collect(),
        ),
        (BuiltinFunction::GetValue, Value::Context(context)) => match args.scalar(1) {
            Value::String(key) => context.get(key).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

/// `get value(m, key)`. A bare name in key position is the key itself, so
/// `get value({a: 1}, a)` reads entry `a` without resolving a variable `a`.
pub(super) fn get_value(ev: &mut Evaluator<'_>, bound: Bound<'_>) -> Value {
    let context = bound.slots[0].map_or(Value::Null, |expr| ev.evaluate(expr));
    let key = match bound.slots[1] {
        Some(Expr::Name(name)) => Value::string(name.as_str()),
        Some(expr) => ev.evaluate(expr),
        None => Value::Null,
    };
    apply(
        BuiltinFunction::GetValue,
        Args::new(BuiltinFunction::GetValue, vec![Some(context), Some(key)], vec![]),
    )
}
