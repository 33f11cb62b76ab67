//! Numeric functions.

use sfeel::BuiltinFunction;

use super::Args;
use crate::value::Value;

pub(super) fn apply(function: BuiltinFunction, args: Args) -> Value {
    let first = args.scalar(0);
    if function == BuiltinFunction::Abs {
        return abs(first);
    }
    let Some(n) = first.as_number() else {
        return Value::Null;
    };
    let result = match function {
        BuiltinFunction::Decimal => args
            .scalar(1)
            .as_integer()
            .and_then(|scale| i32::try_from(scale).ok())
            .map(|scale| decimal(n, scale)),
        BuiltinFunction::Floor => Some(n.floor()),
        BuiltinFunction::Ceiling => Some(n.ceil()),
        BuiltinFunction::Modulo => args
            .scalar(1)
            .as_number()
            .filter(|d| *d != 0.0)
            .map(|d| n - d * (n / d).floor()),
        BuiltinFunction::Sqrt => Some(n).filter(|n| *n >= 0.0).map(f64::sqrt),
        BuiltinFunction::Log => Some(n).filter(|n| *n > 0.0).map(f64::ln),
        BuiltinFunction::Exp => Some(n.exp()),
        BuiltinFunction::Odd | BuiltinFunction::Even => {
            return match first.as_integer() {
                Some(i) => Value::Boolean((i % 2 == 0) == (function == BuiltinFunction::Even)),
                None => Value::Null,
            };
        }
        _ => None,
    };
    result
        .filter(|n| n.is_finite())
        .map_or(Value::Null, Value::Number)
}

fn abs(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n.abs()),
        Value::YearMonthDuration(months) => {
            months.checked_abs().map_or(Value::Null, Value::YearMonthDuration)
        }
        Value::DayTimeDuration(delta) => Value::DayTimeDuration(delta.abs()),
        _ => Value::Null,
    }
}

/// Rounds to `scale` fractional digits, ties to even.
fn decimal(n: f64, scale: i32) -> f64 {
    let factor = 10f64.powi(scale);
    let scaled = n * factor;
    let rounded = scaled.round();
    let rounded = if (rounded - scaled).abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        rounded
    };
    rounded / factor
}
