//! Scalar coercion, ordering and equality.
//!
//! Binary operators first unwrap a one-element list to its element, then
//! require both sides to share a domain. Dates and date-times form one
//! comparable family: a date stands for midnight in the other side's zone.

use std::cmp::Ordering;

use crate::value::{FeelDateTime, FeelTime, Value, Zone};

/// Unwraps a one-element list to its sole element.
///
/// ```rust
/// use sfeel_eval::{coerce::coerce_scalar, Value};
///
/// let single = Value::List(vec![Value::Number(5.0)]);
/// assert_eq!(coerce_scalar(single), Value::Number(5.0));
/// ```
pub fn coerce_scalar(value: Value) -> Value {
    match value {
        Value::List(mut items) if items.len() == 1 => items.pop().unwrap_or(Value::Null),
        other => other,
    }
}

/// Borrowing form of [`coerce_scalar`].
pub fn scalar_ref(value: &Value) -> &Value {
    match value {
        Value::List(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// Orders two values of one comparable domain; `None` on a domain mismatch,
/// for unordered domains, or when only one side carries a zone.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let (left, right) = (scalar_ref(left), scalar_ref(right));
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => compare_times(a, b),
        (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => Some(a.cmp(b)),
        (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => Some(a.cmp(b)),
        _ => {
            let (a, b) = date_family_pair(left, right)?;
            compare_date_times(&a, &b)
        }
    }
}

/// Lifts a date/date-time pair to two date-times; a date takes the zone of
/// the other side.
pub(crate) fn date_family_pair(left: &Value, right: &Value) -> Option<(FeelDateTime, FeelDateTime)> {
    let zone_of = |v: &Value| -> Option<Zone> {
        match v {
            Value::DateTime(dt) => dt.zone.clone(),
            _ => None,
        }
    };
    let lift = |v: &Value, other_zone: Option<Zone>| -> Option<FeelDateTime> {
        match v {
            Value::Date(date) => Some(FeelDateTime::midnight(*date, other_zone)),
            Value::DateTime(dt) => Some(dt.clone()),
            _ => None,
        }
    };
    Some((lift(left, zone_of(right))?, lift(right, zone_of(left))?))
}

pub(crate) fn compare_date_times(a: &FeelDateTime, b: &FeelDateTime) -> Option<Ordering> {
    if a.zone.is_some() != b.zone.is_some() {
        return None;
    }
    Some(a.normalized().cmp(&b.normalized()))
}

pub(crate) fn compare_times(a: &FeelTime, b: &FeelTime) -> Option<Ordering> {
    if a.zone.is_some() != b.zone.is_some() {
        return None;
    }
    Some(a.normalized().cmp(&b.normalized()))
}

/// Equality for `=` and `!=`.
///
/// `null` equals only `null`. Lists, contexts and ranges compare deeply.
/// Scalars of different domains are incomparable (`None`).
pub fn equals(left: &Value, right: &Value) -> Option<bool> {
    let (left, right) = (scalar_ref(left), scalar_ref(right));
    match (left, right) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Null, _) | (_, Value::Null) => Some(false),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a == b),
        (Value::List(_), Value::List(_))
        | (Value::Context(_), Value::Context(_))
        | (Value::Range(_), Value::Range(_)) => Some(deep_equals(left, right)),
        _ => compare(left, right).map(|ordering| ordering == Ordering::Equal),
    }
}

/// Structural equality used inside composites; a domain mismatch is simply
/// unequal.
pub fn deep_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equals(x, y))
        }
        (Value::Context(a), Value::Context(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equals(x, y)))
        }
        (Value::Range(a), Value::Range(b)) => {
            let endpoint = |x: &Option<Value>, y: &Option<Value>| match (x, y) {
                (None, None) => true,
                (Some(x), Some(y)) => deep_equals(x, y),
                _ => false,
            };
            a.start == b.start && a.end == b.end && endpoint(&a.low, &b.low) && endpoint(&a.high, &b.high)
        }
        (Value::List(_), _) | (_, Value::List(_)) => false,
        _ => equals(left, right).unwrap_or(false),
    }
}
