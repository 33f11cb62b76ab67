//! List functions and statistics.
//!
//! Positions are 1-based; negative positions count back from the end.
//! Aggregates over an empty list are `null`, except `count` (0) and `mode`
//! (`[]`).

use std::cmp::Ordering;

use sfeel::{ArithmeticOperator, BuiltinFunction, Expr};

use super::{Args, Bound};
use crate::arithmetic::arithmetic;
use crate::coerce::{compare, deep_equals, equals};
use crate::evaluator::Evaluator;
use crate::value::{Domain, Value};

pub(super) fn apply(function: BuiltinFunction, mut args: Args) -> Value {
    match function {
        BuiltinFunction::Min => extreme(args.items(), Ordering::Less),
        BuiltinFunction::Max => extreme(args.items(), Ordering::Greater),
        BuiltinFunction::Sum => sum(args.items()),
        BuiltinFunction::Mean => {
            let items = args.items();
            let count = items.len() as f64;
            match sum(items) {
                Value::Null => Value::Null,
                total => arithmetic(ArithmeticOperator::Divide, total, Value::Number(count)),
            }
        }
        BuiltinFunction::Product => numbers(args.items())
            .filter(|n| !n.is_empty())
            .map_or(Value::Null, |n| Value::Number(n.iter().product())),
        BuiltinFunction::Median => numbers(args.items()).map_or(Value::Null, median),
        BuiltinFunction::Stddev => numbers(args.items()).map_or(Value::Null, stddev),
        BuiltinFunction::Mode => numbers(args.items()).map_or(Value::Null, mode),
        BuiltinFunction::Concatenate => lists(args.all()).map_or(Value::Null, |lists| {
            Value::List(lists.into_iter().flatten().collect())
        }),
        BuiltinFunction::Union => lists(args.all()).map_or(Value::Null, |lists| {
            Value::List(distinct(lists.into_iter().flatten()))
        }),
        BuiltinFunction::Append => {
            let mut extra = Vec::new();
            if args.given(1) {
                extra.push(args.take(1));
            }
            extra.extend(args.rest());
            match args.take(0) {
                Value::List(mut items) => {
                    items.extend(extra);
                    Value::List(items)
                }
                _ => Value::Null,
            }
        }
        _ => {
            let Value::List(items) = args.take(0) else {
                return Value::Null;
            };
            on_list(function, items, args)
        }
    }
}

fn on_list(function: BuiltinFunction, mut items: Vec<Value>, mut args: Args) -> Value {
    let len = items.len();
    match function {
        BuiltinFunction::Count => Value::Number(len as f64),
        BuiltinFunction::ListContains => {
            let element = args.get(1);
            Value::Boolean(items.iter().any(|item| equals(item, element) == Some(true)))
        }
        BuiltinFunction::Reverse => {
            items.reverse();
            Value::List(items)
        }
        BuiltinFunction::DistinctValues => Value::List(distinct(items)),
        BuiltinFunction::Flatten => {
            let mut flat = Vec::with_capacity(len);
            flatten_into(items, &mut flat);
            Value::List(flat)
        }
        BuiltinFunction::IndexOf => {
            let target = args.get(1);
            Value::List(
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| deep_equals(item, target))
                    .map(|(i, _)| Value::Number((i + 1) as f64))
                    .collect(),
            )
        }
        BuiltinFunction::Sublist => {
            let Some(start) = args.scalar(1).as_integer().and_then(|p| index(len, p)) else {
                return Value::Null;
            };
            let end = match args.scalar(2) {
                Value::Null => len,
                other => match other.as_integer() {
                    Some(n) if n >= 0 && start + n as usize <= len => start + n as usize,
                    _ => return Value::Null,
                },
            };
            Value::List(items.drain(start..end).collect())
        }
        BuiltinFunction::InsertBefore => {
            let at = match args.scalar(1).as_integer() {
                Some(p) if p == len as i64 + 1 => Some(len),
                Some(p) => index(len, p),
                None => None,
            };
            match at {
                Some(at) => {
                    items.insert(at, args.take(2));
                    Value::List(items)
                }
                None => Value::Null,
            }
        }
        BuiltinFunction::Remove => match args.scalar(1).as_integer().and_then(|p| index(len, p)) {
            Some(at) => {
                items.remove(at);
                Value::List(items)
            }
            None => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Zero-based index of 1-based `position`, negative from the end.
fn index(len: usize, position: i64) -> Option<usize> {
    let len = len as i64;
    let at = match position {
        p if p > 0 => p - 1,
        p if p < 0 => len + p,
        _ => return None,
    };
    (0..len).contains(&at).then_some(at as usize)
}

fn distinct(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut kept: Vec<Value> = Vec::new();
    for item in items {
        if !kept.iter().any(|k| deep_equals(k, &item)) {
            kept.push(item);
        }
    }
    kept
}

fn flatten_into(items: Vec<Value>, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::List(inner) => flatten_into(inner, out),
            other => out.push(other),
        }
    }
}

fn lists(values: Vec<Value>) -> Option<Vec<Vec<Value>>> {
    values
        .into_iter()
        .map(|v| match v {
            Value::List(items) => Some(items),
            _ => None,
        })
        .collect()
}

fn numbers(items: Vec<Value>) -> Option<Vec<f64>> {
    items.iter().map(Value::as_number).collect()
}

// =============================================================================
// Aggregates
// =============================================================================

fn extreme(items: Vec<Value>, wanted: Ordering) -> Value {
    let mut items = items.into_iter();
    let Some(mut best) = items.next() else {
        return Value::Null;
    };
    if !best.domain().is_orderable() {
        return Value::Null;
    }
    for item in items {
        match compare(&item, &best) {
            Some(ordering) if ordering == wanted => best = item,
            Some(_) => {}
            None => return Value::Null,
        }
    }
    best
}

/// Sum through `+`, so a list of one duration domain adds up as well.
fn sum(items: Vec<Value>) -> Value {
    let Some(domain) = items.first().map(Value::domain) else {
        return Value::Null;
    };
    let summable = matches!(
        domain,
        Domain::Number | Domain::YearMonthDuration | Domain::DayTimeDuration
    );
    if !summable || items.iter().any(|item| item.domain() != domain) {
        return Value::Null;
    }
    let mut items = items.into_iter();
    let first = items.next().unwrap_or(Value::Null);
    items.fold(first, |total, item| arithmetic(ArithmeticOperator::Add, total, item))
}

fn median(mut numbers: Vec<f64>) -> Value {
    if numbers.is_empty() {
        return Value::Null;
    }
    numbers.sort_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 1 {
        Value::Number(numbers[mid])
    } else {
        Value::Number((numbers[mid - 1] + numbers[mid]) / 2.0)
    }
}

/// Sample standard deviation.
fn stddev(numbers: Vec<f64>) -> Value {
    if numbers.len() < 2 {
        return Value::Null;
    }
    let count = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / count;
    let squares: f64 = numbers.iter().map(|n| (n - mean).powi(2)).sum();
    Value::Number((squares / (count - 1.0)).sqrt())
}

/// The most frequent values, ascending.
fn mode(mut numbers: Vec<f64>) -> Value {
    numbers.sort_by(f64::total_cmp);
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for n in numbers {
        match runs.last_mut() {
            Some((value, count)) if *value == n => *count += 1,
            _ => runs.push((n, 1)),
        }
    }
    let top = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    Value::List(
        runs.into_iter()
            .filter(|(_, count)| *count == top)
            .map(|(value, _)| Value::Number(value))
            .collect(),
    )
}

// =============================================================================
// Sorting
// =============================================================================

/// `sort(list, precedes)`. The comparator is an inline
/// `function(a, b) ...` evaluated once per comparison; without one the list
/// sorts ascending. A comparison that is not a boolean makes the result
/// `null`.
pub(super) fn sort(ev: &mut Evaluator<'_>, bound: Bound<'_>) -> Value {
    let list = bound.slots[0].map_or(Value::Null, |expr| ev.evaluate(expr));
    let Value::List(items) = list else {
        return Value::Null;
    };
    let sorted = match bound.slots.get(1).copied().flatten() {
        None => merge_sort(items, &mut |a, b| compare(a, b).map(|o| o == Ordering::Less)),
        Some(Expr::Lambda { parameters, body }) if parameters.len() == 2 => {
            merge_sort(items, &mut |a, b| {
                let bindings = vec![
                    (parameters[0].clone(), a.clone()),
                    (parameters[1].clone(), b.clone()),
                ];
                ev.with_bindings(bindings, |ev| ev.evaluate(body)).as_bool()
            })
        }
        Some(_) => None,
    };
    sorted.map_or(Value::Null, Value::List)
}

type Precedes<'a> = dyn FnMut(&Value, &Value) -> Option<bool> + 'a;

/// Stable merge sort: an element from the right run moves ahead only when it
/// strictly precedes the left one.
fn merge_sort(mut items: Vec<Value>, precedes: &mut Precedes<'_>) -> Option<Vec<Value>> {
    if items.len() <= 1 {
        return Some(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, precedes)?;
    let right = merge_sort(right, precedes)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        if precedes(r, l)? {
            merged.extend(right.next());
        } else {
            merged.extend(left.next());
        }
    }
    merged.extend(left);
    merged.extend(right);
    Some(merged)
}
