//! Arithmetic over the cross-domain operator table.
//!
//! | Left | Op | Right | Result |
//! |------|----|-------|--------|
//! | number | `+ - * / **` | number | number |
//! | string | `+` | string | string |
//! | list | `+` | list / value | list |
//! | date, date and time | `+ -` | either duration | same as left |
//! | time | `+ -` | days and time duration | time (wraps at midnight) |
//! | date, date and time | `-` | date, date and time | days and time duration |
//! | time | `-` | time | days and time duration |
//! | duration | `+ -` | same duration | duration |
//! | duration | `* /` | number | duration |
//! | number | `*` | duration | duration |
//! | duration | `/` | same duration | number |
//!
//! Every other combination, division by zero and overflow give `null`.

use chrono::TimeDelta;
use sfeel::ArithmeticOperator;

use crate::coerce::{coerce_scalar, date_family_pair};
use crate::temporal::{add_months, delta_seconds, seconds_to_delta};
use crate::value::{FeelDateTime, FeelTime, Value};

/// Applies `op` to two values.
///
/// ```rust
/// use sfeel::ArithmeticOperator;
/// use sfeel_eval::{arithmetic::arithmetic, Value};
///
/// let sum = arithmetic(ArithmeticOperator::Add, Value::Number(1.0), Value::Number(2.0));
/// assert_eq!(sum, Value::Number(3.0));
///
/// let mismatch = arithmetic(ArithmeticOperator::Add, Value::Number(1.0), Value::string("a"));
/// assert_eq!(mismatch, Value::Null);
/// ```
pub fn arithmetic(op: ArithmeticOperator, left: Value, right: Value) -> Value {
    use ArithmeticOperator::*;

    let (left, right) = (coerce_scalar(left), coerce_scalar(right));
    match (op, left, right) {
        (_, Value::Number(a), Value::Number(b)) => number(op, a, b),
        (Add, Value::String(a), Value::String(b)) => Value::String(a + &b),

        (Add, Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        (Add, Value::List(mut a), b) => {
            a.push(b);
            Value::List(a)
        }
        (Add, a, Value::List(mut b)) => {
            b.insert(0, a);
            Value::List(b)
        }

        (Add | Subtract, Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => {
            let months = if op == Add { a.checked_add(b) } else { a.checked_sub(b) };
            Value::or_null(months.map(Value::YearMonthDuration))
        }
        (Add | Subtract, Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => {
            let delta = if op == Add { a.checked_add(&b) } else { a.checked_sub(&b) };
            Value::or_null(delta.map(Value::DayTimeDuration))
        }
        (Multiply, Value::YearMonthDuration(m), Value::Number(n))
        | (Multiply, Value::Number(n), Value::YearMonthDuration(m)) => scale_months(m as f64 * n),
        (Divide, Value::YearMonthDuration(m), Value::Number(n)) if n != 0.0 => scale_months(m as f64 / n),
        (Multiply, Value::DayTimeDuration(d), Value::Number(n))
        | (Multiply, Value::Number(n), Value::DayTimeDuration(d)) => scale_delta(delta_seconds(d) * n),
        (Divide, Value::DayTimeDuration(d), Value::Number(n)) if n != 0.0 => scale_delta(delta_seconds(d) / n),
        (Divide, Value::YearMonthDuration(a), Value::YearMonthDuration(b)) if b != 0 => {
            Value::Number(a as f64 / b as f64)
        }
        (Divide, Value::DayTimeDuration(a), Value::DayTimeDuration(b)) if !b.is_zero() => {
            Value::Number(delta_seconds(a) / delta_seconds(b))
        }

        (Add | Subtract, Value::Date(date), Value::DayTimeDuration(d)) => {
            let days = TimeDelta::days(d.num_days());
            let shifted = if op == Add { date.checked_add_signed(days) } else { date.checked_sub_signed(days) };
            Value::or_null(shifted.map(Value::Date))
        }
        (Add, Value::DayTimeDuration(d), Value::Date(date)) => {
            arithmetic(Add, Value::Date(date), Value::DayTimeDuration(d))
        }
        (Add | Subtract, Value::Date(date), Value::YearMonthDuration(m)) => {
            let months = if op == Add { m } else { -m };
            let midnight = FeelDateTime::midnight(date, None).datetime;
            Value::or_null(add_months(midnight, months).map(|dt| Value::Date(dt.date())))
        }
        (Add, Value::YearMonthDuration(m), Value::Date(date)) => {
            arithmetic(Add, Value::Date(date), Value::YearMonthDuration(m))
        }
        (Add | Subtract, Value::DateTime(dt), Value::DayTimeDuration(d)) => {
            let shifted = if op == Add {
                dt.datetime.checked_add_signed(d)
            } else {
                dt.datetime.checked_sub_signed(d)
            };
            Value::or_null(shifted.map(|datetime| Value::DateTime(FeelDateTime { datetime, zone: dt.zone })))
        }
        (Add, Value::DayTimeDuration(d), Value::DateTime(dt)) => {
            arithmetic(Add, Value::DateTime(dt), Value::DayTimeDuration(d))
        }
        (Add | Subtract, Value::DateTime(dt), Value::YearMonthDuration(m)) => {
            let months = if op == Add { m } else { -m };
            Value::or_null(
                add_months(dt.datetime, months)
                    .map(|datetime| Value::DateTime(FeelDateTime { datetime, zone: dt.zone })),
            )
        }
        (Add, Value::YearMonthDuration(m), Value::DateTime(dt)) => {
            arithmetic(Add, Value::DateTime(dt), Value::YearMonthDuration(m))
        }
        (Add | Subtract, Value::Time(t), Value::DayTimeDuration(d)) => {
            let (time, _) = if op == Add {
                t.time.overflowing_add_signed(d)
            } else {
                t.time.overflowing_sub_signed(d)
            };
            Value::Time(FeelTime { time, zone: t.zone })
        }
        (Add, Value::DayTimeDuration(d), Value::Time(t)) => {
            arithmetic(Add, Value::Time(t), Value::DayTimeDuration(d))
        }
        (Subtract, Value::Time(a), Value::Time(b)) => {
            if a.zone.is_some() != b.zone.is_some() {
                return Value::Null;
            }
            Value::DayTimeDuration(a.normalized().signed_duration_since(b.normalized()))
        }
        (Subtract, a @ (Value::Date(_) | Value::DateTime(_)), b @ (Value::Date(_) | Value::DateTime(_))) => {
            date_difference(&a, &b)
        }
        _ => Value::Null,
    }
}

fn number(op: ArithmeticOperator, a: f64, b: f64) -> Value {
    let result = match op {
        ArithmeticOperator::Add => a + b,
        ArithmeticOperator::Subtract => a - b,
        ArithmeticOperator::Multiply => a * b,
        ArithmeticOperator::Divide if b == 0.0 => return Value::Null,
        ArithmeticOperator::Divide => a / b,
        ArithmeticOperator::Power => a.powf(b),
    };
    if result.is_finite() {
        Value::Number(result)
    } else {
        Value::Null
    }
}

/// Year-month scaling truncates toward zero.
fn scale_months(months: f64) -> Value {
    if months.is_finite() && months.abs() < 9.0e15 {
        Value::YearMonthDuration(months.trunc() as i64)
    } else {
        Value::Null
    }
}

fn scale_delta(seconds: f64) -> Value {
    Value::or_null(seconds_to_delta(seconds).map(Value::DayTimeDuration))
}

fn date_difference(left: &Value, right: &Value) -> Value {
    if let (Value::Date(a), Value::Date(b)) = (left, right) {
        return Value::DayTimeDuration(a.signed_duration_since(*b));
    }
    match date_family_pair(left, right) {
        Some((a, b)) if a.zone.is_some() == b.zone.is_some() => {
            Value::DayTimeDuration(a.normalized().signed_duration_since(b.normalized()))
        }
        _ => Value::Null,
    }
}

/// Unary minus: numbers and both durations.
pub fn negate(value: Value) -> Value {
    match coerce_scalar(value) {
        Value::Number(n) => Value::Number(-n),
        Value::YearMonthDuration(m) => Value::or_null(m.checked_neg().map(Value::YearMonthDuration)),
        Value::DayTimeDuration(d) => Value::DayTimeDuration(-d),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ArithmeticOperator::*;

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    mod numbers {
        use super::*;

        #[test]
        fn test_basic_operators() {
            assert_eq!(arithmetic(Add, n(1.0), n(2.0)), n(3.0));
            assert_eq!(arithmetic(Subtract, n(1.0), n(2.0)), n(-1.0));
            assert_eq!(arithmetic(Multiply, n(3.0), n(2.0)), n(6.0));
            assert_eq!(arithmetic(Divide, n(3.0), n(2.0)), n(1.5));
            assert_eq!(arithmetic(Power, n(2.0), n(10.0)), n(1024.0));
        }

        #[test]
        fn test_division_by_zero() {
            assert_eq!(arithmetic(Divide, n(1.0), n(0.0)), Value::Null);
        }

        #[test]
        fn test_singleton_unwrap() {
            assert_eq!(arithmetic(Add, Value::List(vec![n(5.0)]), n(1.0)), n(6.0));
        }

        #[test]
        fn test_boolean_is_not_a_number() {
            assert_eq!(arithmetic(Add, Value::Boolean(true), n(1.0)), Value::Null);
        }
    }

    mod strings_and_lists {
        use super::*;

        #[test]
        fn test_concatenation() {
            assert_eq!(
                arithmetic(Add, Value::string("foo"), Value::string("bar")),
                Value::string("foobar")
            );
            assert_eq!(arithmetic(Subtract, Value::string("a"), Value::string("b")), Value::Null);
        }

        #[test]
        fn test_list_append_and_prepend() {
            let list = Value::List(vec![n(1.0), n(2.0)]);
            assert_eq!(
                arithmetic(Add, list.clone(), n(3.0)),
                Value::List(vec![n(1.0), n(2.0), n(3.0)])
            );
            assert_eq!(
                arithmetic(Add, n(0.0), list),
                Value::List(vec![n(0.0), n(1.0), n(2.0)])
            );
        }
    }

    mod temporal {
        use super::*;

        #[test]
        fn test_date_plus_months_clamps() {
            assert_eq!(
                arithmetic(Add, date(2021, 1, 31), Value::YearMonthDuration(1)),
                date(2021, 2, 28)
            );
        }

        #[test]
        fn test_date_minus_date() {
            assert_eq!(
                arithmetic(Subtract, date(2021, 3, 1), date(2021, 2, 1)),
                Value::DayTimeDuration(TimeDelta::days(28))
            );
        }

        #[test]
        fn test_time_wraps() {
            let time = Value::Time(FeelTime::local(chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
            let later = arithmetic(Add, time, Value::DayTimeDuration(TimeDelta::hours(2)));
            assert_eq!(
                later,
                Value::Time(FeelTime::local(chrono::NaiveTime::from_hms_opt(1, 0, 0).unwrap()))
            );
        }

        #[test]
        fn test_duration_scaling() {
            assert_eq!(
                arithmetic(Multiply, Value::YearMonthDuration(5), n(1.5)),
                Value::YearMonthDuration(7)
            );
            assert_eq!(
                arithmetic(Divide, Value::DayTimeDuration(TimeDelta::hours(3)), n(2.0)),
                Value::DayTimeDuration(TimeDelta::minutes(90))
            );
            assert_eq!(
                arithmetic(Divide, Value::YearMonthDuration(18), Value::YearMonthDuration(12)),
                n(1.5)
            );
        }

        #[test]
        fn test_mixed_durations_are_null() {
            assert_eq!(
                arithmetic(Add, Value::YearMonthDuration(1), Value::DayTimeDuration(TimeDelta::days(1))),
                Value::Null
            );
        }
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(n(2.0)), n(-2.0));
        assert_eq!(negate(Value::YearMonthDuration(3)), Value::YearMonthDuration(-3));
        assert_eq!(negate(Value::string("x")), Value::Null);
    }
}
