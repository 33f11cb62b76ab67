//! `date`, `time`, `date and time`, `number`, `string`, `duration` and
//! `years and months duration`.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use sfeel::BuiltinFunction;

use super::Args;
use crate::config::SessionConfig;
use crate::error::EvalResult;
use crate::temporal::{months_between, parse_date, parse_date_time, parse_duration, parse_time};
use crate::value::{FeelDateTime, FeelTime, Value, Zone};

pub(super) fn apply(function: BuiltinFunction, mut args: Args, config: &SessionConfig) -> EvalResult<Value> {
    Ok(match function {
        BuiltinFunction::Date => {
            if args.given(1) || args.given(2) {
                if !(args.given(1) && args.given(2)) {
                    return Err(args.arity_error());
                }
                date_from_parts(args.scalar(0), args.scalar(1), args.scalar(2))
            } else {
                date(args.scalar(0))
            }
        }
        BuiltinFunction::Time => {
            if args.given(1) || args.given(2) || args.given(3) {
                if !(args.given(1) && args.given(2)) {
                    return Err(args.arity_error());
                }
                time_from_parts(&args)
            } else {
                time(args.scalar(0), config)
            }
        }
        BuiltinFunction::DateAndTime => {
            if args.given(1) {
                combine(args.scalar(0), args.scalar(1))
            } else {
                date_and_time(args.scalar(0), config)
            }
        }
        BuiltinFunction::Number => number(args.scalar(0), args.scalar(1), args.scalar(2)),
        BuiltinFunction::String => Value::String(args.take(0).to_string()),
        BuiltinFunction::Duration => match args.scalar(0) {
            Value::String(text) => Value::or_null(parse_duration(text)),
            duration @ (Value::YearMonthDuration(_) | Value::DayTimeDuration(_)) => duration.clone(),
            _ => Value::Null,
        },
        BuiltinFunction::YearsAndMonthsDuration => {
            let from = local_date_time(args.scalar(0));
            let to = local_date_time(args.scalar(1));
            match (from, to) {
                (Some(from), Some(to)) => Value::YearMonthDuration(months_between(from, to)),
                _ => Value::Null,
            }
        }
        _ => Value::Null,
    })
}

fn local_date_time(value: &Value) -> Option<chrono::NaiveDateTime> {
    match value {
        Value::Date(date) => Some(date.and_time(NaiveTime::MIN)),
        Value::DateTime(dt) => Some(dt.datetime),
        _ => None,
    }
}

fn date(from: &Value) -> Value {
    match from {
        Value::String(text) => Value::or_null(parse_date(text)),
        Value::Date(date) => Value::Date(*date),
        Value::DateTime(dt) => Value::Date(dt.datetime.date()),
        _ => Value::Null,
    }
}

fn date_from_parts(year: &Value, month: &Value, day: &Value) -> Value {
    let (Some(year), Some(month), Some(day)) = (year.as_integer(), month.as_integer(), day.as_integer())
    else {
        return Value::Null;
    };
    let (Ok(year), Ok(month), Ok(day)) = (i32::try_from(year), u32::try_from(month), u32::try_from(day))
    else {
        return Value::Null;
    };
    Value::or_null(NaiveDate::from_ymd_opt(year, month, day))
}

fn time(from: &Value, config: &SessionConfig) -> Value {
    match from {
        Value::String(text) => {
            let today = config.clock.today();
            parse_time(text, config.zone_resolver.as_ref(), today).map_or(Value::Null, Value::Time)
        }
        Value::Time(time) => Value::Time(time.clone()),
        Value::DateTime(dt) => Value::Time(FeelTime {
            time: dt.datetime.time(),
            zone: dt.zone.clone(),
        }),
        Value::Date(_) => Value::Time(FeelTime::local(NaiveTime::MIN)),
        _ => Value::Null,
    }
}

/// `time(hour, minute, second[, offset])`; surplus seconds and minutes carry
/// into the next unit and the hour wraps at 24.
fn time_from_parts(args: &Args) -> Value {
    let (Some(hour), Some(minute), Some(second)) = (
        args.scalar(0).as_integer(),
        args.scalar(1).as_integer(),
        args.scalar(2).as_number(),
    ) else {
        return Value::Null;
    };
    let zone = match args.scalar(3) {
        Value::Null => None,
        Value::DayTimeDuration(offset) => {
            let Ok(seconds) = i32::try_from(offset.num_seconds()) else {
                return Value::Null;
            };
            match FixedOffset::east_opt(seconds) {
                Some(offset) => Some(Zone::fixed(offset)),
                None => return Value::Null,
            }
        }
        _ => return Value::Null,
    };
    let whole = second.floor();
    let nanos = ((second - whole) * 1e9).round() as i64;
    let total = (i128::from(hour) * 3600 + i128::from(minute) * 60 + whole as i128).rem_euclid(86_400);
    let Ok(total) = u32::try_from(total) else {
        return Value::Null;
    };
    let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(total, 0) else {
        return Value::Null;
    };
    let time = time.overflowing_add_signed(TimeDelta::nanoseconds(nanos)).0;
    Value::Time(FeelTime { time, zone })
}

fn date_and_time(from: &Value, config: &SessionConfig) -> Value {
    match from {
        Value::String(text) => {
            parse_date_time(text, config.zone_resolver.as_ref()).map_or(Value::Null, Value::DateTime)
        }
        Value::DateTime(dt) => Value::DateTime(dt.clone()),
        Value::Date(date) => Value::DateTime(FeelDateTime::midnight(*date, None)),
        _ => Value::Null,
    }
}

fn combine(date: &Value, time: &Value) -> Value {
    let date = match date {
        Value::Date(date) => *date,
        Value::DateTime(dt) => dt.datetime.date(),
        _ => return Value::Null,
    };
    match time {
        Value::Time(time) => Value::DateTime(FeelDateTime {
            datetime: date.and_time(time.time),
            zone: time.zone.clone(),
        }),
        _ => Value::Null,
    }
}

/// `number(from, grouping separator, decimal separator)`.
fn number(from: &Value, grouping: &Value, decimal: &Value) -> Value {
    let Value::String(text) = from else {
        return Value::Null;
    };
    let grouping = match grouping {
        Value::Null => None,
        Value::String(sep) if matches!(sep.as_str(), " " | "," | ".") => Some(sep.as_str()),
        _ => return Value::Null,
    };
    let decimal = match decimal {
        Value::Null => None,
        Value::String(sep) if matches!(sep.as_str(), "," | ".") => Some(sep.as_str()),
        _ => return Value::Null,
    };
    if grouping.is_some() && grouping == decimal {
        return Value::Null;
    }
    let mut text = text.trim().to_string();
    if let Some(grouping) = grouping {
        text = text.replace(grouping, "");
    }
    if let Some(decimal) = decimal {
        if text.matches(decimal).count() > 1 {
            return Value::Null;
        }
        text = text.replace(decimal, ".");
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    fn call(function: BuiltinFunction, slots: Vec<Option<Value>>) -> Value {
        apply(function, Args::new(function, slots, vec![]), &config()).unwrap()
    }

    fn s(text: &str) -> Option<Value> {
        Some(Value::string(text))
    }

    fn n(x: f64) -> Option<Value> {
        Some(Value::Number(x))
    }

    #[test]
    fn test_date_overloads() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2021, 3, 5).unwrap());
        assert_eq!(call(BuiltinFunction::Date, vec![s("2021-03-05"), None, None]), expected);
        assert_eq!(call(BuiltinFunction::Date, vec![n(2021.0), n(3.0), n(5.0)]), expected);
        assert_eq!(call(BuiltinFunction::Date, vec![n(2021.0), n(2.0), n(30.0)]), Value::Null);
    }

    #[test]
    fn test_date_partial_parts_is_arity_error() {
        let function = BuiltinFunction::Date;
        let args = Args::new(function, vec![n(2021.0), n(3.0), None], vec![]);
        assert!(apply(function, args, &config()).is_err());
    }

    #[test]
    fn test_time_from_parts_with_offset() {
        let offset = parse_duration("PT8H");
        let value = call(BuiltinFunction::Time, vec![n(12.0), n(0.0), n(15.0), offset]);
        let Value::Time(time) = value else { panic!("expected a time") };
        assert_eq!(time.time, NaiveTime::from_hms_opt(12, 0, 15).unwrap());
        assert_eq!(time.zone.unwrap().label(), "UTC+08:00");
    }

    #[test]
    fn test_time_from_parts_carries_overflow() {
        let value = call(BuiltinFunction::Time, vec![n(23.0), n(59.0), n(61.0), None]);
        assert_eq!(value.to_string(), "00:00:01");
    }

    #[test]
    fn test_date_and_time_combines() {
        let date = Some(Value::Date(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()));
        let time = Some(Value::Time(FeelTime {
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            zone: Some(Zone::utc()),
        }));
        let value = call(BuiltinFunction::DateAndTime, vec![date, time]);
        assert_eq!(value.to_string(), "2021-01-02T10:30:00@UTC");
    }

    #[test]
    fn test_number_with_separators() {
        assert_eq!(
            call(BuiltinFunction::Number, vec![s("1 000,5"), s(" "), s(",")]),
            Value::Number(1000.5)
        );
        assert_eq!(call(BuiltinFunction::Number, vec![s("12"), None, None]), Value::Number(12.0));
        assert_eq!(call(BuiltinFunction::Number, vec![s("1,5"), s(","), s(",")]), Value::Null);
        assert_eq!(call(BuiltinFunction::Number, vec![s("abc"), None, None]), Value::Null);
    }

    #[test]
    fn test_string_of_values() {
        assert_eq!(call(BuiltinFunction::String, vec![n(1.1)]), Value::string("1.1"));
        assert_eq!(call(BuiltinFunction::String, vec![Some(Value::Null)]), Value::string("null"));
        assert_eq!(
            call(BuiltinFunction::String, vec![parse_duration("P2D")]),
            Value::string("P2DT0H0M0S")
        );
    }

    #[test]
    fn test_years_and_months_duration() {
        let from = Some(Value::Date(NaiveDate::from_ymd_opt(2011, 12, 22).unwrap()));
        let to = Some(Value::Date(NaiveDate::from_ymd_opt(2013, 8, 24).unwrap()));
        assert_eq!(
            call(BuiltinFunction::YearsAndMonthsDuration, vec![from, to]),
            Value::YearMonthDuration(20)
        );
    }
}
