//! Calendar functions, the clock, and the numeric encodings of temporal
//! values (`valuet`, `valuedt`, `valuedtd`, `valueymd` and their inverses).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Weekday};
use sfeel::BuiltinFunction;

use super::Args;
use crate::config::SessionConfig;
use crate::temporal::{delta_seconds, seconds_of_day, seconds_to_delta};
use crate::value::{FeelDateTime, FeelTime, Value};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(super) fn apply(function: BuiltinFunction, args: Args, config: &SessionConfig) -> Value {
    let value = args.scalar(0);
    match function {
        BuiltinFunction::Now => Value::DateTime(FeelDateTime::local(config.clock.now())),
        BuiltinFunction::Today => Value::Date(config.clock.today()),
        BuiltinFunction::DayOfYear => {
            date_of(value).map_or(Value::Null, |d| Value::Number(f64::from(d.ordinal())))
        }
        BuiltinFunction::DayOfWeek => {
            date_of(value).map_or(Value::Null, |d| Value::string(weekday_name(d.weekday())))
        }
        BuiltinFunction::MonthOfYear => date_of(value).map_or(Value::Null, |d| {
            Value::string(MONTHS[d.month0() as usize])
        }),
        BuiltinFunction::WeekOfYear => {
            date_of(value).map_or(Value::Null, |d| Value::Number(f64::from(d.iso_week().week())))
        }
        BuiltinFunction::ValueT => match value {
            Value::Time(time) => Value::Number(seconds_of_day(time.time)),
            Value::DateTime(dt) => Value::Number(seconds_of_day(dt.datetime.time())),
            Value::Date(_) => Value::Number(0.0),
            _ => Value::Null,
        },
        BuiltinFunction::ValueTInverse => match value.as_number() {
            Some(n) if n.is_finite() => {
                let seconds = n.rem_euclid(86_400.0);
                let whole = seconds.trunc() as u32;
                let nanos = ((seconds - seconds.trunc()) * 1e9) as u32;
                NaiveTime::from_num_seconds_from_midnight_opt(whole, nanos)
                    .map_or(Value::Null, |t| Value::Time(FeelTime::local(t)))
            }
            _ => Value::Null,
        },
        BuiltinFunction::ValueDt => {
            let instant = match value {
                Value::DateTime(dt) => dt.normalized(),
                Value::Date(date) => FeelDateTime::midnight(*date, None).datetime,
                _ => return Value::Null,
            };
            let utc = instant.and_utc();
            Value::Number(utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1e9)
        }
        BuiltinFunction::ValueDtInverse => match value.as_number() {
            Some(n) if n.is_finite() => {
                let secs = n.floor();
                let nanos = ((n - secs) * 1e9) as u32;
                DateTime::from_timestamp(secs as i64, nanos)
                    .map_or(Value::Null, |dt| Value::DateTime(FeelDateTime::local(dt.naive_utc())))
            }
            _ => Value::Null,
        },
        BuiltinFunction::ValueDtd => match value {
            Value::DayTimeDuration(delta) => Value::Number(delta_seconds(*delta)),
            _ => Value::Null,
        },
        BuiltinFunction::ValueDtdInverse => value
            .as_number()
            .and_then(seconds_to_delta)
            .map_or(Value::Null, Value::DayTimeDuration),
        BuiltinFunction::ValueYmd => match value {
            Value::YearMonthDuration(months) => Value::Number(*months as f64),
            _ => Value::Null,
        },
        BuiltinFunction::ValueYmdInverse => match value.as_number() {
            Some(n) if n.is_finite() && n.abs() < 1e15 => Value::YearMonthDuration(n.trunc() as i64),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

fn date_of(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(date) => Some(*date),
        Value::DateTime(dt) => Some(dt.datetime.date()),
        _ => None,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
