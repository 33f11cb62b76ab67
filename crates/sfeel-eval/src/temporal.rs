//! Date, time and duration support.
//!
//! Parsing accepts the ISO forms produced by the lexer plus a few common
//! free-form variants (`2021/03/05`, `5 Mar 2021`, a space instead of `T`,
//! times without seconds). Zone suffixes are `Z`, `±HH:MM` or `@Region/City`;
//! regions are resolved through a [`ZoneResolver`] at the local date-time
//! they qualify.

use chrono::{Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::traits::ZoneResolver;
use crate::value::{FeelDateTime, FeelTime, Value, Zone};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%d %B %Y", "%b %d %Y", "%B %d %Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

// =============================================================================
// Zones
// =============================================================================

/// A zone suffix as written, before region lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ZoneText<'a> {
    Utc,
    Offset(FixedOffset),
    Region(&'a str),
}

/// Splits `13:15:17+08:00` into the clock text and its zone suffix.
fn split_zone(text: &str) -> Option<(&str, Option<ZoneText<'_>>)> {
    if let Some(at) = text.find('@') {
        let region = text[at + 1..].trim();
        if region.is_empty() {
            return None;
        }
        return Some((text[..at].trim_end(), Some(ZoneText::Region(region))));
    }
    if let Some(clock) = text.strip_suffix(['Z', 'z']) {
        return Some((clock, Some(ZoneText::Utc)));
    }
    match text.rfind(['+', '-']) {
        Some(sign) => {
            let offset = parse_offset(&text[sign..])?;
            Some((&text[..sign], Some(ZoneText::Offset(offset))))
        }
        None => Some((text, None)),
    }
}

/// `+08:00`, `-0530` or `+08`.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, digits) = if let Some(rest) = text.strip_prefix('+') {
        (1, rest)
    } else {
        (-1, text.strip_prefix('-')?)
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn resolve_zone(
    zone: Option<ZoneText<'_>>,
    zones: &dyn ZoneResolver,
    local: NaiveDateTime,
) -> Option<Option<Zone>> {
    match zone {
        None => Some(None),
        Some(ZoneText::Utc) => Some(Some(Zone::utc())),
        Some(ZoneText::Offset(offset)) => Some(Some(Zone::fixed(offset))),
        Some(ZoneText::Region(region)) => {
            let offset = zones.offset_at(region, local)?;
            Some(Some(Zone::named(offset, region)))
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a calendar date.
///
/// ```rust
/// use chrono::NaiveDate;
/// use sfeel_eval::temporal::parse_date;
///
/// assert_eq!(parse_date("2021-03-05"), NaiveDate::from_ymd_opt(2021, 3, 5));
/// assert_eq!(parse_date("5 Mar 2021"), NaiveDate::from_ymd_opt(2021, 3, 5));
/// assert_eq!(parse_date("2021-02-30"), None);
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim().replace(',', "");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

/// Parses a time of day with an optional zone. Region zones are resolved
/// on `today`.
pub fn parse_time(text: &str, zones: &dyn ZoneResolver, today: NaiveDate) -> Option<FeelTime> {
    let (clock, zone) = split_zone(text.trim())?;
    let time = parse_clock(clock)?;
    let zone = resolve_zone(zone, zones, today.and_time(time))?;
    Some(FeelTime { time, zone })
}

/// Parses a date-time; a bare date means midnight.
pub fn parse_date_time(text: &str, zones: &dyn ZoneResolver) -> Option<FeelDateTime> {
    let text = text.trim();
    let Some(split) = date_time_separator(text).or_else(|| date_time_space(text)) else {
        let date = parse_date(text)?;
        return Some(FeelDateTime::midnight(date, None));
    };
    let date = parse_date(&text[..split])?;
    let (clock, zone) = split_zone(text[split + 1..].trim())?;
    let datetime = date.and_time(parse_clock(clock)?);
    let zone = resolve_zone(zone, zones, datetime)?;
    Some(FeelDateTime { datetime, zone })
}

/// The `T` after the day digits of `2021-03-05T12:00`.
fn date_time_separator(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|(i, c)| matches!(c, 'T' | 't') && text[..*i].ends_with(|p: char| p.is_ascii_digit()))
        .map(|(i, _)| i)
}

/// The space between `2021-03-05 12:00`, if the text has that shape.
fn date_time_space(text: &str) -> Option<usize> {
    let space = text.rfind(' ')?;
    text[space + 1..].contains(':').then_some(space)
}

/// Parses an ISO-8601 duration into a days-and-time or years-and-months
/// duration value. Mixing the two families (`P1Y2D`) is rejected.
///
/// ```rust
/// use sfeel_eval::temporal::parse_duration;
/// use sfeel_eval::Value;
///
/// assert_eq!(parse_duration("P1Y2M"), Some(Value::YearMonthDuration(14)));
/// assert_eq!(parse_duration("-P3M"), Some(Value::YearMonthDuration(-3)));
/// assert!(matches!(parse_duration("P1DT2H"), Some(Value::DayTimeDuration(_))));
/// assert_eq!(parse_duration("P1Y2D"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<Value> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let body = body.strip_prefix(['P', 'p'])?;

    let mut months: i64 = 0;
    let mut seconds: f64 = 0.0;
    let (mut calendar, mut clock, mut in_time) = (false, false, false);
    let mut chars = body.char_indices().peekable();
    let mut number_start = None;
    while let Some((i, c)) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            number_start.get_or_insert(i);
            continue;
        }
        if c == 'T' || c == 't' {
            if in_time || number_start.is_some() {
                return None;
            }
            in_time = true;
            if chars.peek().is_none() {
                return None;
            }
            continue;
        }
        let start = number_start.take()?;
        let digits = &body[start..i];
        let unit = c.to_ascii_uppercase();
        if digits.contains('.') && !(in_time && unit == 'S') {
            return None;
        }
        let n: f64 = digits.parse().ok()?;
        match (in_time, unit) {
            (false, 'Y') => {
                months += (n as i64).checked_mul(12)?;
                calendar = true;
            }
            (false, 'M') => {
                months += n as i64;
                calendar = true;
            }
            (false, 'W') => {
                seconds += n * 604_800.0;
                clock = true;
            }
            (false, 'D') => {
                seconds += n * 86_400.0;
                clock = true;
            }
            (true, 'H') => {
                seconds += n * 3_600.0;
                clock = true;
            }
            (true, 'M') => {
                seconds += n * 60.0;
                clock = true;
            }
            (true, 'S') => {
                seconds += n;
                clock = true;
            }
            _ => return None,
        }
    }
    if number_start.is_some() || calendar == clock || (calendar && in_time) {
        return None;
    }
    if calendar {
        return Some(Value::YearMonthDuration(if negative { -months } else { months }));
    }
    let delta = seconds_to_delta(seconds)?;
    Some(Value::DayTimeDuration(if negative { -delta } else { delta }))
}

// =============================================================================
// Calendar arithmetic
// =============================================================================

/// Converts fractional seconds to a duration with nanosecond resolution.
pub fn seconds_to_delta(seconds: f64) -> Option<TimeDelta> {
    if !seconds.is_finite() {
        return None;
    }
    let nanos = (seconds * 1e9).round();
    if nanos.abs() < 9.0e18 {
        Some(TimeDelta::nanoseconds(nanos as i64))
    } else {
        TimeDelta::try_seconds(seconds.trunc() as i64)
    }
}

/// A duration as fractional seconds.
pub fn delta_seconds(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => delta.num_seconds() as f64,
    }
}

/// Adds a signed number of months, clamping the day to the target month.
pub fn add_months(datetime: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        datetime.checked_add_months(magnitude)
    } else {
        datetime.checked_sub_months(magnitude)
    }
}

/// Whole months from `from` to `to`, truncated toward zero.
///
/// ```rust
/// use chrono::NaiveDate;
/// use sfeel_eval::temporal::months_between;
///
/// let from = NaiveDate::from_ymd_opt(2011, 12, 22).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let to = NaiveDate::from_ymd_opt(2013, 8, 24).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(months_between(from, to), 20);
/// assert_eq!(months_between(to, from), -20);
/// ```
pub fn months_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
    let rest = |dt: NaiveDateTime| (dt.day(), dt.num_seconds_from_midnight(), dt.nanosecond());
    if months > 0 && rest(to) < rest(from) {
        months -= 1;
    } else if months < 0 && rest(to) > rest(from) {
        months += 1;
    }
    months
}

/// Seconds since midnight, with fraction.
pub fn seconds_of_day(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) + f64::from(time.nanosecond()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TzDatabase;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
    }

    mod dates_and_times {
        use super::*;

        #[test]
        fn test_free_form_dates() {
            let expected = NaiveDate::from_ymd_opt(2019, 9, 17);
            assert_eq!(parse_date("2019/09/17"), expected);
            assert_eq!(parse_date("17 September 2019"), expected);
            assert_eq!(parse_date("Sep 17, 2019"), expected);
            assert_eq!(parse_date("yesterday"), None);
        }

        #[test]
        fn test_time_with_offset() {
            let time = parse_time("13:15:17-05:00", &TzDatabase, today()).unwrap();
            assert_eq!(time.time, NaiveTime::from_hms_opt(13, 15, 17).unwrap());
            assert_eq!(time.zone.unwrap().offset, FixedOffset::west_opt(5 * 3600).unwrap());
        }

        #[test]
        fn test_time_with_fraction_and_utc() {
            let time = parse_time("08:00:00.25Z", &TzDatabase, today()).unwrap();
            assert_eq!(time.time, NaiveTime::from_hms_milli_opt(8, 0, 0, 250).unwrap());
            assert_eq!(time.zone, Some(Zone::utc()));
        }

        #[test]
        fn test_time_without_seconds() {
            let time = parse_time("09:30", &TzDatabase, today()).unwrap();
            assert_eq!(time.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
            assert!(time.zone.is_none());
        }

        #[test]
        fn test_region_zone() {
            let datetime = parse_date_time("2021-01-01T10:00:00@Australia/Perth", &TzDatabase).unwrap();
            let zone = datetime.zone.unwrap();
            assert_eq!(zone.name.as_deref(), Some("Australia/Perth"));
            assert_eq!(zone.offset.local_minus_utc(), 8 * 3600);
        }

        #[test]
        fn test_unknown_region_fails() {
            assert!(parse_date_time("2021-01-01T10:00:00@Nowhere/Land", &TzDatabase).is_none());
        }

        #[test]
        fn test_space_separated_date_time() {
            let datetime = parse_date_time("2021-03-05 12:30", &TzDatabase).unwrap();
            assert_eq!(datetime.datetime.hour(), 12);
            assert_eq!(datetime.datetime.minute(), 30);
        }

        #[test]
        fn test_date_only_is_midnight() {
            let datetime = parse_date_time("2021-03-05", &TzDatabase).unwrap();
            assert_eq!(datetime.datetime.time(), NaiveTime::MIN);
        }
    }

    mod durations {
        use super::*;

        #[test]
        fn test_day_time() {
            let Some(Value::DayTimeDuration(delta)) = parse_duration("P1DT2H3M4.5S") else {
                panic!("expected a days and time duration");
            };
            assert_eq!(delta, TimeDelta::milliseconds(93_784_500));
        }

        #[test]
        fn test_negative_day_time() {
            assert_eq!(
                parse_duration("-PT90M"),
                Some(Value::DayTimeDuration(-TimeDelta::minutes(90)))
            );
        }

        #[test]
        fn test_rejects_malformed() {
            assert_eq!(parse_duration("P"), None);
            assert_eq!(parse_duration("P1DT"), None);
            assert_eq!(parse_duration("PT1.5H"), None);
            assert_eq!(parse_duration("1D"), None);
            assert_eq!(parse_duration("P1Y1S"), None);
        }
    }

    mod arithmetic {
        use super::*;

        fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap()
        }

        #[test]
        fn test_add_months_clamps() {
            assert_eq!(add_months(at(2021, 1, 31), 1), Some(at(2021, 2, 28)));
            assert_eq!(add_months(at(2020, 1, 31), 1), Some(at(2020, 2, 29)));
            assert_eq!(add_months(at(2021, 3, 31), -1), Some(at(2021, 2, 28)));
        }

        #[test]
        fn test_months_between_partial_month() {
            assert_eq!(months_between(at(2021, 1, 15), at(2021, 2, 14)), 0);
            assert_eq!(months_between(at(2021, 1, 15), at(2021, 2, 15)), 1);
            assert_eq!(months_between(at(2021, 2, 15), at(2021, 1, 16)), 0);
        }

        #[test]
        fn test_seconds_round_trip() {
            let delta = seconds_to_delta(-1.5).unwrap();
            assert_eq!(delta, -TimeDelta::milliseconds(1500));
            assert_eq!(delta_seconds(delta), -1.5);
        }
    }
}
