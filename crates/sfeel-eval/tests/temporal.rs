//! Integration tests for dates, times, durations and the session clock.

use std::sync::Arc;

use chrono::NaiveDate;
use sfeel_eval::{FixedClock, Session, SessionConfig};

/// A session whose clock reads Thursday 2024-02-29 09:30:00.
fn session() -> Session {
    let now = NaiveDate::from_ymd_opt(2024, 2, 29)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .expect("valid timestamp");
    let config = SessionConfig::builder()
        .with_clock(Arc::new(FixedClock::new(now)))
        .build();
    Session::with_config(config)
}

fn eval(text: &str) -> String {
    let (diagnostics, value) = session().parse(text);
    assert!(diagnostics.is_empty(), "{text}: {diagnostics:?}");
    value.expect("a value").to_string()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_date_construction() {
    assert_eq!(eval("date(\"2021-03-05\")"), "2021-03-05");
    assert_eq!(eval("date(2021, 3, 5)"), "2021-03-05");
    assert_eq!(eval("date(date and time(\"2021-03-05T10:00:00\"))"), "2021-03-05");
    assert_eq!(eval("2021-03-05"), "2021-03-05");
}

#[test]
fn test_invalid_dates_are_null() {
    assert_eq!(eval("date(\"2019-02-30\")"), "null");
    assert_eq!(eval("date(2021, 2, 30)"), "null");
    assert_eq!(eval("date(\"soon\")"), "null");
}

#[test]
fn test_time_construction() {
    assert_eq!(eval("time(\"10:20:30\")"), "10:20:30");
    assert_eq!(eval("time(10, 20, 30)"), "10:20:30");
    assert_eq!(eval("time(\"10:20:30+02:00\")"), "10:20:30+02:00");
    assert_eq!(eval("time(23, 59, 61)"), "00:00:01");
}

#[test]
fn test_date_and_time_construction() {
    assert_eq!(
        eval("date and time(\"2019-09-17T10:00:00\")"),
        "2019-09-17T10:00:00"
    );
    assert_eq!(
        eval("date and time(date(\"2019-09-17\"), time(\"10:00:00\"))"),
        "2019-09-17T10:00:00"
    );
    assert_eq!(
        eval("2019-09-17T10:00:00@Europe/Paris"),
        "2019-09-17T10:00:00@Europe/Paris"
    );
}

#[test]
fn test_at_string_literals() {
    assert_eq!(eval("@\"2019-09-17\""), "2019-09-17");
    assert_eq!(eval("@\"P1D\""), "P1DT0H0M0S");
    assert_eq!(eval("@\"not a date\""), "not a date");
}

#[test]
fn test_durations() {
    assert_eq!(eval("duration(\"P1D\")"), "P1DT0H0M0S");
    assert_eq!(eval("duration(\"PT36H\")"), "P1DT12H0M0S");
    assert_eq!(eval("duration(\"P14M\")"), "P1Y2M");
    assert_eq!(eval("duration(\"P1Y1S\")"), "null");
    assert_eq!(eval("string(duration(\"P1DT2H\"))"), "P1DT2H0M0S");
    assert_eq!(
        eval("years and months duration(date(\"2011-12-22\"), date(\"2013-08-24\"))"),
        "P1Y8M"
    );
}

// ============================================================================
// Arithmetic and comparison
// ============================================================================

#[test]
fn test_date_arithmetic() {
    assert_eq!(eval("date(\"2024-01-31\") + duration(\"P1M\")"), "2024-02-29");
    assert_eq!(eval("date(\"2021-03-01\") - date(\"2021-02-01\")"), "P28DT0H0M0S");
    assert_eq!(eval("date(\"2021-01-01\") + duration(\"P2D\")"), "2021-01-03");
}

#[test]
fn test_date_time_arithmetic() {
    assert_eq!(
        eval("date and time(\"2021-01-01T23:00:00\") + duration(\"PT2H\")"),
        "2021-01-02T01:00:00"
    );
    assert_eq!(
        eval("date and time(\"2021-01-02T01:00:00\") - date and time(\"2021-01-01T23:00:00\")"),
        "P0DT2H0M0S"
    );
}

#[test]
fn test_time_arithmetic_wraps() {
    assert_eq!(eval("time(\"23:00:00\") + duration(\"PT2H\")"), "01:00:00");
    assert_eq!(eval("time(\"11:00:00\") - time(\"10:30:00\")"), "P0DT0H30M0S");
}

#[test]
fn test_duration_arithmetic() {
    assert_eq!(eval("duration(\"P1Y\") + duration(\"P2M\")"), "P1Y2M");
    assert_eq!(eval("duration(\"PT1H\") * 3"), "P0DT3H0M0S");
    assert_eq!(eval("duration(\"P1Y\") + duration(\"P1D\")"), "null");
}

#[test]
fn test_temporal_comparison() {
    assert_eq!(eval("date(\"2021-01-01\") < date(\"2021-01-02\")"), "true");
    assert_eq!(eval("time(\"10:00:00+01:00\") = time(\"09:00:00Z\")"), "true");
    assert_eq!(eval("time(\"10:00:00\") < time(\"11:00:00+01:00\")"), "null");
    assert_eq!(
        eval("date(\"2021-01-01\") < date and time(\"2021-01-01T12:00:00\")"),
        "true"
    );
}

// ============================================================================
// Accessors and calendar functions
// ============================================================================

#[test]
fn test_accessors() {
    assert_eq!(eval("date(\"2019-09-17\").month"), "9");
    assert_eq!(eval("date(\"2019-09-17\").weekday"), "2");
    assert_eq!(eval("time(\"10:20:30\").minute"), "20");
    assert_eq!(eval("2019-09-17T10:00:00@Europe/Paris.time offset"), "P0DT2H0M0S");
    assert_eq!(eval("2019-09-17T10:00:00@Europe/Paris.timezone"), "Europe/Paris");
    assert_eq!(eval("duration(\"P2Y3M\").years"), "2");
    assert_eq!(eval("duration(\"P1DT2H3M4S\").minutes"), "3");
}

#[test]
fn test_calendar_functions() {
    assert_eq!(eval("day of year(date(\"2019-09-17\"))"), "260");
    assert_eq!(eval("day of week(date(\"2019-09-17\"))"), "Tuesday");
    assert_eq!(eval("month of year(date(\"2019-09-17\"))"), "September");
    assert_eq!(eval("week of year(date(\"2019-09-17\"))"), "38");
}

#[test]
fn test_clock_functions() {
    assert_eq!(eval("today()"), "2024-02-29");
    assert_eq!(eval("now()"), "2024-02-29T09:30:00");
    assert_eq!(eval("day of week(today())"), "Thursday");
    assert_eq!(eval("today() - date(\"2024-01-01\")"), "P59DT0H0M0S");
}

#[test]
fn test_numeric_encodings() {
    assert_eq!(eval("valuet(time(\"01:02:03\"))"), "3723");
    assert_eq!(eval("valuet-1(3723)"), "01:02:03");
    assert_eq!(eval("valuedtd(duration(\"PT90M\"))"), "5400");
    assert_eq!(eval("valueymd(duration(\"P1Y2M\"))"), "14");
    assert_eq!(eval("valueymd-1(14)"), "P1Y2M");
}
