//! Runtime values.
//!
//! [`Value`] is the closed set of S-FEEL semantic domains. Every evaluated
//! node produces one, and every operator re-checks the domains of its inputs.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta};
use sfeel::{format_number, RangeBound};

// =============================================================================
// Zones and zoned temporal values
// =============================================================================

/// A resolved time zone: a fixed offset, optionally labelled with the region
/// it came from (`Australia/Perth`) or `UTC` for the `Z` designator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Offset east of UTC.
    pub offset: FixedOffset,
    /// Region or `UTC` label.
    pub name: Option<String>,
}

impl Zone {
    /// `Z`.
    pub fn utc() -> Self {
        Self {
            offset: chrono::Utc.fix(),
            name: Some("UTC".to_string()),
        }
    }

    /// A bare `+HH:MM` offset.
    pub fn fixed(offset: FixedOffset) -> Self {
        Self { offset, name: None }
    }

    /// An offset resolved from a region name.
    pub fn named(offset: FixedOffset, name: impl Into<String>) -> Self {
        Self {
            offset,
            name: Some(name.into()),
        }
    }

    /// The `timezone` accessor: the region name, or `UTC±HH:MM`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if self.offset.local_minus_utc() == 0 => "UTC".to_string(),
            None => format!("UTC{}", self.offset),
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "@{}", name),
            None => write!(f, "{}", self.offset),
        }
    }
}

/// A time of day with an optional zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeelTime {
    /// Local wall-clock time.
    pub time: NaiveTime,
    /// Zone, if one was given.
    pub zone: Option<Zone>,
}

impl FeelTime {
    /// Creates a time without zone.
    pub fn local(time: NaiveTime) -> Self {
        Self { time, zone: None }
    }

    /// The time converted to UTC, wrapping around midnight; `time` itself
    /// when unzoned.
    pub fn normalized(&self) -> NaiveTime {
        match &self.zone {
            Some(zone) => {
                let shift = TimeDelta::seconds(i64::from(zone.offset.local_minus_utc()));
                self.time.overflowing_sub_signed(shift).0
            }
            None => self.time,
        }
    }
}

impl std::fmt::Display for FeelTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.time.format("%H:%M:%S%.f"))?;
        if let Some(zone) = &self.zone {
            write!(f, "{}", zone)?;
        }
        Ok(())
    }
}

/// A date and time with an optional zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeelDateTime {
    /// Local wall-clock date-time.
    pub datetime: NaiveDateTime,
    /// Zone, if one was given.
    pub zone: Option<Zone>,
}

impl FeelDateTime {
    /// Creates a date-time without zone.
    pub fn local(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            zone: None,
        }
    }

    /// Midnight at the start of `date`, in `zone`.
    pub fn midnight(date: NaiveDate, zone: Option<Zone>) -> Self {
        Self {
            datetime: date.and_time(NaiveTime::MIN),
            zone,
        }
    }

    /// The instant as a UTC date-time; `datetime` itself when unzoned.
    pub fn normalized(&self) -> NaiveDateTime {
        match &self.zone {
            Some(zone) => {
                self.datetime - TimeDelta::seconds(i64::from(zone.offset.local_minus_utc()))
            }
            None => self.datetime,
        }
    }
}

impl std::fmt::Display for FeelDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%dT%H:%M:%S%.f"))?;
        if let Some(zone) = &self.zone {
            write!(f, "{}", zone)?;
        }
        Ok(())
    }
}

// =============================================================================
// Context
// =============================================================================

/// An ordered string-keyed map with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    entries: Vec<(String, Value)>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Stores `value` under `key`, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Adds a new entry, handing the value back if the key already exists.
    pub fn try_insert(&mut self, key: impl Into<String>, value: Value) -> Result<(), Value> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(value);
        }
        self.entries.push((key, value));
        Ok(())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

// =============================================================================
// Range
// =============================================================================

/// An interval over one comparable domain. `None` endpoints are unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Whether the low endpoint is included.
    pub start: RangeBound,
    /// Low endpoint; `None` is minus infinity.
    pub low: Option<Value>,
    /// High endpoint; `None` is plus infinity.
    pub high: Option<Value>,
    /// Whether the high endpoint is included.
    pub end: RangeBound,
}

impl Range {
    /// Builds a range, or `None` if an endpoint is not an orderable value or
    /// the two endpoints belong to different domains.
    pub fn new(
        start: RangeBound,
        low: Option<Value>,
        high: Option<Value>,
        end: RangeBound,
    ) -> Option<Range> {
        let domains: Vec<Domain> = [&low, &high]
            .into_iter()
            .flatten()
            .map(|v| v.domain().comparison_class())
            .collect();
        if domains.iter().any(|d| !d.is_orderable()) {
            return None;
        }
        if domains.len() == 2 && domains[0] != domains[1] {
            return None;
        }
        if low.is_none() && high.is_none() {
            return None;
        }
        let start = if low.is_some() { start } else { RangeBound::Open };
        let end = if high.is_some() { end } else { RangeBound::Open };
        Some(Range {
            start,
            low,
            high,
            end,
        })
    }

    /// `[p..p]`.
    pub fn point(value: Value) -> Option<Range> {
        Range::new(
            RangeBound::Closed,
            Some(value.clone()),
            Some(value),
            RangeBound::Closed,
        )
    }

    /// The shared endpoint domain, with dates folded into date-times.
    pub fn domain(&self) -> Domain {
        self.low
            .as_ref()
            .or(self.high.as_ref())
            .map_or(Domain::Null, |v| v.domain().comparison_class())
    }

    /// Returns true if the low endpoint is included.
    pub fn start_included(&self) -> bool {
        self.start == RangeBound::Closed
    }

    /// Returns true if the high endpoint is included.
    pub fn end_included(&self) -> bool {
        self.end == RangeBound::Closed
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.start_included() { "[" } else { "(" })?;
        if let Some(low) = &self.low {
            write_element(f, low)?;
        }
        f.write_str("..")?;
        if let Some(high) = &self.high {
            write_element(f, high)?;
        }
        f.write_str(if self.end_included() { "]" } else { ")" })
    }
}

// =============================================================================
// Value
// =============================================================================

/// An S-FEEL runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unknown.
    Null,
    /// `true` / `false`.
    Boolean(bool),
    /// IEEE double.
    Number(f64),
    /// Text.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(FeelTime),
    /// Date and time.
    DateTime(FeelDateTime),
    /// Signed count of months.
    YearMonthDuration(i64),
    /// Signed days, seconds and nanoseconds.
    DayTimeDuration(TimeDelta),
    /// Ordered heterogeneous list.
    List(Vec<Value>),
    /// Ordered key-value map.
    Context(Context),
    /// Interval.
    Range(Box<Range>),
}

/// The semantic domain of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `null`
    Null,
    /// `boolean`
    Boolean,
    /// `number`
    Number,
    /// `string`
    String,
    /// `date`
    Date,
    /// `time`
    Time,
    /// `date and time`
    DateTime,
    /// `years and months duration`
    YearMonthDuration,
    /// `days and time duration`
    DayTimeDuration,
    /// `list`
    List,
    /// `context`
    Context,
    /// `range`
    Range,
}

impl Domain {
    /// The type name as written after `instance of`.
    pub fn name(self) -> &'static str {
        match self {
            Domain::Null => "null",
            Domain::Boolean => "boolean",
            Domain::Number => "number",
            Domain::String => "string",
            Domain::Date => "date",
            Domain::Time => "time",
            Domain::DateTime => "date and time",
            Domain::YearMonthDuration => "years and months duration",
            Domain::DayTimeDuration => "days and time duration",
            Domain::List => "list",
            Domain::Context => "context",
            Domain::Range => "range",
        }
    }

    /// Dates and date-times compare with each other.
    pub fn comparison_class(self) -> Domain {
        match self {
            Domain::Date => Domain::DateTime,
            other => other,
        }
    }

    /// Domains that can appear as range endpoints.
    pub fn is_orderable(self) -> bool {
        matches!(
            self,
            Domain::Number
                | Domain::String
                | Domain::Date
                | Domain::DateTime
                | Domain::Time
                | Domain::YearMonthDuration
                | Domain::DayTimeDuration
        )
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The value's domain.
    pub fn domain(&self) -> Domain {
        match self {
            Value::Null => Domain::Null,
            Value::Boolean(_) => Domain::Boolean,
            Value::Number(_) => Domain::Number,
            Value::String(_) => Domain::String,
            Value::Date(_) => Domain::Date,
            Value::Time(_) => Domain::Time,
            Value::DateTime(_) => Domain::DateTime,
            Value::YearMonthDuration(_) => Domain::YearMonthDuration,
            Value::DayTimeDuration(_) => Domain::DayTimeDuration,
            Value::List(_) => Domain::List,
            Value::Context(_) => Domain::Context,
            Value::Range(_) => Domain::Range,
        }
    }

    /// Returns true for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The number, if this is a whole number that fits an `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
            _ => None,
        }
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Shorthand for a string value.
    pub fn string(text: impl Into<String>) -> Value {
        Value::String(text.into())
    }

    /// Wraps an optional result, mapping `None` to `null`.
    pub fn or_null<T: Into<Value>>(value: Option<T>) -> Value {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Range> for Value {
    fn from(range: Range) -> Self {
        Value::Range(Box::new(range))
    }
}

// =============================================================================
// Display
// =============================================================================

/// Formats a days-and-time duration as `[-]PnDTnHnMnS`.
pub fn format_day_time(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let magnitude = delta.abs();
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let seconds = if nanos == 0 {
        seconds.to_string()
    } else {
        let fraction = format!("{:09}", nanos);
        format!("{}.{}", seconds, fraction.trim_end_matches('0'))
    };
    format!("{}P{}DT{}H{}M{}S", sign, days, hours, minutes, seconds)
}

/// Formats a years-and-months duration as `[-]PnYnM`.
pub fn format_year_month(months: i64) -> String {
    let sign = if months < 0 { "-" } else { "" };
    let magnitude = months.unsigned_abs();
    format!("{}P{}Y{}M", sign, magnitude / 12, magnitude % 12)
}

/// Strings nested in lists, contexts and ranges are quoted.
fn write_element(f: &mut std::fmt::Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::String(s) => write!(f, "\"{}\"", s),
        other => write!(f, "{}", other),
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Value::Time(time) => write!(f, "{}", time),
            Value::DateTime(datetime) => write!(f, "{}", datetime),
            Value::YearMonthDuration(months) => f.write_str(&format_year_month(*months)),
            Value::DayTimeDuration(delta) => f.write_str(&format_day_time(*delta)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_element(f, item)?;
                }
                f.write_str("]")
            }
            Value::Context(context) => {
                f.write_str("{")?;
                for (i, (key, value)) in context.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    write_element(f, value)?;
                }
                f.write_str("}")
            }
            Value::Range(range) => write!(f, "{}", range),
        }
    }
}

// =============================================================================
// Serialization
// =============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_none(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Context(context) => {
                let mut map = serializer.serialize_map(Some(context.len()))?;
                for (key, value) in context.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Range(range) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("start", &range.low.clone().unwrap_or(Value::Null))?;
                map.serialize_entry("end", &range.high.clone().unwrap_or(Value::Null))?;
                map.serialize_entry("start included", &range.start_included())?;
                map.serialize_entry("end included", &range.end_included())?;
                map.end()
            }
            Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_)
            | Value::YearMonthDuration(_)
            | Value::DayTimeDuration(_) => serializer.collect_str(self),
        }
    }
}
