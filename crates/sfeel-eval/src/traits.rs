//! External collaborators consumed by the evaluator.
//!
//! The evaluator never reads the system clock or the time zone database
//! directly. It goes through [`Clock`] and [`ZoneResolver`], so embedders can
//! pin `now()`/`today()` in tests or swap the zone source.
//!
//! # Example: a fixed clock
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sfeel_eval::{Clock, FixedClock};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 2, 29)
//!     .and_then(|d| d.and_hms_opt(9, 30, 0))
//!     .unwrap();
//! let clock = FixedClock::new(now);
//! assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
//! ```

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone};

// =============================================================================
// Clock
// =============================================================================

/// Source of the current local date and time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current local date-time, without zone.
    fn now(&self) -> NaiveDateTime;

    /// The current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The machine clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    /// Creates a clock that always reports `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

// =============================================================================
// Zone resolution
// =============================================================================

/// Resolves region names such as `Australia/Perth` to a UTC offset.
pub trait ZoneResolver: Send + Sync + std::fmt::Debug {
    /// The offset in force in `region` at the given local date-time, or
    /// `None` if the region is unknown.
    fn offset_at(&self, region: &str, local: NaiveDateTime) -> Option<FixedOffset>;
}

/// Zone resolver backed by the IANA time zone database.
#[derive(Debug, Clone, Copy, Default)]
pub struct TzDatabase;

impl ZoneResolver for TzDatabase {
    fn offset_at(&self, region: &str, local: NaiveDateTime) -> Option<FixedOffset> {
        let tz: chrono_tz::Tz = region.parse().ok()?;
        match tz.offset_from_local_datetime(&local).earliest() {
            Some(offset) => Some(offset.fix()),
            // Local time inside a DST gap; use the offset at that UTC instant.
            None => Some(tz.offset_from_utc_datetime(&local).fix()),
        }
    }
}
