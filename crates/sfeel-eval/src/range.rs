//! Range membership and Allen's interval relations.
//!
//! Every relation works on two intervals. A scalar argument is first turned
//! into the degenerate closed range `[p..p]`, then the relation is decided
//! from endpoint comparisons alone. Unbounded endpoints compare below (low)
//! or above (high) every bounded value, so an unbounded side never meets or
//! sits inside a bounded one.
//!
//! Relations answer `false`, not `null`, when the endpoints of the two
//! arguments belong to different domains.

use std::cmp::Ordering;

use sfeel::{BuiltinFunction, RangeBound};

use crate::coerce::{compare, scalar_ref};
use crate::value::{Range, Value};

// =============================================================================
// Membership
// =============================================================================

impl Range {
    /// Tests whether `value` lies inside the range; `None` when it cannot be
    /// compared with the endpoints.
    pub fn contains(&self, value: &Value) -> Option<bool> {
        let value = scalar_ref(value);
        if let Some(low) = &self.low {
            let ordering = compare(value, low)?;
            let inside = match self.start {
                RangeBound::Closed => ordering != Ordering::Less,
                RangeBound::Open => ordering == Ordering::Greater,
            };
            if !inside {
                return Some(false);
            }
        }
        if let Some(high) = &self.high {
            let ordering = compare(value, high)?;
            let inside = match self.end {
                RangeBound::Closed => ordering != Ordering::Greater,
                RangeBound::Open => ordering == Ordering::Less,
            };
            if !inside {
                return Some(false);
            }
        }
        Some(true)
    }
}

// =============================================================================
// Endpoints
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Endpoint<'a> {
    NegativeInfinity,
    At(&'a Value),
    PositiveInfinity,
}

impl Endpoint<'_> {
    fn cmp(self, other: Endpoint<'_>) -> Option<Ordering> {
        use Endpoint::*;
        match (self, other) {
            (NegativeInfinity, NegativeInfinity) | (PositiveInfinity, PositiveInfinity) => {
                Some(Ordering::Equal)
            }
            (NegativeInfinity, _) | (_, PositiveInfinity) => Some(Ordering::Less),
            (PositiveInfinity, _) | (_, NegativeInfinity) => Some(Ordering::Greater),
            (At(a), At(b)) => compare(a, b),
        }
    }
}

/// An interval view of a range or a point.
#[derive(Debug, Clone, Copy)]
struct Interval<'a> {
    low: Endpoint<'a>,
    low_closed: bool,
    high: Endpoint<'a>,
    high_closed: bool,
}

impl<'a> Interval<'a> {
    fn of(value: &'a Value) -> Option<Interval<'a>> {
        match scalar_ref(value) {
            Value::Range(range) => Some(Interval {
                low: range.low.as_ref().map_or(Endpoint::NegativeInfinity, Endpoint::At),
                low_closed: range.start_included(),
                high: range.high.as_ref().map_or(Endpoint::PositiveInfinity, Endpoint::At),
                high_closed: range.end_included(),
            }),
            point if point.domain().is_orderable() => Some(Interval {
                low: Endpoint::At(point),
                low_closed: true,
                high: Endpoint::At(point),
                high_closed: true,
            }),
            _ => None,
        }
    }

    fn endpoints(&self) -> impl Iterator<Item = &'a Value> {
        [self.low, self.high].into_iter().filter_map(|e| match e {
            Endpoint::At(v) => Some(v),
            _ => None,
        })
    }
}

/// Endpoint comparisons that treat an incomparable pair as a failed check.
struct Relation;

impl Relation {
    fn lt(a: Endpoint<'_>, b: Endpoint<'_>) -> bool {
        a.cmp(b) == Some(Ordering::Less)
    }

    fn gt(a: Endpoint<'_>, b: Endpoint<'_>) -> bool {
        a.cmp(b) == Some(Ordering::Greater)
    }

    fn eq(a: Endpoint<'_>, b: Endpoint<'_>) -> bool {
        a.cmp(b) == Some(Ordering::Equal)
    }
}

fn before(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    Relation::lt(a.high, b.low) || (Relation::eq(a.high, b.low) && !(a.high_closed && b.low_closed))
}

fn meets(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    a.high_closed && b.low_closed && Relation::eq(a.high, b.low)
}

fn overlaps(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    let reaches = Relation::gt(a.high, b.low)
        || (Relation::eq(a.high, b.low) && a.high_closed && b.low_closed);
    let starts_in_time = Relation::lt(a.low, b.high)
        || (Relation::eq(a.low, b.high) && a.low_closed && b.high_closed);
    reaches && starts_in_time
}

fn overlaps_before(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    let starts_first = Relation::lt(a.low, b.low)
        || (Relation::eq(a.low, b.low) && a.low_closed && !b.low_closed);
    let reaches = Relation::gt(a.high, b.low)
        || (Relation::eq(a.high, b.low) && a.high_closed && b.low_closed);
    let ends_first = Relation::lt(a.high, b.high)
        || (Relation::eq(a.high, b.high) && (!a.high_closed || b.high_closed));
    starts_first && reaches && ends_first
}

fn finishes(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    a.high_closed == b.high_closed
        && Relation::eq(a.high, b.high)
        && (Relation::gt(a.low, b.low)
            || (Relation::eq(a.low, b.low) && (!a.low_closed || b.low_closed)))
}

fn includes(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    let low_ok = Relation::lt(a.low, b.low)
        || (Relation::eq(a.low, b.low) && (a.low_closed || !b.low_closed));
    let high_ok = Relation::gt(a.high, b.high)
        || (Relation::eq(a.high, b.high) && (a.high_closed || !b.high_closed));
    low_ok && high_ok
}

fn starts(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    a.low_closed == b.low_closed
        && Relation::eq(a.low, b.low)
        && (Relation::lt(a.high, b.high)
            || (Relation::eq(a.high, b.high) && (!a.high_closed || b.high_closed)))
}

fn coincides(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    a.low_closed == b.low_closed
        && a.high_closed == b.high_closed
        && Relation::eq(a.low, b.low)
        && Relation::eq(a.high, b.high)
}

/// Decides one of the fourteen interval relations between two points or
/// ranges. Returns `None` for functions that are not range relations.
///
/// ```rust
/// use sfeel::{BuiltinFunction, RangeBound};
/// use sfeel_eval::{range::relate, Range, Value};
///
/// let range = |start, low: f64, high: f64, end| {
///     Value::from(Range::new(start, Some(Value::Number(low)), Some(Value::Number(high)), end).unwrap())
/// };
/// let a = range(RangeBound::Closed, 1.0, 5.0, RangeBound::Closed);
/// let b = range(RangeBound::Closed, 5.0, 8.0, RangeBound::Closed);
/// assert_eq!(relate(BuiltinFunction::Overlaps, &a, &b), Some(true));
/// assert_eq!(relate(BuiltinFunction::Before, &Value::Number(1.0), &b), Some(true));
/// ```
pub fn relate(function: BuiltinFunction, left: &Value, right: &Value) -> Option<bool> {
    if !function.is_range_relation() {
        return None;
    }
    let (Some(a), Some(b)) = (Interval::of(left), Interval::of(right)) else {
        return Some(false);
    };
    if !same_domain(&a, &b) {
        return Some(false);
    }
    let (a, b) = (&a, &b);
    Some(match function {
        BuiltinFunction::Before => before(a, b),
        BuiltinFunction::After => before(b, a),
        BuiltinFunction::Meets => meets(a, b),
        BuiltinFunction::MetBy => meets(b, a),
        BuiltinFunction::Overlaps => overlaps(a, b),
        BuiltinFunction::OverlapsBefore => overlaps_before(a, b),
        BuiltinFunction::OverlapsAfter => overlaps_before(b, a),
        BuiltinFunction::Finishes => finishes(a, b),
        BuiltinFunction::FinishedBy => finishes(b, a),
        BuiltinFunction::Includes => includes(a, b),
        BuiltinFunction::During => includes(b, a),
        BuiltinFunction::Starts => starts(a, b),
        BuiltinFunction::StartedBy => starts(b, a),
        BuiltinFunction::Coincides => coincides(a, b),
        _ => return None,
    })
}

fn same_domain(a: &Interval<'_>, b: &Interval<'_>) -> bool {
    let mut domains = a
        .endpoints()
        .chain(b.endpoints())
        .map(|v| v.domain().comparison_class());
    match domains.next() {
        Some(first) => domains.all(|d| d == first),
        None => true,
    }
}
