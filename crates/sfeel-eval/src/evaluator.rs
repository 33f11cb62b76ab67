//! Tree-walking evaluator.
//!
//! The evaluator turns a parsed [`Expr`] into a [`Value`]. It never fails:
//! problems that need the caller's attention (undefined names, argument
//! binding errors, duplicate context keys) are collected as diagnostics and
//! the node evaluates to `null`. Domain mismatches silently produce `null`.
//!
//! # Scopes
//!
//! Names resolve innermost first through a scope stack:
//!
//! - the element under test inside a filter (`item`, and the keys of the
//!   element when it is a context),
//! - quantifier variables and `sort` comparator parameters,
//! - the entries already built in an enclosing context literal,
//!
//! and finally the session [`Environment`].

use std::cmp::Ordering;

use sfeel::{ComparisonOperator, Diagnostics, Expr, Iteration, Literal, Quantifier, RangeBound, TypeName};
use tracing::trace;

use crate::arithmetic::{arithmetic, negate};
use crate::coerce::{compare, deep_equals, equals, scalar_ref};
use crate::config::SessionConfig;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::temporal::{delta_seconds, parse_date, parse_date_time, parse_duration, parse_time};
use crate::value::{Context, Domain, Range, Value, Zone};

/// One level of the name-resolution stack.
#[derive(Debug)]
enum Scope {
    /// The current filter element.
    Item(Value),
    /// Named values introduced by a quantifier or comparator.
    Bindings(Vec<(String, Value)>),
    /// A context literal under construction.
    Context(Context),
}

/// Evaluates expressions against one session's environment and settings.
pub(crate) struct Evaluator<'s> {
    env: &'s Environment,
    config: &'s SessionConfig,
    scopes: Vec<Scope>,
    diagnostics: Diagnostics,
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(env: &'s Environment, config: &'s SessionConfig) -> Self {
        Self {
            env,
            config,
            scopes: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub(crate) fn config(&self) -> &'s SessionConfig {
        self.config
    }

    /// Records a diagnostic.
    pub(crate) fn report(&mut self, error: EvalError) {
        self.diagnostics.report(&error);
    }

    pub(crate) fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Runs `f` with `bindings` visible as names.
    pub(crate) fn with_bindings<T>(
        &mut self,
        bindings: Vec<(String, Value)>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.scoped(Scope::Bindings(bindings), f)
    }

    fn scoped<T>(&mut self, scope: Scope, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Evaluates one expression.
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Name(name) => self.lookup(name),
            Expr::Item => self.item(),
            Expr::List(items) => Value::List(items.iter().map(|e| self.evaluate(e)).collect()),
            Expr::Context(entries) => self.context(entries),
            Expr::Range {
                start,
                low,
                high,
                end,
            } => {
                let low = self.evaluate(low);
                let high = self.evaluate(high);
                Value::or_null(Range::new(*start, Some(low), Some(high), *end))
            }
            Expr::UnaryTest { op, operand } => {
                let operand = self.evaluate(operand);
                unary_test_value(*op, operand)
            }
            Expr::Negate(inner) => negate(self.evaluate(inner)),
            Expr::Not(inner) => match scalar_ref(&self.evaluate(inner)) {
                Value::Boolean(b) => Value::Boolean(!b),
                _ => Value::Null,
            },
            Expr::Arithmetic { op, left, right } => {
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                arithmetic(*op, left, right)
            }
            Expr::Comparison { op, left, right } => {
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                Value::or_null(holds(*op, &left, &right))
            }
            Expr::And(left, right) => {
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                Value::or_null(and(truth(&left), truth(&right)))
            }
            Expr::Or(left, right) => {
                let left = self.evaluate(left);
                let right = self.evaluate(right);
                Value::or_null(or(truth(&left), truth(&right)))
            }
            Expr::Between { value, low, high } => {
                let value = self.evaluate(value);
                let low = self.evaluate(low);
                let high = self.evaluate(high);
                Value::or_null(and(
                    holds(ComparisonOperator::GreaterOrEqual, &value, &low),
                    holds(ComparisonOperator::LessOrEqual, &value, &high),
                ))
            }
            Expr::In { value, target } => {
                let value = self.evaluate(value);
                Value::or_null(self.satisfies(&value, target))
            }
            Expr::InList { value, tests } => {
                let value = self.evaluate(value);
                let mut matched = false;
                for alternative in tests {
                    matched |= self.satisfies(&value, alternative) == Some(true);
                }
                Value::Boolean(matched)
            }
            Expr::InstanceOf { value, type_name } => {
                let value = self.evaluate(value);
                Value::Boolean(instance_of(&value, *type_name))
            }
            Expr::Filter { target, condition } => {
                let target = self.evaluate(target);
                self.filter(target, condition)
            }
            Expr::Path { target, name } => {
                let target = self.evaluate(target);
                path(&target, name)
            }
            Expr::Call {
                function,
                arguments,
            } => self.call(*function, arguments),
            Expr::Lambda { .. } => Value::Null,
            Expr::Quantified {
                quantifier,
                iterations,
                condition,
            } => match self.scan(*quantifier, iterations, condition) {
                Ok(()) => Value::Boolean(*quantifier == Quantifier::Every),
                Err(decided) => decided,
            },
        }
    }

    fn literal(&self, literal: &Literal) -> Value {
        let zones = &*self.config.zone_resolver;
        match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::string(s.as_str()),
            Literal::Date(text) => Value::or_null(parse_date(text)),
            Literal::Time(text) => {
                Value::or_null(parse_time(text, zones, self.config.clock.today()).map(Value::Time))
            }
            Literal::DateTime(text) => {
                Value::or_null(parse_date_time(text, zones).map(Value::DateTime))
            }
            Literal::DayTimeDuration(text) | Literal::YearMonthDuration(text) => {
                parse_duration(text).unwrap_or(Value::Null)
            }
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    fn lookup(&mut self, name: &str) -> Value {
        for scope in self.scopes.iter().rev() {
            let found = match scope {
                Scope::Item(Value::Context(context)) | Scope::Context(context) => context.get(name),
                Scope::Item(_) => None,
                Scope::Bindings(bindings) => bindings
                    .iter()
                    .rev()
                    .find(|(bound, _)| bound == name)
                    .map(|(_, value)| value),
            };
            if let Some(value) = found {
                return value.clone();
            }
        }
        match self.env.lookup(name) {
            Some(value) => value.clone(),
            None => {
                trace!(name, "undefined name");
                self.report(EvalError::UndefinedName(name.to_string()));
                Value::Null
            }
        }
    }

    fn item(&mut self) -> Value {
        let current = self.scopes.iter().rev().find_map(|scope| match scope {
            Scope::Item(value) => Some(value.clone()),
            _ => None,
        });
        current.unwrap_or_else(|| {
            self.report(EvalError::UndefinedName("item".to_string()));
            Value::Null
        })
    }

    // =========================================================================
    // Composites
    // =========================================================================

    /// Builds a context literal. Each entry sees the entries before it.
    fn context(&mut self, entries: &[sfeel::ContextEntry]) -> Value {
        self.scopes.push(Scope::Context(Context::new()));
        let mut duplicate = false;
        for entry in entries {
            let value = self.evaluate(&entry.value);
            if let Some(Scope::Context(context)) = self.scopes.last_mut() {
                if context.try_insert(entry.key.as_str(), value).is_err() {
                    duplicate = true;
                    self.diagnostics
                        .report(&EvalError::DuplicateKey(entry.key.clone()));
                }
            }
        }
        match self.scopes.pop() {
            Some(Scope::Context(context)) if !duplicate => Value::Context(context),
            _ => Value::Null,
        }
    }

    /// `target[condition]`.
    fn filter(&mut self, target: Value, condition: &Expr) -> Value {
        let Value::List(items) = target else {
            return Value::Null;
        };

        if !self.is_predicate(&items, condition) {
            return match self.evaluate(condition) {
                Value::Number(n) => index(&items, n),
                Value::Boolean(true) => Value::List(items),
                Value::Boolean(false) => Value::List(Vec::new()),
                _ => Value::Null,
            };
        }

        let mut kept = Vec::new();
        for item in items {
            let verdict = self.scoped(Scope::Item(item.clone()), |ev| match condition {
                Expr::UnaryTest { .. } => Value::or_null(ev.satisfies(&item, condition)),
                _ => ev.evaluate(condition),
            });
            match verdict {
                Value::Boolean(true) => kept.push(item),
                Value::Boolean(false) | Value::Null => {}
                _ => return Value::Null,
            }
        }
        Value::List(kept)
    }

    /// Whether a filter condition is evaluated per element rather than once
    /// as an index or a keep-all flag.
    fn is_predicate(&self, items: &[Value], condition: &Expr) -> bool {
        if matches!(condition, Expr::UnaryTest { .. }) || condition.mentions_item() {
            return true;
        }
        let names = condition.names();
        !names.is_empty()
            && items.iter().any(|item| match item {
                Value::Context(context) => names.iter().any(|name| context.contains_key(name)),
                _ => false,
            })
    }

    /// Runs a quantifier over the cartesian product of its iterations.
    /// `Err` carries the value that decided the scan early.
    fn scan(
        &mut self,
        quantifier: Quantifier,
        iterations: &[Iteration],
        condition: &Expr,
    ) -> Result<(), Value> {
        let Some((first, rest)) = iterations.split_first() else {
            let decisive = quantifier == Quantifier::Some;
            return match self.evaluate(condition) {
                Value::Boolean(b) if b == decisive => Err(Value::Boolean(b)),
                Value::Boolean(_) => Ok(()),
                _ => Err(Value::Null),
            };
        };
        let items = match self.evaluate(&first.source) {
            Value::List(items) => items,
            Value::Null => return Err(Value::Null),
            other => vec![other],
        };
        for item in items {
            self.with_bindings(vec![(first.name.clone(), item)], |ev| {
                ev.scan(quantifier, rest, condition)
            })?;
        }
        Ok(())
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Whether `value` passes the test written as `test`: a unary test, a
    /// range, a list of alternatives, a context to be a subset of, or a plain
    /// value to equal.
    fn satisfies(&mut self, value: &Value, test_expr: &Expr) -> Option<bool> {
        if let Expr::UnaryTest { op, operand } = test_expr {
            let operand = self.evaluate(operand);
            return holds(*op, value, &operand);
        }
        let target = self.evaluate(test_expr);
        member(value, &target)
    }
}

fn member(value: &Value, target: &Value) -> Option<bool> {
    match target {
        Value::Range(range) => range.contains(value),
        Value::List(alternatives) => Some(alternatives.iter().any(|alternative| match alternative {
            Value::Range(range) => range.contains(value) == Some(true),
            other => equals(value, other) == Some(true),
        })),
        Value::Context(superset) => match value {
            Value::Context(subset) => Some(
                subset
                    .iter()
                    .all(|(key, v)| superset.get(key).is_some_and(|w| deep_equals(v, w))),
            ),
            _ => Some(false),
        },
        other => equals(value, other),
    }
}

// =============================================================================
// Operators
// =============================================================================

/// Applies a relational operator; `None` when the operands do not compare.
fn holds(op: ComparisonOperator, left: &Value, right: &Value) -> Option<bool> {
    use ComparisonOperator::*;
    match op {
        Equal => equals(left, right),
        NotEqual => equals(left, right).map(|eq| !eq),
        LessThan => compare(left, right).map(Ordering::is_lt),
        LessOrEqual => compare(left, right).map(Ordering::is_le),
        GreaterThan => compare(left, right).map(Ordering::is_gt),
        GreaterOrEqual => compare(left, right).map(Ordering::is_ge),
    }
}

/// A unary test standing alone is the set of values it admits.
fn unary_test_value(op: ComparisonOperator, operand: Value) -> Value {
    use ComparisonOperator::*;
    let range = match op {
        Equal => return operand,
        NotEqual => return Value::Null,
        LessThan => Range::new(RangeBound::Open, None, Some(operand), RangeBound::Open),
        LessOrEqual => Range::new(RangeBound::Open, None, Some(operand), RangeBound::Closed),
        GreaterThan => Range::new(RangeBound::Open, Some(operand), None, RangeBound::Open),
        GreaterOrEqual => Range::new(RangeBound::Closed, Some(operand), None, RangeBound::Open),
    };
    Value::or_null(range)
}

fn truth(value: &Value) -> Option<bool> {
    scalar_ref(value).as_bool()
}

fn and(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn instance_of(value: &Value, type_name: TypeName) -> bool {
    let expected = match type_name {
        TypeName::Any => return !value.is_null(),
        TypeName::Null => Domain::Null,
        TypeName::Boolean => Domain::Boolean,
        TypeName::Number => Domain::Number,
        TypeName::String => Domain::String,
        TypeName::Date => Domain::Date,
        TypeName::Time => Domain::Time,
        TypeName::DateAndTime => Domain::DateTime,
        TypeName::YearsAndMonthsDuration => Domain::YearMonthDuration,
        TypeName::DaysAndTimeDuration => Domain::DayTimeDuration,
        TypeName::List => Domain::List,
        TypeName::Context => Domain::Context,
        TypeName::Range => Domain::Range,
    };
    value.domain() == expected
}

/// 1-based element access; negative positions count from the end.
fn index(items: &[Value], position: f64) -> Value {
    if position.fract() != 0.0 || position == 0.0 || position.abs() > items.len() as f64 {
        return Value::Null;
    }
    let offset = if position > 0.0 {
        position as usize - 1
    } else {
        items.len() - position.abs() as usize
    };
    items.get(offset).cloned().unwrap_or(Value::Null)
}

// =============================================================================
// Path access
// =============================================================================

/// `value.name`: a context entry, a projection over a list, or a component
/// of a temporal value, duration or range.
fn path(value: &Value, name: &str) -> Value {
    match value {
        Value::Context(context) => context.get(name).cloned().unwrap_or(Value::Null),
        Value::List(items) => Value::List(items.iter().map(|item| path(item, name)).collect()),
        Value::Null => Value::Null,
        other => component(other, &name.replace('_', " ")),
    }
}

fn component(value: &Value, name: &str) -> Value {
    use chrono::Timelike;

    let number = |n: u32| Value::Number(f64::from(n));
    let seconds = |second: u32, nanos: u32| Value::Number(f64::from(second) + f64::from(nanos) / 1e9);
    match (value, name) {
        (Value::Date(d), _) => calendar(d, name),
        (Value::DateTime(dt), "year" | "month" | "day" | "weekday") => calendar(&dt.datetime.date(), name),
        (Value::DateTime(dt), "hour") => number(dt.datetime.hour()),
        (Value::DateTime(dt), "minute") => number(dt.datetime.minute()),
        (Value::DateTime(dt), "second") => seconds(dt.datetime.second(), dt.datetime.nanosecond()),
        (Value::DateTime(dt), _) => zone_component(dt.zone.as_ref(), name),
        (Value::Time(t), "hour") => number(t.time.hour()),
        (Value::Time(t), "minute") => number(t.time.minute()),
        (Value::Time(t), "second") => seconds(t.time.second(), t.time.nanosecond()),
        (Value::Time(t), _) => zone_component(t.zone.as_ref(), name),
        (Value::YearMonthDuration(months), "years") => Value::Number((months / 12) as f64),
        (Value::YearMonthDuration(months), "months") => Value::Number((months % 12) as f64),
        (Value::DayTimeDuration(delta), _) => {
            let total = delta.num_seconds();
            match name {
                "days" => Value::Number((total / 86_400) as f64),
                "hours" => Value::Number(((total % 86_400) / 3_600) as f64),
                "minutes" => Value::Number(((total % 3_600) / 60) as f64),
                "seconds" => Value::Number(delta_seconds(*delta) - (total - total % 60) as f64),
                _ => Value::Null,
            }
        }
        (Value::Range(range), "start") => range.low.clone().unwrap_or(Value::Null),
        (Value::Range(range), "end") => range.high.clone().unwrap_or(Value::Null),
        (Value::Range(range), "start included") => Value::Boolean(range.start_included()),
        (Value::Range(range), "end included") => Value::Boolean(range.end_included()),
        _ => Value::Null,
    }
}

fn calendar(date: &chrono::NaiveDate, name: &str) -> Value {
    use chrono::Datelike;
    let n = match name {
        "year" => date.year() as f64,
        "month" => f64::from(date.month()),
        "day" => f64::from(date.day()),
        "weekday" => f64::from(date.weekday().number_from_monday()),
        _ => return Value::Null,
    };
    Value::Number(n)
}

fn zone_component(zone: Option<&Zone>, name: &str) -> Value {
    match (zone, name) {
        (Some(zone), "timezone") => Value::string(zone.label()),
        (Some(zone), "time offset") => Value::DayTimeDuration(chrono::TimeDelta::seconds(
            i64::from(zone.offset.local_minus_utc()),
        )),
        _ => Value::Null,
    }
}
