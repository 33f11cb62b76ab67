//! The builtin function library.
//!
//! A call goes through three steps:
//!
//! 1. **Binding**: positional and `name: value` arguments are matched to the
//!    function's parameter [`Signature`]. Unknown keywords, parameters bound
//!    twice and missing or surplus arguments are reported as diagnostics and
//!    the call evaluates to `null`.
//! 2. **Evaluation**: bound argument expressions are evaluated in order.
//!    `sort` keeps its comparator unevaluated and `get value` reads a bare
//!    name key literally.
//! 3. **Application**: the function checks the domains of its arguments and
//!    answers `null` for anything it cannot handle.
//!
//! Overloads such as `date(from)` / `date(year, month, day)` share one
//! signature whose first slot answers to either parameter name.

mod context;
mod conversion;
mod interval;
mod list;
mod logic;
mod numeric;
mod string;
mod temporal;

use sfeel::{Argument, BuiltinFunction, Expr};
use tracing::trace;

use crate::coerce::scalar_ref;
use crate::config::SessionConfig;
use crate::error::{EvalError, EvalResult};
use crate::evaluator::Evaluator;
use crate::value::Value;

static NULL: Value = Value::Null;

// =============================================================================
// Signatures
// =============================================================================

/// Parameter schema of a builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Signature {
    /// Accepted names per parameter slot.
    pub params: &'static [&'static [&'static str]],
    /// Number of leading slots that must be bound.
    pub required: usize,
    /// Whether surplus positional arguments are collected.
    pub variadic: bool,
}

const fn fixed(params: &'static [&'static [&'static str]], required: usize) -> Signature {
    Signature {
        params,
        required,
        variadic: false,
    }
}

const fn variadic(params: &'static [&'static [&'static str]], required: usize) -> Signature {
    Signature {
        params,
        required,
        variadic: true,
    }
}

const LIST: &[&[&str]] = &[&["list"]];
const STRING: &[&[&str]] = &[&["string"]];
const STRING_MATCH: &[&[&str]] = &[&["string"], &["match"]];
const N: &[&[&str]] = &[&["n"]];
const NUMBER: &[&[&str]] = &[&["number"]];
const DATE: &[&[&str]] = &[&["date"]];
const FROM: &[&[&str]] = &[&["from"]];
const RELATION: &[&[&str]] = &[
    &["point1", "range1", "point", "range"],
    &["point2", "range2", "point", "range"],
];

/// Returns the parameter schema of `function`.
pub(crate) fn signature(function: BuiltinFunction) -> Signature {
    use BuiltinFunction::*;
    match function {
        Date => fixed(&[&["from", "year"], &["month"], &["day"]], 1),
        Time => fixed(&[&["from", "hour"], &["minute"], &["second"], &["offset"]], 1),
        DateAndTime => fixed(&[&["from", "date"], &["time"]], 1),
        Number => fixed(
            &[&["from"], &["grouping separator"], &["decimal separator"]],
            1,
        ),
        String | Duration => fixed(FROM, 1),
        YearsAndMonthsDuration => fixed(&[&["from"], &["to"]], 2),

        Not => fixed(&[&["negand"]], 1),
        All | Any => variadic(LIST, 1),

        Substring => fixed(&[&["string"], &["start position"], &["length"]], 2),
        StringLength | UpperCase | LowerCase => fixed(STRING, 1),
        SubstringBefore | SubstringAfter | Contains | StartsWith | EndsWith => {
            fixed(STRING_MATCH, 2)
        }
        Replace => fixed(&[&["input"], &["pattern"], &["replacement"], &["flags"]], 3),
        Matches => fixed(&[&["input"], &["pattern"], &["flags"]], 2),
        Split => fixed(&[&["string"], &["delimiter"]], 2),

        ListContains => fixed(&[&["list"], &["element"]], 2),
        Count | Reverse | DistinctValues | Flatten => fixed(LIST, 1),
        Min | Max | Sum | Mean | Product | Median | Stddev | Mode => variadic(LIST, 1),
        Concatenate | Union => variadic(LIST, 0),
        Sublist => fixed(&[&["list"], &["start position"], &["length"]], 2),
        Append => variadic(&[&["list"], &["item"]], 1),
        InsertBefore => fixed(&[&["list"], &["position"], &["newItem"]], 3),
        Remove => fixed(&[&["list"], &["position"]], 2),
        IndexOf => fixed(&[&["list"], &["match"]], 2),
        Sort => fixed(&[&["list"], &["precedes"]], 1),

        Decimal => fixed(&[&["n"], &["scale"]], 2),
        Floor | Ceiling | Abs => fixed(N, 1),
        Modulo => fixed(&[&["dividend"], &["divisor"]], 2),
        Sqrt | Log | Exp | Odd | Even => fixed(NUMBER, 1),

        DayOfYear | DayOfWeek | MonthOfYear | WeekOfYear => fixed(DATE, 1),
        Now | Today => fixed(&[], 0),

        GetValue => fixed(&[&["m"], &["key"]], 2),
        GetEntries => fixed(&[&["m"]], 1),

        Is => fixed(&[&["value1"], &["value2"]], 2),

        Before | After | Meets | MetBy | Overlaps | OverlapsBefore | OverlapsAfter | Finishes
        | FinishedBy | Includes | During | Starts | StartedBy | Coincides => fixed(RELATION, 2),

        ValueT => fixed(&[&["time"]], 1),
        ValueDt => fixed(&[&["date and time"]], 1),
        ValueDtd | ValueYmd => fixed(&[&["duration"]], 1),
        ValueTInverse | ValueDtInverse | ValueDtdInverse | ValueYmdInverse => fixed(NUMBER, 1),
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Argument expressions matched to parameter slots.
#[derive(Debug)]
pub(crate) struct Bound<'e> {
    pub slots: Vec<Option<&'e Expr>>,
    pub rest: Vec<&'e Expr>,
}

fn normalize_keyword(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Matches call arguments to the parameters of `function`.
pub(crate) fn bind(function: BuiltinFunction, arguments: &[Argument]) -> EvalResult<Bound<'_>> {
    let signature = signature(function);
    let name = function.name();
    let mut slots: Vec<Option<&Expr>> = vec![None; signature.params.len()];
    let mut rest = Vec::new();
    let mut position = 0;

    for argument in arguments {
        match argument {
            Argument::Positional(value) => {
                if position < slots.len() {
                    if slots[position].is_some() {
                        return Err(EvalError::DuplicateParameter {
                            name: signature.params[position][0].to_string(),
                            function: name.to_string(),
                        });
                    }
                    slots[position] = Some(value);
                } else if signature.variadic {
                    rest.push(value);
                } else {
                    return Err(EvalError::Arity(name.to_string()));
                }
                position += 1;
            }
            Argument::Named { name: keyword, value } => {
                let keyword = normalize_keyword(keyword);
                let mut matching = signature
                    .params
                    .iter()
                    .enumerate()
                    .filter(|(_, aliases)| aliases.contains(&keyword.as_str()))
                    .map(|(index, _)| index)
                    .peekable();
                if matching.peek().is_none() {
                    return Err(EvalError::UnknownParameter {
                        name: keyword,
                        function: name.to_string(),
                    });
                }
                match matching.find(|index| slots[*index].is_none()) {
                    Some(index) => slots[index] = Some(value),
                    None => {
                        return Err(EvalError::DuplicateParameter {
                            name: keyword,
                            function: name.to_string(),
                        })
                    }
                }
            }
        }
    }

    if slots[..signature.required].iter().any(Option::is_none) {
        return Err(EvalError::Arity(name.to_string()));
    }
    Ok(Bound { slots, rest })
}

// =============================================================================
// Evaluated arguments
// =============================================================================

/// Evaluated arguments of one call.
#[derive(Debug)]
pub(crate) struct Args {
    function: BuiltinFunction,
    slots: Vec<Option<Value>>,
    rest: Vec<Value>,
}

impl Args {
    pub(crate) fn new(function: BuiltinFunction, slots: Vec<Option<Value>>, rest: Vec<Value>) -> Self {
        Self {
            function,
            slots,
            rest,
        }
    }

    /// The value bound to slot `index`, `null` when unbound.
    pub(crate) fn get(&self, index: usize) -> &Value {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .unwrap_or(&NULL)
    }

    /// Like [`get`](Self::get), with a one-element list unwrapped.
    pub(crate) fn scalar(&self, index: usize) -> &Value {
        scalar_ref(self.get(index))
    }

    /// Moves the value out of slot `index`.
    pub(crate) fn take(&mut self, index: usize) -> Value {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .unwrap_or(Value::Null)
    }

    /// Returns true if slot `index` was bound, even to `null`.
    pub(crate) fn given(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    /// Surplus positional arguments.
    pub(crate) fn rest(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.rest)
    }

    /// The items of a variadic aggregate: one list argument, or every
    /// positional argument.
    pub(crate) fn items(mut self) -> Vec<Value> {
        if self.rest.is_empty() {
            if !self.given(0) {
                return Vec::new();
            }
            return match self.take(0) {
                Value::List(items) => items,
                single => vec![single],
            };
        }
        let mut items = Vec::with_capacity(self.rest.len() + 1);
        if let Some(Some(first)) = self.slots.first_mut().map(Option::take) {
            items.push(first);
        }
        items.append(&mut self.rest);
        items
    }

    /// Every positional argument as written, for functions whose arguments
    /// are themselves lists.
    pub(crate) fn all(mut self) -> Vec<Value> {
        let mut values: Vec<Value> = self.slots.iter_mut().filter_map(Option::take).collect();
        values.append(&mut self.rest);
        values
    }

    /// An arity error for this call.
    pub(crate) fn arity_error(&self) -> EvalError {
        EvalError::Arity(self.function.name().to_string())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

impl Evaluator<'_> {
    /// Evaluates a builtin call.
    pub(crate) fn call(&mut self, function: BuiltinFunction, arguments: &[Argument]) -> Value {
        let bound = match bind(function, arguments) {
            Ok(bound) => bound,
            Err(error) => {
                trace!(function = function.name(), %error, "argument binding failed");
                self.report(error);
                return Value::Null;
            }
        };

        match function {
            BuiltinFunction::Sort => return list::sort(self, bound),
            BuiltinFunction::GetValue => return context::get_value(self, bound),
            _ => {}
        }

        let slots = bound
            .slots
            .iter()
            .map(|slot| slot.map(|expr| self.evaluate(expr)))
            .collect();
        let rest = bound.rest.iter().map(|expr| self.evaluate(expr)).collect();
        let args = Args::new(function, slots, rest);

        match apply(function, args, self.config()) {
            Ok(value) => value,
            Err(error) => {
                self.report(error);
                Value::Null
            }
        }
    }
}

/// Applies `function` to already evaluated arguments.
pub(crate) fn apply(function: BuiltinFunction, args: Args, config: &SessionConfig) -> EvalResult<Value> {
    use BuiltinFunction::*;
    match function {
        Date | Time | DateAndTime | Number | String | Duration | YearsAndMonthsDuration => {
            conversion::apply(function, args, config)
        }
        Not | All | Any | Is => Ok(logic::apply(function, args)),
        Substring | StringLength | UpperCase | LowerCase | SubstringBefore | SubstringAfter
        | Replace | Contains | StartsWith | EndsWith | Matches | Split => {
            string::apply(function, args, config)
        }
        ListContains | Count | Min | Max | Sum | Mean | Sublist | Append | Concatenate
        | InsertBefore | Remove | Reverse | IndexOf | Union | DistinctValues | Flatten | Product
        | Median | Stddev | Mode | Sort => Ok(list::apply(function, args)),
        Decimal | Floor | Ceiling | Abs | Modulo | Sqrt | Log | Exp | Odd | Even => {
            Ok(numeric::apply(function, args))
        }
        DayOfYear | DayOfWeek | MonthOfYear | WeekOfYear | Now | Today | ValueT | ValueTInverse
        | ValueDt | ValueDtInverse | ValueDtd | ValueDtdInverse | ValueYmd | ValueYmdInverse => {
            Ok(temporal::apply(function, args, config))
        }
        GetValue | GetEntries => Ok(context::apply(function, args)),
        Before | After | Meets | MetBy | Overlaps | OverlapsBefore | OverlapsAfter | Finishes
        | FinishedBy | Includes | During | Starts | StartedBy | Coincides => {
            Ok(interval::apply(function, &args))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(n: f64) -> Argument {
        Argument::Positional(Expr::number(n))
    }

    fn named(name: &str, n: f64) -> Argument {
        Argument::Named {
            name: name.to_string(),
            value: Expr::number(n),
        }
    }

    mod binding {
        use super::*;

        #[test]
        fn test_positional_and_named_reach_same_slots() {
            let args = [positional(1.0), named("start position", 2.0)];
            let bound = bind(BuiltinFunction::Substring, &args).unwrap();
            assert!(bound.slots[0].is_some());
            assert!(bound.slots[1].is_some());
            assert!(bound.slots[2].is_none());
        }

        #[test]
        fn test_missing_required_parameter() {
            // "start position" is required for substring
            let args = [positional(1.0), named("length", 3.0)];
            let error = bind(BuiltinFunction::Substring, &args).unwrap_err();
            assert_eq!(error.to_string(), "Wrong number of arguments for function 'substring'");
            let error = bind(BuiltinFunction::Substring, &args[..1]).unwrap_err();
            assert_eq!(error.to_string(), "Wrong number of arguments for function 'substring'");
        }

        #[test]
        fn test_unknown_keyword() {
            let error = bind(BuiltinFunction::Abs, &[named("x", 1.0)]).unwrap_err();
            assert_eq!(error.to_string(), "Unknown parameter 'x' for function 'abs'");
        }

        #[test]
        fn test_duplicate_parameter() {
            let error = bind(BuiltinFunction::Abs, &[positional(1.0), named("n", 2.0)]).unwrap_err();
            assert!(matches!(error, EvalError::DuplicateParameter { .. }));
        }

        #[test]
        fn test_too_many_arguments() {
            let args = [positional(1.0), positional(2.0)];
            assert!(matches!(
                bind(BuiltinFunction::Floor, &args),
                Err(EvalError::Arity(_))
            ));
        }

        #[test]
        fn test_variadic_collects_rest() {
            let args = [positional(1.0), positional(2.0), positional(3.0)];
            let bound = bind(BuiltinFunction::Sum, &args).unwrap();
            assert_eq!(bound.rest.len(), 2);
        }

        #[test]
        fn test_shared_keyword_fills_next_free_slot() {
            let args = [named("point", 1.0), named("range", 2.0)];
            let bound = bind(BuiltinFunction::Before, &args).unwrap();
            assert!(bound.slots.iter().all(Option::is_some));
        }

        #[test]
        fn test_overload_names() {
            let args = [named("year", 2021.0), named("month", 3.0), named("day", 5.0)];
            assert!(bind(BuiltinFunction::Date, &args).is_ok());
        }
    }

    mod arguments {
        use super::*;

        #[test]
        fn test_items_from_single_list() {
            let args = Args::new(
                BuiltinFunction::Sum,
                vec![Some(Value::List(vec![Value::Number(1.0), Value::Number(2.0)]))],
                vec![],
            );
            assert_eq!(args.items().len(), 2);
        }

        #[test]
        fn test_items_from_positionals() {
            let args = Args::new(
                BuiltinFunction::Sum,
                vec![Some(Value::Number(1.0))],
                vec![Value::Number(2.0), Value::Number(3.0)],
            );
            assert_eq!(args.items().len(), 3);
        }

        #[test]
        fn test_unbound_slot_reads_null() {
            let args = Args::new(BuiltinFunction::Substring, vec![None, None, None], vec![]);
            assert!(args.get(2).is_null());
            assert!(!args.given(2));
        }
    }
}
