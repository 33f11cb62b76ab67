//! Abstract syntax tree for S-FEEL statements.
//!
//! `Display` renders a node back to S-FEEL source. Nested operators are
//! parenthesised, so the output re-parses to the same tree.

use crate::functions::BuiltinFunction;

// =============================================================================
// Operators
// =============================================================================

/// Relational operators, used both infix (`a < b`) and as unary tests (`< b`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComparisonOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOperator::Equal => write!(f, "="),
            ComparisonOperator::NotEqual => write!(f, "!="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::LessOrEqual => write!(f, "<="),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArithmeticOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `**`
    Power,
}

impl std::fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithmeticOperator::Add => write!(f, "+"),
            ArithmeticOperator::Subtract => write!(f, "-"),
            ArithmeticOperator::Multiply => write!(f, "*"),
            ArithmeticOperator::Divide => write!(f, "/"),
            ArithmeticOperator::Power => write!(f, "**"),
        }
    }
}

/// Whether a range end includes its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeBound {
    /// `(` or `)`: endpoint excluded.
    Open,
    /// `[` or `]`: endpoint included.
    Closed,
}

/// `some` or `every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantifier {
    /// Existential.
    Some,
    /// Universal.
    Every,
}

/// Type names accepted after `instance of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum TypeName {
    Any,
    Null,
    Boolean,
    Number,
    String,
    Date,
    Time,
    DateAndTime,
    YearsAndMonthsDuration,
    DaysAndTimeDuration,
    List,
    Context,
    Range,
}

impl TypeName {
    /// Every type name.
    pub const ALL: &'static [TypeName] = &[
        TypeName::Any,
        TypeName::Null,
        TypeName::Boolean,
        TypeName::Number,
        TypeName::String,
        TypeName::Date,
        TypeName::Time,
        TypeName::DateAndTime,
        TypeName::YearsAndMonthsDuration,
        TypeName::DaysAndTimeDuration,
        TypeName::List,
        TypeName::Context,
        TypeName::Range,
    ];

    /// The source spelling.
    pub fn name(self) -> &'static str {
        match self {
            TypeName::Any => "Any",
            TypeName::Null => "null",
            TypeName::Boolean => "boolean",
            TypeName::Number => "number",
            TypeName::String => "string",
            TypeName::Date => "date",
            TypeName::Time => "time",
            TypeName::DateAndTime => "date and time",
            TypeName::YearsAndMonthsDuration => "years and months duration",
            TypeName::DaysAndTimeDuration => "days and time duration",
            TypeName::List => "list",
            TypeName::Context => "context",
            TypeName::Range => "range",
        }
    }

    /// Looks a type up by its space-separated spelling.
    pub fn from_name(name: &str) -> Option<TypeName> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A literal value as written in the source.
///
/// Temporal literals keep their ISO text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Decimal number.
    Number(f64),
    /// String.
    String(String),
    /// Date literal text.
    Date(String),
    /// Time literal text.
    Time(String),
    /// Date-time literal text.
    DateTime(String),
    /// Days-and-time duration literal text.
    DayTimeDuration(String),
    /// Years-and-months duration literal text.
    YearMonthDuration(String),
}

/// One `key: value` entry of a context literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextEntry {
    /// Entry key.
    pub key: String,
    /// Entry value expression.
    pub value: Expr,
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Argument {
    /// Bound by position.
    Positional(Expr),
    /// Bound by parameter name: `start position: 2`.
    Named {
        /// Parameter name.
        name: String,
        /// Argument expression.
        value: Expr,
    },
}

impl Argument {
    /// The argument expression, whichever form it was written in.
    pub fn value(&self) -> &Expr {
        match self {
            Argument::Positional(value) | Argument::Named { value, .. } => value,
        }
    }
}

/// `name in source` inside a quantified expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iteration {
    /// Variable bound to each element.
    pub name: String,
    /// The list iterated over.
    pub source: Expr,
}

/// An S-FEEL expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// Literal value.
    Literal(Literal),
    /// Name reference.
    Name(String),
    /// The current element inside a filter.
    Item,
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `{a: 1, "b c": 2}`
    Context(Vec<ContextEntry>),
    /// `[a..b)` and friends.
    Range {
        /// Start bound.
        start: RangeBound,
        /// Low endpoint.
        low: Box<Expr>,
        /// High endpoint.
        high: Box<Expr>,
        /// End bound.
        end: RangeBound,
    },
    /// `< x`, `!= x`: a test against an implicit operand.
    UnaryTest {
        /// Relational operator.
        op: ComparisonOperator,
        /// Right-hand operand.
        operand: Box<Expr>,
    },
    /// `-x`
    Negate(Box<Expr>),
    /// `not x`
    Not(Box<Expr>),
    /// `a + b`, `a ** b`, ...
    Arithmetic {
        /// Operator.
        op: ArithmeticOperator,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `a < b`, `a = b`, ...
    Comparison {
        /// Operator.
        op: ComparisonOperator,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `a and b`
    And(Box<Expr>, Box<Expr>),
    /// `a or b`
    Or(Box<Expr>, Box<Expr>),
    /// `v between low and high`
    Between {
        /// Tested value.
        value: Box<Expr>,
        /// Inclusive lower bound.
        low: Box<Expr>,
        /// Inclusive upper bound.
        high: Box<Expr>,
    },
    /// `v in target`
    In {
        /// Tested value.
        value: Box<Expr>,
        /// Range, list, context, unary test or scalar.
        target: Box<Expr>,
    },
    /// `v in(t1, t2, ...)`
    InList {
        /// Tested value.
        value: Box<Expr>,
        /// Alternative tests.
        tests: Vec<Expr>,
    },
    /// `v instance of type`
    InstanceOf {
        /// Tested value.
        value: Box<Expr>,
        /// Expected type.
        type_name: TypeName,
    },
    /// `list[condition]`
    Filter {
        /// Filtered expression.
        target: Box<Expr>,
        /// Index, boolean, or per-item predicate.
        condition: Box<Expr>,
    },
    /// `target.name`
    Path {
        /// Accessed expression.
        target: Box<Expr>,
        /// Property name.
        name: String,
    },
    /// Builtin call.
    Call {
        /// Called builtin.
        function: BuiltinFunction,
        /// Arguments in source order.
        arguments: Vec<Argument>,
    },
    /// `function(a, b) body`; only meaningful as a `sort` comparator.
    Lambda {
        /// Parameter names.
        parameters: Vec<String>,
        /// Body expression.
        body: Box<Expr>,
    },
    /// `some x in xs satisfies cond` / `every ...`
    Quantified {
        /// `some` or `every`.
        quantifier: Quantifier,
        /// Iteration variables and their sources.
        iterations: Vec<Iteration>,
        /// Condition checked per binding.
        condition: Box<Expr>,
    },
}

impl Expr {
    /// Boxes `self`.
    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// Shorthand for a number literal.
    pub fn number(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    /// Shorthand for a name reference.
    pub fn name(name: impl Into<String>) -> Expr {
        Expr::Name(name.into())
    }

    /// Returns true if evaluating this expression reads the filter `item`.
    pub fn mentions_item(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| found |= matches!(e, Expr::Item));
        found
    }

    /// Collects every name referenced anywhere below this node.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Name(name) = e {
                names.push(name.as_str());
            }
        });
        names
    }

    /// Visits this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Literal(_) | Expr::Name(_) | Expr::Item => {}
            Expr::List(items) => items.iter().for_each(|e| e.walk(visit)),
            Expr::Context(entries) => entries.iter().for_each(|e| e.value.walk(visit)),
            Expr::Range { low, high, .. } => {
                low.walk(visit);
                high.walk(visit);
            }
            Expr::UnaryTest { operand, .. } => operand.walk(visit),
            Expr::Negate(inner) | Expr::Not(inner) => inner.walk(visit),
            Expr::Arithmetic { left, right, .. }
            | Expr::Comparison { left, right, .. }
            | Expr::And(left, right)
            | Expr::Or(left, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::Between { value, low, high } => {
                value.walk(visit);
                low.walk(visit);
                high.walk(visit);
            }
            Expr::In { value, target } => {
                value.walk(visit);
                target.walk(visit);
            }
            Expr::InList { value, tests } => {
                value.walk(visit);
                tests.iter().for_each(|e| e.walk(visit));
            }
            Expr::InstanceOf { value, .. } => value.walk(visit),
            Expr::Filter { target, condition } => {
                target.walk(visit);
                condition.walk(visit);
            }
            Expr::Path { target, .. } => target.walk(visit),
            Expr::Call { arguments, .. } => arguments.iter().for_each(|a| a.value().walk(visit)),
            Expr::Lambda { body, .. } => body.walk(visit),
            Expr::Quantified {
                iterations,
                condition,
                ..
            } => {
                iterations.iter().for_each(|i| i.source.walk(visit));
                condition.walk(visit);
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Arithmetic { .. }
                | Expr::Comparison { .. }
                | Expr::And(..)
                | Expr::Or(..)
                | Expr::Between { .. }
                | Expr::In { .. }
                | Expr::InList { .. }
                | Expr::InstanceOf { .. }
                | Expr::Negate(_)
                | Expr::Not(_)
                | Expr::UnaryTest { .. }
                | Expr::Quantified { .. }
                | Expr::Lambda { .. }
        )
    }
}

/// A complete input line: an assignment or a bare expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    /// `name <- expr`
    Assignment {
        /// Bound name.
        name: String,
        /// Bound expression.
        value: Expr,
    },
    /// Any other expression.
    Expression(Expr),
}

impl Statement {
    /// The expression evaluated by this statement.
    pub fn expr(&self) -> &Expr {
        match self {
            Statement::Assignment { value, .. } => value,
            Statement::Expression(expr) => expr,
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Formats a number the way S-FEEL prints it: whole values without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, text: &str) -> std::fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '?')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == ' ')
}

struct Operand<'a>(&'a Expr);

impl std::fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, items: &[Expr]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) => write_quoted(f, s),
            Literal::Date(text)
            | Literal::Time(text)
            | Literal::DateTime(text)
            | Literal::DayTimeDuration(text)
            | Literal::YearMonthDuration(text) => write!(f, "@\"{}\"", text),
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Argument::Positional(value) => write!(f, "{}", value),
            Argument::Named { name, value } => write!(f, "{}: {}", name, value),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Name(name) => f.write_str(name),
            Expr::Item => f.write_str("item"),
            Expr::List(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            Expr::Context(entries) => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if is_plain_key(&entry.key) {
                        f.write_str(&entry.key)?;
                    } else {
                        write_quoted(f, &entry.key)?;
                    }
                    write!(f, ": {}", entry.value)?;
                }
                f.write_str("}")
            }
            Expr::Range {
                start,
                low,
                high,
                end,
            } => {
                let open = if *start == RangeBound::Closed { "[" } else { "(" };
                let close = if *end == RangeBound::Closed { "]" } else { ")" };
                write!(f, "{}{}..{}{}", open, Operand(low), Operand(high), close)
            }
            Expr::UnaryTest { op, operand } => write!(f, "{} {}", op, Operand(operand)),
            Expr::Negate(inner) => write!(f, "-{}", Operand(inner)),
            Expr::Not(inner) => write!(f, "not({})", inner),
            Expr::Arithmetic { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op, Operand(right))
            }
            Expr::Comparison { op, left, right } => {
                write!(f, "{} {} {}", Operand(left), op, Operand(right))
            }
            Expr::And(left, right) => write!(f, "{} and {}", Operand(left), Operand(right)),
            Expr::Or(left, right) => write!(f, "{} or {}", Operand(left), Operand(right)),
            Expr::Between { value, low, high } => write!(
                f,
                "{} between {} and {}",
                Operand(value),
                Operand(low),
                Operand(high)
            ),
            Expr::In { value, target } => write!(f, "{} in {}", Operand(value), Operand(target)),
            Expr::InList { value, tests } => {
                write!(f, "{} in(", Operand(value))?;
                write_list(f, tests)?;
                f.write_str(")")
            }
            Expr::InstanceOf { value, type_name } => {
                write!(f, "{} instance of {}", Operand(value), type_name)
            }
            Expr::Filter { target, condition } => {
                write!(f, "{}[{}]", Operand(target), condition)
            }
            Expr::Path { target, name } => write!(f, "{}.{}", Operand(target), name),
            Expr::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")
            }
            Expr::Lambda { parameters, body } => {
                write!(f, "function({}) {}", parameters.join(", "), body)
            }
            Expr::Quantified {
                quantifier,
                iterations,
                condition,
            } => {
                let keyword = match quantifier {
                    Quantifier::Some => "some",
                    Quantifier::Every => "every",
                };
                write!(f, "{} ", keyword)?;
                for (i, iteration) in iterations.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} in {}", iteration.name, Operand(&iteration.source))?;
                }
                write!(f, " satisfies {}", condition)
            }
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Assignment { name, value } => write!(f, "{} <- {}", name, value),
            Statement::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(1.1), "1.1");
        assert_eq!(format_number(-0.5), "-0.5");
    }

    #[test]
    fn test_display_range_and_unary_test() {
        let range = Expr::Range {
            start: RangeBound::Open,
            low: Expr::number(1.0).boxed(),
            high: Expr::number(5.0).boxed(),
            end: RangeBound::Closed,
        };
        assert_eq!(range.to_string(), "(1..5]");

        let test = Expr::UnaryTest {
            op: ComparisonOperator::LessOrEqual,
            operand: Expr::number(10.0).boxed(),
        };
        assert_eq!(test.to_string(), "<= 10");
    }

    #[test]
    fn test_display_parenthesises_nested_operators() {
        let expr = Expr::Arithmetic {
            op: ArithmeticOperator::Multiply,
            left: Expr::Arithmetic {
                op: ArithmeticOperator::Add,
                left: Expr::number(1.0).boxed(),
                right: Expr::number(2.0).boxed(),
            }
            .boxed(),
            right: Expr::name("x").boxed(),
        };
        assert_eq!(expr.to_string(), "(1 + 2) * x");
    }

    #[test]
    fn test_display_context_quotes_unusual_keys() {
        let expr = Expr::Context(vec![
            ContextEntry {
                key: "first name".into(),
                value: Expr::Literal(Literal::String("Jo".into())),
            },
            ContextEntry {
                key: "a-b".into(),
                value: Expr::Literal(Literal::Null),
            },
        ]);
        assert_eq!(expr.to_string(), "{first name: \"Jo\", \"a-b\": null}");
    }

    #[test]
    fn test_mentions_item() {
        let filter_condition = Expr::Comparison {
            op: ComparisonOperator::GreaterThan,
            left: Expr::Item.boxed(),
            right: Expr::number(2.0).boxed(),
        };
        assert!(filter_condition.mentions_item());
        assert!(!Expr::number(1.0).mentions_item());
    }

    #[test]
    fn test_names_collects_references() {
        let expr = Expr::And(Expr::name("a").boxed(), Expr::name("b").boxed());
        assert_eq!(expr.names(), vec!["a", "b"]);
    }
}
