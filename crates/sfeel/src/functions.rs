//! Catalogue of the builtin functions known to the lexer.
//!
//! Builtin names are lexed as single tokens that include the opening
//! parenthesis (`starts with(`), so the catalogue lives next to the lexer
//! rather than the evaluator.

/// A builtin function, identified by its (possibly multi-word) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum BuiltinFunction {
    // Conversion
    Date,
    Time,
    DateAndTime,
    Number,
    String,
    Duration,
    YearsAndMonthsDuration,
    // Boolean
    Not,
    All,
    Any,
    // String
    Substring,
    StringLength,
    UpperCase,
    LowerCase,
    SubstringBefore,
    SubstringAfter,
    Replace,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Split,
    // List
    ListContains,
    Count,
    Min,
    Max,
    Sum,
    Mean,
    Sublist,
    Append,
    Concatenate,
    InsertBefore,
    Remove,
    Reverse,
    IndexOf,
    Union,
    DistinctValues,
    Flatten,
    Product,
    Median,
    Stddev,
    Mode,
    Sort,
    // Numeric
    Decimal,
    Floor,
    Ceiling,
    Abs,
    Modulo,
    Sqrt,
    Log,
    Exp,
    Odd,
    Even,
    // Date and time
    DayOfYear,
    DayOfWeek,
    MonthOfYear,
    WeekOfYear,
    Now,
    Today,
    // Context
    GetValue,
    GetEntries,
    // Type
    Is,
    // Range relations
    Before,
    After,
    Meets,
    MetBy,
    Overlaps,
    OverlapsBefore,
    OverlapsAfter,
    Finishes,
    FinishedBy,
    Includes,
    During,
    Starts,
    StartedBy,
    Coincides,
    // Numeric encodings of temporal values
    ValueT,
    ValueTInverse,
    ValueDt,
    ValueDtInverse,
    ValueDtd,
    ValueDtdInverse,
    ValueYmd,
    ValueYmdInverse,
}

impl BuiltinFunction {
    /// Every builtin, in catalogue order.
    pub const ALL: &'static [BuiltinFunction] = &[
        BuiltinFunction::Date,
        BuiltinFunction::Time,
        BuiltinFunction::DateAndTime,
        BuiltinFunction::Number,
        BuiltinFunction::String,
        BuiltinFunction::Duration,
        BuiltinFunction::YearsAndMonthsDuration,
        BuiltinFunction::Not,
        BuiltinFunction::All,
        BuiltinFunction::Any,
        BuiltinFunction::Substring,
        BuiltinFunction::StringLength,
        BuiltinFunction::UpperCase,
        BuiltinFunction::LowerCase,
        BuiltinFunction::SubstringBefore,
        BuiltinFunction::SubstringAfter,
        BuiltinFunction::Replace,
        BuiltinFunction::Contains,
        BuiltinFunction::StartsWith,
        BuiltinFunction::EndsWith,
        BuiltinFunction::Matches,
        BuiltinFunction::Split,
        BuiltinFunction::ListContains,
        BuiltinFunction::Count,
        BuiltinFunction::Min,
        BuiltinFunction::Max,
        BuiltinFunction::Sum,
        BuiltinFunction::Mean,
        BuiltinFunction::Sublist,
        BuiltinFunction::Append,
        BuiltinFunction::Concatenate,
        BuiltinFunction::InsertBefore,
        BuiltinFunction::Remove,
        BuiltinFunction::Reverse,
        BuiltinFunction::IndexOf,
        BuiltinFunction::Union,
        BuiltinFunction::DistinctValues,
        BuiltinFunction::Flatten,
        BuiltinFunction::Product,
        BuiltinFunction::Median,
        BuiltinFunction::Stddev,
        BuiltinFunction::Mode,
        BuiltinFunction::Sort,
        BuiltinFunction::Decimal,
        BuiltinFunction::Floor,
        BuiltinFunction::Ceiling,
        BuiltinFunction::Abs,
        BuiltinFunction::Modulo,
        BuiltinFunction::Sqrt,
        BuiltinFunction::Log,
        BuiltinFunction::Exp,
        BuiltinFunction::Odd,
        BuiltinFunction::Even,
        BuiltinFunction::DayOfYear,
        BuiltinFunction::DayOfWeek,
        BuiltinFunction::MonthOfYear,
        BuiltinFunction::WeekOfYear,
        BuiltinFunction::Now,
        BuiltinFunction::Today,
        BuiltinFunction::GetValue,
        BuiltinFunction::GetEntries,
        BuiltinFunction::Is,
        BuiltinFunction::Before,
        BuiltinFunction::After,
        BuiltinFunction::Meets,
        BuiltinFunction::MetBy,
        BuiltinFunction::Overlaps,
        BuiltinFunction::OverlapsBefore,
        BuiltinFunction::OverlapsAfter,
        BuiltinFunction::Finishes,
        BuiltinFunction::FinishedBy,
        BuiltinFunction::Includes,
        BuiltinFunction::During,
        BuiltinFunction::Starts,
        BuiltinFunction::StartedBy,
        BuiltinFunction::Coincides,
        BuiltinFunction::ValueT,
        BuiltinFunction::ValueTInverse,
        BuiltinFunction::ValueDt,
        BuiltinFunction::ValueDtInverse,
        BuiltinFunction::ValueDtd,
        BuiltinFunction::ValueDtdInverse,
        BuiltinFunction::ValueYmd,
        BuiltinFunction::ValueYmdInverse,
    ];

    /// The source-level name, words separated by single spaces.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinFunction::Date => "date",
            BuiltinFunction::Time => "time",
            BuiltinFunction::DateAndTime => "date and time",
            BuiltinFunction::Number => "number",
            BuiltinFunction::String => "string",
            BuiltinFunction::Duration => "duration",
            BuiltinFunction::YearsAndMonthsDuration => "years and months duration",
            BuiltinFunction::Not => "not",
            BuiltinFunction::All => "all",
            BuiltinFunction::Any => "any",
            BuiltinFunction::Substring => "substring",
            BuiltinFunction::StringLength => "string length",
            BuiltinFunction::UpperCase => "upper case",
            BuiltinFunction::LowerCase => "lower case",
            BuiltinFunction::SubstringBefore => "substring before",
            BuiltinFunction::SubstringAfter => "substring after",
            BuiltinFunction::Replace => "replace",
            BuiltinFunction::Contains => "contains",
            BuiltinFunction::StartsWith => "starts with",
            BuiltinFunction::EndsWith => "ends with",
            BuiltinFunction::Matches => "matches",
            BuiltinFunction::Split => "split",
            BuiltinFunction::ListContains => "list contains",
            BuiltinFunction::Count => "count",
            BuiltinFunction::Min => "min",
            BuiltinFunction::Max => "max",
            BuiltinFunction::Sum => "sum",
            BuiltinFunction::Mean => "mean",
            BuiltinFunction::Sublist => "sublist",
            BuiltinFunction::Append => "append",
            BuiltinFunction::Concatenate => "concatenate",
            BuiltinFunction::InsertBefore => "insert before",
            BuiltinFunction::Remove => "remove",
            BuiltinFunction::Reverse => "reverse",
            BuiltinFunction::IndexOf => "index of",
            BuiltinFunction::Union => "union",
            BuiltinFunction::DistinctValues => "distinct values",
            BuiltinFunction::Flatten => "flatten",
            BuiltinFunction::Product => "product",
            BuiltinFunction::Median => "median",
            BuiltinFunction::Stddev => "stddev",
            BuiltinFunction::Mode => "mode",
            BuiltinFunction::Sort => "sort",
            BuiltinFunction::Decimal => "decimal",
            BuiltinFunction::Floor => "floor",
            BuiltinFunction::Ceiling => "ceiling",
            BuiltinFunction::Abs => "abs",
            BuiltinFunction::Modulo => "modulo",
            BuiltinFunction::Sqrt => "sqrt",
            BuiltinFunction::Log => "log",
            BuiltinFunction::Exp => "exp",
            BuiltinFunction::Odd => "odd",
            BuiltinFunction::Even => "even",
            BuiltinFunction::DayOfYear => "day of year",
            BuiltinFunction::DayOfWeek => "day of week",
            BuiltinFunction::MonthOfYear => "month of year",
            BuiltinFunction::WeekOfYear => "week of year",
            BuiltinFunction::Now => "now",
            BuiltinFunction::Today => "today",
            BuiltinFunction::GetValue => "get value",
            BuiltinFunction::GetEntries => "get entries",
            BuiltinFunction::Is => "is",
            BuiltinFunction::Before => "before",
            BuiltinFunction::After => "after",
            BuiltinFunction::Meets => "meets",
            BuiltinFunction::MetBy => "met by",
            BuiltinFunction::Overlaps => "overlaps",
            BuiltinFunction::OverlapsBefore => "overlaps before",
            BuiltinFunction::OverlapsAfter => "overlaps after",
            BuiltinFunction::Finishes => "finishes",
            BuiltinFunction::FinishedBy => "finished by",
            BuiltinFunction::Includes => "includes",
            BuiltinFunction::During => "during",
            BuiltinFunction::Starts => "starts",
            BuiltinFunction::StartedBy => "started by",
            BuiltinFunction::Coincides => "coincides",
            BuiltinFunction::ValueT => "valuet",
            BuiltinFunction::ValueTInverse => "valuet-1",
            BuiltinFunction::ValueDt => "valuedt",
            BuiltinFunction::ValueDtInverse => "valuedt-1",
            BuiltinFunction::ValueDtd => "valuedtd",
            BuiltinFunction::ValueDtdInverse => "valuedtd-1",
            BuiltinFunction::ValueYmd => "valueymd",
            BuiltinFunction::ValueYmdInverse => "valueymd-1",
        }
    }

    /// Looks a builtin up by name. Runs of whitespace between words are
    /// treated as a single space.
    pub fn from_name(name: &str) -> Option<BuiltinFunction> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL.iter().copied().find(|f| f.name() == normalized)
    }

    /// Returns true for the interval-algebra predicates.
    pub fn is_range_relation(self) -> bool {
        matches!(
            self,
            BuiltinFunction::Before
                | BuiltinFunction::After
                | BuiltinFunction::Meets
                | BuiltinFunction::MetBy
                | BuiltinFunction::Overlaps
                | BuiltinFunction::OverlapsBefore
                | BuiltinFunction::OverlapsAfter
                | BuiltinFunction::Finishes
                | BuiltinFunction::FinishedBy
                | BuiltinFunction::Includes
                | BuiltinFunction::During
                | BuiltinFunction::Starts
                | BuiltinFunction::StartedBy
                | BuiltinFunction::Coincides
        )
    }
}

impl std::fmt::Display for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
