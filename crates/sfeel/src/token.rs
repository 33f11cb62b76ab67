//! Token types produced by the lexer.

use crate::functions::BuiltinFunction;

/// A component selector written as a dotted suffix (`.year`, `.start included`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Selector {
    Year,
    Month,
    Day,
    Weekday,
    Hour,
    Minute,
    Second,
    Timezone,
    TimeOffset,
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
    Start,
    End,
    StartIncluded,
    EndIncluded,
}

impl Selector {
    /// Every selector, multi-word selectors first so that the lexer can try
    /// them in order.
    pub const ALL: &'static [Selector] = &[
        Selector::StartIncluded,
        Selector::EndIncluded,
        Selector::TimeOffset,
        Selector::Weekday,
        Selector::Timezone,
        Selector::Minutes,
        Selector::Seconds,
        Selector::Minute,
        Selector::Second,
        Selector::Months,
        Selector::Month,
        Selector::Years,
        Selector::Year,
        Selector::Hours,
        Selector::Hour,
        Selector::Days,
        Selector::Day,
        Selector::Start,
        Selector::End,
    ];

    /// The property name this selector addresses.
    pub fn name(self) -> &'static str {
        match self {
            Selector::Year => "year",
            Selector::Month => "month",
            Selector::Day => "day",
            Selector::Weekday => "weekday",
            Selector::Hour => "hour",
            Selector::Minute => "minute",
            Selector::Second => "second",
            Selector::Timezone => "timezone",
            Selector::TimeOffset => "time offset",
            Selector::Years => "years",
            Selector::Months => "months",
            Selector::Days => "days",
            Selector::Hours => "hours",
            Selector::Minutes => "minutes",
            Selector::Seconds => "seconds",
            Selector::Start => "start",
            Selector::End => "end",
            Selector::StartIncluded => "start included",
            Selector::EndIncluded => "end included",
        }
    }
}

/// The kind of a token, carrying the decoded payload where there is one.
///
/// Temporal literals keep their ISO text; turning them into values needs a
/// zone resolver and is left to the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Decimal number literal.
    Number(f64),
    /// String literal with escapes decoded.
    String(String),
    /// `true` / `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// Date literal, e.g. `2021-03-05`.
    Date(String),
    /// Time literal, e.g. `13:15:17Z`.
    Time(String),
    /// Date-time literal, e.g. `2021-03-05T12:00:00@Europe/Paris`.
    DateTime(String),
    /// Days-and-time duration literal, e.g. `P1DT2H`.
    DayTimeDuration(String),
    /// Years-and-months duration literal, e.g. `P2Y2M`.
    YearMonthDuration(String),
    /// Identifier.
    Name(String),
    /// Builtin function name including its opening parenthesis.
    Function(BuiltinFunction),
    /// `in(`: the function form of a membership test.
    InList,
    /// Dotted component selector.
    Selector(Selector),

    // Keywords
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `between`
    Between,
    /// `in`
    In,
    /// `item`
    Item,
    /// `some`
    Some,
    /// `every`
    Every,
    /// `satisfies`
    Satisfies,
    /// `function`
    FunctionKeyword,
    /// `instance of`
    InstanceOf,

    // Punctuation
    /// `<-`
    Assign,
    /// `..`
    Ellipsis,
    /// `**`
    Power,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    /// A character the lexer could not place in any token.
    Error(char),
}

impl TokenKind {
    /// Returns true if this is one of the six relational operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::LessThan
                | TokenKind::LessOrEqual
                | TokenKind::GreaterThan
                | TokenKind::GreaterOrEqual
                | TokenKind::Equal
                | TokenKind::NotEqual
        )
    }
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was recognised.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub lexeme: String,
    /// Byte offset of the token in the source.
    pub position: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    /// Returns true for lexer error tokens.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, TokenKind::Error(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lexeme)
    }
}
