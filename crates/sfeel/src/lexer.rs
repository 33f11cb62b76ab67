//! S-FEEL lexer.
//!
//! The fixed-shape literal grammars (dates, times, durations, numbers) are
//! nom parsers; the context-sensitive classes (function tokens, selectors,
//! identifiers) are matched by hand against the builtin catalogue.
//!
//! Lexing never fails. A character that starts no token becomes a
//! [`TokenKind::Error`] token one code point wide and scanning resumes right
//! after it.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value, verify},
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::functions::BuiltinFunction;
use crate::token::{Selector, Token, TokenKind};

/// Splits `text` into tokens.
///
/// # Example
///
/// ```rust
/// use sfeel::{tokenize, TokenKind, BuiltinFunction};
///
/// let tokens = tokenize("starts with(\"foobar\", \"fo\")");
/// assert_eq!(tokens[0].kind, TokenKind::Function(BuiltinFunction::StartsWith));
/// assert_eq!(tokens[0].lexeme, "starts with(");
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

/// Streaming tokenizer over a source string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.offset..];
        let trimmed = rest.trim_start_matches(is_whitespace);
        self.offset += rest.len() - trimmed.len();
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let rest = &self.source[self.offset..];
        let first = rest.chars().next()?;
        let start = self.offset;
        let (kind, len) = scan(rest).unwrap_or((TokenKind::Error(first), first.len_utf8()));
        self.offset += len;
        Some(Token::new(kind, &rest[..len], start))
    }
}

// ============================================================================
// Token dispatch
// ============================================================================

fn scan(input: &str) -> Option<(TokenKind, usize)> {
    at_string(input)
        .or_else(|| string_token(input))
        .or_else(|| nom_token(input, temporal_literal))
        .or_else(|| nom_token(input, duration_literal))
        .or_else(|| function_token(input))
        .or_else(|| selector_token(input))
        .or_else(|| nom_token(input, number))
        .or_else(|| identifier_token(input))
        .or_else(|| punctuation(input))
}

fn nom_token(
    input: &str,
    parser: fn(&str) -> IResult<&str, TokenKind>,
) -> Option<(TokenKind, usize)> {
    parser(input)
        .ok()
        .map(|(remaining, kind)| (kind, input.len() - remaining.len()))
}

// ============================================================================
// Character classes
// ============================================================================

/// Whitespace skipped between tokens, including the Unicode space separators
/// that `char::is_whitespace` leaves out.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{200B}' | '\u{FEFF}')
}

/// Characters that may start an identifier.
pub fn is_name_start(c: char) -> bool {
    matches!(c,
        '?' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
        && !is_whitespace(c)
}

/// Characters that may continue an identifier.
pub fn is_name_part(c: char) -> bool {
    is_name_start(c)
        || matches!(c,
            '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}'
            | '/' | '-' | '\'' | '+' | '*')
}

// ============================================================================
// Strings
// ============================================================================

/// Decodes a double-quoted string at the start of `input`, returning the
/// decoded text and the number of bytes consumed.
fn quoted(input: &str) -> Option<(String, usize)> {
    let mut chars = input.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, i + 1)),
            '\\' => {
                let (j, escaped) = chars.next()?;
                match escaped {
                    '"' => out.push('"'),
                    '\'' => out.push('\''),
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let hex = input.get(j + 1..j + 5);
                        match hex
                            .and_then(|h| u32::from_str_radix(h, 16).ok())
                            .and_then(char::from_u32)
                        {
                            Some(decoded) => {
                                out.push(decoded);
                                for _ in 0..4 {
                                    chars.next();
                                }
                            }
                            None => out.push_str("\\u"),
                        }
                    }
                    other => {
                        // Unknown escapes survive verbatim so regex classes
                        // like `\s` and `\d` reach the pattern functions.
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            _ => out.push(c),
        }
    }
    None
}

fn string_token(input: &str) -> Option<(TokenKind, usize)> {
    quoted(input).map(|(text, len)| (TokenKind::String(text), len))
}

/// `@"..."`: a string that is re-read as a temporal literal when it has one
/// of the literal shapes.
fn at_string(input: &str) -> Option<(TokenKind, usize)> {
    let body = input.strip_prefix('@')?;
    let (text, len) = quoted(body)?;
    let kind = classify_literal(&text).unwrap_or(TokenKind::String(text));
    Some((kind, len + 1))
}

/// Classifies `text` as a date, time, date-time or duration literal if the
/// whole of it has that shape.
pub fn classify_literal(text: &str) -> Option<TokenKind> {
    let text = text.trim();
    all_consuming(temporal_literal)(text)
        .or_else(|_| all_consuming(duration_literal)(text))
        .ok()
        .map(|(_, kind)| kind)
}

// ============================================================================
// Temporal literals
// ============================================================================

fn digits_in_range(lo: u32, hi: u32) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input| {
        verify(
            take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
            |s: &str| s.parse::<u32>().map_or(false, |n| (lo..=hi).contains(&n)),
        )(input)
    }
}

fn year(input: &str) -> IResult<&str, &str> {
    verify(digit1, |s: &str| s.len() >= 4)(input)
}

fn zone_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+'))(input)
}

fn zone(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((
            one_of("+-"),
            digits_in_range(0, 14),
            char(':'),
            digits_in_range(0, 59),
        ))),
        recognize(pair(char('@'), zone_name)),
        recognize(one_of("Zz")),
    ))(input)
}

fn date_text(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        year,
        char('-'),
        digits_in_range(1, 12),
        char('-'),
        digits_in_range(1, 31),
    )))(input)
}

fn time_text(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        digits_in_range(0, 23),
        char(':'),
        digits_in_range(0, 59),
        char(':'),
        digits_in_range(0, 59),
        opt(pair(char('.'), digit1)),
        opt(zone),
    )))(input)
}

fn temporal_literal(input: &str) -> IResult<&str, TokenKind> {
    alt((
        map(recognize(tuple((date_text, char('T'), time_text))), |text: &str| {
            TokenKind::DateTime(text.to_string())
        }),
        map(date_text, |text: &str| TokenKind::Date(text.to_string())),
        map(time_text, |text: &str| TokenKind::Time(text.to_string())),
    ))(input)
}

// ============================================================================
// Durations
// ============================================================================

fn day_time_duration(input: &str) -> IResult<&str, &str> {
    verify(
        recognize(tuple((
            opt(char('-')),
            char('P'),
            opt(pair(digit1, char('D'))),
            opt(preceded(
                char('T'),
                tuple((
                    opt(pair(digit1, char('H'))),
                    opt(pair(digit1, char('M'))),
                    opt(tuple((digit1, opt(pair(char('.'), digit1)), char('S')))),
                )),
            )),
        ))),
        |s: &str| {
            let body = s.trim_start_matches('-').trim_start_matches('P');
            !body.is_empty() && !body.ends_with('T')
        },
    )(input)
}

fn year_month_duration(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        char('P'),
        alt((
            recognize(tuple((digit1, char('Y'), opt(pair(digit1, char('M')))))),
            recognize(pair(digit1, char('M'))),
        )),
    )))(input)
}

fn duration_literal(input: &str) -> IResult<&str, TokenKind> {
    alt((
        map(day_time_duration, |text: &str| {
            TokenKind::DayTimeDuration(text.to_string())
        }),
        map(year_month_duration, |text: &str| {
            TokenKind::YearMonthDuration(text.to_string())
        }),
    ))(input)
}

// ============================================================================
// Numbers
// ============================================================================

fn number(input: &str) -> IResult<&str, TokenKind> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |text: &str| text.parse::<f64>().map(TokenKind::Number),
    )(input)
}

// ============================================================================
// Function tokens and selectors
// ============================================================================

/// Matches the space-separated `words` at the start of `input`, allowing any
/// run of whitespace between words. Returns the unconsumed remainder.
fn match_words<'i>(input: &'i str, words: &str) -> Option<&'i str> {
    let mut rest = input;
    for (i, word) in words.split(' ').enumerate() {
        if i > 0 {
            let trimmed = rest.trim_start_matches(is_whitespace);
            if trimmed.len() == rest.len() {
                return None;
            }
            rest = trimmed;
        }
        rest = rest.strip_prefix(word)?;
    }
    Some(rest)
}

fn open_paren(rest: &str) -> Option<&str> {
    rest.trim_start_matches(is_whitespace).strip_prefix('(')
}

fn function_token(input: &str) -> Option<(TokenKind, usize)> {
    if !input.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    let mut best: Option<(TokenKind, usize)> = None;
    let mut consider = |kind: TokenKind, rest: &str| {
        let len = input.len() - rest.len();
        if best.as_ref().map_or(true, |(_, best_len)| len > *best_len) {
            best = Some((kind, len));
        }
    };
    if let Some(rest) = match_words(input, "in").and_then(open_paren) {
        consider(TokenKind::InList, rest);
    }
    for &function in BuiltinFunction::ALL {
        if let Some(rest) = match_words(input, function.name()).and_then(open_paren) {
            consider(TokenKind::Function(function), rest);
        }
    }
    best
}

fn selector_token(input: &str) -> Option<(TokenKind, usize)> {
    let body = input.strip_prefix('.')?;
    if !body.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    Selector::ALL.iter().find_map(|&selector| {
        let rest = match_words(body, selector.name())?;
        if rest.starts_with(is_name_part) {
            return None;
        }
        Some((TokenKind::Selector(selector), input.len() - rest.len()))
    })
}

// ============================================================================
// Identifiers and keywords
// ============================================================================

fn identifier_token(input: &str) -> Option<(TokenKind, usize)> {
    if !input.starts_with(is_name_start) {
        return None;
    }
    let len = input
        .char_indices()
        .find(|&(_, c)| !is_name_part(c))
        .map_or(input.len(), |(i, _)| i);
    let word = &input[..len];
    let kind = match word {
        "true" => TokenKind::Boolean(true),
        "false" => TokenKind::Boolean(false),
        "null" => TokenKind::Null,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "between" => TokenKind::Between,
        "in" => TokenKind::In,
        "item" => TokenKind::Item,
        "some" => TokenKind::Some,
        "every" => TokenKind::Every,
        "satisfies" => TokenKind::Satisfies,
        "function" => TokenKind::FunctionKeyword,
        "instance" => {
            if let Some(rest) = match_words(input, "instance of") {
                if !rest.starts_with(is_name_part) {
                    return Some((TokenKind::InstanceOf, input.len() - rest.len()));
                }
            }
            TokenKind::Name(word.to_string())
        }
        _ => TokenKind::Name(word.to_string()),
    };
    Some((kind, len))
}

// ============================================================================
// Punctuation
// ============================================================================

fn punctuation_kind(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Assign, tag("<-")),
        value(TokenKind::Ellipsis, tag("..")),
        value(TokenKind::Power, tag("**")),
        value(TokenKind::LessOrEqual, tag("<=")),
        value(TokenKind::GreaterOrEqual, tag(">=")),
        value(TokenKind::NotEqual, tag("!=")),
        map(one_of("<>=+-*/,:.()[]{}"), |c: char| match c {
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            '=' => TokenKind::Equal,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            _ => TokenKind::RBrace,
        }),
    ))(input)
}

fn punctuation(input: &str) -> Option<(TokenKind, usize)> {
    nom_token(input, punctuation_kind)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    mod literals {
        use super::*;

        #[test]
        fn test_numbers_and_ranges() {
            assert_eq!(
                kinds("[1..3.5]"),
                vec![
                    TokenKind::LBracket,
                    TokenKind::Number(1.0),
                    TokenKind::Ellipsis,
                    TokenKind::Number(3.5),
                    TokenKind::RBracket,
                ]
            );
        }

        #[test]
        fn test_temporal_literals() {
            assert_eq!(
                kinds("2021-03-05T12:00:00"),
                vec![TokenKind::DateTime("2021-03-05T12:00:00".into())]
            );
            assert_eq!(kinds("2021-03-05"), vec![TokenKind::Date("2021-03-05".into())]);
            assert_eq!(kinds("13:15:17Z"), vec![TokenKind::Time("13:15:17Z".into())]);
            assert_eq!(
                kinds("2018-12-10T10:30:00@Australia/Perth"),
                vec![TokenKind::DateTime("2018-12-10T10:30:00@Australia/Perth".into())]
            );
        }

        #[test]
        fn test_duration_literals() {
            assert_eq!(kinds("PT3H10M"), vec![TokenKind::DayTimeDuration("PT3H10M".into())]);
            assert_eq!(kinds("P2Y2M"), vec![TokenKind::YearMonthDuration("P2Y2M".into())]);
            assert_eq!(kinds("-P1D"), vec![TokenKind::DayTimeDuration("-P1D".into())]);
            assert_eq!(kinds("P3M"), vec![TokenKind::YearMonthDuration("P3M".into())]);
        }

        #[test]
        fn test_date_is_not_subtraction() {
            assert_eq!(kinds("2021-03-05").len(), 1);
            assert_eq!(
                kinds("2021 - 3"),
                vec![TokenKind::Number(2021.0), TokenKind::Minus, TokenKind::Number(3.0)]
            );
        }

        #[test]
        fn test_string_escapes() {
            assert_eq!(
                kinds(r#""a\"b\nA\s""#),
                vec![TokenKind::String("a\"b\nA\\s".into())]
            );
        }

        #[test]
        fn test_at_strings() {
            assert_eq!(kinds(r#"@"PT8H""#), vec![TokenKind::DayTimeDuration("PT8H".into())]);
            assert_eq!(kinds(r#"@"2019-01-01""#), vec![TokenKind::Date("2019-01-01".into())]);
            assert_eq!(kinds(r#"@"hello""#), vec![TokenKind::String("hello".into())]);
        }
    }

    mod words {
        use super::*;

        #[test]
        fn test_multi_word_functions() {
            let tokens = tokenize("date and time(\"2019-01-01T00:00:00\")");
            assert_eq!(tokens[0].kind, TokenKind::Function(BuiltinFunction::DateAndTime));
            let tokens = tokenize("get  value({a: 1}, \"a\")");
            assert_eq!(tokens[0].kind, TokenKind::Function(BuiltinFunction::GetValue));
            assert_eq!(tokens[0].lexeme, "get  value(");
        }

        #[test]
        fn test_longest_function_wins() {
            assert_eq!(
                kinds("string length(")[0],
                TokenKind::Function(BuiltinFunction::StringLength)
            );
            assert_eq!(kinds("string(")[0], TokenKind::Function(BuiltinFunction::String));
            assert_eq!(
                kinds("valuedtd-1(")[0],
                TokenKind::Function(BuiltinFunction::ValueDtdInverse)
            );
        }

        #[test]
        fn test_function_name_without_paren_is_identifier() {
            assert_eq!(kinds("count"), vec![TokenKind::Name("count".into())]);
            assert_eq!(kinds("mydate("), vec![TokenKind::Name("mydate".into()), TokenKind::LParen]);
        }

        #[test]
        fn test_in_list_token() {
            assert_eq!(
                kinds("2 in(<1)"),
                vec![
                    TokenKind::Number(2.0),
                    TokenKind::InList,
                    TokenKind::LessThan,
                    TokenKind::Number(1.0),
                    TokenKind::RParen,
                ]
            );
            assert_eq!(
                kinds("index of(")[0],
                TokenKind::Function(BuiltinFunction::IndexOf)
            );
        }

        #[test]
        fn test_keywords_and_names() {
            assert_eq!(
                kinds("true and item"),
                vec![TokenKind::Boolean(true), TokenKind::And, TokenKind::Item]
            );
            assert_eq!(kinds("trueish"), vec![TokenKind::Name("trueish".into())]);
            assert_eq!(kinds("x instance of number")[1], TokenKind::InstanceOf);
            assert_eq!(kinds("Grüße"), vec![TokenKind::Name("Grüße".into())]);
            assert_eq!(kinds("a-b"), vec![TokenKind::Name("a-b".into())]);
        }

        #[test]
        fn test_selectors() {
            assert_eq!(
                kinds("r.start included"),
                vec![TokenKind::Name("r".into()), TokenKind::Selector(Selector::StartIncluded)]
            );
            assert_eq!(
                kinds("d.year"),
                vec![TokenKind::Name("d".into()), TokenKind::Selector(Selector::Year)]
            );
            assert_eq!(
                kinds("d.yearly"),
                vec![TokenKind::Name("d".into()), TokenKind::Dot, TokenKind::Name("yearly".into())]
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_illegal_character_is_skipped() {
            let tokens = tokenize("1 $ 2");
            assert_eq!(tokens.len(), 3);
            assert_eq!(tokens[1].kind, TokenKind::Error('$'));
            assert_eq!(tokens[1].position, 2);
            assert_eq!(tokens[2].kind, TokenKind::Number(2.0));
        }

        #[test]
        fn test_unterminated_string() {
            let tokens = tokenize("\"abc");
            assert_eq!(tokens[0].kind, TokenKind::Error('"'));
            assert_eq!(tokens[1].kind, TokenKind::Name("abc".into()));
        }

        #[test]
        fn test_unicode_whitespace() {
            assert_eq!(kinds("1\u{00A0}+\u{3000}2").len(), 3);
        }

        #[test]
        fn test_assignment_and_operators() {
            assert_eq!(
                kinds("x <- 2 ** 3"),
                vec![
                    TokenKind::Name("x".into()),
                    TokenKind::Assign,
                    TokenKind::Number(2.0),
                    TokenKind::Power,
                    TokenKind::Number(3.0),
                ]
            );
        }
    }
}
