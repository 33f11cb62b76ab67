//! Integration tests for the builtin function library.

use sfeel_eval::{parse, Value};

fn eval(text: &str) -> String {
    let (diagnostics, value) = parse(text);
    assert!(diagnostics.is_empty(), "{text}: {diagnostics:?}");
    value.expect("a value").to_string()
}

fn diagnostics(text: &str) -> Vec<String> {
    let (diagnostics, value) = parse(text);
    assert_eq!(value, Some(Value::Null), "{text}");
    diagnostics
}

// ============================================================================
// Argument binding
// ============================================================================

#[test]
fn test_named_arguments() {
    assert_eq!(eval("substring(string: \"foobar\", start position: 3)"), "obar");
    assert_eq!(eval("substring(\"foobar\", length: 2, start position: 2)"), "oo");
    assert_eq!(eval("modulo(divisor: 5, dividend: 12)"), "2");
    assert_eq!(eval("date(year: 2021, month: 3, day: 5)"), "2021-03-05");
}

#[test]
fn test_unknown_parameter() {
    assert_eq!(
        diagnostics("substring(strng: \"foobar\", start position: 3)"),
        vec!["Unknown parameter 'strng' for function 'substring'"]
    );
}

#[test]
fn test_wrong_number_of_arguments() {
    assert_eq!(
        diagnostics("abs()"),
        vec!["Wrong number of arguments for function 'abs'"]
    );
    assert_eq!(
        diagnostics("floor(1, 2)"),
        vec!["Wrong number of arguments for function 'floor'"]
    );
}

#[test]
fn test_duplicate_parameter() {
    assert_eq!(
        diagnostics("abs(1, n: 2)"),
        vec!["Duplicate parameter 'n' for function 'abs'"]
    );
}

#[test]
fn test_null_argument_yields_null_silently() {
    assert_eq!(eval("string length(null)"), "null");
    assert_eq!(eval("floor(\"a\")"), "null");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_functions() {
    assert_eq!(eval("substring(\"foobar\", 3)"), "obar");
    assert_eq!(eval("substring(\"foobar\", -2, 1)"), "a");
    assert_eq!(eval("string length(\"foo\")"), "3");
    assert_eq!(eval("upper case(\"aBc4\")"), "ABC4");
    assert_eq!(eval("lower case(\"aBc4\")"), "abc4");
    assert_eq!(eval("substring before(\"foobar\", \"bar\")"), "foo");
    assert_eq!(eval("substring after(\"foobar\", \"ob\")"), "ar");
    assert_eq!(eval("contains(\"foobar\", \"of\")"), "false");
    assert_eq!(eval("starts with(\"foobar\", \"fo\")"), "true");
    assert_eq!(eval("ends with(\"foobar\", \"r\")"), "true");
}

#[test]
fn test_regular_expressions() {
    assert_eq!(eval("matches(\"foobar\", \"^fo*b\")"), "true");
    assert_eq!(eval("matches(\"FooBar\", \"foo\", \"i\")"), "true");
    assert_eq!(eval("matches(\"FooBar\", \"foo\")"), "false");
    assert_eq!(eval("replace(\"abcd\", \"(ab)|(a)\", \"[1=$1][2=$2]\")"), "[1=ab][2=]cd");
    assert_eq!(eval("split(\"a;b;c\", \";\")"), "[\"a\", \"b\", \"c\"]");
}

#[test]
fn test_invalid_regular_expression_reports() {
    let (diagnostics, value) = parse("matches(\"a\", \"(\")");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].starts_with("Invalid regular expression"));
    assert_eq!(value, Some(Value::Null));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_aggregates() {
    assert_eq!(eval("count([1, 2, 3])"), "3");
    assert_eq!(eval("min([3, 1, 2])"), "1");
    assert_eq!(eval("max(3, 7, 2)"), "7");
    assert_eq!(eval("sum([1, 2, 3])"), "6");
    assert_eq!(eval("mean([1, 2, 3, 4])"), "2.5");
    assert_eq!(eval("median([3, 1, 2, 4])"), "2.5");
    assert_eq!(eval("median(8, 2, 5, 3, 4)"), "4");
    assert_eq!(eval("product(2, 3, 4)"), "24");
    assert_eq!(eval("decimal(stddev([2, 4, 7, 5]), 4)"), "2.0817");
    assert_eq!(eval("mode([6, 1, 9, 6, 1])"), "[1, 6]");
    assert_eq!(eval("mode([])"), "[]");
}

#[test]
fn test_aggregates_of_empty_or_mixed_lists() {
    assert_eq!(eval("min([])"), "null");
    assert_eq!(eval("sum([])"), "null");
    assert_eq!(eval("max([1, \"a\"])"), "null");
    assert_eq!(eval("stddev([1])"), "null");
}

#[test]
fn test_list_editing() {
    assert_eq!(eval("sublist([4, 5, 6], 1, 2)"), "[4, 5]");
    assert_eq!(eval("sublist([4, 5, 6], -2)"), "[5, 6]");
    assert_eq!(eval("append([1], 2, 3)"), "[1, 2, 3]");
    assert_eq!(eval("concatenate([1, 2], [3])"), "[1, 2, 3]");
    assert_eq!(eval("insert before([1, 3], 2, 2)"), "[1, 2, 3]");
    assert_eq!(eval("remove([1, 2, 3], 2)"), "[1, 3]");
    assert_eq!(eval("reverse([1, 2, 3])"), "[3, 2, 1]");
    assert_eq!(eval("index of([1, 2, 3, 2], 2)"), "[2, 4]");
    assert_eq!(eval("union([1, 2], [2, 3])"), "[1, 2, 3]");
    assert_eq!(eval("distinct values([1, 2, 3, 2, 1])"), "[1, 2, 3]");
    assert_eq!(eval("flatten([[1, 2], [[3]], 4])"), "[1, 2, 3, 4]");
    assert_eq!(eval("list contains([1, 2], 2)"), "true");
    assert_eq!(eval("list contains([1, 2], 5)"), "false");
}

#[test]
fn test_out_of_range_positions_are_null() {
    assert_eq!(eval("sublist([4, 5, 6], 4)"), "null");
    assert_eq!(eval("remove([1, 2], 0)"), "null");
}

#[test]
fn test_sort() {
    assert_eq!(eval("sort([3, 1, 2])"), "[1, 2, 3]");
    assert_eq!(eval("sort([3, 1, 2], function(x, y) x > y)"), "[3, 2, 1]");
    assert_eq!(
        eval("sort(list: [\"b\", \"a\"], precedes: function(x, y) x < y)"),
        "[\"a\", \"b\"]"
    );
    assert_eq!(eval("sort([1, \"a\"])"), "null");
}

// ============================================================================
// Logic and numbers
// ============================================================================

#[test]
fn test_all_and_any() {
    assert_eq!(eval("all([true, null, false])"), "null");
    assert_eq!(eval("all([true, false, null])"), "false");
    assert_eq!(eval("all([true, null])"), "null");
    assert_eq!(eval("all([])"), "true");
    assert_eq!(eval("any([false, true])"), "true");
    assert_eq!(eval("any([])"), "false");
    assert_eq!(eval("all(true, true)"), "true");
}

#[test]
fn test_numeric_functions() {
    assert_eq!(eval("decimal(1 / 3, 2)"), "0.33");
    assert_eq!(eval("decimal(2.5, 0)"), "2");
    assert_eq!(eval("floor(-1.5)"), "-2");
    assert_eq!(eval("ceiling(1.2)"), "2");
    assert_eq!(eval("abs(-10)"), "10");
    assert_eq!(eval("modulo(-12, 5)"), "3");
    assert_eq!(eval("sqrt(16)"), "4");
    assert_eq!(eval("sqrt(-1)"), "null");
    assert_eq!(eval("exp(0)"), "1");
    assert_eq!(eval("odd(5)"), "true");
    assert_eq!(eval("even(5)"), "false");
}

// ============================================================================
// Conversion and contexts
// ============================================================================

#[test]
fn test_conversion_functions() {
    assert_eq!(eval("number(\"1,000.5\", \",\", \".\")"), "1000.5");
    assert_eq!(eval("number(\"12\")"), "12");
    assert_eq!(eval("number(\"abc\")"), "null");
    assert_eq!(eval("string(1.1)"), "1.1");
    assert_eq!(eval("string(null)"), "null");
    assert_eq!(eval("string([1, \"a\"])"), "[1, \"a\"]");
}

#[test]
fn test_context_functions() {
    assert_eq!(eval("get value({a: 1, b: 2}, b)"), "2");
    assert_eq!(eval("get value({a: 1, b: 2}, \"a\")"), "1");
    assert_eq!(eval("get value({a: 1}, \"z\")"), "null");
    assert_eq!(
        eval("get entries({a: 1, b: \"x\"})"),
        "[{key: \"a\", value: 1}, {key: \"b\", value: \"x\"}]"
    );
    assert_eq!(eval("is(1, 1)"), "true");
    assert_eq!(eval("is(1, \"1\")"), "false");
}
