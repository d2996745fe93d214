// tests/sandbox_tests.rs

use quill_lang::config::CompilerConfig;
use quill_lang::sandbox::{EvalError, Evaluator, Value, eval_source};
use rstest::rstest;
use rust_decimal::Decimal;

fn eval(source: &str) -> Result<Value, EvalError> {
    eval_source(source, &CompilerConfig::default())
}

fn number(n: i64) -> Value {
    Value::Number(Decimal::new(n, 0))
}

// ============================================================================
// Arithmetic
// ============================================================================

#[rstest]
#[case("3 - 5 * 2", -7)]
#[case("3 + 5 * 2", 13)]
#[case("10 - 4 - 3", 3)]
#[case("2 * (3 + 4)", 14)]
#[case("-3 + 1", -2)]
#[case("10 % 4", 2)]
#[case("12 / 4 / 3", 1)]
fn test_arithmetic(#[case] input: &str, #[case] expected: i64) {
    assert_eq!(eval(input).unwrap(), number(expected), "Failed for input: {input}");
}

#[test]
fn test_decimal_literals() {
    assert_eq!(eval("0.1 + 0.2").unwrap(), Value::Number(Decimal::new(3, 1)));
    assert_eq!(eval("3.50").unwrap().to_string(), "3.5");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'ab' + \"cd\"").unwrap(), Value::from("abcd"));
}

// ============================================================================
// Comparisons and Elision
// ============================================================================

#[rstest]
#[case("3 < 4 and 5", true)]
#[case("3 > 2 and 4", false)]
#[case("5 and 3 < 4", false)]
#[case("3 < 4 and 5 and 6", true)]
#[case("3 < 4 and 5 < 6", true)]
#[case("1 is 1 or 2", true)]
#[case("'abc' contains 'b'", true)]
#[case("'b' is in 'abc'", true)]
#[case("'z' is not in 'abc'", true)]
#[case("not (1 is 2)", true)]
fn test_boolean_results(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(eval(input).unwrap(), Value::Boolean(expected), "Failed for input: {input}");
}

#[test]
fn test_is_not_elision_raises() {
    let err = eval("'a' is not 'b' and 'a'").unwrap_err();
    assert!(matches!(err, EvalError::Raised { ref category, .. } if category == "operation"));
}

#[test]
fn test_missing_left_side_uses_it() {
    let mut evaluator = Evaluator::new();
    evaluator.eval_code(r#"Operations["<"](7,9)"#).unwrap();
    let value = evaluator
        .eval_code(r#"Operations["<"](Operations.Identifiers.it,8)"#)
        .unwrap();
    assert_eq!(value, Value::Boolean(true));
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_literal_values() {
    let test_cases = vec![
        ("true", Value::Boolean(true)),
        ("'hi'", Value::from("hi")),
        ("#FFF", Value::Colour("#fff".into())),
        ("it", Value::Undefined),
        ("", Value::Undefined),
        ("1, 2", Value::Array(vec![number(1), number(2)])),
    ];

    for (input, expected) in test_cases {
        assert_eq!(eval(input).unwrap(), expected, "Failed for input: {input}");
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_fragments_are_raised() {
    assert_eq!(
        eval("* 5").unwrap_err(),
        EvalError::Raised {
            category: "operation".into(),
            message: "I need usable code to the left of '*'.".into(),
        }
    );
}

#[test]
fn test_runtime_errors() {
    assert_eq!(eval("1 / 0").unwrap_err(), EvalError::DivisionByZero);
    assert!(matches!(eval("true and 1"), Err(EvalError::TypeError(_))));
    assert!(matches!(eval("$a + 1"), Err(EvalError::Unsupported(_))));
    assert!(matches!(eval("(print: 1)"), Err(EvalError::Unsupported(_))));
}
