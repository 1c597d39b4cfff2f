//! Integration tests for expressions and assignments
//!
//! Tests interpolation, operators, and runtime type errors.

use quill_engine::StepResult;
use quill_foundation::{ErrorKind, Type, Value};

use crate::{dialog, interpreter};

fn first_line(source: &str) -> StepResult {
    interpreter(source).step()
}

#[test]
fn interpolation_renders_variables() {
    assert_eq!(
        first_line("LET gold = 100\nA: \"Gold: {gold}\""),
        dialog("A", "Gold: 100")
    );
}

#[test]
fn interpolation_renders_booleans_and_strings() {
    assert_eq!(
        first_line("LET ok = 1 < 2\nLET who = \"Ada\"\nA: \"{who} {ok}\""),
        dialog("A", "Ada TRUE")
    );
}

#[test]
fn missing_interpolation_stays_literal() {
    assert_eq!(
        first_line("A: \"Hello {missing}!\""),
        dialog("A", "Hello {missing}!")
    );
}

#[test]
fn escaped_braces_are_not_interpolated() {
    let mut interp = interpreter("LET x = 1\nA: \"\\{x\\} is {x}\"");
    assert_eq!(interp.step(), dialog("A", "{x} is 1"));
}

#[test]
fn string_equality() {
    let mut interp = interpreter(
        "LET a = \"ab\"\nIF a == \"ab\" && a != \"cd\" {\n  A: \"{a}\"\n}",
    );
    assert_eq!(interp.step(), dialog("A", "ab"));
}

#[test]
fn adding_strings_is_an_error() {
    let result = first_line("LET a = \"ab\" + \"cd\"");
    assert!(matches!(
        result.error().map(|e| &e.kind),
        Some(ErrorKind::TypeMismatch { operator, .. }) if operator == "+"
    ));
}

#[test]
fn compound_assignment_updates_integers() {
    let mut interp = interpreter("LET gold = 10\ngold += 5\ngold -= 3\nA: \"{gold}\"");
    assert_eq!(interp.step(), dialog("A", "12"));
    assert_eq!(interp.variable("gold"), Some(&Value::Int(12)));
}

#[test]
fn compound_assignment_with_a_string_is_an_error() {
    let mut interp = interpreter("LET a = 1\nLET b = \"x\"\na += b");
    let result = interp.step();
    let err = result.error().unwrap();
    assert_eq!(
        err.kind,
        ErrorKind::TypeMismatch {
            operator: "+=".into(),
            expected: Type::Int,
            left: Type::Int,
            right: Type::String,
        }
    );
    assert_eq!(err.line, Some(3));
    assert!(interp.is_failed());
}

#[test]
fn assignment_to_an_unbound_name_is_an_error() {
    let result = first_line("gold = 5");
    assert_eq!(
        result.error().map(|e| &e.kind),
        Some(&ErrorKind::UndefinedVariable("gold".into()))
    );
}

#[test]
fn non_boolean_condition_is_an_error() {
    let result = first_line("A: \"x\"\nIF 1 {\n  END\n}");
    assert_eq!(result, dialog("A", "x"));
    let mut interp = interpreter("IF 1 {\n  END\n}");
    let err = interp.step().error().cloned().unwrap();
    assert_eq!(err.kind, ErrorKind::NonBooleanCondition(Type::Int));
    assert_eq!(err.line, Some(1));
}

#[test]
fn null_coalescing_supplies_defaults() {
    let mut interp = interpreter("LET age = missing ?? 18\nA: \"{age}\"");
    assert_eq!(interp.step(), dialog("A", "18"));
}

#[test]
fn integer_overflow_is_an_error() {
    let result = first_line("LET big = 9223372036854775807\nbig += 1");
    assert_eq!(
        result.error().map(|e| &e.kind),
        Some(&ErrorKind::IntegerOverflow("+=".into()))
    );
}
