//! Integration tests for tool calls
//!
//! Tests suspending LET statements and host functions in expressions.

use quill_engine::{FunctionTable, Phase, StepResult};
use quill_foundation::{ErrorKind, Value};

use crate::{dialog, interpreter};

#[test]
fn let_tool_call_suspends_then_binds() {
    let mut interp = interpreter("LET hp = 7\nLET name = <getName; \"hero\", hp>\nA: \"Hi {name}\"");
    assert_eq!(
        interp.step(),
        StepResult::ToolCall {
            function: "getName".into(),
            args: vec![Value::from("hero"), Value::Int(7)],
        }
    );
    assert_eq!(interp.phase(), Phase::WaitingForToolCall);
    let pending = interp.pending_tool_call().unwrap();
    assert_eq!(pending.target, "name");
    assert_eq!(pending.line, 2);

    assert_eq!(
        interp.step().error().map(|e| &e.kind),
        Some(&ErrorKind::AwaitingToolCall)
    );
    assert_eq!(interp.phase(), Phase::WaitingForToolCall);

    interp.handle_tool_call_response(Value::from("Ada")).unwrap();
    assert_eq!(interp.variable("name"), Some(&Value::from("Ada")));
    assert_eq!(interp.step(), dialog("A", "Hi Ada"));
}

#[test]
fn responses_without_a_pending_call_are_rejected() {
    let mut interp = interpreter("A: \"x\"");
    let err = interp.handle_tool_call_response(Value::Int(1)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotWaitingForToolCall);
    assert_eq!(interp.step(), dialog("A", "x"));
}

#[test]
fn tool_call_with_a_default_runs_immediately() {
    let mut interp = interpreter("LET n = <getCount> ?? 3\nA: \"{n}\"");
    assert_eq!(interp.step(), dialog("A", "3"));
    assert!(interp.pending_tool_call().is_none());
}

#[test]
fn interpolated_calls_use_the_host() {
    let mut tools = FunctionTable::new();
    tools.register("greet", |args: &[Value]| {
        Ok(Value::from(format!("hello {}", args.first().map(ToString::to_string).unwrap_or_default())))
    });
    let mut interp = interpreter("A: \"<greet; \"Ada\">!\"");
    assert_eq!(interp.step_with(&mut tools), dialog("A", "hello Ada!"));
}

#[test]
fn interpolated_calls_without_a_host_fail() {
    let mut interp = interpreter("A: \"<greet>\"");
    let result = interp.step();
    let err = result.error().unwrap();
    assert_eq!(err.kind, ErrorKind::UnknownTool("greet".into()));
    assert_eq!(err.line, Some(1));
}

#[test]
fn failed_calls_fall_back_with_null_coalescing() {
    let mut interp = interpreter("LET price = 5\nA: \"Cost: {price}\"\nLET shown = (<getPrice> ?? price) + 1\nA: \"{shown}\"");
    assert_eq!(interp.step(), dialog("A", "Cost: 5"));
    assert_eq!(interp.step(), dialog("A", "6"));
}
