//! Integration tests for sessions
//!
//! Tests answering tool calls from the function table.

use quill_engine::{FunctionTable, InterpreterConfig, Phase, StepResult};
use quill_foundation::{ErrorKind, Value};
use quill_runtime::Session;

use crate::QUEST;

fn tools() -> FunctionTable {
    let mut tools = FunctionTable::new();
    tools.register_constant("getPlayerName", Value::from("Ada"));
    tools.register("getData", |args: &[Value]| match args {
        [Value::String(key)] if &**key == "gold" => Ok(Value::Int(40)),
        _ => Ok(Value::Nil),
    });
    tools
}

fn session() -> Session {
    Session::from_source(QUEST, InterpreterConfig::seeded(2))
        .unwrap()
        .with_tools(tools())
}

#[test]
fn registered_functions_answer_silently() {
    let mut session = session();
    let StepResult::Dialog { text, tags, .. } = session.next_event() else {
        panic!("expected dialog");
    };
    assert_eq!(text, "Welcome, Ada.");
    assert_eq!(tags, vec!["warm".to_string()]);
    assert_eq!(session.interpreter().variable("gold"), Some(&Value::Int(40)));
}

#[test]
fn unregistered_functions_surface_to_the_caller() {
    let mut session = session();
    session.next_event();
    assert!(matches!(session.next_event(), StepResult::Choice { .. }));
    assert_eq!(
        session.choose(0),
        StepResult::ToolCall {
            function: "getReward".into(),
            args: vec![Value::Int(40)],
        }
    );
    session.respond(Value::Int(100)).unwrap();
    let StepResult::Dialog { text, .. } = session.next_event() else {
        panic!("expected dialog");
    };
    assert_eq!(text, "You will earn 100.");
    assert!(matches!(session.next_event(), StepResult::Dialog { .. }));
    assert_eq!(session.next_event(), StepResult::End);
}

#[test]
fn functions_registered_later_are_used() {
    let mut session = session();
    session.tools_mut().register("getReward", |args: &[Value]| match args {
        [Value::Int(gold)] => Ok(Value::Int(gold * 2)),
        _ => Ok(Value::Int(0)),
    });
    session.next_event();
    session.next_event();
    let StepResult::Dialog { text, .. } = session.choose(0) else {
        panic!("expected dialog");
    };
    assert_eq!(text, "You will earn 80.");
}

#[test]
fn invalid_choices_can_be_retried() {
    let mut session = session();
    session.next_event();
    session.next_event();
    let result = session.choose(9);
    assert!(matches!(
        result.error().map(|e| &e.kind),
        Some(ErrorKind::InvalidChoice { index: 9, count: 3 })
    ));
    assert_eq!(session.phase(), Phase::WaitingForChoice);
    assert!(matches!(session.choose(1), StepResult::Choice { .. }));
}

#[test]
fn responding_without_a_pending_call_is_an_error() {
    let mut session = session();
    let err = session.respond(Value::Int(1)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotWaitingForToolCall);
}
