//! Integration tests for save files
//!
//! Tests saving a session mid-script and resuming it.

use std::path::PathBuf;

use quill_engine::{FunctionTable, InterpreterConfig, StepResult};
use quill_foundation::{ErrorKind, Value};
use quill_language::compile;
use quill_runtime::Session;
use quill_runtime::serialize::{from_bytes, load_from_file, save_to_file, to_bytes};

use crate::QUEST;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("quill_{name}_{}.msgpack", std::process::id()))
}

fn tools() -> FunctionTable {
    let mut tools = FunctionTable::new();
    tools.register_constant("getPlayerName", Value::from("Ada"));
    tools.register_constant("getData", Value::Int(40));
    tools
}

#[test]
fn save_and_resume_at_a_choice() {
    let mut session = Session::from_source(QUEST, InterpreterConfig::seeded(4))
        .unwrap()
        .with_tools(tools());
    session.next_event();
    let choice = session.next_event();

    let path = temp_path("choice");
    save_to_file(&session.snapshot(), &path).unwrap();
    let snapshot = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let mut resumed = Session::resume(compile(QUEST).unwrap(), snapshot, InterpreterConfig::default())
        .unwrap()
        .with_tools(tools());
    assert_eq!(resumed.current_event(), choice);
    assert_eq!(resumed.interpreter().variable("name"), Some(&Value::from("Ada")));

    let StepResult::Dialog { text, .. } = resumed.choose(2) else {
        panic!("expected dialog");
    };
    assert_eq!(text, "Another time.");
    assert_eq!(resumed.next_event(), StepResult::End);
}

#[test]
fn save_and_resume_at_a_tool_call() {
    let mut session = Session::from_source(QUEST, InterpreterConfig::seeded(4))
        .unwrap()
        .with_tools(tools());
    session.next_event();
    session.next_event();
    let call = session.choose(0);
    assert!(matches!(call, StepResult::ToolCall { .. }));

    let bytes = to_bytes(&session.snapshot()).unwrap();
    let mut resumed = Session::resume(
        compile(QUEST).unwrap(),
        from_bytes(&bytes).unwrap(),
        InterpreterConfig::default(),
    )
    .unwrap();
    assert_eq!(resumed.current_event(), call);
    resumed.respond(Value::Int(7)).unwrap();
    let StepResult::Dialog { text, .. } = resumed.next_event() else {
        panic!("expected dialog");
    };
    assert_eq!(text, "You will earn 7.");
}

#[test]
fn garbage_is_not_a_save() {
    let err = from_bytes(b"not a save").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_from_file(temp_path("missing")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}
