//! Integration tests for the parser
//!
//! Tests parsing whole scripts and reporting syntax errors.

use quill_foundation::ErrorKind;
use quill_language::{Expr, Stmt, StringPart, compile};

const SCRIPT: &str = r#"# The gate
LET gold = <getData; "gold">
LABEL gate
Guard: "Halt! You carry {gold} coins." [stern]
CHOICE {
  "Pay" {
    gold -= 10
    GOTO inside
  } [costly]
  "Leave" {
    END
  }
}
LABEL inside
IF gold >= 10 && !broke {
  Guard: "Welcome."
} ELSE {
  RANDOM {
    { Guard: "Off you go." }
    { Guard: "Come back richer." }
  }
}
"#;

#[test]
fn parses_a_whole_script() {
    let program = compile(SCRIPT).unwrap();
    let labels: Vec<&str> = program
        .statements
        .iter()
        .filter_map(Stmt::label_name)
        .collect();
    assert_eq!(labels, vec!["gate", "inside"]);
    assert_eq!(program.len(), 6);
}

#[test]
fn let_with_a_tool_call() {
    let program = compile(SCRIPT).unwrap();
    let Stmt::Let { name, value, span } = &program.statements[0] else {
        panic!("expected LET");
    };
    assert_eq!(name, "gold");
    assert_eq!(span.line, 2);
    let call = value.as_tool_call().unwrap();
    assert_eq!(call.function, "getData");
    assert!(matches!(&call.args[..], [Expr::String(s, _)] if s == "gold"));
}

#[test]
fn dialog_with_interpolation_and_tags() {
    let program = compile(SCRIPT).unwrap();
    let Stmt::Dialog {
        speaker, text, tags, ..
    } = &program.statements[2]
    else {
        panic!("expected dialog");
    };
    assert_eq!(speaker, "Guard");
    assert_eq!(tags.names(), ["stern"]);
    let Expr::Interpolated(parts, _) = text else {
        panic!("expected interpolated text");
    };
    assert_eq!(parts[1], StringPart::Variable("gold".into()));
}

#[test]
fn choice_options_keep_bodies_and_tags() {
    let program = compile(SCRIPT).unwrap();
    let Stmt::Choice { options, .. } = &program.statements[3] else {
        panic!("expected CHOICE");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].body.statements.len(), 2);
    assert_eq!(options[0].tags.names(), ["costly"]);
    assert!(options[1].tags.is_empty());
}

#[test]
fn every_block_has_its_own_id() {
    let program = compile(SCRIPT).unwrap();
    let mut ids: Vec<u32> = program.blocks().iter().map(|b| b.id.0).collect();
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn syntax_errors_are_collected_with_lines() {
    let err = compile("LET = 1\nA: \"fine\"\nGOTO\nCHOICE {\n  oops\n}").unwrap_err();
    let ErrorKind::Syntax(diagnostics) = err.kind else {
        panic!("expected syntax errors, got {err:?}");
    };
    let lines: Vec<u32> = diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(&lines[..2], &[1, 3]);
    assert_eq!(diagnostics[0].message, "Expected identifier after LET");
    assert!(diagnostics.len() >= 3);
}

#[test]
fn lexical_errors_stop_before_parsing() {
    let err = compile("LET = 1\nA: \"unterminated").unwrap_err();
    let ErrorKind::Lexical(diagnostics) = err.kind else {
        panic!("expected lexical errors, got {err:?}");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 2);
}
